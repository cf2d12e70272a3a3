use super::handler::{RequestContext, RequestHandler, Sender};
use super::transport::{ChatTransport, Destination, PlatformError};
use crate::config::{Config, TransportMode};
use crate::media::{GalleryDlSource, MediaItem, MediaKind, MediaSource};
use crate::utils::display_name;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    types::{
        InputFile, InputMedia, InputMediaAnimation, InputMediaPhoto, InputMediaVideo, MessageId,
        ParseMode, ReplyParameters,
    },
    update_listeners::webhooks,
    utils::command::BotCommands,
    ApiError, RequestError,
};
use tracing::{info, warn};

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "Show the welcome message.")]
    Start,
    #[command(description = "Explain how to use the bot.")]
    Help,
}

impl From<RequestError> for PlatformError {
    fn from(err: RequestError) -> Self {
        match &err {
            RequestError::Api(ApiError::BotBlocked) => PlatformError::Blocked,
            RequestError::Api(api) => PlatformError::from_description(api.to_string()),
            RequestError::RetryAfter(_) => PlatformError::RateLimited(err.to_string()),
            RequestError::Network(_) | RequestError::Io(_) => {
                PlatformError::Network(err.to_string())
            }
            _ => PlatformError::Api(err.to_string()),
        }
    }
}

/// `ChatTransport` backed by the Telegram Bot API.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn input_media(item: &MediaItem) -> InputMedia {
    let file = InputFile::url(item.url.clone());
    match item.kind {
        MediaKind::Photo => InputMedia::Photo(InputMediaPhoto::new(file)),
        MediaKind::Video => InputMedia::Video(InputMediaVideo::new(file)),
        MediaKind::Animation => InputMedia::Animation(InputMediaAnimation::new(file)),
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, to: Destination, text: &str) -> Result<i32, PlatformError> {
        let mut req = self
            .bot
            .send_message(ChatId(to.chat_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(reply_to) = to.reply_to {
            req = req.reply_parameters(ReplyParameters::new(MessageId(reply_to)));
        }
        let message = req.await?;
        Ok(message.id.0)
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), PlatformError> {
        self.bot
            .delete_message(ChatId(chat_id), MessageId(message_id))
            .await?;
        Ok(())
    }

    async fn send_media_group(
        &self,
        to: Destination,
        items: &[MediaItem],
    ) -> Result<(), PlatformError> {
        let media: Vec<InputMedia> = items.iter().map(input_media).collect();

        let mut req = self.bot.send_media_group(ChatId(to.chat_id), media);
        if let Some(reply_to) = to.reply_to {
            req = req.reply_parameters(ReplyParameters::new(MessageId(reply_to)));
        }
        req.await
            .map_err(|e| PlatformError::from(e).in_call("sendMediaGroup"))?;
        Ok(())
    }
}

fn request_context(update: &Update, msg: &Message) -> RequestContext {
    RequestContext {
        update_id: Some(update.id.0),
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        is_private: msg.chat.is_private(),
        sender: msg.from.as_ref().map(|user| Sender {
            id: user.id.0,
            name: display_name(&user.first_name, user.last_name.as_deref()),
            username: user.username.clone(),
        }),
    }
}

fn schema() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text))
}

async fn handle_command(
    update: Update,
    msg: Message,
    cmd: Command,
    handler: Arc<RequestHandler>,
) -> ResponseResult<()> {
    let started = Instant::now();
    let ctx = request_context(&update, &msg);

    let result = match cmd {
        Command::Start => handler.start(&ctx).await,
        Command::Help => handler.help(&ctx).await,
    };
    if let Err(e) = result {
        handler
            .report_escaped(&ctx, msg.text().unwrap_or_default(), &e)
            .await;
    }

    info!("Response time: {} ms", started.elapsed().as_millis());
    respond(())
}

async fn handle_text(
    update: Update,
    msg: Message,
    handler: Arc<RequestHandler>,
) -> ResponseResult<()> {
    let started = Instant::now();
    let ctx = request_context(&update, &msg);
    let text = msg.text().unwrap_or_default();

    match handler.handle_text(&ctx, text).await {
        Ok(outcome) => info!(chat_id = ctx.chat_id, ?outcome, "Request finished"),
        Err(e) => handler.report_escaped(&ctx, text, &e).await,
    }

    info!("Response time: {} ms", started.elapsed().as_millis());
    respond(())
}

async fn register_commands(bot: &Bot) -> Result<()> {
    info!("Registering Telegram bot commands...");
    bot.set_my_commands(Command::bot_commands()).await?;
    info!("Successfully registered /start and /help");
    Ok(())
}

pub async fn run(token: String, config: Config) -> Result<()> {
    let bot = Bot::new(token);

    let source = GalleryDlSource::new(config.scraper.program.clone());
    if !source.test_availability().await {
        warn!("Media source {} is not available", source.name());
    }

    if let Err(e) = register_commands(&bot).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let handler = Arc::new(RequestHandler::new(
        Arc::new(source),
        Arc::new(TelegramTransport::new(bot.clone())),
        config.bot.clone(),
    ));

    // A single distribution key puts every update in one queue.
    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![handler])
        .distribution_function(|_| Some(()))
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match config.transport.mode {
        TransportMode::Polling => {
            info!("Telegram bot starting with long polling...");
            dispatcher.dispatch().await;
        }
        TransportMode::Webhook => {
            let (addr, url) = config.transport.webhook()?;
            info!("Telegram bot starting with webhook {} on {}", url, addr);
            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url))
                .await
                .context("Failed to set up webhook")?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    info!("Telegram dispatcher stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_blocked_maps_to_blocked() {
        let err = PlatformError::from(RequestError::Api(ApiError::BotBlocked));
        assert_eq!(err, PlatformError::Blocked);
    }

    #[test]
    fn test_api_error_keeps_description() {
        let err = PlatformError::from(RequestError::Api(ApiError::MessageToDeleteNotFound));
        assert!(matches!(err, PlatformError::Api(ref d) if d.contains("message to delete not found")));

        let err = PlatformError::from(RequestError::Api(ApiError::Unknown(
            "Forbidden: bot was blocked by the user".to_string(),
        )));
        assert_eq!(err, PlatformError::Blocked);
    }

    #[test]
    fn test_input_media_kinds() {
        let url = Url::parse("https://im.vsco.co/a/1.jpg").unwrap();

        let photo = input_media(&MediaItem::new(MediaKind::Photo, url.clone()));
        assert!(matches!(photo, InputMedia::Photo(_)));

        let video = input_media(&MediaItem::new(MediaKind::Video, url.clone()));
        assert!(matches!(video, InputMedia::Video(_)));

        let animation = input_media(&MediaItem::new(MediaKind::Animation, url));
        assert!(matches!(animation, InputMedia::Animation(_)));
    }

    #[test]
    fn test_command_parsing() {
        assert!(matches!(
            Command::parse("/start", "vsco_bot"),
            Ok(Command::Start)
        ));
        assert!(matches!(
            Command::parse("/help@vsco_bot", "vsco_bot"),
            Ok(Command::Help)
        ));
        assert!(Command::parse("/gallery", "vsco_bot").is_err());
    }
}
