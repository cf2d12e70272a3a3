use super::fetch::{fetch_and_deliver, FetchError};
use super::messages;
use super::transport::{ChatTransport, Destination, PlatformError};
use crate::config::BotSettings;
use crate::media::MediaSource;
use crate::profile::{resolve, Rejection};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// How long the "Downloading" notice stays up.
pub const STATUS_DELETE_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct Sender {
    pub id: u64,
    pub name: String,
    pub username: Option<String>,
}

/// Per-message state, dropped once the message has been handled.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub update_id: Option<u32>,
    pub chat_id: i64,
    pub message_id: i32,
    pub is_private: bool,
    pub sender: Option<Sender>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The user blocked the bot, nothing can be sent back.
    Blocked,
    SendFailed,
    Platform,
    Source,
}

/// Terminal state of a handled text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done { groups: usize },
    Rejected(Rejection),
    Failed(Failure),
}

pub struct RequestHandler {
    source: Arc<dyn MediaSource>,
    transport: Arc<dyn ChatTransport>,
    settings: BotSettings,
}

impl RequestHandler {
    pub fn new(
        source: Arc<dyn MediaSource>,
        transport: Arc<dyn ChatTransport>,
        settings: BotSettings,
    ) -> Self {
        Self {
            source,
            transport,
            settings,
        }
    }

    fn reply_destination(&self, ctx: &RequestContext) -> Destination {
        if self.settings.thread_replies {
            Destination::reply(ctx.chat_id, ctx.message_id)
        } else {
            Destination::chat(ctx.chat_id)
        }
    }

    pub async fn start(&self, ctx: &RequestContext) -> Result<(), PlatformError> {
        let to = Destination::chat(ctx.chat_id);

        if self.settings.private_only && !ctx.is_private {
            info!("Refusing /start in non-private chat {}", ctx.chat_id);
            self.transport
                .send_message(to, &messages::groups_unsupported())
                .await?;
            return Ok(());
        }

        self.transport.send_message(to, &messages::welcome()).await?;
        info!(chat_id = ctx.chat_id, sender = ?ctx.sender, "New user added");
        Ok(())
    }

    pub async fn help(&self, ctx: &RequestContext) -> Result<(), PlatformError> {
        self.transport
            .send_message(
                Destination::chat(ctx.chat_id),
                &messages::help(self.settings.fetch_limit),
            )
            .await?;
        info!("Help command sent to {}", ctx.chat_id);
        Ok(())
    }

    /// Handles a profile name or link sent by the user.
    ///
    /// Fetch failures are reported to the user and end in `Outcome::Failed`.
    /// An `Err` means a reply of the handler itself could not be sent.
    pub async fn handle_text(
        &self,
        ctx: &RequestContext,
        text: &str,
    ) -> Result<Outcome, PlatformError> {
        match &ctx.sender {
            Some(sender) => info!(
                user_id = sender.id,
                "From: {} (@{}) Message: {}",
                sender.name,
                sender.username.as_deref().unwrap_or("-"),
                text
            ),
            None => info!("From: unknown sender Message: {}", text),
        }

        let handle = match resolve(text) {
            Ok(handle) => handle,
            Err(rejection) => {
                info!("Rejected input {:?}: {:?}", text, rejection);
                let reply = match rejection {
                    Rejection::InvalidLink => messages::invalid_link(),
                    Rejection::InvalidUsername => messages::invalid_username(),
                };
                self.transport
                    .send_message(self.reply_destination(ctx), &reply)
                    .await?;
                return Ok(Outcome::Rejected(rejection));
            }
        };

        let status_id = self
            .transport
            .send_message(Destination::chat(ctx.chat_id), &messages::downloading())
            .await?;
        self.schedule_status_delete(ctx.chat_id, status_id);

        let result = fetch_and_deliver(
            self.source.as_ref(),
            self.transport.as_ref(),
            &handle,
            self.settings.fetch_limit,
            self.reply_destination(ctx),
        )
        .await;

        match result {
            Ok(groups) => Ok(Outcome::Done { groups }),
            Err(err) => {
                let failure = self.report_failure(ctx, err).await?;
                Ok(Outcome::Failed(failure))
            }
        }
    }

    /// Deletes the status notice after a delay, independent of the fetch.
    fn schedule_status_delete(&self, chat_id: i64, message_id: i32) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            tokio::time::sleep(STATUS_DELETE_DELAY).await;
            if let Err(e) = transport.delete_message(chat_id, message_id).await {
                debug!("Could not delete status message {}: {}", message_id, e);
            }
        });
    }

    async fn report_failure(
        &self,
        ctx: &RequestContext,
        err: FetchError,
    ) -> Result<Failure, PlatformError> {
        let to = self.reply_destination(ctx);

        let failure = match err {
            FetchError::Platform(PlatformError::Blocked) => {
                info!("Bot was blocked by the user");
                return Ok(Failure::Blocked);
            }
            FetchError::Platform(
                e @ (PlatformError::SendFailed { .. } | PlatformError::RateLimited(_)),
            ) => {
                error!("Error sending files. Maybe API limit was hit: {}", e);
                self.transport
                    .send_message(to, &messages::send_failed())
                    .await?;
                Failure::SendFailed
            }
            FetchError::Platform(e) => {
                error!("Error sending message: {}", e);
                self.transport
                    .send_message(to, &messages::platform_error(&e.to_string()))
                    .await?;
                Failure::Platform
            }
            FetchError::Source(e) => {
                error!("Failed to fetch media: {:#}", e);
                self.transport
                    .send_message(to, &messages::fetch_failed(&format!("{e:#}")))
                    .await?;
                Failure::Source
            }
        };

        Ok(failure)
    }

    /// Last resort for errors the per-message flow could not deal with.
    pub async fn report_escaped(&self, ctx: &RequestContext, query: &str, err: &PlatformError) {
        error!(
            update_id = ?ctx.update_id,
            query,
            "Error while handling update: {}",
            err
        );

        match err {
            PlatformError::Blocked => info!("Bot was blocked by the user"),
            PlatformError::Network(_) => error!("{}", err),
            _ => {
                if let Err(e) = self
                    .transport
                    .send_message(Destination::chat(ctx.chat_id), &messages::generic_error())
                    .await
                {
                    error!("Failed to report error to chat {}: {}", ctx.chat_id, e);
                }
            }
        }
    }
}
