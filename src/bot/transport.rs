use crate::media::MediaItem;
use async_trait::async_trait;
use thiserror::Error;

const BLOCKED_DESCRIPTION: &str = "blocked by the user";

/// Errors reported by the chat platform, reduced to what the handler acts on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Forbidden: bot was blocked by the user")]
    Blocked,
    #[error("{0}")]
    RateLimited(String),
    #[error("Call to '{method}' failed! ({description})")]
    SendFailed {
        method: &'static str,
        description: String,
    },
    #[error("{0}")]
    Api(String),
    #[error("Could not contact Telegram: {0}")]
    Network(String),
}

impl PlatformError {
    /// Classifies a platform error description.
    pub fn from_description(description: impl Into<String>) -> Self {
        let description = description.into();
        if description.contains(BLOCKED_DESCRIPTION) {
            Self::Blocked
        } else {
            Self::Api(description)
        }
    }

    /// Attributes a generic API failure to the send call that produced it.
    pub fn in_call(self, method: &'static str) -> Self {
        match self {
            Self::Api(description) => Self::SendFailed {
                method,
                description,
            },
            other => other,
        }
    }
}

/// Where a reply goes, optionally threaded to an earlier message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub chat_id: i64,
    pub reply_to: Option<i32>,
}

impl Destination {
    pub fn chat(chat_id: i64) -> Self {
        Self {
            chat_id,
            reply_to: None,
        }
    }

    pub fn reply(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            reply_to: Some(message_id),
        }
    }
}

/// The subset of the chat platform the bot talks to.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends an HTML formatted text message and returns its message id.
    async fn send_message(&self, to: Destination, text: &str) -> Result<i32, PlatformError>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), PlatformError>;

    /// Sends one media group of at most ten items.
    async fn send_media_group(
        &self,
        to: Destination,
        items: &[MediaItem],
    ) -> Result<(), PlatformError>;
}
