//! One-shot page messages carried across a redirect in the session.

use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};
use tracing::warn;

/// Session key holding the pending `Vec<PageMessage>`.
pub const FLASH_KEY: &str = "page_message";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl MessageLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl PageMessage {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, text)
    }
}

/// Queues `messages` for the next page rendered in this session.
pub async fn push_messages(
    session: &Session,
    messages: &[PageMessage],
) -> Result<(), session::Error> {
    let mut pending = session
        .get::<Vec<PageMessage>>(FLASH_KEY)
        .await?
        .unwrap_or_default();
    pending.extend_from_slice(messages);
    session.insert(FLASH_KEY, pending).await
}

/// Removes and returns the queued messages.
pub async fn take_messages(session: &Session) -> Vec<PageMessage> {
    match session.remove::<Vec<PageMessage>>(FLASH_KEY).await {
        Ok(pending) => pending.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "unreadable page messages dropped");
            Vec::new()
        }
    }
}
