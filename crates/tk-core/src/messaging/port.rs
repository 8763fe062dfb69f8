use async_trait::async_trait;

use crate::{
    domain::{ThreadId, UserId},
    messaging::types::{Attachment, MessagingCapabilities},
    Result,
};

/// Outbound port to the chat backend.
///
/// Every operation except `capabilities` is optional for an implementation;
/// one that cannot perform it reports the flag as `false` and returns
/// `Error::Unsupported` if called anyway.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, thread: &ThreadId, text: &str) -> Result<()>;
    async fn send_sticker(&self, thread: &ThreadId, sticker_id: &str) -> Result<()>;
    async fn send_media(&self, thread: &ThreadId, media: &[Attachment]) -> Result<()>;

    async fn set_title(&self, thread: &ThreadId, title: &str) -> Result<()>;
    async fn change_nickname(&self, thread: &ThreadId, user: &UserId, nickname: &str)
        -> Result<()>;
    async fn list_participants(&self, thread: &ThreadId) -> Result<Vec<UserId>>;

    /// Remove the logged-in account from the thread.
    async fn leave_thread(&self, thread: &ThreadId) -> Result<()>;
}
