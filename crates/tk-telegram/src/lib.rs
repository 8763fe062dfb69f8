//! Telegram adapter (teloxide).
//!
//! This crate implements the `tk-core` MessagingPort over the Telegram Bot API
//! and feeds normalized updates into the command interpreter.

use async_trait::async_trait;

use teloxide::{prelude::*, types::InputFile};

pub mod events;
pub mod router;

use tk_core::{
    domain::{ThreadId, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{Attachment, AttachmentKind, Capability, MessagingCapabilities},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(thread: &ThreadId) -> Result<teloxide::types::ChatId> {
        thread
            .0
            .parse::<i64>()
            .map(teloxide::types::ChatId)
            .map_err(|_| Error::External(format!("not a telegram chat id: {thread}")))
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn send_attachment(
        &self,
        chat: teloxide::types::ChatId,
        attachment: &Attachment,
    ) -> std::result::Result<Message, teloxide::RequestError> {
        let file = InputFile::file_id(attachment.file_id.clone());
        match attachment.kind {
            AttachmentKind::Photo => self.bot.send_photo(chat, file).await,
            AttachmentKind::Video => self.bot.send_video(chat, file).await,
            AttachmentKind::Animation => self.bot.send_animation(chat, file).await,
            AttachmentKind::Document => self.bot.send_document(chat, file).await,
            AttachmentKind::Audio => self.bot.send_audio(chat, file).await,
            AttachmentKind::Voice => self.bot.send_voice(chat, file).await,
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        // Telegram has no per-chat member nicknames and bots cannot list
        // every member of a group.
        MessagingCapabilities {
            send_text: true,
            send_sticker: true,
            send_media: true,
            set_title: true,
            change_nickname: false,
            list_participants: false,
            leave_thread: true,
        }
    }

    async fn send_text(&self, thread: &ThreadId, text: &str) -> Result<()> {
        let chat = Self::tg_chat(thread)?;
        self.bot
            .send_message(chat, text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_sticker(&self, thread: &ThreadId, sticker_id: &str) -> Result<()> {
        let chat = Self::tg_chat(thread)?;
        self.bot
            .send_sticker(chat, InputFile::file_id(sticker_id.to_string()))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_media(&self, thread: &ThreadId, media: &[Attachment]) -> Result<()> {
        let chat = Self::tg_chat(thread)?;
        for attachment in media {
            self.send_attachment(chat, attachment)
                .await
                .map_err(Self::map_err)?;
        }
        Ok(())
    }

    async fn set_title(&self, thread: &ThreadId, title: &str) -> Result<()> {
        let chat = Self::tg_chat(thread)?;
        self.bot
            .set_chat_title(chat, title.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn change_nickname(
        &self,
        _thread: &ThreadId,
        _user: &UserId,
        _nickname: &str,
    ) -> Result<()> {
        Err(Error::Unsupported(Capability::ChangeNickname))
    }

    async fn list_participants(&self, _thread: &ThreadId) -> Result<Vec<UserId>> {
        Err(Error::Unsupported(Capability::ListParticipants))
    }

    async fn leave_thread(&self, thread: &ThreadId) -> Result<()> {
        let chat = Self::tg_chat(thread)?;
        self.bot.leave_chat(chat).await.map_err(Self::map_err)?;
        Ok(())
    }
}
