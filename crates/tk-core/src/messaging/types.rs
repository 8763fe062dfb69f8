use crate::domain::{MessageId, ThreadId, UserId};

/// Inbound event model, already normalized by the adapter.
#[derive(Clone, Debug)]
pub enum InboundEvent {
    Message(MessageEvent),
    ThreadLog(ThreadLogEvent),
}

#[derive(Clone, Debug)]
pub struct MessageEvent {
    pub thread_id: ThreadId,
    pub sender_id: UserId,
    pub message_id: MessageId,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Clone, Debug)]
pub struct ThreadLogEvent {
    pub thread_id: ThreadId,
    pub kind: ThreadLogKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThreadLogKind {
    TitleChanged { name: String },
    Other(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    Photo,
    Video,
    Animation,
    Document,
    Audio,
    Voice,
}

/// Media already stored by the backend, re-sendable by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_id: String,
}

/// Optional operations a backend may or may not provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    SendText,
    SendSticker,
    SendMedia,
    SetTitle,
    ChangeNickname,
    ListParticipants,
    LeaveThread,
}

/// Capability set of a messenger implementation.
///
/// Callers probe this before invoking an optional operation; unsupported
/// operations return `Error::Unsupported`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessagingCapabilities {
    pub send_text: bool,
    pub send_sticker: bool,
    pub send_media: bool,
    pub set_title: bool,
    pub change_nickname: bool,
    pub list_participants: bool,
    pub leave_thread: bool,
}

impl MessagingCapabilities {
    pub fn all() -> Self {
        Self {
            send_text: true,
            send_sticker: true,
            send_media: true,
            set_title: true,
            change_nickname: true,
            list_participants: true,
            leave_thread: true,
        }
    }

    pub fn supports(&self, cap: Capability) -> bool {
        match cap {
            Capability::SendText => self.send_text,
            Capability::SendSticker => self.send_sticker,
            Capability::SendMedia => self.send_media,
            Capability::SetTitle => self.set_title,
            Capability::ChangeNickname => self.change_nickname,
            Capability::ListParticipants => self.list_participants,
            Capability::LeaveThread => self.leave_thread,
        }
    }
}
