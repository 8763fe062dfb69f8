//! Telegram update -> core event normalization.

use teloxide::types::Message;

use tk_core::{
    domain::{MessageId, ThreadId, UserId},
    messaging::types::{
        Attachment, AttachmentKind, InboundEvent, MessageEvent, ThreadLogEvent, ThreadLogKind,
    },
};

/// Map a Telegram message into a core event.
///
/// Returns `None` for shapes the interpreter has no use for (service
/// messages other than title changes, messages without a sender, stickers,
/// polls, ...).
pub fn normalize(msg: &Message) -> Option<InboundEvent> {
    let thread_id = ThreadId(msg.chat.id.0.to_string());

    if let Some(title) = msg.new_chat_title() {
        return Some(InboundEvent::ThreadLog(ThreadLogEvent {
            thread_id,
            kind: ThreadLogKind::TitleChanged {
                name: title.to_string(),
            },
        }));
    }

    let sender = msg.from()?;
    let body = msg.text().or_else(|| msg.caption()).map(str::to_string);
    let attachments = attachments(msg);
    if body.is_none() && attachments.is_empty() {
        return None;
    }

    Some(InboundEvent::Message(MessageEvent {
        thread_id,
        sender_id: UserId(sender.id.0.to_string()),
        message_id: MessageId(msg.id.0.to_string()),
        body,
        attachments,
    }))
}

fn attachments(msg: &Message) -> Vec<Attachment> {
    let mut out = Vec::new();

    // Telegram sends every resolution; the last one is the largest.
    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        out.push(Attachment {
            kind: AttachmentKind::Photo,
            file_id: photo.file.id.clone(),
        });
    }

    let single = [
        (AttachmentKind::Video, msg.video().map(|v| &v.file.id)),
        (AttachmentKind::Animation, msg.animation().map(|a| &a.file.id)),
        (AttachmentKind::Document, msg.document().map(|d| &d.file.id)),
        (AttachmentKind::Audio, msg.audio().map(|a| &a.file.id)),
        (AttachmentKind::Voice, msg.voice().map(|v| &v.file.id)),
    ];
    for (kind, id) in single {
        if let Some(id) = id {
            out.push(Attachment {
                kind,
                file_id: id.clone(),
            });
        }
    }

    out
}
