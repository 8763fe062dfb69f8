//! Command interpreter.
//!
//! `Bot::handle` is the single entry point for normalized inbound events.
//! Title-change logs are routed to title enforcement; messages feed any armed
//! media capture and then, for owners only, command dispatch.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use tokio::{sync::Mutex, time::Instant};

use crate::{
    config::Config,
    domain::{ThreadId, UserId},
    lines::{read_lines, read_lines_or_empty},
    messaging::{
        port::MessagingPort,
        types::{Attachment, Capability, InboundEvent, MessageEvent, ThreadLogEvent, ThreadLogKind},
    },
    repeater::{Feature, Repeaters},
    title_lock::TitleLocks,
    Result,
};

const HELP_TEXT: &str = "Available commands:
/allname <name> - change every member's nickname
/groupname <name> - change the group name
/lockgroupname <name> - lock the group name
/unlockgroupname - unlock the group name
/uid - show the group id
/exit - leave the group
/photo - send a photo/video next; it is resent every 30s
/stopphoto - stop resending the photo/video
/sticker<seconds> - send stickers from the sticker file (e.g. /sticker20)
/stopsticker - stop the sticker loop
/help - show this message";

/// Parsed owner command: lowercased first token plus the trimmed remainder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: String,
}

pub fn parse_command(body: &str) -> Option<Command> {
    let mut parts = body.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    if first.is_empty() {
        return None;
    }
    let args = parts.next().unwrap_or("").trim().to_string();

    // Telegram may send `/cmd@botname args`.
    let name = first.split('@').next().unwrap_or("").to_lowercase();

    Some(Command { name, args })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    AllName,
    GroupName,
    LockGroupName,
    UnlockGroupName,
    Uid,
    Exit,
    Photo,
    StopPhoto,
    Help,
    StopSticker,
    /// `None` when the suffix is not a number.
    Sticker(Option<u64>),
}

fn route(name: &str) -> Option<Action> {
    let action = match name {
        "/allname" => Action::AllName,
        "/groupname" => Action::GroupName,
        "/lockgroupname" => Action::LockGroupName,
        "/unlockgroupname" => Action::UnlockGroupName,
        "/uid" => Action::Uid,
        "/exit" => Action::Exit,
        "/photo" => Action::Photo,
        "/stopphoto" => Action::StopPhoto,
        "/help" => Action::Help,
        "/stopsticker" => Action::StopSticker,
        other => {
            let suffix = other.strip_prefix("/sticker")?;
            Action::Sticker(suffix.parse::<u64>().ok())
        }
    };
    Some(action)
}

#[derive(Clone, Debug)]
struct CapturedMedia {
    thread_id: ThreadId,
    attachments: Vec<Attachment>,
}

pub struct Bot {
    cfg: Arc<Config>,
    messenger: Arc<dyn MessagingPort>,
    owners: Mutex<HashSet<UserId>>,
    locks: TitleLocks,
    repeaters: Repeaters,
    /// Threads with an armed `/photo` capture, and when it expires.
    captures: Mutex<HashMap<ThreadId, Instant>>,
    media: Arc<Mutex<Option<CapturedMedia>>>,
}

/// Owner ids from `TK_OWNER_IDS` plus the owners file.
pub fn seed_owners(cfg: &Config) -> HashSet<UserId> {
    cfg.owner_ids
        .iter()
        .cloned()
        .chain(read_lines_or_empty(&cfg.owners_path()))
        .map(UserId)
        .collect()
}

impl Bot {
    pub fn new(
        cfg: Arc<Config>,
        messenger: Arc<dyn MessagingPort>,
        owners: HashSet<UserId>,
    ) -> Self {
        if owners.is_empty() {
            tracing::warn!("no owners configured; commands are only accepted from the bot itself");
        }
        Self {
            cfg,
            messenger,
            owners: Mutex::new(owners),
            locks: TitleLocks::new(),
            repeaters: Repeaters::new(),
            captures: Mutex::new(HashMap::new()),
            media: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn add_owner(&self, id: UserId) {
        tracing::info!(owner = %id, "owner added");
        self.owners.lock().await.insert(id);
    }

    pub async fn is_owner(&self, id: &UserId) -> bool {
        self.owners.lock().await.contains(id)
    }

    pub fn repeaters(&self) -> &Repeaters {
        &self.repeaters
    }

    pub fn title_locks(&self) -> &TitleLocks {
        &self.locks
    }

    pub async fn shutdown(&self) {
        self.repeaters.stop_all().await;
    }

    pub async fn handle(&self, event: InboundEvent) -> Result<()> {
        match event {
            InboundEvent::ThreadLog(log) => self.on_thread_log(log).await,
            InboundEvent::Message(msg) => self.on_message(msg).await,
        }
    }

    async fn on_thread_log(&self, log: ThreadLogEvent) -> Result<()> {
        let ThreadLogKind::TitleChanged { name } = &log.kind else {
            return Ok(());
        };
        let Some(locked) = self.locks.correction(&log.thread_id, name).await else {
            return Ok(());
        };

        if !self.supports(Capability::SetTitle) {
            tracing::warn!(thread = %log.thread_id, "title is locked but backend cannot set titles");
            return Ok(());
        }

        tracing::info!(thread = %log.thread_id, observed = %name, "restoring locked group name");
        match self.messenger.set_title(&log.thread_id, &locked).await {
            Ok(()) => {
                self.say(
                    &log.thread_id,
                    &format!("Group name restored to \"{locked}\""),
                )
                .await;
            }
            Err(e) => {
                tracing::error!(thread = %log.thread_id, error = %e, "failed to restore group name");
            }
        }
        Ok(())
    }

    async fn on_message(&self, msg: MessageEvent) -> Result<()> {
        if !msg.attachments.is_empty() {
            self.try_capture(&msg).await;
        }

        if !self.is_owner(&msg.sender_id).await {
            return Ok(());
        }

        let Some(body) = msg.body.as_deref() else {
            return Ok(());
        };
        let Some(cmd) = parse_command(body) else {
            return Ok(());
        };
        let Some(action) = route(&cmd.name) else {
            return Ok(());
        };

        tracing::info!(thread = %msg.thread_id, sender = %msg.sender_id, command = %cmd.name, "command");
        let thread = &msg.thread_id;
        match action {
            Action::AllName => self.cmd_allname(thread, &cmd.args).await,
            Action::GroupName => self.cmd_groupname(thread, &cmd.args).await,
            Action::LockGroupName => self.cmd_lockgroupname(thread, &cmd.args).await,
            Action::UnlockGroupName => {
                self.locks.unlock(thread).await;
                self.say(thread, "Group name unlocked.").await;
                Ok(())
            }
            Action::Uid => {
                self.say(thread, &format!("Group ID: {thread}")).await;
                Ok(())
            }
            Action::Exit => self.cmd_exit(thread).await,
            Action::Photo => self.cmd_photo(thread).await,
            Action::StopPhoto => self.cmd_stopphoto(thread).await,
            Action::Help => {
                self.say(thread, HELP_TEXT).await;
                Ok(())
            }
            Action::Sticker(secs) => self.cmd_sticker(thread, secs).await,
            Action::StopSticker => {
                let text = if self.repeaters.stop(Feature::Sticker).await {
                    "Sticker loop stopped."
                } else {
                    "Sticker loop was not running."
                };
                self.say(thread, text).await;
                Ok(())
            }
        }
    }

    async fn cmd_allname(&self, thread: &ThreadId, nickname: &str) -> Result<()> {
        if !self.supports(Capability::ListParticipants) || !self.supports(Capability::ChangeNickname)
        {
            self.say(thread, "Nicknames are not supported here.").await;
            return Ok(());
        }

        let members = match self.messenger.list_participants(thread).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(thread = %thread, error = %e, "failed to list participants");
                self.say(thread, "Could not list members.").await;
                return Ok(());
            }
        };
        self.say(thread, &format!("Changing {} nicknames...", members.len()))
            .await;

        let messenger = self.messenger.clone();
        let thread = thread.clone();
        let nickname = nickname.to_string();
        let spacing = self.cfg.nickname_spacing;
        self.repeaters
            .start(Feature::Nicknames, move |tick| async move {
                let total = members.len();
                let mut changed = 0usize;
                for (idx, uid) in members.iter().enumerate() {
                    if idx > 0 && !tick.sleep(spacing).await {
                        return;
                    }
                    if tick.is_cancelled() {
                        return;
                    }
                    match messenger.change_nickname(&thread, uid, &nickname).await {
                        Ok(()) => {
                            changed += 1;
                            tracing::info!(thread = %thread, user = %uid, "nickname changed");
                        }
                        Err(e) => {
                            tracing::warn!(thread = %thread, user = %uid, error = %e, "nickname change failed");
                        }
                    }
                }
                say_via(
                    messenger.as_ref(),
                    &thread,
                    &format!("Nicknames changed: {changed}/{total}."),
                )
                .await;
            })
            .await;
        Ok(())
    }

    async fn cmd_groupname(&self, thread: &ThreadId, title: &str) -> Result<()> {
        if title.is_empty() {
            self.say(thread, "Give a group name.").await;
            return Ok(());
        }
        if !self.supports(Capability::SetTitle) {
            self.say(thread, "Could not change the group name.").await;
            return Ok(());
        }
        match self.messenger.set_title(thread, title).await {
            Ok(()) => {
                self.say(thread, &format!("Group name changed to: {title}"))
                    .await
            }
            Err(e) => {
                tracing::warn!(thread = %thread, error = %e, "set title failed");
                self.say(thread, "Could not change the group name.").await;
            }
        }
        Ok(())
    }

    async fn cmd_lockgroupname(&self, thread: &ThreadId, title: &str) -> Result<()> {
        if title.is_empty() {
            self.say(thread, "Give a name to lock.").await;
            return Ok(());
        }
        if !self.supports(Capability::SetTitle) {
            self.say(thread, "Locking failed.").await;
            return Ok(());
        }
        match self.messenger.set_title(thread, title).await {
            Ok(()) => {
                self.locks.lock(thread.clone(), title.to_string()).await;
                self.say(thread, &format!("Group name locked as \"{title}\""))
                    .await;
            }
            Err(e) => {
                tracing::warn!(thread = %thread, error = %e, "set title failed while locking");
                self.say(thread, "Locking failed.").await;
            }
        }
        Ok(())
    }

    async fn cmd_exit(&self, thread: &ThreadId) -> Result<()> {
        if !self.supports(Capability::LeaveThread) {
            self.say(thread, "Can't leave group.").await;
            return Ok(());
        }
        if let Err(e) = self.messenger.leave_thread(thread).await {
            tracing::warn!(thread = %thread, error = %e, "leave failed");
            self.say(thread, "Can't leave group.").await;
        }
        Ok(())
    }

    async fn cmd_photo(&self, thread: &ThreadId) -> Result<()> {
        if !self.supports(Capability::SendMedia) {
            self.say(thread, "Media resend is not supported here.").await;
            return Ok(());
        }
        let window = self.cfg.capture_window;
        self.captures
            .lock()
            .await
            .insert(thread.clone(), Instant::now() + window);
        self.say(
            thread,
            &format!(
                "Send a photo or video within {}...",
                human_secs(window)
            ),
        )
        .await;
        Ok(())
    }

    async fn try_capture(&self, msg: &MessageEvent) {
        {
            let mut captures = self.captures.lock().await;
            let Some(deadline) = captures.get(&msg.thread_id).copied() else {
                return;
            };
            captures.remove(&msg.thread_id);
            if Instant::now() > deadline {
                tracing::info!(thread = %msg.thread_id, "media capture window expired");
                return;
            }
        }

        *self.media.lock().await = Some(CapturedMedia {
            thread_id: msg.thread_id.clone(),
            attachments: msg.attachments.clone(),
        });

        let interval = self.cfg.media_resend_interval;
        self.say(
            &msg.thread_id,
            &format!(
                "Photo/video received. Will resend every {}.",
                human_secs(interval)
            ),
        )
        .await;

        let messenger = self.messenger.clone();
        let media = self.media.clone();
        self.repeaters
            .start(Feature::MediaResend, move |tick| async move {
                loop {
                    if !tick.sleep(interval).await {
                        return;
                    }
                    let Some(captured) = media.lock().await.clone() else {
                        return;
                    };
                    if let Err(e) = messenger
                        .send_media(&captured.thread_id, &captured.attachments)
                        .await
                    {
                        tracing::warn!(thread = %captured.thread_id, error = %e, "media resend failed");
                    }
                }
            })
            .await;
    }

    async fn cmd_stopphoto(&self, thread: &ThreadId) -> Result<()> {
        let was_running = self.repeaters.stop(Feature::MediaResend).await;
        if was_running {
            *self.media.lock().await = None;
            self.say(thread, "Media resend stopped.").await;
        } else {
            self.say(thread, "Media resend was not running.").await;
        }
        Ok(())
    }

    async fn cmd_sticker(&self, thread: &ThreadId, secs: Option<u64>) -> Result<()> {
        let path = self.cfg.sticker_path();
        let name = self.cfg.sticker_file.display().to_string();

        let Some(stickers) = read_lines(&path)? else {
            tracing::warn!(path = %path.display(), "sticker file not found");
            self.say(thread, &format!("{name} not found")).await;
            return Ok(());
        };

        let min = self.cfg.sticker_min_interval;
        let Some(interval) = secs
            .map(Duration::from_secs)
            .filter(|d| *d >= min)
        else {
            self.say(
                thread,
                &format!("Give a valid interval (min {} seconds)", min.as_secs()),
            )
            .await;
            return Ok(());
        };

        if stickers.is_empty() {
            self.say(thread, &format!("{name} is empty")).await;
            return Ok(());
        }
        if !self.supports(Capability::SendSticker) {
            self.say(thread, "Stickers are not supported here.").await;
            return Ok(());
        }

        self.say(
            thread,
            &format!("Sending stickers every {} sec", interval.as_secs()),
        )
        .await;

        let messenger = self.messenger.clone();
        let thread = thread.clone();
        self.repeaters
            .start(Feature::Sticker, move |tick| async move {
                for sticker in stickers.iter() {
                    if !tick.sleep(interval).await {
                        return;
                    }
                    if let Err(e) = messenger.send_sticker(&thread, sticker).await {
                        tracing::warn!(thread = %thread, sticker = %sticker, error = %e, "sticker send failed");
                    }
                }
            })
            .await;
        Ok(())
    }

    fn supports(&self, cap: Capability) -> bool {
        self.messenger.capabilities().supports(cap)
    }

    async fn say(&self, thread: &ThreadId, text: &str) {
        say_via(self.messenger.as_ref(), thread, text).await;
    }
}

/// Best-effort text send: skipped when unsupported, logged on failure.
async fn say_via(messenger: &dyn MessagingPort, thread: &ThreadId, text: &str) {
    if !messenger.capabilities().supports(Capability::SendText) {
        tracing::debug!(thread = %thread, "backend cannot send text; reply dropped");
        return;
    }
    if let Err(e) = messenger.send_text(thread, text).await {
        tracing::warn!(thread = %thread, error = %e, "send failed");
    }
}

fn human_secs(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}
