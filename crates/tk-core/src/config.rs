use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Identity
    pub owner_ids: Vec<String>,
    pub bot_token: Option<String>,

    // Files
    pub data_dir: PathBuf,
    pub owners_file: PathBuf,
    pub sticker_file: PathBuf,
    pub session_file: PathBuf,

    // Status page
    pub status_port: u16,

    // Timing
    pub nickname_spacing: Duration,
    pub media_resend_interval: Duration,
    pub sticker_min_interval: Duration,
    pub capture_window: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let owner_ids = parse_csv(env_str("TK_OWNER_IDS"));
        let bot_token = env_str("TK_BOT_TOKEN").and_then(non_empty);

        let data_dir = env_path("TK_DATA_DIR").unwrap_or_else(|| PathBuf::from("."));
        let owners_file = env_path("TK_OWNERS_FILE").unwrap_or_else(|| "owners.txt".into());
        let sticker_file = env_path("TK_STICKER_FILE").unwrap_or_else(|| "Sticker.txt".into());
        let session_file = env_path("TK_SESSION_FILE").unwrap_or_else(|| "appstate.json".into());

        let status_port = match env_str("PORT") {
            None => 3000,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got {raw:?}")))?,
        };

        let nickname_spacing = Duration::from_secs(env_u64("TK_NICKNAME_SPACING_SECS").unwrap_or(20));
        let media_resend_interval =
            Duration::from_secs(env_u64("TK_MEDIA_RESEND_SECS").unwrap_or(30));
        let sticker_min_interval = Duration::from_secs(env_u64("TK_STICKER_MIN_SECS").unwrap_or(5));
        let capture_window = Duration::from_secs(env_u64("TK_CAPTURE_WINDOW_SECS").unwrap_or(60));

        Ok(Self {
            owner_ids,
            bot_token,
            data_dir,
            owners_file,
            sticker_file,
            session_file,
            status_port,
            nickname_spacing,
            media_resend_interval,
            sticker_min_interval,
            capture_window,
        })
    }

    pub fn owners_path(&self) -> PathBuf {
        self.data_dir.join(&self.owners_file)
    }

    pub fn sticker_path(&self) -> PathBuf {
        self.data_dir.join(&self.sticker_file)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(&self.session_file)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
