//! Persisted credential blob, read once at startup.

use std::{fs, io, path::Path};

use serde::Deserialize;

use crate::{config::Config, Result};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SessionBlob {
    #[serde(default)]
    pub bot_token: Option<String>,
}

impl SessionBlob {
    /// Load the blob. A missing file is reported and yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let txt = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "session file not found; create it before starting the bot"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&txt)?))
    }
}

/// Env token wins over the blob.
pub fn resolve_token(cfg: &Config, blob: Option<&SessionBlob>) -> Option<String> {
    cfg.bot_token.clone().or_else(|| {
        blob.and_then(|b| b.bot_token.clone())
            .filter(|t| !t.trim().is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{path::PathBuf, time::Duration};

    fn cfg(token: Option<&str>) -> Config {
        Config {
            owner_ids: vec![],
            bot_token: token.map(str::to_string),
            data_dir: "/tmp".into(),
            owners_file: "owners.txt".into(),
            sticker_file: "Sticker.txt".into(),
            session_file: "appstate.json".into(),
            status_port: 3000,
            nickname_spacing: Duration::from_secs(20),
            media_resend_interval: Duration::from_secs(30),
            sticker_min_interval: Duration::from_secs(5),
            capture_window: Duration::from_secs(60),
        }
    }

    #[test]
    fn loads_blob_and_env_token_wins() {
        let root = PathBuf::from(format!("/tmp/tk-session-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        let p = root.join("appstate.json");
        fs::write(&p, r#"{"bot_token":"from-file","extra":1}"#).unwrap();

        let blob = SessionBlob::load(&p).unwrap().unwrap();
        assert_eq!(resolve_token(&cfg(None), Some(&blob)).as_deref(), Some("from-file"));
        assert_eq!(
            resolve_token(&cfg(Some("from-env")), Some(&blob)).as_deref(),
            Some("from-env")
        );

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_blob_is_none_and_malformed_is_error() {
        let root = PathBuf::from(format!("/tmp/tk-session-bad-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();

        assert!(SessionBlob::load(&root.join("missing.json")).unwrap().is_none());
        assert_eq!(resolve_token(&cfg(None), None), None);

        let bad = root.join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert!(matches!(
            SessionBlob::load(&bad),
            Err(crate::Error::Json(_))
        ));

        let _ = fs::remove_dir_all(&root);
    }
}
