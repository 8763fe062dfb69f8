use std::sync::Arc;

use tk_core::{
    bot::seed_owners,
    config::Config,
    session::{resolve_token, SessionBlob},
};

mod status;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tk_core::logging::init("tk")?;

    let cfg = Arc::new(Config::load()?);

    // Liveness page comes up first so it stays observable if login fails.
    let status = tokio::spawn(status::serve(cfg.status_port));

    let blob = match SessionBlob::load(&cfg.session_path()) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::error!(path = %cfg.session_path().display(), error = %e, "unreadable session file");
            None
        }
    };

    let Some(token) = resolve_token(&cfg, blob.as_ref()) else {
        tracing::error!("no bot token in TK_BOT_TOKEN or the session file; bot is not running");
        return status.await?;
    };

    let owners = seed_owners(&cfg);
    tracing::info!(owners = owners.len(), data_dir = %cfg.data_dir.display(), "starting");

    if let Err(e) = tk_telegram::router::run_polling(cfg, token, owners).await {
        tracing::error!(error = %e, "bot stopped; status page stays up");
        return status.await?;
    }

    Ok(())
}
