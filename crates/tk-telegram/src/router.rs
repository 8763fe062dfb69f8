use std::{collections::HashSet, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tk_core::{
    bot::Bot as Keeper, config::Config, domain::UserId, messaging::port::MessagingPort,
};

use crate::{events, TelegramMessenger};

/// Log in with `token` and dispatch updates until the dispatcher stops.
pub async fn run_polling(
    cfg: Arc<Config>,
    token: String,
    owners: HashSet<UserId>,
) -> anyhow::Result<()> {
    let bot = Bot::new(token);

    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("login failed: {e}"))?;
    tracing::info!(username = %me.username(), "logged in");

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let keeper = Arc::new(Keeper::new(cfg, messenger, owners));
    keeper.add_owner(UserId(me.user.id.0.to_string())).await;

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![keeper.clone()])
        .build()
        .dispatch()
        .await;

    keeper.shutdown().await;
    tracing::info!("dispatcher stopped");
    Ok(())
}

async fn handle_message(msg: Message, keeper: Arc<Keeper>) -> ResponseResult<()> {
    let Some(event) = events::normalize(&msg) else {
        tracing::debug!(chat = msg.chat.id.0, "dropping unrecognized update");
        return Ok(());
    };

    if let Err(e) = keeper.handle(event).await {
        tracing::error!(chat = msg.chat.id.0, error = %e, "handler failed");
    }
    Ok(())
}
