mod assemble;
mod config;
mod context;
mod error;
mod event;
mod handler;
mod helper;
mod history;
mod llm;
mod logging;
mod persistent_state;
mod plugin;
mod relay;
mod settings;
mod volatile_state;

use serenity::{all::GatewayIntents, Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = crate::config::Config::load().await?;
    let pstate = crate::persistent_state::PersistentState::load(&cfg.general.data_dir).await?;
    let vstate = crate::volatile_state::VolatileState::new();
    let llm = crate::llm::OllamaClient::new(cfg.request_timeout())?;
    let handler = handler::Handler::new(pstate, vstate, Box::new(llm));

    // Things we want discord to tell us about.
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(&cfg.general.discord_token, intents)
        .event_handler(handler)
        .await?
        .start()
        .await
        .map_err(Into::into)
}
