//! Relays a channel message to the guild's model and records both sides of the exchange

use crate::{
    assemble::assemble,
    error::{InferenceError, PersistenceError},
    history::ChatTurn,
    llm::{ChatMessageRole, ModelClient},
    persistent_state::PersistentState,
};

/// What to tell the channel after relaying a message
#[derive(Debug)]
pub enum Outcome {
    /// The guild has no endpoint or no model selected yet
    ConfigurationRequired,
    Reply(String),
    Failed(InferenceError),
}

/// Record `content` from `username` in the guild's history and, if the guild is configured, ask
/// its model for a reply.
///
/// The guild's history stays locked for the whole exchange so concurrent messages in the same
/// guild are recorded one full exchange at a time.  Only a successful reply is recorded; on
/// failure the history ends with the user's turn.
pub async fn relay(
    pstate: &PersistentState,
    llm: &dyn ModelClient,
    guild_id: &str,
    username: &str,
    content: &str,
) -> Result<Outcome, PersistenceError> {
    let guild = pstate.history.guild(guild_id).await;
    let mut history = guild.lock().await;

    history
        .append(ChatTurn::now(ChatMessageRole::user, username, content))
        .await?;

    let Some(setting) = pstate.settings.read().await.get(guild_id).cloned() else {
        return Ok(Outcome::ConfigurationRequired);
    };
    let (Some(url), Some(model)) = (&setting.endpoint_url, &setting.selected_model) else {
        return Ok(Outcome::ConfigurationRequired);
    };

    let messages = assemble(history.turns().await?, setting.system_prompt());
    let reply = match llm.chat(url, model, &messages).await {
        Ok(reply) => reply,
        Err(e) => return Ok(Outcome::Failed(e)),
    };

    history
        .append(ChatTurn::now(ChatMessageRole::assistant, model, &reply))
        .await?;

    Ok(Outcome::Reply(reply))
}
