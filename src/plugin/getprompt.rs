use crate::{event::*, plugin::*};
use anyhow::Result;

pub struct GetPrompt;

#[serenity::async_trait]
impl Plugin for GetPrompt {
    fn name(&self) -> &'static str {
        "getprompt"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Show the current system prompt"))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(command) = event.is_slash_cmd(self.name()) else {
            return Ok(EventHandled::No);
        };
        let Some(guild_id) = require_guild(ctx, command).await? else {
            return Ok(EventHandled::Yes);
        };

        let reply = match ctx.pstate.settings.read().await.system_prompt(&guild_id) {
            Some(prompt) => format!("📋 Current system prompt:\n```\n{}\n```", prompt),
            None => "⚠️ No system prompt is set.".to_owned(),
        };

        command.respond(ctx, reply, true).await?;
        Ok(EventHandled::Yes)
    }
}
