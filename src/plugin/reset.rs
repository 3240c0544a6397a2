use crate::{event::*, log_internal, plugin::*};
use anyhow::Result;

/// Forgets the server's conversation
pub struct Reset;

#[serenity::async_trait]
impl Plugin for Reset {
    fn name(&self) -> &'static str {
        "reset"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Clear this server's chat history"))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(command) = event.is_slash_cmd(self.name()) else {
            return Ok(EventHandled::No);
        };
        let Some(guild_id) = require_guild(ctx, command).await? else {
            return Ok(EventHandled::Yes);
        };

        let guild = ctx.pstate.history.guild(&guild_id).await;
        let result = guild.lock().await.reset().await;
        if let Err(e) = result {
            return fail_command(ctx, command, e.into()).await;
        }
        log_internal!("Reset history of server {}", guild_id);

        command
            .respond(ctx, "🧹 History has been reset.".to_owned(), true)
            .await?;
        Ok(EventHandled::Yes)
    }
}
