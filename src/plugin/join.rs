use crate::{event::*, log_internal, plugin::*};
use anyhow::Result;

/// Starts auto-replying in the invoking channel
pub struct Join;

#[serenity::async_trait]
impl Plugin for Join {
    fn name(&self) -> &'static str {
        "join"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Reply to every message in this channel"))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(command) = event.is_slash_cmd(self.name()) else {
            return Ok(EventHandled::No);
        };
        let Some(guild_id) = require_guild(ctx, command).await? else {
            return Ok(EventHandled::Yes);
        };

        // Load the server's history now so a corrupt file is reported here rather than on the
        // first message, and so the history file exists from the start.
        let guild = ctx.pstate.history.guild(&guild_id).await;
        let result = guild.lock().await.save().await;
        if let Err(e) = result {
            return fail_command(ctx, command, e.into()).await;
        }

        ctx.vstate
            .write()
            .await
            .joined_channels
            .join(command.channel_id);
        log_internal!("Joined channel {} in server {}", command.channel_id, guild_id);

        command
            .respond(ctx, "✅ Joined this channel!".to_owned(), false)
            .await?;
        Ok(EventHandled::Yes)
    }
}
