use crate::{event::*, log_internal, plugin::*};
use anyhow::Result;

pub struct Leave;

#[serenity::async_trait]
impl Plugin for Leave {
    fn name(&self) -> &'static str {
        "leave"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Stop replying in this channel"))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(command) = event.is_slash_cmd(self.name()) else {
            return Ok(EventHandled::No);
        };

        ctx.vstate
            .write()
            .await
            .joined_channels
            .leave(command.channel_id);
        log_internal!("Left channel {}", command.channel_id);

        command
            .respond(ctx, "👋 Left this channel.".to_owned(), false)
            .await?;
        Ok(EventHandled::Yes)
    }
}
