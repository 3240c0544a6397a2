use crate::{event::*, plugin::*};
use anyhow::Result;

pub struct Ping;

#[serenity::async_trait]
impl Plugin for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(CreateCommand::new(self.name()).description("Check that the bot is responding"))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(command) = event.is_slash_cmd(self.name()) else {
            return Ok(EventHandled::No);
        };

        command.respond(ctx, "🏓 Pong!".to_owned(), true).await?;
        Ok(EventHandled::Yes)
    }
}
