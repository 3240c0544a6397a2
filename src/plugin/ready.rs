use crate::{event::*, log_internal, plugin::*};
use anyhow::Result;
use serenity::all::Command;

/// Registers the slash commands once the connection to Discord is ready.
pub struct Ready;

#[serenity::async_trait]
impl Plugin for Ready {
    fn name(&self) -> &'static str {
        "ready"
    }

    fn command(&self) -> Option<CreateCommand> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Ready(_) = event else {
            return Ok(EventHandled::No);
        };

        let commands = crate::plugin::plugins()
            .iter()
            .filter_map(|plugin| plugin.command())
            .collect();

        // Global commands can take a while to show up in every server.
        let registered = Command::set_global_commands(ctx.cache_http, commands).await?;
        log_internal!("Registered {} global command(s)", registered.len());

        Ok(EventHandled::Yes)
    }
}
