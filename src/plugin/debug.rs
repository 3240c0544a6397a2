use crate::{event::*, log_event, logging::*, plugin::*};
use anyhow::Result;

/// Prints debug information about event to stdout
pub struct Debug;

#[serenity::async_trait]
impl Plugin for Debug {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn command(&self) -> Option<CreateCommand> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        match event {
            Event::Ready(ready) => {
                log_event!(
                    "Connected to {} server(s) as {}",
                    ready.guilds.len(),
                    ready.user.color(),
                );
            }
            Event::Message(msg) => {
                log_event!(
                    "{}{}{}{}{}{} {}",
                    msg.guild_id.color(ctx.http).await,
                    Glue {}.color(),
                    msg.channel_id.color(ctx.http).await,
                    Glue {}.color(),
                    msg.author.color(),
                    Glue {}.color(),
                    msg.content,
                );
            }
            Event::Command(command) => {
                log_event!(
                    "{}{}{}{}{}{} {}",
                    command.guild_id.color(ctx.http).await,
                    Glue {}.color(),
                    command.channel_id.color(ctx.http).await,
                    Glue {}.color(),
                    command.user.color(),
                    Glue {}.color(),
                    command.color(),
                );
            }
        }

        Ok(EventHandled::No)
    }
}
