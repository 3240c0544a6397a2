use crate::{event::*, plugin::*};
use anyhow::Result;

/// Swallows messages from bots, including our own replies, so nothing answers them.
pub struct IgnoreBots;

#[serenity::async_trait]
impl Plugin for IgnoreBots {
    fn name(&self) -> &'static str {
        "ignore_bots"
    }

    fn command(&self) -> Option<CreateCommand> {
        None
    }

    async fn handle(&self, _ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Message(msg) = event else {
            return Ok(EventHandled::No);
        };

        if msg.author.bot {
            Ok(EventHandled::Yes)
        } else {
            Ok(EventHandled::No)
        }
    }
}
