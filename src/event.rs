//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! `Handler` translates the callbacks into a distinct Event enum.

use crate::{context::Context, log_internal};
use serenity::all::{CommandInteraction, Message, Ready};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
    /// A slash command invocation
    Command(CommandInteraction),
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => log_internal!("Error in plugin {}: {:#}", plugin.name(), err),
            }
        }
    }

    /// The slash command invocation, if this event is the command called `name`.
    pub fn is_slash_cmd(&self, name: &str) -> Option<&CommandInteraction> {
        match self {
            Event::Command(command) if command.data.name == name => Some(command),
            _ => None,
        }
    }
}

pub enum EventHandled {
    Yes,
    No,
}
