use crate::{context::Context, event::EventHandled, helper::CommandHelper};
use anyhow::Result;
use serenity::all::{CommandInteraction, CreateCommand};

mod auto_reply;
mod debug;
mod getprompt;
mod ignore_bots;
mod join;
mod leave;
mod ping;
mod ready;
mod reset;
mod setmodel;
mod setprompt;
mod seturl;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Doubles as the slash command name for plugins which provide one.
    fn name(&self) -> &'static str;
    /// Slash command to register with Discord.  None if the plugin only reacts to events
    fn command(&self) -> Option<CreateCommand>;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    /// handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context<'_>, event: &crate::event::Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    use crate::plugin::*;

    vec![
        // Core bot operations
        Box::new(debug::Debug),
        Box::new(ready::Ready),
        Box::new(ignore_bots::IgnoreBots),
        Box::new(ping::Ping),
        // Server settings
        Box::new(seturl::SetUrl),
        Box::new(setmodel::SetModel),
        Box::new(setprompt::SetPrompt),
        Box::new(getprompt::GetPrompt),
        // Conversation
        Box::new(join::Join),
        Box::new(leave::Leave),
        Box::new(reset::Reset),
        // Reply to everything in joined channels that nothing else handled.
        // Keep last.
        Box::new(auto_reply::AutoReply),
    ]
}

/// The invoking server's id.  Tells the user and returns None when invoked outside a server.
async fn require_guild(ctx: &Context<'_>, command: &CommandInteraction) -> Result<Option<String>> {
    match command.guild_id {
        Some(guild_id) => Ok(Some(guild_id.to_string())),
        None => {
            command
                .respond(ctx, "⚠️ This command only works in a server.".to_owned(), true)
                .await?;
            Ok(None)
        }
    }
}

/// Tell the user the command failed, then pass the error on to be logged.
async fn fail_command(
    ctx: &Context<'_>,
    command: &CommandInteraction,
    err: anyhow::Error,
) -> Result<EventHandled> {
    command
        .respond(ctx, format!("❌ Error: {}", err), true)
        .await?;
    Err(err)
}
