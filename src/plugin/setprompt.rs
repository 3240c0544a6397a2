use crate::{event::*, plugin::*};
use anyhow::Result;
use serenity::all::{CommandOptionType, CreateCommandOption};

pub struct SetPrompt;

#[serenity::async_trait]
impl Plugin for SetPrompt {
    fn name(&self) -> &'static str {
        "setprompt"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(
            CreateCommand::new(self.name())
                .description("Set the system prompt sent ahead of every conversation")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::String, "prompt", "Prompt text")
                        .required(true),
                ),
        )
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(command) = event.is_slash_cmd(self.name()) else {
            return Ok(EventHandled::No);
        };
        let Some(guild_id) = require_guild(ctx, command).await? else {
            return Ok(EventHandled::Yes);
        };
        let prompt = command.string_option("prompt").unwrap_or_default();

        let result = ctx
            .pstate
            .settings
            .write()
            .await
            .set_system_prompt(&guild_id, prompt)
            .await;
        if let Err(e) = result {
            return fail_command(ctx, command, e.into()).await;
        }

        command
            .respond(ctx, "✅ System prompt set.".to_owned(), true)
            .await?;
        Ok(EventHandled::Yes)
    }
}
