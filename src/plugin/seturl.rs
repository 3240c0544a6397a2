use crate::{event::*, plugin::*};
use anyhow::Result;
use serenity::all::{CommandOptionType, CreateCommandOption, EditInteractionResponse};

/// Points the server at an inference server and refreshes its model list
pub struct SetUrl;

#[serenity::async_trait]
impl Plugin for SetUrl {
    fn name(&self) -> &'static str {
        "seturl"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(
            CreateCommand::new(self.name())
                .description("Set the Ollama server URL")
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "url",
                        "e.g. http://localhost:11434",
                    )
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
        let url = command.string_option("url").unwrap_or_default().trim();

        // Querying the server may take a moment, longer than Discord waits for a first response.
        command.defer_ephemeral(ctx.cache_http).await?;

        let result = ctx
            .pstate
            .set_endpoint(&guild_id, url, ctx.llm)
            .await
            .map(|models| match models.as_slice() {
                [] => format!("✅ URL saved, but no models were found at `{}`.", url),
                models => format!("✅ URL saved. Available models: {}", models.join(", ")),
            });

        let reply = match &result {
            Ok(reply) => reply.clone(),
            Err(e) => format!("❌ Error: {}", e),
        };
        command
            .edit_response(ctx.cache_http, EditInteractionResponse::new().content(reply))
            .await?;

        result?;
        Ok(EventHandled::Yes)
    }
}
