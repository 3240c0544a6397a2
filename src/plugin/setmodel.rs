use crate::{error::SettingsError, event::*, plugin::*};
use anyhow::Result;
use serenity::all::{CommandOptionType, CreateCommandOption};

pub struct SetModel;

#[serenity::async_trait]
impl Plugin for SetModel {
    fn name(&self) -> &'static str {
        "setmodel"
    }

    fn command(&self) -> Option<CreateCommand> {
        Some(
            CreateCommand::new(self.name())
                .description("Choose the model to chat with")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::String, "model_name", "Model name")
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
        let model = command.string_option("model_name").unwrap_or_default().trim();

        let result = ctx
            .pstate
            .settings
            .write()
            .await
            .set_model(&guild_id, model)
            .await;

        let reply = match result {
            Ok(()) => format!("✅ Model set to `{}`.", model),
            Err(SettingsError::NotConfigured) => {
                "❌ Set the server URL with `/seturl` first.".to_owned()
            }
            Err(SettingsError::UnknownModel { available, .. }) => format!(
                "❌ No such model. Available models: {}",
                available.join(", ")
            ),
            Err(SettingsError::Persistence(e)) => {
                return fail_command(ctx, command, e.into()).await
            }
        };

        command.respond(ctx, reply, true).await?;
        Ok(EventHandled::Yes)
    }
}
