use crate::{
    event::*,
    helper::{split_message, UserHelper, MESSAGE_LIMIT},
    log_internal,
    plugin::*,
    relay::{relay, Outcome},
};
use anyhow::Result;

/// Answers every message in joined channels with the server's model
pub struct AutoReply;

#[serenity::async_trait]
impl Plugin for AutoReply {
    fn name(&self) -> &'static str {
        "auto_reply"
    }

    fn command(&self) -> Option<CreateCommand> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Message(msg) = event else {
            return Ok(EventHandled::No);
        };
        let Some(guild_id) = msg.guild_id else {
            return Ok(EventHandled::No);
        };
        if !ctx
            .vstate
            .read()
            .await
            .joined_channels
            .is_joined(msg.channel_id)
        {
            return Ok(EventHandled::No);
        }

        let username = msg.author.nick_in_guild(ctx, Some(guild_id)).await;

        // The model may take a while.  Tell Discord (and thus users in the channel) that we're
        // "typing" in the meantime.
        let typing = msg.channel_id.start_typing(ctx.http);
        let outcome = relay(
            ctx.pstate,
            ctx.llm,
            &guild_id.to_string(),
            &username,
            &msg.content,
        )
        .await;
        typing.stop();

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                msg.channel_id
                    .say(ctx.cache_http, format!("❌ Error: {}", e))
                    .await?;
                return Err(e.into());
            }
        };

        match outcome {
            Outcome::ConfigurationRequired => {
                msg.channel_id
                    .say(
                        ctx.cache_http,
                        "⚠️ Set up the bot with `/seturl` and `/setmodel` first.",
                    )
                    .await?;
            }
            Outcome::Reply(reply) if reply.trim().is_empty() => {
                msg.channel_id
                    .say(ctx.cache_http, "⚠️ The model sent an empty reply.")
                    .await?;
            }
            Outcome::Reply(reply) => {
                for chunk in split_message(&reply, MESSAGE_LIMIT) {
                    msg.channel_id.say(ctx.cache_http, chunk).await?;
                }
            }
            Outcome::Failed(e) => {
                log_internal!("Chat request for server {} failed: {}", guild_id, e);
                msg.channel_id
                    .say(ctx.cache_http, format!("❌ Error: {}", e))
                    .await?;
            }
        }

        Ok(EventHandled::Yes)
    }
}
