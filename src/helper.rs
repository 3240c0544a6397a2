//! Miscellaneous convenience methods

use crate::context::Context;
use anyhow::Result;
use serenity::all::{
    CommandInteraction, CreateInteractionResponse, CreateInteractionResponseMessage, GuildId,
};

/// Discord rejects messages longer than this many characters
pub const MESSAGE_LIMIT: usize = 2000;

#[serenity::async_trait]
pub trait UserHelper {
    async fn nick_in_guild(&self, ctx: &Context<'_>, guild_id: Option<GuildId>) -> String;
}

#[serenity::async_trait]
impl UserHelper for serenity::all::User {
    async fn nick_in_guild(&self, ctx: &Context<'_>, guild_id: Option<GuildId>) -> String {
        let nick_in_guild = match guild_id {
            Some(guild_id) => self.nick_in(ctx.cache_http, guild_id).await,
            None => None,
        };

        // May not have a server nickname.  Fall back to the global display name.
        match nick_in_guild {
            Some(nick_in_guild) => nick_in_guild,
            None => self.display_name().to_owned(),
        }
    }
}

#[serenity::async_trait]
pub trait CommandHelper {
    /// Value of a string option passed to the slash command
    fn string_option(&self, name: &str) -> Option<&str>;
    async fn respond(&self, ctx: &Context<'_>, content: String, ephemeral: bool) -> Result<()>;
}

#[serenity::async_trait]
impl CommandHelper for CommandInteraction {
    fn string_option(&self, name: &str) -> Option<&str> {
        self.data
            .options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_str())
    }

    async fn respond(&self, ctx: &Context<'_>, content: String, ephemeral: bool) -> Result<()> {
        let message = CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(ephemeral);
        self.create_response(ctx.cache_http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }
}

/// Cut `content` into pieces Discord will accept, preferring to cut after a newline.
pub fn split_message(content: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = content;

    while rest.chars().count() > limit {
        // Byte offset of the first character past the limit
        let hard_cut = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);
        let cut = match rest[..hard_cut].rfind('\n') {
            Some(i) if i > 0 => i + 1,
            _ => hard_cut,
        };
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
