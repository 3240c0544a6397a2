use crate::{
    context::Context, event::Event, llm::ModelClient, persistent_state::PersistentState,
    volatile_state::VolatileState,
};
use serenity::all::{Interaction, Message, Ready};
use tokio::sync::RwLock;

/// Discord event handler
pub struct Handler {
    pstate: PersistentState,
    vstate: RwLock<VolatileState>,
    llm: Box<dyn ModelClient>,
}

impl<'a> Handler {
    pub fn new(pstate: PersistentState, vstate: VolatileState, llm: Box<dyn ModelClient>) -> Self {
        Self {
            pstate,
            vstate: RwLock::new(vstate),
            llm,
        }
    }

    fn ctx(&'a self, discord_ctx: &'a serenity::all::Context) -> Context<'a> {
        Context {
            pstate: &self.pstate,
            vstate: &self.vstate,
            llm: self.llm.as_ref(),
            cache: &discord_ctx.cache,
            http: &discord_ctx.http,
            cache_http: discord_ctx,
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        Event::Ready(ready).handle(self.ctx(&discord_ctx)).await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: Message) {
        Event::Message(msg).handle(self.ctx(&discord_ctx)).await;
    }

    async fn interaction_create(&self, discord_ctx: serenity::all::Context, interaction: Interaction) {
        // Slash commands are the only interactions the bot registers.
        if let Interaction::Command(command) = interaction {
            Event::Command(command)
                .handle(self.ctx(&discord_ctx))
                .await;
        }
    }
}
