use serenity::all::ChannelId;
use std::collections::HashSet;

/// State which is lost across sessions
pub struct VolatileState {
    pub joined_channels: JoinedChannels,
}

/// Channels the bot auto-replies in.  Starts empty every session; `/join` has to be reissued
/// after a restart.
pub struct JoinedChannels(HashSet<ChannelId>);

impl VolatileState {
    pub fn new() -> Self {
        Self {
            joined_channels: JoinedChannels::new(),
        }
    }
}

impl JoinedChannels {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn join(&mut self, channel_id: ChannelId) {
        self.0.insert(channel_id);
    }

    pub fn leave(&mut self, channel_id: ChannelId) {
        self.0.remove(&channel_id);
    }

    pub fn is_joined(&self, channel_id: ChannelId) -> bool {
        self.0.contains(&channel_id)
    }
}
