//! Jukebox: a Discord bot that plays YouTube audio in voice channels,
//! driven by prefixed text commands (`!play`, `!skip`, `!queue`, ...).

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;
pub mod presence;

use commands::music::{audio_sources::TrackResolver, utils::music_manager::MusicManager};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type CommandResult = Result<(), Error>;

/// User data shared with every event and command invocation.
pub struct Data {
    /// Prefix every command token must start with (e.g. `!`).
    pub command_prefix: String,
    /// Per-guild playback sessions.
    pub music: Arc<MusicManager>,
    /// Turns user queries into playable track references.
    pub resolver: Arc<TrackResolver>,
}

impl Data {
    pub fn new(
        command_prefix: impl Into<String>,
        music: Arc<MusicManager>,
        resolver: Arc<TrackResolver>,
    ) -> Self {
        Self {
            command_prefix: command_prefix.into(),
            music,
            resolver,
        }
    }
}
