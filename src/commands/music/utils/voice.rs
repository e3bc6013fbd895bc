//! The voice transport seam: joining a channel, creating a player on the
//! connection, and the events a player reports back.

use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, GuildId};
use serenity::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::music_manager::MusicResult;
use crate::commands::music::audio_sources::TrackRef;

/// Identifies one voice connection over its lifetime. Every join gets a new id.
pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEventKind {
    /// The player finished its current resource (natural end or forced stop).
    Idle,
    /// Streaming or playback failed and cannot continue.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub guild_id: GuildId,
    pub session_id: SessionId,
    pub kind: PlayerEventKind,
}

/// Where a player reports its events, tagged with the session it belongs to.
#[derive(Clone, Debug)]
pub struct PlayerEventSink {
    guild_id: GuildId,
    session_id: SessionId,
    tx: UnboundedSender<PlayerEvent>,
}

impl PlayerEventSink {
    pub fn new(guild_id: GuildId, session_id: SessionId, tx: UnboundedSender<PlayerEvent>) -> Self {
        Self {
            guild_id,
            session_id,
            tx,
        }
    }

    pub fn idle(&self) {
        self.send(PlayerEventKind::Idle);
    }

    pub fn error(&self, reason: impl Into<String>) {
        self.send(PlayerEventKind::Error(reason.into()));
    }

    fn send(&self, kind: PlayerEventKind) {
        let event = PlayerEvent {
            guild_id: self.guild_id,
            session_id: self.session_id,
            kind,
        };
        // The receiver only goes away during shutdown.
        if self.tx.send(event).is_err() {
            debug!("Player event loop closed, dropping event");
        }
    }
}

#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Connect to `channel_id` in `guild_id`.
    async fn join(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<dyn VoiceConnection>>;
}

#[async_trait]
pub trait VoiceConnection: Send + Sync {
    /// Create the player bound to this connection. Its Idle and Error
    /// events go to `events`.
    fn create_player(&self, events: PlayerEventSink) -> Arc<dyn AudioPlayer>;

    /// Leave the voice channel.
    async fn destroy(&self) -> MusicResult<()>;
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Open the track's audio stream and start playing it, replacing
    /// whatever was loaded before.
    async fn play(&self, track: &TrackRef) -> MusicResult<()>;

    async fn pause(&self) -> MusicResult<()>;

    async fn unpause(&self) -> MusicResult<()>;

    /// Stop the current resource. The player reports Idle afterwards.
    async fn stop(&self) -> MusicResult<()>;
}
