use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::messages;
use super::session::{ActivePlayback, PlaybackState, Session};
use super::voice::{PlayerEvent, PlayerEventKind, PlayerEventSink, SessionId, VoiceTransport};
use crate::commands::music::audio_sources::TrackRef;

/// Errors that can occur during music operations.
///
/// The `Display` text of each variant is the reply sent back to the user.
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("This command can only be used in a server.")]
    NotInGuild,

    #[error("Please provide a song name or YouTube/Spotify URL.")]
    MissingQuery,

    #[error("You need to be in a voice channel to play music!")]
    NoVoiceChannel,

    #[error("No results found on Spotify.")]
    MetadataLookupFailed,

    #[error("No results found on YouTube.")]
    NoSearchResults,

    #[error("No song is currently playing.")]
    NothingPlaying,

    #[error("An error occurred while trying to play the audio.")]
    PlaybackError(String),

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Playback was stopped before your track was ready, so it was not queued.")]
    StaleRequest,
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// What happened to a track handed to [`MusicManager::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The session was idle; the track is playing now.
    NowPlaying,
    /// Appended behind the current track; `position` is its 0-based queue index.
    Queued { position: usize },
}

/// A message the player event loop should post without a command to reply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub channel: ChannelId,
    pub text: String,
}

/// Owns the playback session of every guild.
///
/// Each session sits behind its own mutex; every operation takes that lock
/// once and applies its whole transition under it.
pub struct MusicManager {
    transport: Arc<dyn VoiceTransport>,
    events: UnboundedSender<PlayerEvent>,
    sessions: DashMap<GuildId, Arc<Mutex<Session>>>,
    next_session_id: AtomicU64,
}

impl MusicManager {
    /// Create a manager and the receiving end of its player event channel,
    /// to be drained by [`run_player_events`](super::event_handlers::run_player_events).
    pub fn new(transport: Arc<dyn VoiceTransport>) -> (Self, UnboundedReceiver<PlayerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self {
            transport,
            events,
            sessions: DashMap::new(),
            next_session_id: AtomicU64::new(1),
        };
        (manager, rx)
    }

    fn session(&self, guild_id: GuildId) -> Arc<Mutex<Session>> {
        self.sessions.entry(guild_id).or_default().clone()
    }

    pub async fn state(&self, guild_id: GuildId) -> PlaybackState {
        self.session(guild_id).lock().await.state()
    }

    /// Current cancellation epoch, captured before resolving a track.
    pub async fn epoch(&self, guild_id: GuildId) -> u64 {
        self.session(guild_id).lock().await.epoch()
    }

    /// Id of the live voice connection, if any.
    pub async fn active_session(&self, guild_id: GuildId) -> Option<SessionId> {
        let session = self.session(guild_id);
        let session = session.lock().await;
        session.active.as_ref().map(|active| active.session_id)
    }

    /// Ordered copy of the queue; the first entry is the current track.
    pub async fn queue_snapshot(&self, guild_id: GuildId) -> Vec<TrackRef> {
        let session = self.session(guild_id);
        let session = session.lock().await;
        session.queue.iter().cloned().collect()
    }

    /// Append `track` to the guild's queue, connecting to `voice_channel`
    /// and starting playback when the session is idle.
    ///
    /// `epoch` is the value of [`Self::epoch`] observed before the track was
    /// resolved; if playback was cancelled since, the track is discarded.
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        track: TrackRef,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
        epoch: u64,
    ) -> MusicResult<Enqueued> {
        let voice_channel = voice_channel.ok_or(MusicError::NoVoiceChannel)?;

        let session = self.session(guild_id);
        let mut session = session.lock().await;

        if session.epoch != epoch {
            info!(
                "Discarding {} for guild {}: playback was cancelled while it resolved",
                track, guild_id
            );
            return Err(MusicError::StaleRequest);
        }

        if session.active.is_some() {
            session.queue.push_back(track);
            let position = session.queue.len() - 1;
            info!("Queued track at position {} for guild {}", position, guild_id);
            return Ok(Enqueued::Queued { position });
        }

        let connection = self.transport.join(guild_id, voice_channel).await?;
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let player = connection.create_player(PlayerEventSink::new(
            guild_id,
            session_id,
            self.events.clone(),
        ));

        session.queue.clear();
        session.queue.push_back(track.clone());
        session.active = Some(ActivePlayback {
            session_id,
            connection,
            player: player.clone(),
            text_channel,
            paused: false,
        });
        info!("Started session {} for guild {}", session_id, guild_id);

        if let Err(e) = player.play(&track).await {
            return Err(Self::fail(&mut session, guild_id, e).await);
        }

        Ok(Enqueued::NowPlaying)
    }

    /// Stop the current track; the player's Idle event advances the queue.
    pub async fn skip(&self, guild_id: GuildId) -> MusicResult<()> {
        let session = self.session(guild_id);
        let session = session.lock().await;
        let player = match &session.active {
            Some(active) => active.player.clone(),
            None => return Err(MusicError::NothingPlaying),
        };

        // A failed stop leaves the session as it is; whatever Idle or Error
        // the player reports next drives the queue.
        if let Err(e) = player.stop().await {
            warn!("Failed to stop current track for guild {}: {}", guild_id, e);
        }
        debug!("Skipped current track for guild {}", guild_id);
        Ok(())
    }

    pub async fn pause(&self, guild_id: GuildId) -> MusicResult<()> {
        self.set_paused(guild_id, true).await
    }

    pub async fn resume(&self, guild_id: GuildId) -> MusicResult<()> {
        self.set_paused(guild_id, false).await
    }

    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> MusicResult<()> {
        let session = self.session(guild_id);
        let mut session = session.lock().await;
        let player = match &session.active {
            Some(active) if active.paused != paused => active.player.clone(),
            _ => return Err(MusicError::NothingPlaying),
        };

        let result = if paused {
            player.pause().await
        } else {
            player.unpause().await
        };
        if let Err(e) = result {
            warn!(
                "Failed to {} playback for guild {}: {}",
                if paused { "pause" } else { "resume" },
                guild_id,
                e
            );
            return Err(e);
        }

        if let Some(active) = session.active.as_mut() {
            active.paused = paused;
        }
        info!(
            "{} playback for guild {}",
            if paused { "Paused" } else { "Resumed" },
            guild_id
        );
        Ok(())
    }

    /// Clear the queue and disconnect.
    pub async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let session = self.session(guild_id);
        let mut session = session.lock().await;
        let player = match &session.active {
            Some(active) => active.player.clone(),
            None => return Err(MusicError::NothingPlaying),
        };

        if let Err(e) = player.stop().await {
            warn!("Failed to stop player for guild {}: {}", guild_id, e);
        }
        session.teardown(true).await;
        info!("Stopped playback for guild {}", guild_id);
        Ok(())
    }

    /// Apply a player event to its session. Events from a connection that is
    /// no longer active are ignored.
    pub async fn handle_player_event(&self, event: PlayerEvent) -> Option<Announcement> {
        let session = self.sessions.get(&event.guild_id).map(|s| s.clone())?;
        let mut session = session.lock().await;

        let (channel, player) = match &session.active {
            Some(active) if active.session_id == event.session_id => {
                (active.text_channel, active.player.clone())
            }
            _ => {
                debug!(
                    "Ignoring {:?} from stale session {} in guild {}",
                    event.kind, event.session_id, event.guild_id
                );
                return None;
            }
        };

        let text = match event.kind {
            PlayerEventKind::Idle => {
                session.queue.pop_front();
                match session.queue.front().cloned() {
                    Some(next) => match player.play(&next).await {
                        Ok(()) => {
                            if let Some(active) = session.active.as_mut() {
                                active.paused = false;
                            }
                            info!("Advanced to {} in guild {}", next, event.guild_id);
                            messages::NOW_PLAYING.to_string()
                        }
                        Err(e) => Self::fail(&mut session, event.guild_id, e).await.to_string(),
                    },
                    None => {
                        info!("Queue drained for guild {}", event.guild_id);
                        session.teardown(false).await;
                        messages::FINISHED.to_string()
                    }
                }
            }
            PlayerEventKind::Error(reason) => {
                Self::fail(&mut session, event.guild_id, MusicError::PlaybackError(reason))
                    .await
                    .to_string()
            }
        };

        Some(Announcement { channel, text })
    }

    /// Tear the session down after a player failure. The queue is abandoned.
    async fn fail(session: &mut Session, guild_id: GuildId, cause: MusicError) -> MusicError {
        error!("Playback failed for guild {}: {:?}", guild_id, cause);
        session.teardown(true).await;
        match cause {
            MusicError::PlaybackError(reason) => MusicError::PlaybackError(reason),
            other => MusicError::PlaybackError(other.to_string()),
        }
    }
}
