//! Songbird-backed implementation of the voice transport.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::error::{ControlError, TrackResult};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, EventContext, Songbird, TrackEvent};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::music_manager::{MusicError, MusicResult};
use super::voice::{AudioPlayer, PlayerEventSink, VoiceConnection, VoiceTransport};
use crate::commands::music::audio_sources::{TrackRef, YoutubeApi};

pub struct SongbirdTransport {
    songbird: Arc<Songbird>,
    http: reqwest::Client,
}

impl SongbirdTransport {
    pub fn new(songbird: Arc<Songbird>, http: reqwest::Client) -> Self {
        Self { songbird, http }
    }
}

#[async_trait]
impl VoiceTransport for SongbirdTransport {
    async fn join(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<dyn VoiceConnection>> {
        let call = self.songbird.join(guild_id, channel_id).await.map_err(|e| {
            error!(
                "Failed to join voice channel {} for guild {}: {}",
                channel_id, guild_id, e
            );
            MusicError::JoinError(e.to_string())
        })?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(Arc::new(SongbirdConnection {
            songbird: self.songbird.clone(),
            guild_id,
            call,
            http: self.http.clone(),
        }))
    }
}

struct SongbirdConnection {
    songbird: Arc<Songbird>,
    guild_id: GuildId,
    call: Arc<SerenityMutex<Call>>,
    http: reqwest::Client,
}

#[async_trait]
impl VoiceConnection for SongbirdConnection {
    fn create_player(&self, events: PlayerEventSink) -> Arc<dyn AudioPlayer> {
        Arc::new(SongbirdPlayer {
            call: self.call.clone(),
            http: self.http.clone(),
            events,
            current: Mutex::new(None),
        })
    }

    async fn destroy(&self) -> MusicResult<()> {
        if self.songbird.get(self.guild_id).is_none() {
            return Ok(());
        }

        self.songbird
            .remove(self.guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Left voice channel in guild {}", self.guild_id);
        Ok(())
    }
}

struct SongbirdPlayer {
    call: Arc<SerenityMutex<Call>>,
    http: reqwest::Client,
    events: PlayerEventSink,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdPlayer {
    async fn current(&self) -> MusicResult<TrackHandle> {
        self.current
            .lock()
            .await
            .clone()
            .ok_or(MusicError::NothingPlaying)
    }
}

/// A handle whose track already ended has its End event on the way, which
/// advances the queue, so `Finished` is not a failure.
fn control_result(result: TrackResult<()>) -> MusicResult<()> {
    match result {
        Ok(()) | Err(ControlError::Finished) => Ok(()),
        Err(e) => Err(MusicError::PlaybackError(e.to_string())),
    }
}

#[async_trait]
impl AudioPlayer for SongbirdPlayer {
    async fn play(&self, track: &TrackRef) -> MusicResult<()> {
        let input = YoutubeApi::audio_input(self.http.clone(), track.url());

        let handle = {
            let mut call = self.call.lock().await;
            call.play_only_input(input)
        };

        for (event, kind) in [
            (TrackEvent::End, ForwardedEvent::Idle),
            (TrackEvent::Error, ForwardedEvent::Error),
        ] {
            handle
                .add_event(
                    Event::Track(event),
                    TrackEventForwarder {
                        sink: self.events.clone(),
                        kind,
                    },
                )
                .map_err(|e| MusicError::PlaybackError(e.to_string()))?;
        }

        info!("Started streaming {}", track);
        *self.current.lock().await = Some(handle);
        Ok(())
    }

    async fn pause(&self) -> MusicResult<()> {
        control_result(self.current().await?.pause())
    }

    async fn unpause(&self) -> MusicResult<()> {
        control_result(self.current().await?.play())
    }

    async fn stop(&self) -> MusicResult<()> {
        let Some(handle) = self.current.lock().await.take() else {
            return Ok(());
        };
        control_result(handle.stop())
    }
}

#[derive(Clone, Copy)]
enum ForwardedEvent {
    Idle,
    Error,
}

/// Forwards songbird track events into the player event channel.
struct TrackEventForwarder {
    sink: PlayerEventSink,
    kind: ForwardedEvent,
}

#[async_trait]
impl songbird::EventHandler for TrackEventForwarder {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            match self.kind {
                ForwardedEvent::Idle => self.sink.idle(),
                ForwardedEvent::Error => {
                    let reason = tracks
                        .iter()
                        .find_map(|(state, _)| match &state.playing {
                            PlayMode::Errored(e) => Some(e.to_string()),
                            _ => None,
                        })
                        .unwrap_or_else(|| "track errored".to_string());
                    warn!("Track reported an error: {}", reason);
                    self.sink.error(reason);
                }
            }
        }
        None
    }
}
