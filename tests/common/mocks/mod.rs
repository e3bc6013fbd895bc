//! Fakes for the voice transport, the announcer and the resolver services.
//!
//! The voice fakes record every call in a shared log so tests can assert on
//! what the manager asked the voice layer to do.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use jukebox::commands::music::audio_sources::{
    SearchError, SpotifyError, SpotifyTrack, TrackMetadataApi, TrackRef, VideoSearchApi,
};
use jukebox::commands::music::utils::announcer::Announcer;
use jukebox::commands::music::utils::music_manager::{MusicError, MusicResult};
use jukebox::commands::music::utils::voice::{
    AudioPlayer, PlayerEventSink, VoiceConnection, VoiceTransport,
};
use poise::serenity_prelude::{ChannelId, GuildId};
use serenity::async_trait;
use tokio::sync::Notify;

/// Something the manager asked the voice layer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Join(GuildId, ChannelId),
    Play(String),
    Pause,
    Unpause,
    Stop,
    Destroy,
}

type CallLog = Arc<Mutex<Vec<VoiceCall>>>;

#[derive(Default)]
pub struct FakeTransport {
    log: CallLog,
    players: Arc<Mutex<Vec<Arc<FakePlayer>>>>,
    pub fail_join: AtomicBool,
    /// Shared with every player; makes `play` fail while set.
    pub fail_play: Arc<AtomicBool>,
    /// Shared with every player; makes `pause`, `unpause` and `stop` fail
    /// while set, as when the driver has already dropped the track.
    pub fail_control: Arc<AtomicBool>,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<VoiceCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, call: &VoiceCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn joins(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VoiceCall::Join(..)))
            .count()
    }

    /// URLs handed to `play`, in order.
    pub fn played(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                VoiceCall::Play(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// The player created for the most recent connection.
    pub fn player(&self) -> Arc<FakePlayer> {
        self.players
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no player has been created")
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_control(&self, fail: bool) {
        self.fail_control.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceTransport for FakeTransport {
    async fn join(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<dyn VoiceConnection>> {
        if self.fail_join.load(Ordering::SeqCst) {
            return Err(MusicError::JoinError("gateway unavailable".into()));
        }
        self.log
            .lock()
            .unwrap()
            .push(VoiceCall::Join(guild_id, channel_id));

        Ok(Arc::new(FakeConnection {
            log: self.log.clone(),
            players: self.players.clone(),
            fail_play: self.fail_play.clone(),
            fail_control: self.fail_control.clone(),
        }))
    }
}

pub struct FakeConnection {
    log: CallLog,
    players: Arc<Mutex<Vec<Arc<FakePlayer>>>>,
    fail_play: Arc<AtomicBool>,
    fail_control: Arc<AtomicBool>,
}

#[async_trait]
impl VoiceConnection for FakeConnection {
    fn create_player(&self, events: PlayerEventSink) -> Arc<dyn AudioPlayer> {
        let player = Arc::new(FakePlayer {
            log: self.log.clone(),
            events,
            fail_play: self.fail_play.clone(),
            fail_control: self.fail_control.clone(),
        });
        self.players.lock().unwrap().push(player.clone());
        player
    }

    async fn destroy(&self) -> MusicResult<()> {
        self.log.lock().unwrap().push(VoiceCall::Destroy);
        Ok(())
    }
}

/// Behaves like a real player: `stop` reports Idle, and tests drive the
/// natural end or a stream failure through [`FakePlayer::finish`] and
/// [`FakePlayer::break_stream`].
pub struct FakePlayer {
    log: CallLog,
    events: PlayerEventSink,
    fail_play: Arc<AtomicBool>,
    fail_control: Arc<AtomicBool>,
}

impl FakePlayer {
    /// The current track reached its end.
    pub fn finish(&self) {
        self.events.idle();
    }

    pub fn break_stream(&self, reason: &str) {
        self.events.error(reason);
    }

    fn control(&self, call: VoiceCall) -> MusicResult<()> {
        if self.fail_control.load(Ordering::SeqCst) {
            return Err(MusicError::PlaybackError("Track is finished".into()));
        }
        self.log.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl AudioPlayer for FakePlayer {
    async fn play(&self, track: &TrackRef) -> MusicResult<()> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(MusicError::PlaybackError("stream could not be opened".into()));
        }
        self.log
            .lock()
            .unwrap()
            .push(VoiceCall::Play(track.url().to_string()));
        Ok(())
    }

    async fn pause(&self) -> MusicResult<()> {
        self.control(VoiceCall::Pause)
    }

    async fn unpause(&self) -> MusicResult<()> {
        self.control(VoiceCall::Unpause)
    }

    async fn stop(&self) -> MusicResult<()> {
        self.control(VoiceCall::Stop)?;
        self.events.idle();
        Ok(())
    }
}

/// Collects announcements and wakes waiters on each one.
#[derive(Default)]
pub struct RecordingAnnouncer {
    sent: Mutex<Vec<(ChannelId, String)>>,
    pub posted: Notify,
}

impl RecordingAnnouncer {
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn announce(&self, channel: ChannelId, text: &str) {
        self.sent.lock().unwrap().push((channel, text.to_string()));
        self.posted.notify_one();
    }
}

/// Spotify lookups answered from a fixed table.
#[derive(Default)]
pub struct FakeMetadata {
    tracks: HashMap<String, SpotifyTrack>,
}

impl FakeMetadata {
    pub fn with_track(mut self, id: &str, artist: &str, name: &str) -> Self {
        self.tracks.insert(
            id.to_string(),
            SpotifyTrack {
                name: name.to_string(),
                artists: vec![artist.to_string()],
            },
        );
        self
    }
}

#[async_trait]
impl TrackMetadataApi for FakeMetadata {
    async fn get_track(&self, track_id: &str) -> Result<SpotifyTrack, SpotifyError> {
        self.tracks
            .get(track_id)
            .cloned()
            .ok_or(SpotifyError::NotFound)
    }
}

/// Keyword search answered from a fixed table. With a gate installed every
/// search signals `entered` and then waits for the gate to open.
#[derive(Default)]
pub struct FakeSearch {
    results: HashMap<String, String>,
    gate: Option<SearchGate>,
}

#[derive(Clone, Default)]
pub struct SearchGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl FakeSearch {
    pub fn with_result(mut self, text: &str, video_id: &str) -> Self {
        self.results.insert(text.to_string(), video_id.to_string());
        self
    }

    pub fn gated(mut self, gate: SearchGate) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl VideoSearchApi for FakeSearch {
    async fn search_by_keyword(&self, text: &str) -> Result<Option<String>, SearchError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(self.results.get(text).cloned())
    }
}
