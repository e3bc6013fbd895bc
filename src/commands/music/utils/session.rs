use std::collections::VecDeque;
use std::sync::Arc;

use poise::serenity_prelude::ChannelId;
use tracing::warn;

use super::voice::{AudioPlayer, SessionId, VoiceConnection};
use crate::commands::music::audio_sources::TrackRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// The voice connection and the player created on it. They only ever exist
/// together.
pub(crate) struct ActivePlayback {
    pub(crate) session_id: SessionId,
    pub(crate) connection: Arc<dyn VoiceConnection>,
    pub(crate) player: Arc<dyn AudioPlayer>,
    /// Where "Now playing" and "Finished playing!" are announced.
    pub(crate) text_channel: ChannelId,
    pub(crate) paused: bool,
}

/// Playback state of one guild.
///
/// `queue[0]` is the track loaded into the player whenever `active` is set;
/// the queue is empty whenever it is not.
#[derive(Default)]
pub struct Session {
    pub(crate) queue: VecDeque<TrackRef>,
    pub(crate) active: Option<ActivePlayback>,
    /// Bumped when playback is cancelled (stop or player error) so that
    /// requests resolved against an older epoch can be discarded.
    pub(crate) epoch: u64,
}

impl Session {
    pub fn state(&self) -> PlaybackState {
        match &self.active {
            None => PlaybackState::Idle,
            Some(active) if active.paused => PlaybackState::Paused,
            Some(_) => PlaybackState::Playing,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Drop the queue and disconnect. `cancel` also invalidates pending
    /// requests captured under the current epoch.
    pub(crate) async fn teardown(&mut self, cancel: bool) {
        self.queue.clear();
        if cancel {
            self.epoch += 1;
        }

        if let Some(active) = self.active.take() {
            if let Err(e) = active.connection.destroy().await {
                warn!("Failed to leave voice channel during teardown: {}", e);
            }
        }
    }
}
