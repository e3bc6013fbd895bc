//! Shared test harness: fake voice transport, fake resolver services and
//! a helper that wires them into a `MusicManager`.

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::sync::{Arc, Once};

use jukebox::Data;
use jukebox::commands::music::audio_sources::TrackResolver;
use jukebox::commands::music::utils::music_manager::{Announcement, MusicManager};
use jukebox::commands::music::utils::voice::PlayerEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::Level;

use mocks::{FakeMetadata, FakeSearch, FakeTransport};

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// A `MusicManager` on a fake transport, with its player event receiver.
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub music: Arc<MusicManager>,
    pub events: UnboundedReceiver<PlayerEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_transport(FakeTransport::default())
    }

    pub fn with_transport(transport: FakeTransport) -> Self {
        init();
        let transport = Arc::new(transport);
        let (music, events) = MusicManager::new(transport.clone());
        Self {
            transport,
            music: Arc::new(music),
            events,
        }
    }

    /// Apply the next pending player event, if there is one.
    pub async fn pump(&mut self) -> Option<Announcement> {
        let event = self.events.try_recv().ok()?;
        self.music.handle_player_event(event).await
    }

    /// Shared user data using this harness' manager and the given resolver services.
    pub fn data(&self, metadata: FakeMetadata, search: FakeSearch) -> Arc<Data> {
        let resolver = TrackResolver::new(Arc::new(metadata), Arc::new(search));
        Arc::new(Data::new("!", self.music.clone(), Arc::new(resolver)))
    }
}
