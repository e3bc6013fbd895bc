//! Turns what a user typed after `play` into a playable track reference.
//!
//! Three shapes of input are understood: YouTube links are played as-is,
//! Spotify track links are looked up on Spotify and re-searched on YouTube
//! as `"<artist> - <title>"`, and anything else is a YouTube keyword search.

/// Submodule implementing `TrackMetadataApi` against the Spotify Web API.
pub(crate) mod spotify;
/// Submodule implementing `VideoSearchApi` via `yt-dlp`, plus YouTube URL helpers.
pub(crate) mod youtube;

pub use spotify::{SpotifyApi, SpotifyError, SpotifyTrack, spawn_token_refresh};
pub use youtube::{SearchError, YoutubeApi, YtDlpSearch};

use std::fmt;
use std::sync::Arc;

use serenity::async_trait;
use tracing::{debug, info, warn};

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};

/// An opaque locator for a playable audio source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackRef(String);

impl TrackRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Track metadata lookups (Spotify).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackMetadataApi: Send + Sync {
    async fn get_track(&self, track_id: &str) -> Result<SpotifyTrack, SpotifyError>;
}

/// Keyword search returning the id of the first matching video, if any.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSearchApi: Send + Sync {
    async fn search_by_keyword(&self, text: &str) -> Result<Option<String>, SearchError>;
}

/// Composite of metadata lookup and keyword search.
pub struct TrackResolver {
    metadata: Arc<dyn TrackMetadataApi>,
    search: Arc<dyn VideoSearchApi>,
}

impl TrackResolver {
    pub fn new(metadata: Arc<dyn TrackMetadataApi>, search: Arc<dyn VideoSearchApi>) -> Self {
        Self { metadata, search }
    }

    /// Resolve a query or URL into a track reference.
    pub async fn resolve(&self, query: &str) -> MusicResult<TrackRef> {
        let query = query.trim();

        if YoutubeApi::is_youtube_url(query) {
            debug!("Using YouTube URL as-is: {}", query);
            return Ok(TrackRef::new(query));
        }

        if SpotifyApi::is_track_link(query) {
            return self.resolve_spotify(query).await;
        }

        self.search_youtube(query).await
    }

    /// Spotify links never fall back to a plain keyword search.
    async fn resolve_spotify(&self, query: &str) -> MusicResult<TrackRef> {
        let Some(track_id) = SpotifyApi::extract_track_id(query) else {
            warn!("Spotify link without a track id: {}", query);
            return Err(MusicError::MetadataLookupFailed);
        };

        info!("Looking up Spotify track {}", track_id);
        let track = self.metadata.get_track(&track_id).await.map_err(|e| {
            warn!("Spotify lookup for {} failed: {}", track_id, e);
            MusicError::MetadataLookupFailed
        })?;

        self.search_youtube(&track.search_query()).await
    }

    async fn search_youtube(&self, text: &str) -> MusicResult<TrackRef> {
        info!("Searching YouTube for: {}", text);
        match self.search.search_by_keyword(text).await {
            Ok(Some(video_id)) => Ok(TrackRef::new(YoutubeApi::watch_url(&video_id))),
            Ok(None) => Err(MusicError::NoSearchResults),
            Err(e) => {
                warn!("YouTube search for {:?} failed: {}", text, e);
                Err(MusicError::NoSearchResults)
            }
        }
    }
}
