//! Spotify Web API client used to turn track links into `"<artist> - <title>"`.
//! Authenticates with the client credentials flow; the access token is
//! refreshed on a fixed interval by [`spawn_token_refresh`].

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use serenity::async_trait;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SpotifyCredentials;

use super::TrackMetadataApi;

const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const API_BASE_URL: &str = "https://api.spotify.com";

/// Matches `open.spotify.com/track/<id>` links, including localised `intl-xx` paths.
static SPOTIFY_TRACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"open\.spotify\.com/(?:intl-[A-Za-z-]+/)?track/([A-Za-z0-9]+)").unwrap()
});

/// Errors from the Spotify Web API.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("Spotify credentials are not configured")]
    MissingCredentials,

    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Spotify API error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Track not found")]
    NotFound,

    #[error("Track has no artists")]
    NoArtists,
}

/// Basic track information retrieved from Spotify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotifyTrack {
    pub name: String,
    /// Artist names in credit order.
    pub artists: Vec<String>,
}

impl SpotifyTrack {
    /// The YouTube search string for this track: first artist, then title.
    pub fn search_query(&self) -> String {
        match self.artists.first() {
            Some(artist) => format!("{} - {}", artist, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpotifyToken {
    access_token: String,
    expires_in: u64,
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    /// Considered expired 30 seconds early.
    fn is_expired(&self) -> bool {
        let expiry = Duration::from_secs(self.expires_in);
        self.created_at.elapsed() > expiry.saturating_sub(Duration::from_secs(30))
    }
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    name: String,
    artists: Vec<ArtistResponse>,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    name: String,
}

pub struct SpotifyApi {
    http: reqwest::Client,
    credentials: Option<SpotifyCredentials>,
    accounts_base_url: String,
    api_base_url: String,
    token: Mutex<Option<SpotifyToken>>,
}

impl SpotifyApi {
    pub fn new(http: reqwest::Client, credentials: Option<SpotifyCredentials>) -> Self {
        Self::with_base_urls(http, credentials, ACCOUNTS_BASE_URL, API_BASE_URL)
    }

    /// Point the client at different endpoints (used by tests).
    pub fn with_base_urls(
        http: reqwest::Client,
        credentials: Option<SpotifyCredentials>,
        accounts_base_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            accounts_base_url: accounts_base_url.into(),
            api_base_url: api_base_url.into(),
            token: Mutex::new(None),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Extract the track id from a Spotify track link.
    /// Whether `query` points at a Spotify track page, valid id or not.
    pub fn is_track_link(query: &str) -> bool {
        query.contains("open.spotify.com/track") || SPOTIFY_TRACK_REGEX.is_match(query)
    }

    pub fn extract_track_id(url: &str) -> Option<String> {
        SPOTIFY_TRACK_REGEX
            .captures(url)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Request a fresh access token and store it, replacing the previous one.
    /// On failure the previously held token is left untouched.
    pub async fn refresh_access_token(&self) -> Result<(), SpotifyError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SpotifyError::MissingCredentials)?;

        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_base_url))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(SpotifyError::Status { status, body });
        }

        let token = response.json::<SpotifyToken>().await?;
        debug!("Spotify token valid for {}s", token.expires_in);
        *self.token.lock().await = Some(token);

        Ok(())
    }

    /// The current access token, refreshing first when none is held or it has expired.
    async fn access_token(&self) -> Result<String, SpotifyError> {
        {
            let token = self.token.lock().await;
            if let Some(token) = token.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.access_token.clone());
            }
        }

        self.refresh_access_token().await?;

        self.token
            .lock()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(SpotifyError::MissingCredentials)
    }
}

#[async_trait]
impl TrackMetadataApi for SpotifyApi {
    async fn get_track(&self, track_id: &str) -> Result<SpotifyTrack, SpotifyError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(format!("{}/v1/tracks/{}", self.api_base_url, track_id))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => return Err(SpotifyError::NotFound),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Cannot read response".to_string());
                return Err(SpotifyError::Status { status, body });
            }
        }

        let track = response.json::<TrackResponse>().await?;
        if track.artists.is_empty() {
            return Err(SpotifyError::NoArtists);
        }

        Ok(SpotifyTrack {
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
        })
    }
}

/// Refresh the Spotify token immediately and then on every `interval`.
/// Failures are logged and the previous token stays in use.
pub fn spawn_token_refresh(api: Arc<SpotifyApi>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match api.refresh_access_token().await {
                Ok(()) => info!("Spotify access token refreshed"),
                Err(e) => error!("Error refreshing Spotify access token: {}", e),
            }
        }
    })
}
