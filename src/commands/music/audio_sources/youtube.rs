//! YouTube helpers: link validation, canonical watch URLs, keyword search
//! through `yt-dlp`, and opening a link as a songbird audio input.

use regex::Regex;
use serenity::async_trait;
use songbird::input::{Input, YoutubeDl};
use std::sync::LazyLock;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use super::VideoSearchApi;

static VIDEO_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

const WATCH_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to run yt-dlp: {0}")]
    Io(#[from] std::io::Error),

    #[error("yt-dlp search failed: {0}")]
    Failed(String),

    #[error("Unable to parse yt-dlp output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Default)]
pub struct YoutubeApi;

impl YoutubeApi {
    /// Whether `query` is a YouTube link that can be streamed directly
    /// (watch pages, shorts, embeds and `youtu.be` short links).
    pub fn is_youtube_url(query: &str) -> bool {
        Self::video_id(query).is_some()
    }

    /// The video id of a YouTube link, if `query` is one.
    pub fn video_id(query: &str) -> Option<String> {
        let url = Url::parse(query.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?;

        let id = if host == "youtu.be" {
            url.path_segments()?.next().map(str::to_string)
        } else if WATCH_HOSTS.contains(&host) {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("shorts" | "embed" | "v" | "live") => segments.next().map(str::to_string),
                _ => None,
            }
        } else {
            None
        };

        id.filter(|id| VIDEO_ID_REGEX.is_match(id))
    }

    /// Canonical watch URL for a video id.
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    /// Open `url` as a lazily-started audio stream. `yt-dlp` picks the best
    /// audio-only format available.
    pub fn audio_input(http: reqwest::Client, url: &str) -> Input {
        YoutubeDl::new(http, url.to_string()).into()
    }
}

/// Keyword search through `yt-dlp`'s `ytsearch` extractor.
pub struct YtDlpSearch {
    program: String,
}

impl Default for YtDlpSearch {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlpSearch {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// First video id found in `yt-dlp --dump-json` output (one JSON object per line).
    pub(crate) fn parse_first_id(stdout: &str) -> Result<Option<String>, SearchError> {
        let Some(line) = stdout.lines().find(|line| !line.trim().is_empty()) else {
            return Ok(None);
        };

        let entry: serde_json::Value = serde_json::from_str(line)?;
        Ok(entry["id"]
            .as_str()
            .filter(|id| VIDEO_ID_REGEX.is_match(id))
            .map(str::to_string))
    }
}

#[async_trait]
impl VideoSearchApi for YtDlpSearch {
    async fn search_by_keyword(&self, text: &str) -> Result<Option<String>, SearchError> {
        let search_param = format!("ytsearch1:{}", text);
        debug!("Running {} for {:?}", self.program, search_param);

        let output = Command::new(&self.program)
            .args([
                "--flat-playlist", // Only list results, don't resolve formats
                "--dump-json",
                "--no-warnings",
                &search_param,
            ])
            .output()
            .await?;

        if !output.status.success() {
            return Err(SearchError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Self::parse_first_id(&String::from_utf8_lossy(&output.stdout))
    }
}
