use super::*;
use crate::commands::music::utils::music_manager::{Enqueued, MusicError};
use tracing::info;

/// Play a song from a YouTube link, a Spotify track link or a search query
pub async fn play(data: &Data, request: &CommandRequest) -> MusicResult<String> {
    let query = request.args.join(" ");
    if query.trim().is_empty() {
        return Err(MusicError::MissingQuery);
    }
    if request.voice_channel.is_none() {
        return Err(MusicError::NoVoiceChannel);
    }

    info!("Received play command with query: {}", query);

    // Resolution can take a while; anything that cancels playback in the
    // meantime bumps the epoch and the result is discarded.
    let epoch = data.music.epoch(request.guild_id).await;
    let track = data.resolver.resolve(&query).await?;

    let outcome = data
        .music
        .enqueue(
            request.guild_id,
            track,
            request.voice_channel,
            request.text_channel,
            epoch,
        )
        .await?;

    Ok(match outcome {
        Enqueued::NowPlaying => messages::NOW_PLAYING,
        Enqueued::Queued { .. } => messages::ADDED_TO_QUEUE,
    }
    .to_string())
}
