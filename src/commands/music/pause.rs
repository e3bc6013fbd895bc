use super::*;

/// Pause the current track
pub async fn pause(data: &Data, request: &CommandRequest) -> MusicResult<String> {
    data.music.pause(request.guild_id).await?;
    Ok(messages::PAUSED.to_string())
}
