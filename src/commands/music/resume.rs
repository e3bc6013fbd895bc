use super::*;

/// Resume a paused track
pub async fn resume(data: &Data, request: &CommandRequest) -> MusicResult<String> {
    data.music.resume(request.guild_id).await?;
    Ok(messages::RESUMED.to_string())
}
