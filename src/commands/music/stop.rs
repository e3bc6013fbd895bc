use super::*;

/// Stop the music, clear the queue, and leave the voice channel
pub async fn stop(data: &Data, request: &CommandRequest) -> MusicResult<String> {
    data.music.stop(request.guild_id).await?;
    Ok(messages::STOPPED.to_string())
}
