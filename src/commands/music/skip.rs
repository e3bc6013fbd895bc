use super::*;

/// Skip the currently playing song
pub async fn skip(data: &Data, request: &CommandRequest) -> MusicResult<String> {
    data.music.skip(request.guild_id).await?;
    Ok(messages::SKIPPED.to_string())
}
