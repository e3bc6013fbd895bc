use super::*;
use crate::commands::music::audio_sources::TrackRef;

/// View the current music queue
pub async fn queue(data: &Data, request: &CommandRequest) -> MusicResult<String> {
    let queue = data.music.queue_snapshot(request.guild_id).await;
    Ok(format_queue(&queue))
}

/// 1-indexed listing of the queue, or the empty-queue message.
pub fn format_queue(queue: &[TrackRef]) -> String {
    if queue.is_empty() {
        messages::QUEUE_EMPTY.to_string()
    } else {
        messages::queue_listing(queue)
    }
}
