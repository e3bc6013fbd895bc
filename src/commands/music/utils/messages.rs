//! Text replies and announcements sent to the channel a command came from.

pub const NOW_PLAYING: &str = "Now playing";
pub const ADDED_TO_QUEUE: &str = "Added to the queue.";
pub const SKIPPED: &str = "Skipped the current song.";
pub const PAUSED: &str = "Paused the music.";
pub const RESUMED: &str = "Resumed the music.";
pub const STOPPED: &str = "Stopped the music and cleared the queue.";
pub const FINISHED: &str = "Finished playing!";
pub const QUEUE_EMPTY: &str = "The queue is currently empty.";

/// "Current queue:" followed by one numbered line per entry.
pub fn queue_listing<T: std::fmt::Display>(entries: &[T]) -> String {
    let lines = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| format!("{}. {}", index + 1, entry))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Current queue:\n{}", lines)
}
