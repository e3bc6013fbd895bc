use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use super::announcer::Announcer;
use super::music_manager::MusicManager;
use super::voice::PlayerEvent;

/// Drain player events one at a time, applying each to its session and
/// posting the resulting announcement. Returns once every sender is gone.
pub async fn run_player_events(
    music: Arc<MusicManager>,
    announcer: Arc<dyn Announcer>,
    mut events: UnboundedReceiver<PlayerEvent>,
) {
    info!("Player event loop started");

    while let Some(event) = events.recv().await {
        debug!(
            "Player event {:?} for session {} in guild {}",
            event.kind, event.session_id, event.guild_id
        );

        if let Some(announcement) = music.handle_player_event(event).await {
            announcer
                .announce(announcement.channel, &announcement.text)
                .await;
        }
    }

    info!("Player event loop finished");
}
