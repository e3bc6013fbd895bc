use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::warn;

/// Posts messages that are not replies to a command, such as
/// "Finished playing!" once the queue drains.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, channel: ChannelId, text: &str);
}

/// Sends announcements through the Discord HTTP API.
pub struct HttpAnnouncer {
    http: Arc<Http>,
}

impl HttpAnnouncer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Announcer for HttpAnnouncer {
    async fn announce(&self, channel: ChannelId, text: &str) {
        if let Err(e) = channel.say(&self.http, text).await {
            warn!("Failed to send announcement to channel {}: {}", channel, e);
        }
    }
}
