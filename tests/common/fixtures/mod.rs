//! Sample ids and links used across the integration tests.

use jukebox::commands::music::audio_sources::TrackRef;
use poise::serenity_prelude::{ChannelId, GuildId};

pub const GUILD: GuildId = GuildId::new(111);
pub const OTHER_GUILD: GuildId = GuildId::new(222);
pub const TEXT_CHANNEL: ChannelId = ChannelId::new(333);
pub const VOICE_CHANNEL: ChannelId = ChannelId::new(444);

pub const URL_A: &str = "https://www.youtube.com/watch?v=abc";
pub const URL_B: &str = "https://www.youtube.com/watch?v=def";
pub const URL_C: &str = "https://www.youtube.com/watch?v=ghi";

pub fn track(url: &str) -> TrackRef {
    TrackRef::new(url)
}

pub fn tracks(urls: &[&str]) -> Vec<TrackRef> {
    urls.iter().map(|url| TrackRef::new(*url)).collect()
}
