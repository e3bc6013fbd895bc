//! The bot's status line: "Listening to !play", shown as Do Not Disturb.

use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{ActivityData, OnlineStatus};
use tracing::info;

pub fn activity(command_prefix: &str) -> ActivityData {
    ActivityData::listening(format!("{}play", command_prefix))
}

pub fn set_presence(ctx: &serenity::Context, command_prefix: &str) {
    let activity = activity(command_prefix);
    info!("Setting presence: listening to {}", activity.name);
    ctx.set_presence(Some(activity), OnlineStatus::DoNotDisturb);
}
