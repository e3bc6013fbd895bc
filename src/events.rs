use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{ChannelId, GuildId, UserId};
use tracing::{debug, info};

use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::commands::{self, CommandRequest};
use crate::{Data, Error, presence};

/// Framework-wide event handler: sets the presence once connected and
/// routes prefixed messages to the command dispatcher.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("{} is connected", data_about_bot.user.name);
            presence::set_presence(ctx, &data.command_prefix);
        }
        serenity::FullEvent::Message { new_message } => {
            handle_message(ctx, new_message, data).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let Some(invocation) =
        commands::parse_invocation(&message.content, &data.command_prefix, message.author.bot)
    else {
        return Ok(());
    };

    debug!(
        "{} invoked {:?} in channel {}",
        message.author.name, invocation.command, message.channel_id
    );

    let request = command_request(
        message.guild_id,
        message.channel_id,
        invocation.args,
        |guild_id| user_voice_channel(ctx, guild_id, message.author.id),
    );
    let reply = match request {
        Ok(request) => commands::dispatch(data, invocation.command, &request).await,
        Err(e) => e.to_string(),
    };

    message.channel_id.say(&ctx.http, reply).await?;
    Ok(())
}

/// Commands only run inside a guild; `voice_channel` is only consulted there.
fn command_request(
    guild_id: Option<GuildId>,
    text_channel: ChannelId,
    args: Vec<String>,
    voice_channel: impl FnOnce(GuildId) -> Option<ChannelId>,
) -> MusicResult<CommandRequest> {
    let guild_id = guild_id.ok_or(MusicError::NotInGuild)?;
    Ok(CommandRequest {
        guild_id,
        text_channel,
        voice_channel: voice_channel(guild_id),
        args,
    })
}

/// The voice channel `user_id` is connected to, from the guild cache.
fn user_voice_channel(
    ctx: &serenity::Context,
    guild_id: GuildId,
    user_id: UserId,
) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|voice_state| voice_state.channel_id)
}
