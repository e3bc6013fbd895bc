//! Prefixed text commands: parsing a message into an invocation and
//! routing it to the matching music handler.

/// Commands related to music playback.
pub mod music;

use std::collections::HashMap;
use std::sync::LazyLock;

use poise::serenity_prelude::{ChannelId, GuildId};
use tracing::{debug, warn};

use crate::Data;
use music::utils::music_manager::MusicResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Play,
    Skip,
    Pause,
    Resume,
    Stop,
    Queue,
}

/// Command token (without prefix, lower-case) to command.
///
/// Routing stays outside poise's prefix framework: unknown commands must be
/// ignored without a reply, and a known command outside a guild still gets
/// an answer, which poise's own alias and guild checks do not give us.
static COMMAND_TABLE: LazyLock<HashMap<&'static str, CommandKind>> = LazyLock::new(|| {
    HashMap::from([
        ("play", CommandKind::Play),
        ("p", CommandKind::Play),
        ("skip", CommandKind::Skip),
        ("s", CommandKind::Skip),
        ("pause", CommandKind::Pause),
        ("resume", CommandKind::Resume),
        ("stop", CommandKind::Stop),
        ("queue", CommandKind::Queue),
        ("q", CommandKind::Queue),
    ])
});

/// A recognised command and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: CommandKind,
    pub args: Vec<String>,
}

/// Everything a handler needs to know about the message that invoked it.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub guild_id: GuildId,
    /// Channel the command was posted in; replies go here.
    pub text_channel: ChannelId,
    /// Voice channel the author is connected to, if any.
    pub voice_channel: Option<ChannelId>,
    pub args: Vec<String>,
}

/// Parse a message into an invocation. Messages from bots, messages not
/// starting with `prefix`, and unknown commands yield `None`.
pub fn parse_invocation(content: &str, prefix: &str, sender_is_bot: bool) -> Option<Invocation> {
    if sender_is_bot {
        return None;
    }

    let mut tokens = content.split_whitespace();
    let key = tokens.next()?.strip_prefix(prefix)?.to_lowercase();
    let command = *COMMAND_TABLE.get(key.as_str())?;

    Some(Invocation {
        command,
        args: tokens.map(str::to_string).collect(),
    })
}

/// Run a command and produce the text to reply with. Failures become their
/// user-facing message.
pub async fn dispatch(data: &Data, command: CommandKind, request: &CommandRequest) -> String {
    debug!(
        "Dispatching {:?} with {} argument(s) in guild {}",
        command,
        request.args.len(),
        request.guild_id
    );

    let result: MusicResult<String> = match command {
        CommandKind::Play => music::play::play(data, request).await,
        CommandKind::Skip => music::skip::skip(data, request).await,
        CommandKind::Pause => music::pause::pause(data, request).await,
        CommandKind::Resume => music::resume::resume(data, request).await,
        CommandKind::Stop => music::stop::stop(data, request).await,
        CommandKind::Queue => music::queue::queue(data, request).await,
    };

    result.unwrap_or_else(|e| {
        warn!("{:?} failed in guild {}: {:?}", command, request.guild_id, e);
        e.to_string()
    })
}
