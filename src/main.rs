use ::serenity::all::ClientBuilder;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use jukebox::commands::music::audio_sources::{
    SpotifyApi, TrackResolver, YtDlpSearch, spawn_token_refresh,
};
use jukebox::commands::music::utils::{
    announcer::HttpAnnouncer, event_handlers::run_player_events, music_manager::MusicManager,
    songbird_voice::SongbirdTransport,
};
use jukebox::config::Config;
use jukebox::{Data, Error, events};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging with debug level for our crate
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jukebox=debug,warn")),
        )
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_target(true)
        .with_ansi(true)
        .pretty()
        .init();

    dotenv().ok();

    let config = Config::from_env()?;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let http_client = reqwest::Client::new();
    let songbird = Songbird::serenity();

    let (music, player_events) = MusicManager::new(Arc::new(SongbirdTransport::new(
        songbird.clone(),
        http_client.clone(),
    )));
    let music = Arc::new(music);

    let spotify = Arc::new(SpotifyApi::new(http_client, config.spotify.clone()));
    if !spotify.has_credentials() {
        warn!("SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET not set, Spotify links will not resolve");
    }
    let resolver = Arc::new(TrackResolver::new(
        spotify.clone(),
        Arc::new(YtDlpSearch::default()),
    ));

    let command_prefix = config.command_prefix.clone();
    let refresh_interval = config.spotify_refresh_interval;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);

                if spotify.has_credentials() {
                    spawn_token_refresh(spotify, refresh_interval);
                }

                let announcer = Arc::new(HttpAnnouncer::new(ctx.http.clone()));
                tokio::spawn(run_player_events(music.clone(), announcer, player_events));

                Ok(Data::new(command_prefix, music, resolver))
            })
        })
        .build();

    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .register_songbird_with(songbird)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.map_err(Into::into)
}
