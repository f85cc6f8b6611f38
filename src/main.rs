use anyhow::Result;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use songbird::{SerenityInit, Songbird};
use std::sync::Arc;
use tracing::{error, info};

mod audio;
mod bot;
mod config;
mod error;
mod sources;
mod ui;
mod voice;

use crate::audio::player::PlaybackController;
use crate::bot::notify::ChannelNotifier;
use crate::bot::EchoBot;
use crate::config::Config;
use crate::sources::YouTubeSearchClient;
use crate::voice::SongbirdGateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Inicializar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("echo_music=debug".parse()?)
                .add_directive("serenity=info".parse()?)
                .add_directive("songbird=info".parse()?),
        )
        .init();

    info!("🎵 Iniciando echo v{}", env!("CARGO_PKG_VERSION"));

    if std::env::args().any(|arg| arg == "--health-check") {
        return health_check().await;
    }

    let config = Config::load()?;

    // Intents mínimos: mensajes con contenido y estados de voz
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::MESSAGE_CONTENT;

    // Colaboradores construidos explícitamente e inyectados; nada de
    // singletons de módulo.
    let manager = Songbird::serenity();
    let gateway = Arc::new(SongbirdGateway::new(manager.clone()));
    let resolver = Arc::new(YouTubeSearchClient::new(config.youtube_api_key.clone()));
    let notifier = Arc::new(ChannelNotifier::new(Arc::new(serenity::http::Http::new(
        &config.discord_token,
    ))));
    let controller = Arc::new(PlaybackController::new(
        resolver,
        gateway.clone(),
        notifier.clone(),
    ));

    let handler = EchoBot::new(controller, notifier, gateway);

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(manager)
        .await?;

    // Shutdown ordenado
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("no se pudo registrar Ctrl+C");
        info!("⚠️ Señal de shutdown recibida, cerrando...");
        std::process::exit(0);
    });

    info!("🚀 Bot iniciado");
    if let Err(why) = client.start().await {
        error!("Error al ejecutar el cliente: {why:?}");
    }

    Ok(())
}

/// Comprueba que yt-dlp, del que depende el streaming, está disponible.
async fn health_check() -> Result<()> {
    let yt_dlp = async_process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .await?;

    if yt_dlp.status.success() {
        println!("OK");
        Ok(())
    } else {
        anyhow::bail!("yt-dlp no está disponible");
    }
}
