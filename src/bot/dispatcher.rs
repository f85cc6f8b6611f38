//! Traducción de los tokens de sub-comando a operaciones del controlador.

use serenity::model::id::{GuildId, UserId};
use tracing::debug;

use crate::audio::player::PlaybackController;
use crate::bot::notify::Notifier;
use crate::error::PlaybackError;

/// Sub-comandos aceptados tras la mención al bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCommand {
    Play { query: String },
    Pause,
    Resume,
    Stop,
    Skip,
    Queue,
    Repeat,
    Volume { argument: String },
}

/// Reconoce el token de sub-comando (y sus alias) y captura el resto como
/// argumento. Los tokens desconocidos se ignoran.
pub fn parse(tokens: &[&str]) -> Option<AudioCommand> {
    let (&command, rest) = tokens.split_first()?;
    let argument = rest.join(" ");

    match command.to_lowercase().as_str() {
        "play" | "p" => Some(AudioCommand::Play { query: argument }),
        "pause" | "ps" => Some(AudioCommand::Pause),
        "resume" | "rs" => Some(AudioCommand::Resume),
        "stop" | "s" => Some(AudioCommand::Stop),
        "skip" | "sk" => Some(AudioCommand::Skip),
        "queue" | "q" => Some(AudioCommand::Queue),
        "repeat" | "r" => Some(AudioCommand::Repeat),
        "volume" | "v" => Some(AudioCommand::Volume { argument }),
        _ => None,
    }
}

/// Valida la forma del argumento de volumen. El rango se comprueba en el
/// controlador, después de la comprobación de sesión.
fn parse_volume(argument: &str) -> Result<f32, PlaybackError> {
    argument
        .trim()
        .parse::<f32>()
        .map_err(|_| PlaybackError::NotANumber)
}

/// Ejecuta un comando contra el controlador. Único punto donde un fallo de
/// operación se convierte en su aviso al usuario.
pub async fn dispatch(
    controller: &PlaybackController,
    notifier: &dyn Notifier,
    guild_id: GuildId,
    user_id: UserId,
    command: AudioCommand,
) {
    debug!("comando {command:?} en guild {guild_id}");

    let outcome = match &command {
        AudioCommand::Play { query } => controller.play(guild_id, user_id, query).await,
        AudioCommand::Pause => controller.pause(guild_id).await,
        AudioCommand::Resume => controller.resume(guild_id).await,
        AudioCommand::Stop => controller.stop(guild_id).await,
        AudioCommand::Skip => controller.skip(guild_id).await,
        AudioCommand::Queue => controller.describe_queue(guild_id).await,
        AudioCommand::Repeat => controller.toggle_repeat(guild_id).await,
        AudioCommand::Volume { argument } => match parse_volume(argument) {
            Ok(percent) => controller.set_volume(guild_id, percent).await,
            Err(err) => Err(err),
        },
    };

    if let Err(err) = outcome {
        notifier.notice(guild_id, &err.to_string()).await;
    }
}
