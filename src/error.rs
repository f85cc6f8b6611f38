use thiserror::Error;

/// Fallos y desenlaces visibles para el usuario de las operaciones de
/// reproducción. El `Display` de cada variante es exactamente el aviso que
/// se envía al canal, así el dispatcher convierte cualquiera de ellos con
/// `to_string()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// El usuario que pidió `play` no está en ningún canal de voz.
    #[error("You need to join a voice channel first")]
    NoVoiceChannel,

    /// La operación requiere una sesión de voz activa y no la hay.
    #[error("echo is not in a voice channel")]
    NotConnected,

    #[error("No results for that search")]
    NoResults,

    #[error("Playlists are not supported")]
    PlaylistNotSupported,

    /// Volumen fuera del rango 0-400.
    #[error("Enter a value between 0-400")]
    InvalidRange,

    /// El argumento de volumen ni siquiera es un número.
    #[error("Enter a numeric value between 0-400")]
    NotANumber,

    #[error("Playback is already paused")]
    AlreadyPaused,

    #[error("Playback is not paused")]
    NotPaused,

    #[error("Nothing to skip")]
    NothingToSkip,

    #[error("Nothing in queue")]
    EmptyQueue,

    /// El transporte no pudo arrancar el stream. La cola se conserva para
    /// que el usuario pueda reintentar.
    #[error("Could not start playback: {0}")]
    Transport(String),
}
