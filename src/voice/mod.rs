//! Frontera con el transporte de voz/stream. El controlador solo ve estos
//! traits; la implementación real sobre songbird vive en [`discord`].

mod discord;

pub use discord::SongbirdGateway;

use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::id::{GuildId, UserId};
use tokio::sync::oneshot;

use crate::error::PlaybackError;

/// Motivo con el que terminó un stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Cortado por orden del usuario (skip o stop).
    User,
    /// Fin natural del stream, o el transporte lo dio por perdido.
    Natural,
}

/// Receptor del único evento terminal de un stream.
pub type StreamEnd = oneshot::Receiver<EndReason>;

/// Sesión de voz viva. Exclusiva de una guild; nunca se comparte.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceSession: Send + Sync {
    /// Empieza a reproducir `link` con el volumen dado y devuelve el
    /// receptor del evento terminal. El transporte emite exactamente un
    /// fin por stream, en el orden en que los streams arrancaron.
    async fn play(&self, link: &str, volume: f32) -> Result<StreamEnd, PlaybackError>;

    async fn pause(&self);

    async fn resume(&self);

    async fn is_paused(&self) -> bool;

    /// ¿Está produciendo audio ahora mismo?
    async fn is_speaking(&self) -> bool;

    async fn set_volume(&self, volume: f32);

    /// Corta el stream actual; el transporte emitirá su fin con motivo de
    /// usuario.
    async fn stop(&self);

    async fn disconnect(&self);
}

/// Acceso al transporte de chat para entrar al canal de voz del usuario
/// que dio la orden.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Se une al canal de voz en el que está `user_id` dentro de la guild.
    async fn join(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Arc<dyn VoiceSession>, PlaybackError>;
}
