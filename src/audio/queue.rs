use std::collections::VecDeque;
use std::sync::Arc;

use crate::voice::VoiceSession;

pub const DEFAULT_VOLUME: f32 = 1.0;

/// Referencia inmutable a un medio reproducible, con sus metadatos de
/// presentación. Se crea al resolver una búsqueda (o al pegar un enlace) y
/// se descarta al salir de la cola.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub link: String,
    pub title: String,
    pub channel: String,
}

impl Track {
    pub fn new(
        link: impl Into<String>,
        title: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            channel: channel.into(),
        }
    }

    /// Track para un enlace pegado directamente: no pasa por el buscador,
    /// con placeholders de título y canal.
    pub fn from_link(link: &str) -> Self {
        Self::new(link, link, "unknown")
    }
}

/// Estado de reproducción de una guild: cola FIFO (la cabeza es lo que
/// suena o lo próximo en sonar), flag de repetición, volumen y el handle a
/// la sesión de voz. Una entrada por guild, creada perezosamente y viva
/// durante todo el proceso.
pub struct GuildPlayback {
    pub queue: VecDeque<Track>,
    pub repeating: bool,
    pub volume: f32,
    /// Sesión de voz activa. No es propiedad del estado: es un handle al
    /// transporte, y se suelta cuando la cola se vacía o hay desconexión.
    pub session: Option<Arc<dyn VoiceSession>>,
}

impl Default for GuildPlayback {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            repeating: false,
            volume: DEFAULT_VOLUME,
            session: None,
        }
    }
}

impl GuildPlayback {
    pub fn head(&self) -> Option<&Track> {
        self.queue.front()
    }

    /// Avanza la cola tras un fin de stream: descarta la cabeza, salvo que
    /// el modo repetición esté activo (la cabeza volverá a sonar).
    pub fn advance(&mut self) {
        if !self.repeating && !self.queue.is_empty() {
            self.queue.pop_front();
        }
    }

    /// Vuelve a los valores por defecto al terminar la reproducción. El
    /// flag de repetición se apaga sin aviso al usuario. Devuelve la sesión
    /// que hubiera, para que el llamador decida si desconectarla.
    pub fn reset(&mut self) -> Option<Arc<dyn VoiceSession>> {
        self.queue.clear();
        self.repeating = false;
        self.volume = DEFAULT_VOLUME;
        self.session.take()
    }
}
