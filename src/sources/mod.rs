//! Resolución de la entrada de `play` a tracks reproducibles.

pub mod youtube;

pub use youtube::YouTubeSearchClient;

use async_trait::async_trait;
use url::Url;

use crate::audio::queue::Track;
use crate::error::PlaybackError;

/// Proveedor externo de búsqueda: texto libre → track reproducible.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchResolver: Send + Sync {
    async fn search(&self, query: &str) -> Result<Track, PlaybackError>;
}

/// Normaliza la entrada de `play`: un enlace directo se usa tal cual, con
/// placeholders de metadatos; cualquier otra cosa pasa por el buscador.
pub async fn resolve(resolver: &dyn SearchResolver, query: &str) -> Result<Track, PlaybackError> {
    if is_direct_link(query) {
        return Ok(Track::from_link(query));
    }
    resolver.search(query).await
}

fn is_direct_link(query: &str) -> bool {
    match Url::parse(query) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
