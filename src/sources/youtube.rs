use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::SearchResolver;
use crate::audio::queue::Track;
use crate::error::PlaybackError;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    kind: String,
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
}

/// Cliente del endpoint de búsqueda de la YouTube Data API v3. Pide solo
/// el mejor resultado; las playlists se rechazan en vez de encolarse.
pub struct YouTubeSearchClient {
    api_key: String,
    client: reqwest::Client,
}

impl YouTubeSearchClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("no se pudo construir el cliente HTTP");

        Self { api_key, client }
    }

    async fn top_result(&self, query: &str) -> Result<SearchResponse, PlaybackError> {
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("❌ búsqueda de YouTube inalcanzable: {e}");
                PlaybackError::NoResults
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("❌ YouTube API respondió {status}: {body}");
            return Err(PlaybackError::NoResults);
        }

        let body = response.text().await.map_err(|e| {
            error!("❌ no se pudo leer la respuesta de búsqueda: {e}");
            PlaybackError::NoResults
        })?;

        serde_json::from_str(&body).map_err(|e| {
            error!("❌ respuesta de búsqueda ilegible: {e}");
            PlaybackError::NoResults
        })
    }

    fn track_from(response: SearchResponse) -> Result<Track, PlaybackError> {
        let Some(item) = response.items.into_iter().next() else {
            return Err(PlaybackError::NoResults);
        };

        if item.id.kind == "youtube#playlist" {
            return Err(PlaybackError::PlaylistNotSupported);
        }

        let Some(video_id) = item.id.video_id else {
            return Err(PlaybackError::NoResults);
        };

        Ok(Track::new(
            format!("{WATCH_URL}{video_id}"),
            item.snippet.title,
            item.snippet.channel_title,
        ))
    }
}

#[async_trait]
impl SearchResolver for YouTubeSearchClient {
    async fn search(&self, query: &str) -> Result<Track, PlaybackError> {
        debug!("🔍 Búsqueda en YouTube: {query}");
        let response = self.top_result(query).await?;
        let track = Self::track_from(response)?;
        info!("✅ Resultado para \"{query}\": {}", track.title);
        Ok(track)
    }
}
