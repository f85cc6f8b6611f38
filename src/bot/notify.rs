use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId};
use tracing::{error, warn};

/// Salida de texto hacia una guild. El controlador solo conoce este trait;
/// el destino concreto lo decide la implementación.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notice(&self, guild_id: GuildId, text: &str);
}

/// Notifier real: envía cada aviso al último canal desde el que la guild
/// dio una orden.
pub struct ChannelNotifier {
    http: Arc<Http>,
    channels: DashMap<GuildId, ChannelId>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            channels: DashMap::new(),
        }
    }

    /// Registra el canal de destino de los avisos de una guild. Se
    /// refresca con cada comando entrante.
    pub fn bind(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.channels.insert(guild_id, channel_id);
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notice(&self, guild_id: GuildId, text: &str) {
        let Some(channel_id) = self.channels.get(&guild_id).map(|entry| *entry) else {
            warn!("aviso para guild {guild_id} sin canal registrado: {text}");
            return;
        };

        if let Err(e) = channel_id.say(&self.http, text).await {
            error!("no se pudo enviar un aviso a guild {guild_id}: {e:?}");
        }
    }
}
