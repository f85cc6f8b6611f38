use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serenity::cache::Cache;
use serenity::model::id::{ChannelId, GuildId, UserId};
use songbird::input::{Input, YoutubeDl};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::{EndReason, StreamEnd, VoiceGateway, VoiceSession};
use crate::error::PlaybackError;

/// Gateway de voz respaldado por songbird. El cache del gateway de Discord
/// llega en `ready`, cuando serenity ya lo construyó; hasta entonces no se
/// puede localizar a nadie.
pub struct SongbirdGateway {
    manager: Arc<Songbird>,
    http: reqwest::Client,
    cache: RwLock<Option<Arc<Cache>>>,
}

impl SongbirdGateway {
    pub fn new(manager: Arc<Songbird>) -> Self {
        Self {
            manager,
            http: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    pub fn attach_cache(&self, cache: Arc<Cache>) {
        *self.cache.write() = Some(cache);
    }

    /// Canal de voz en el que está el usuario, según el cache del gateway.
    fn voice_channel_of(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        let cache = self.cache.read().clone()?;
        let guild = cache.guild(guild_id)?;
        guild
            .voice_states
            .get(&user_id)
            .and_then(|state| state.channel_id)
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn join(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Arc<dyn VoiceSession>, PlaybackError> {
        let channel_id = self
            .voice_channel_of(guild_id, user_id)
            .ok_or(PlaybackError::NoVoiceChannel)?;

        let call = self.manager.join(guild_id, channel_id).await.map_err(|e| {
            error!("error al entrar al canal de voz {channel_id} en guild {guild_id}: {e:?}");
            PlaybackError::Transport(e.to_string())
        })?;

        info!("🔊 Conectado al canal de voz {channel_id} en guild {guild_id}");
        Ok(Arc::new(SongbirdSession {
            guild_id,
            manager: self.manager.clone(),
            call,
            http: self.http.clone(),
            current: Mutex::new(None),
        }))
    }
}

/// Sesión sobre un `Call` de songbird. Guarda el handle del track en curso
/// para las señales de pausa/volumen/corte.
struct SongbirdSession {
    guild_id: GuildId,
    manager: Arc<Songbird>,
    call: Arc<tokio::sync::Mutex<Call>>,
    http: reqwest::Client,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdSession {
    fn current_handle(&self) -> Option<TrackHandle> {
        self.current.lock().clone()
    }
}

#[async_trait]
impl VoiceSession for SongbirdSession {
    async fn play(&self, link: &str, volume: f32) -> Result<StreamEnd, PlaybackError> {
        let input: Input = YoutubeDl::new(self.http.clone(), link.to_string()).into();
        let handle = self.call.lock().await.play_input(input);

        handle
            .set_volume(volume)
            .map_err(|e| PlaybackError::Transport(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        handle
            .add_event(
                Event::Track(TrackEvent::End),
                EndRelay {
                    tx: Mutex::new(Some(tx)),
                },
            )
            .map_err(|e| PlaybackError::Transport(e.to_string()))?;

        *self.current.lock() = Some(handle);
        debug!("stream iniciado en guild {}: {link}", self.guild_id);
        Ok(rx)
    }

    async fn pause(&self) {
        if let Some(track) = self.current_handle() {
            let _ = track.pause();
        }
    }

    async fn resume(&self) {
        if let Some(track) = self.current_handle() {
            let _ = track.play();
        }
    }

    async fn is_paused(&self) -> bool {
        let Some(track) = self.current_handle() else {
            return false;
        };
        matches!(track.get_info().await.map(|info| info.playing), Ok(PlayMode::Pause))
    }

    async fn is_speaking(&self) -> bool {
        let Some(track) = self.current_handle() else {
            return false;
        };
        matches!(track.get_info().await.map(|info| info.playing), Ok(PlayMode::Play))
    }

    async fn set_volume(&self, volume: f32) {
        if let Some(track) = self.current_handle() {
            let _ = track.set_volume(volume);
        }
    }

    async fn stop(&self) {
        if let Some(track) = self.current.lock().take() {
            let _ = track.stop();
        }
    }

    async fn disconnect(&self) {
        if let Err(e) = self.manager.remove(self.guild_id).await {
            warn!("error al desconectar de guild {}: {e:?}", self.guild_id);
        }
    }
}

/// Reenvía el evento terminal del track al watcher del controlador. El
/// sender se consume en el primer evento; los siguientes se ignoran.
struct EndRelay {
    tx: Mutex<Option<oneshot::Sender<EndReason>>>,
}

#[async_trait]
impl VoiceEventHandler for EndRelay {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let reason = match ctx {
            EventContext::Track(ended) => match ended.first() {
                Some((state, _)) if state.playing == PlayMode::Stop => EndReason::User,
                _ => EndReason::Natural,
            },
            _ => EndReason::Natural,
        };

        if let Some(tx) = self.tx.lock().take() {
            let _ = tx.send(reason);
        }
        None
    }
}
