//! Glue con Discord: eventos de serenity, gating de menciones y la
//! política de fallos del proceso.

pub mod dispatcher;
pub mod notify;

use std::sync::Arc;

use anyhow::Result;
use serenity::all::{Context, EventHandler, Message, Ready, VoiceState};
use serenity::async_trait;
use serenity::gateway::ActivityData;
use tracing::{error, info};

use crate::audio::player::PlaybackController;
use crate::bot::notify::ChannelNotifier;
use crate::voice::SongbirdGateway;

pub struct EchoBot {
    controller: Arc<PlaybackController>,
    notifier: Arc<ChannelNotifier>,
    gateway: Arc<SongbirdGateway>,
}

impl EchoBot {
    pub fn new(
        controller: Arc<PlaybackController>,
        notifier: Arc<ChannelNotifier>,
        gateway: Arc<SongbirdGateway>,
    ) -> Self {
        Self {
            controller,
            notifier,
            gateway,
        }
    }

    /// Un mensaje solo es una orden si menciona al bot y la mención es el
    /// primer token. Devuelve los tokens restantes.
    fn addressed_tokens<'a>(&self, ctx: &Context, content: &'a str) -> Option<Vec<&'a str>> {
        let me = ctx.cache.current_user().id;
        let mut tokens = content.split_whitespace();
        let first = tokens.next()?;

        let direct = format!("<@{me}>");
        let nickname = format!("<@!{me}>");
        if first != direct && first != nickname {
            return None;
        }
        Some(tokens.collect())
    }

    async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let Some(guild_id) = msg.guild_id else {
            return Ok(());
        };
        let Some(tokens) = self.addressed_tokens(ctx, &msg.content) else {
            return Ok(());
        };
        let Some(command) = dispatcher::parse(&tokens) else {
            return Ok(());
        };

        self.notifier.bind(guild_id, msg.channel_id);
        dispatcher::dispatch(
            self.controller.as_ref(),
            self.notifier.as_ref(),
            guild_id,
            msg.author.id,
            command,
        )
        .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for EchoBot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 {} está en línea!", ready.user.name);
        info!("📊 Conectado a {} servidores", ready.guilds.len());

        self.gateway.attach_cache(ctx.cache.clone());
        ctx.set_activity(Some(ActivityData::listening("@echo play")));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Err(err) = self.handle_message(&ctx, &msg).await {
            // Política de fallos inesperados: dejar rastro y tumbar el
            // handler en vez de seguir con estado dudoso.
            error!("💥 fallo no recuperable procesando \"{}\": {err:?}", msg.content);
            panic!("fallo no recuperable procesando un comando: {err}");
        }
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        // Desconexión externa del bot: restablecer el estado de la guild
        // para mantener el invariante cola vacía ⇔ sin sesión.
        let me = ctx.cache.current_user().id;
        if new.user_id != me || new.channel_id.is_some() || old.is_none() {
            return;
        }
        let Some(guild_id) = new.guild_id else {
            return;
        };

        info!("🔌 Bot desconectado del canal de voz en guild {guild_id}");
        self.controller.clear_guild(guild_id).await;
    }
}
