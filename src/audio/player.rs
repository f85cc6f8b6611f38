use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use serenity::model::id::{GuildId, UserId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::audio::queue::{GuildPlayback, Track};
use crate::bot::notify::Notifier;
use crate::error::PlaybackError;
use crate::sources::{self, SearchResolver};
use crate::ui::messages;
use crate::voice::{EndReason, VoiceGateway, VoiceSession};

/// Registro concurrente guild → estado de reproducción. La entrada se crea
/// perezosamente con los valores por defecto. El mutex por entrada
/// serializa las operaciones de esa guild (incluida la continuación de fin
/// de stream) sin bloquear al resto de guilds.
pub struct GuildStore {
    states: DashMap<GuildId, Arc<Mutex<GuildPlayback>>>,
}

impl GuildStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn get(&self, guild_id: GuildId) -> Arc<Mutex<GuildPlayback>> {
        self.states
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(GuildPlayback::default())))
            .clone()
    }
}

/// Máquina de estados de reproducción por guild: arranca, pausa, reanuda,
/// corta y encadena streams reaccionando a sus eventos terminales.
#[derive(Clone)]
pub struct PlaybackController {
    store: Arc<GuildStore>,
    resolver: Arc<dyn SearchResolver>,
    gateway: Arc<dyn VoiceGateway>,
    notifier: Arc<dyn Notifier>,
}

impl PlaybackController {
    pub fn new(
        resolver: Arc<dyn SearchResolver>,
        gateway: Arc<dyn VoiceGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store: Arc::new(GuildStore::new()),
            resolver,
            gateway,
            notifier,
        }
    }

    /// Resuelve `query`, encola el track y, si la guild no tiene sesión,
    /// entra al canal de voz del usuario y arranca el stream de la cabeza.
    pub async fn play(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        query: &str,
    ) -> Result<(), PlaybackError> {
        // La resolución puede tardar; se hace antes de tocar el estado.
        let track = sources::resolve(self.resolver.as_ref(), query).await?;

        let entry = self.store.get(guild_id);
        let mut state = entry.lock().await;

        if let Some(session) = state.session.clone() {
            state.queue.push_back(track.clone());
            if session.is_speaking().await {
                self.notifier
                    .notice(guild_id, &messages::added_to_queue(&track.title))
                    .await;
            }
            return Ok(());
        }

        // Sin sesión: entrar al canal antes de encolar, para que un fallo
        // de canal de voz no deje rastro en el estado.
        let session = self.gateway.join(guild_id, user_id).await?;
        state.session = Some(session.clone());
        state.queue.push_back(track);

        let Some(head) = state.head().cloned() else {
            return Ok(());
        };
        self.notifier
            .notice(guild_id, &messages::now_playing(&head))
            .await;

        if let Err(err) = self
            .begin_stream(guild_id, &session, &head, state.volume)
            .await
        {
            self.drop_session(&mut state).await;
            return Err(err);
        }
        Ok(())
    }

    pub async fn pause(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let state = entry.lock().await;
        let session = state.session.clone().ok_or(PlaybackError::NotConnected)?;

        if session.is_paused().await {
            return Err(PlaybackError::AlreadyPaused);
        }
        session.pause().await;
        self.notifier.notice(guild_id, messages::PAUSED).await;
        Ok(())
    }

    pub async fn resume(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let state = entry.lock().await;
        let session = state.session.clone().ok_or(PlaybackError::NotConnected)?;

        if !session.is_paused().await {
            return Err(PlaybackError::NotPaused);
        }
        session.resume().await;
        self.notifier.notice(guild_id, messages::RESUMED).await;
        Ok(())
    }

    /// Vacía la cola y corta el stream en curso. La continuación observará
    /// la cola vacía y desconectará la sesión.
    pub async fn stop(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let mut state = entry.lock().await;
        state.queue.clear();

        let session = state.session.clone().ok_or(PlaybackError::NotConnected)?;
        session.stop().await;
        Ok(())
    }

    /// Corta el stream en curso; el avance de la cola lo hace la
    /// continuación al recibir el fin.
    pub async fn skip(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let state = entry.lock().await;

        let session = match state.session.clone() {
            Some(session) if !state.queue.is_empty() => session,
            _ => return Err(PlaybackError::NothingToSkip),
        };
        session.stop().await;
        Ok(())
    }

    /// `percent` llega ya validado como número; aquí se comprueba el rango
    /// y se aplica tanto al transporte vivo como al estado de la guild.
    pub async fn set_volume(&self, guild_id: GuildId, percent: f32) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let mut state = entry.lock().await;
        let session = state.session.clone().ok_or(PlaybackError::NotConnected)?;

        if !(0.0..=400.0).contains(&percent) {
            return Err(PlaybackError::InvalidRange);
        }

        let volume = percent / 100.0;
        session.set_volume(volume).await;
        state.volume = volume;
        self.notifier
            .notice(guild_id, &messages::volume_set(percent))
            .await;
        Ok(())
    }

    pub async fn toggle_repeat(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let mut state = entry.lock().await;
        state.repeating = !state.repeating;
        self.notifier
            .notice(guild_id, &messages::repeat_status(state.repeating))
            .await;
        Ok(())
    }

    /// Solo lectura: muestra la cola con el estado de repetición y volumen.
    pub async fn describe_queue(&self, guild_id: GuildId) -> Result<(), PlaybackError> {
        let entry = self.store.get(guild_id);
        let state = entry.lock().await;

        if state.queue.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }
        let overview = messages::queue_overview(state.queue.iter(), state.repeating, state.volume);
        self.notifier.notice(guild_id, &overview).await;
        Ok(())
    }

    /// Restablece una guild a los valores por defecto tras una
    /// desconexión externa del transporte.
    pub async fn clear_guild(&self, guild_id: GuildId) {
        let entry = self.store.get(guild_id);
        let mut state = entry.lock().await;
        // La sesión ya murió con la desconexión; basta con soltar el handle.
        let _ = state.reset();
    }

    /// Continuación de fin de stream: avanza o limpia la cola y decide el
    /// siguiente paso. El mutex de la guild garantiza una sola continuación
    /// en vuelo; los fines llegan en el orden en que arrancaron los
    /// streams.
    pub async fn handle_stream_end(&self, guild_id: GuildId, reason: EndReason) {
        let entry = self.store.get(guild_id);
        let mut state = entry.lock().await;

        let finished = state.head().cloned();
        match &finished {
            Some(track) => info!(
                "🏁 Stream terminado ({reason:?}) en guild {guild_id}: {} - {}",
                track.title, track.link
            ),
            None => debug!("fin de stream sin cola en guild {guild_id}"),
        }

        state.advance();

        if state.queue.is_empty() {
            // `reset` apaga el flag de repetición sin aviso al usuario.
            if let Some(session) = state.reset() {
                session.disconnect().await;
            }
            self.notifier.notice(guild_id, messages::QUEUE_COMPLETE).await;
            return;
        }

        let Some(head) = state.head().cloned() else {
            return;
        };
        let Some(session) = state.session.clone() else {
            warn!("cola con tracks pero sin sesión en guild {guild_id}");
            return;
        };

        let replaying =
            state.repeating && reason != EndReason::User && finished.as_ref() == Some(&head);
        if replaying {
            self.notifier
                .notice(guild_id, &messages::now_repeating(&head))
                .await;
        } else {
            self.notifier
                .notice(guild_id, &messages::now_playing(&head))
                .await;
        }

        if let Err(err) = self
            .begin_stream(guild_id, &session, &head, state.volume)
            .await
        {
            error!("no se pudo encadenar el siguiente stream en guild {guild_id}: {err}");
            self.drop_session(&mut state).await;
            self.notifier.notice(guild_id, &err.to_string()).await;
        }
    }

    /// Arranca el stream de `track` y deja un watcher esperando su único
    /// evento terminal, que re-entra en `handle_stream_end`. Transición
    /// explícita en lugar de recursión: la pila no crece con la cola.
    //
    // Se declara como `fn` que devuelve un futuro en caja con `Send`
    // explícito en lugar de `async fn`: `handle_stream_end` vuelve a entrar
    // aquí a través de `tokio::spawn`, y ese borde en caja rompe el ciclo de
    // inferencia de auto-traits que impide probar `Send` en la recursión.
    fn begin_stream<'a>(
        &'a self,
        guild_id: GuildId,
        session: &'a Arc<dyn VoiceSession>,
        track: &'a Track,
        volume: f32,
    ) -> Pin<Box<dyn Future<Output = Result<(), PlaybackError>> + Send + 'a>> {
        Box::pin(async move {
            let stream_end = session.play(&track.link, volume).await?;
            info!("🎵 Reproduciendo en guild {guild_id}: {}", track.title);

            let controller = self.clone();
            tokio::spawn(async move {
                match stream_end.await {
                    Ok(reason) => controller.handle_stream_end(guild_id, reason).await,
                    // Transporte muerto sin evento terminal: la cola de esa
                    // guild queda parada. Limitación asumida, sin timeouts.
                    Err(_) => {
                        warn!("el transporte soltó el stream de guild {guild_id} sin emitir fin")
                    }
                }
            });
            Ok(())
        })
    }

    /// Suelta la sesión sin tocar la cola, para que un `play` posterior
    /// reintente desde la cabeza.
    async fn drop_session(&self, state: &mut GuildPlayback) {
        if let Some(session) = state.session.take() {
            session.disconnect().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use crate::audio::queue::DEFAULT_VOLUME;
    use crate::bot::notify::MockNotifier;
    use crate::sources::MockSearchResolver;
    use crate::voice::{MockVoiceGateway, MockVoiceSession};

    const GUILD: GuildId = GuildId::new(1);
    const USER: UserId = UserId::new(7);

    fn track(title: &str) -> Track {
        Track::new(format!("https://example.com/{title}"), title, "canal")
    }

    type NoticeLog = Arc<parking_lot::Mutex<Vec<String>>>;

    fn recording_notifier() -> (Arc<MockNotifier>, NoticeLog) {
        let log: NoticeLog = Arc::default();
        let sink = log.clone();
        let mut notifier = MockNotifier::new();
        notifier.expect_notice().returning(move |_, text| {
            sink.lock().push(text.to_string());
        });
        (Arc::new(notifier), log)
    }

    /// Contadores y registros de lo que el controlador pidió a la sesión.
    #[derive(Default)]
    struct SessionProbe {
        ends: parking_lot::Mutex<Vec<oneshot::Sender<EndReason>>>,
        played: parking_lot::Mutex<Vec<String>>,
        stops: AtomicUsize,
        disconnects: AtomicUsize,
    }

    fn streaming_session(
        speaking: bool,
        paused: bool,
    ) -> (Arc<MockVoiceSession>, Arc<SessionProbe>) {
        let probe = Arc::new(SessionProbe::default());
        let mut session = MockVoiceSession::new();

        let on_play = probe.clone();
        session.expect_play().returning(move |link, _volume| {
            on_play.played.lock().push(link.to_string());
            let (tx, rx) = oneshot::channel();
            on_play.ends.lock().push(tx);
            Ok(rx)
        });
        session.expect_is_speaking().returning(move || speaking);
        session.expect_is_paused().returning(move || paused);
        session.expect_pause().returning(|| ());
        session.expect_resume().returning(|| ());
        session.expect_set_volume().returning(|_| ());

        let on_stop = probe.clone();
        session.expect_stop().returning(move || {
            on_stop.stops.fetch_add(1, Ordering::SeqCst);
        });
        let on_disconnect = probe.clone();
        session.expect_disconnect().returning(move || {
            on_disconnect.disconnects.fetch_add(1, Ordering::SeqCst);
        });

        (Arc::new(session), probe)
    }

    fn gateway_returning(session: Arc<MockVoiceSession>) -> MockVoiceGateway {
        let mut gateway = MockVoiceGateway::new();
        gateway.expect_join().returning(move |_, _| {
            let session: Arc<dyn VoiceSession> = session.clone();
            Ok(session)
        });
        gateway
    }

    fn resolver_returning(track: Track) -> MockSearchResolver {
        let mut resolver = MockSearchResolver::new();
        resolver
            .expect_search()
            .returning(move |_| Ok(track.clone()));
        resolver
    }

    fn controller(
        resolver: MockSearchResolver,
        gateway: MockVoiceGateway,
        notifier: Arc<MockNotifier>,
    ) -> PlaybackController {
        PlaybackController::new(Arc::new(resolver), Arc::new(gateway), notifier)
    }

    /// Siembra el estado de la guild con una sesión y una cola dadas.
    async fn seed(
        ctrl: &PlaybackController,
        session: &Arc<MockVoiceSession>,
        tracks: &[Track],
        repeating: bool,
        volume: f32,
    ) {
        let entry = ctrl.store.get(GUILD);
        let mut state = entry.lock().await;
        state.queue.extend(tracks.iter().cloned());
        state.repeating = repeating;
        state.volume = volume;
        let session: Arc<dyn VoiceSession> = session.clone();
        state.session = Some(session);
    }

    async fn snapshot(ctrl: &PlaybackController) -> (Vec<String>, bool, f32, bool) {
        let entry = ctrl.store.get(GUILD);
        let state = entry.lock().await;
        (
            state.queue.iter().map(|t| t.title.clone()).collect(),
            state.repeating,
            state.volume,
            state.session.is_some(),
        )
    }

    #[tokio::test]
    async fn play_with_direct_link_joins_and_streams() {
        let (session, probe) = streaming_session(false, false);
        let (notifier, notices) = recording_notifier();
        // Sin expectativas de búsqueda: el enlace directo no debe tocarla.
        let ctrl = controller(
            MockSearchResolver::new(),
            gateway_returning(session),
            notifier,
        );

        ctrl.play(GUILD, USER, "http://x/video").await.unwrap();

        assert_eq!(*probe.played.lock(), ["http://x/video"]);
        let (queue, _, _, has_session) = snapshot(&ctrl).await;
        assert_eq!(queue, ["http://x/video"]);
        assert!(has_session);
        assert!(notices.lock()[0].contains("Now playing"));
    }

    #[tokio::test]
    async fn play_while_speaking_only_appends() {
        let (session, probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(
            resolver_returning(track("dos")),
            MockVoiceGateway::new(),
            notifier,
        );
        seed(&ctrl, &session, &[track("uno")], false, DEFAULT_VOLUME).await;

        ctrl.play(GUILD, USER, "otra canción").await.unwrap();

        assert!(probe.played.lock().is_empty());
        let (queue, _, _, _) = snapshot(&ctrl).await;
        assert_eq!(queue, ["uno", "dos"]);
        assert_eq!(*notices.lock(), ["dos added to the queue"]);
    }

    #[tokio::test]
    async fn play_without_voice_channel_leaves_no_trace() {
        let mut gateway = MockVoiceGateway::new();
        gateway
            .expect_join()
            .returning(|_, _| Err(PlaybackError::NoVoiceChannel));
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(resolver_returning(track("uno")), gateway, notifier);

        let result = ctrl.play(GUILD, USER, "una canción").await;

        assert_eq!(result, Err(PlaybackError::NoVoiceChannel));
        let (queue, _, _, has_session) = snapshot(&ctrl).await;
        assert!(queue.is_empty());
        assert!(!has_session);
        assert!(notices.lock().is_empty());
    }

    #[tokio::test]
    async fn failed_stream_start_keeps_queue_for_retry() {
        let mut session = MockVoiceSession::new();
        session
            .expect_play()
            .returning(|_, _| Err(PlaybackError::Transport("yt-dlp".into())));
        let disconnects = Arc::new(AtomicUsize::new(0));
        let on_disconnect = disconnects.clone();
        session.expect_disconnect().returning(move || {
            on_disconnect.fetch_add(1, Ordering::SeqCst);
        });
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(
            MockSearchResolver::new(),
            gateway_returning(Arc::new(session)),
            notifier,
        );

        let result = ctrl.play(GUILD, USER, "http://x/video").await;

        assert!(matches!(result, Err(PlaybackError::Transport(_))));
        let (queue, _, _, has_session) = snapshot(&ctrl).await;
        assert_eq!(queue, ["http://x/video"]);
        assert!(!has_session);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_results_aborts_before_any_mutation() {
        let mut resolver = MockSearchResolver::new();
        resolver
            .expect_search()
            .returning(|_| Err(PlaybackError::NoResults));
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(resolver, MockVoiceGateway::new(), notifier);

        let result = ctrl.play(GUILD, USER, "nada").await;

        assert_eq!(result, Err(PlaybackError::NoResults));
        let (queue, _, _, has_session) = snapshot(&ctrl).await;
        assert!(queue.is_empty());
        assert!(!has_session);
        assert!(notices.lock().is_empty());
    }

    #[tokio::test]
    async fn natural_end_advances_to_next_track() {
        let (session, probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(
            &ctrl,
            &session,
            &[track("uno"), track("dos")],
            false,
            DEFAULT_VOLUME,
        )
        .await;

        ctrl.handle_stream_end(GUILD, EndReason::Natural).await;

        let (queue, _, _, has_session) = snapshot(&ctrl).await;
        assert_eq!(queue, ["dos"]);
        assert!(has_session);
        assert_eq!(*probe.played.lock(), ["https://example.com/dos"]);
        assert!(notices.lock()[0].contains("Now playing"));
    }

    #[tokio::test]
    async fn natural_drain_resets_and_disconnects() {
        let (session, probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(&ctrl, &session, &[track("uno")], false, 2.0).await;

        ctrl.handle_stream_end(GUILD, EndReason::Natural).await;

        let (queue, repeating, volume, has_session) = snapshot(&ctrl).await;
        assert!(queue.is_empty());
        assert!(!repeating);
        assert_eq!(volume, DEFAULT_VOLUME);
        assert!(!has_session);
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(*notices.lock(), [messages::QUEUE_COMPLETE]);
    }

    #[tokio::test]
    async fn repeating_replays_head_without_dequeue() {
        let (session, probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(
            &ctrl,
            &session,
            &[track("uno"), track("dos")],
            true,
            DEFAULT_VOLUME,
        )
        .await;

        for _ in 0..3 {
            ctrl.handle_stream_end(GUILD, EndReason::Natural).await;
        }

        let (queue, repeating, _, _) = snapshot(&ctrl).await;
        assert_eq!(queue, ["uno", "dos"]);
        assert!(repeating);
        assert_eq!(probe.played.lock().len(), 3);
        for notice in notices.lock().iter() {
            assert!(notice.contains("Now repeating"));
        }
    }

    #[tokio::test]
    async fn user_end_while_repeating_announces_now_playing() {
        let (session, _probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(&ctrl, &session, &[track("uno")], true, DEFAULT_VOLUME).await;

        ctrl.handle_stream_end(GUILD, EndReason::User).await;

        let (queue, _, _, _) = snapshot(&ctrl).await;
        assert_eq!(queue, ["uno"]);
        assert!(notices.lock()[0].contains("Now playing"));
    }

    #[tokio::test]
    async fn skip_cuts_stream_and_continuation_dequeues_once() {
        let (session, probe) = streaming_session(true, false);
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(
            &ctrl,
            &session,
            &[track("uno"), track("dos")],
            false,
            DEFAULT_VOLUME,
        )
        .await;

        ctrl.skip(GUILD).await.unwrap();
        assert_eq!(probe.stops.load(Ordering::SeqCst), 1);

        // El transporte responde al corte con su único evento terminal.
        ctrl.handle_stream_end(GUILD, EndReason::User).await;

        let (queue, _, _, _) = snapshot(&ctrl).await;
        assert_eq!(queue, ["dos"]);
        assert_eq!(*probe.played.lock(), ["https://example.com/dos"]);
    }

    #[tokio::test]
    async fn skip_with_nothing_queued_is_informational() {
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);

        assert_eq!(ctrl.skip(GUILD).await, Err(PlaybackError::NothingToSkip));
    }

    #[tokio::test]
    async fn stop_clears_queue_and_drain_tears_down() {
        let (session, probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(
            &ctrl,
            &session,
            &[track("uno"), track("dos")],
            false,
            DEFAULT_VOLUME,
        )
        .await;

        ctrl.stop(GUILD).await.unwrap();
        ctrl.handle_stream_end(GUILD, EndReason::User).await;

        let (queue, _, volume, has_session) = snapshot(&ctrl).await;
        assert!(queue.is_empty());
        assert_eq!(volume, DEFAULT_VOLUME);
        assert!(!has_session);
        assert_eq!(probe.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(*notices.lock(), [messages::QUEUE_COMPLETE]);
    }

    #[tokio::test]
    async fn stop_without_session_still_clears_queue() {
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        {
            let entry = ctrl.store.get(GUILD);
            entry.lock().await.queue.push_back(track("uno"));
        }

        assert_eq!(ctrl.stop(GUILD).await, Err(PlaybackError::NotConnected));
        let (queue, _, _, _) = snapshot(&ctrl).await;
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn volume_applies_within_range_and_rejects_outside() {
        let (session, _probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(&ctrl, &session, &[track("uno")], false, DEFAULT_VOLUME).await;

        ctrl.set_volume(GUILD, 150.0).await.unwrap();
        let (_, _, volume, _) = snapshot(&ctrl).await;
        assert_eq!(volume, 1.5);
        assert_eq!(*notices.lock(), ["volume set to 150%"]);

        assert_eq!(
            ctrl.set_volume(GUILD, 401.0).await,
            Err(PlaybackError::InvalidRange)
        );
        let (_, _, volume, _) = snapshot(&ctrl).await;
        assert_eq!(volume, 1.5);
    }

    #[tokio::test]
    async fn volume_requires_an_active_session() {
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);

        assert_eq!(
            ctrl.set_volume(GUILD, 50.0).await,
            Err(PlaybackError::NotConnected)
        );
    }

    #[tokio::test]
    async fn volume_is_reflected_in_the_queue_overview() {
        let (session, _probe) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(&ctrl, &session, &[track("uno")], false, DEFAULT_VOLUME).await;

        ctrl.set_volume(GUILD, 150.0).await.unwrap();
        ctrl.describe_queue(GUILD).await.unwrap();

        let notices = notices.lock();
        assert!(notices.last().unwrap().contains("volume: 150%"));
        assert!(notices.last().unwrap().contains("1. uno"));
    }

    #[tokio::test]
    async fn pause_and_resume_report_their_state() {
        let (paused_session, _) = streaming_session(false, true);
        let (live_session, _) = streaming_session(true, false);
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);

        seed(&ctrl, &live_session, &[track("uno")], false, DEFAULT_VOLUME).await;
        ctrl.pause(GUILD).await.unwrap();
        assert_eq!(ctrl.resume(GUILD).await, Err(PlaybackError::NotPaused));

        seed(
            &ctrl,
            &paused_session,
            &[],
            false,
            DEFAULT_VOLUME,
        )
        .await;
        assert_eq!(ctrl.pause(GUILD).await, Err(PlaybackError::AlreadyPaused));
        ctrl.resume(GUILD).await.unwrap();

        assert_eq!(*notices.lock(), [messages::PAUSED, messages::RESUMED]);
    }

    #[tokio::test]
    async fn repeat_toggle_always_confirms() {
        let (notifier, notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);

        ctrl.toggle_repeat(GUILD).await.unwrap();
        ctrl.toggle_repeat(GUILD).await.unwrap();

        assert_eq!(
            *notices.lock(),
            ["Repeat current audio: `on`", "Repeat current audio: `off`"]
        );
    }

    #[tokio::test]
    async fn describe_queue_is_read_only() {
        let (session, _probe) = streaming_session(true, false);
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);
        seed(
            &ctrl,
            &session,
            &[track("uno"), track("dos")],
            true,
            2.0,
        )
        .await;

        ctrl.describe_queue(GUILD).await.unwrap();

        let (queue, repeating, volume, has_session) = snapshot(&ctrl).await;
        assert_eq!(queue, ["uno", "dos"]);
        assert!(repeating);
        assert_eq!(volume, 2.0);
        assert!(has_session);
    }

    #[tokio::test]
    async fn describe_queue_on_empty_is_informational() {
        let (notifier, _notices) = recording_notifier();
        let ctrl = controller(MockSearchResolver::new(), MockVoiceGateway::new(), notifier);

        assert_eq!(
            ctrl.describe_queue(GUILD).await,
            Err(PlaybackError::EmptyQueue)
        );
    }

    #[tokio::test]
    async fn store_isolates_guilds() {
        let store = GuildStore::new();
        let a = store.get(GuildId::new(1));
        let b = store.get(GuildId::new(2));

        a.lock().await.queue.push_back(track("uno"));

        assert!(b.lock().await.queue.is_empty());
        assert_eq!(store.get(GuildId::new(1)).lock().await.queue.len(), 1);
    }
}
