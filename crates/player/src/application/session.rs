//! Scene session - the top-level owner of every player component
//!
//! Data flows one way: channel → store → mode gate → effects → renderer.
//! Components never call each other; the session routes every event to
//! the owners in that order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;

use pixeltales_domain::SceneSnapshot;

use crate::application::input::InputEvent;
use crate::application::status_presenter::ConnectionStatusPresenter;
use crate::config::PlayerConfig;
use crate::infrastructure::websocket::{ChannelEvent, TransportChannel};
use crate::infrastructure::ConnectionState;
use crate::ports::outbound::{ClockPort, SceneRenderer, StatusIndicator, StatusSink};
use crate::state::{
    EffectController, ListenerError, Mode, ModeController, SnapshotGate, SnapshotStore,
    StaleSnapshotGuard, SubscriptionId,
};

pub struct SceneSession {
    id: Uuid,
    channel: TransportChannel,
    store: SnapshotStore,
    guard: StaleSnapshotGuard,
    effects: EffectController,
    modes: ModeController,
    presenter: ConnectionStatusPresenter,
    renderer: Box<dyn SceneRenderer>,
    clock: Arc<dyn ClockPort>,
    effect_tick: Duration,
    /// A snapshot arrived while History held the live view back
    held_back: bool,
}

impl SceneSession {
    pub fn new(
        config: &PlayerConfig,
        channel: TransportChannel,
        renderer: Box<dyn SceneRenderer>,
        status_sink: Box<dyn StatusSink>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            store: SnapshotStore::new(),
            guard: StaleSnapshotGuard::new(config.discard_stale),
            effects: EffectController::new(config.effect_restart),
            modes: ModeController::new(config.nav_feedback),
            presenter: ConnectionStatusPresenter::new(status_sink),
            renderer,
            clock,
            effect_tick: config.effect_tick,
            held_back: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channel.state()
    }

    pub fn status(&self) -> Option<StatusIndicator> {
        self.presenter.current()
    }

    pub fn current_snapshot(&self) -> Option<&Arc<SceneSnapshot>> {
        self.store.current()
    }

    pub fn effects(&self) -> &EffectController {
        &self.effects
    }

    /// Whether invalid-navigation feedback is showing right now
    pub fn feedback_active(&self) -> bool {
        self.modes.feedback_active(self.clock.now())
    }

    /// Attach an external observer of applied snapshots.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Arc<SceneSnapshot>) -> Result<(), ListenerError> + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::StateChanged(status) => {
                self.presenter.on_status(status);
            }
            ChannelEvent::Connected => {
                // A reconnect may land on a restarted server with fresh versions
                self.guard.reset();
            }
            ChannelEvent::Disconnected { reason } => {
                tracing::debug!(?reason, "Channel disconnected");
            }
            ChannelEvent::ConnectError {
                error,
                attempt,
                max_attempts,
            } => {
                tracing::debug!(%error, attempt, max_attempts, "Channel connect error");
            }
            ChannelEvent::SnapshotPushed(snapshot) => self.on_snapshot(*snapshot),
        }
    }

    fn on_snapshot(&mut self, snapshot: SceneSnapshot) {
        if !self.guard.admit(&snapshot) {
            return;
        }

        let snapshot = self.store.apply(snapshot);
        let now_unix = self.clock.now_unix();
        tracing::debug!(
            conversation_secs = snapshot.conversation_duration(now_unix),
            end_requests = snapshot.end_requests_active(now_unix),
            ended = snapshot.conversation_ended,
            "Scene progress"
        );

        match self.modes.on_snapshot() {
            SnapshotGate::Display => self.render_live(&snapshot),
            SnapshotGate::Suppressed => {
                self.held_back = true;
                tracing::debug!("Snapshot held back while browsing history");
            }
        }
    }

    fn render_live(&mut self, snapshot: &SceneSnapshot) {
        let now = self.clock.now();
        self.effects.on_snapshot(snapshot, now);
        self.renderer.on_snapshot_for_display(snapshot);
        self.renderer.on_effects_for_display(&self.effects.frame(now));
    }

    /// Show the live view again after History.
    ///
    /// Effects are only re-derived when a push was held back; otherwise the
    /// running countdowns are redrawn as they are.
    fn resume_live(&mut self) {
        let held_back = std::mem::take(&mut self.held_back);
        let Some(current) = self.store.current().cloned() else {
            return;
        };
        if held_back {
            self.render_live(&current);
        } else {
            self.renderer.on_snapshot_for_display(&current);
            self.renderer
                .on_effects_for_display(&self.effects.frame(self.clock.now()));
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        let outcome = match event {
            InputEvent::EnterHistory => self
                .modes
                .enter_history(self.store.current().cloned(), self.renderer.as_mut())
                .map(|()| self.held_back = false),
            InputEvent::ExitHistory => self.modes.exit_history().map(|()| self.resume_live()),
            InputEvent::Navigate(direction) => self
                .modes
                .navigate(direction, self.clock.now(), self.renderer.as_mut())
                .map(|_| ()),
            InputEvent::InputDisabled(disabled) => {
                self.modes.set_input_disabled(disabled);
                Ok(())
            }
            InputEvent::Reconnect => {
                tracing::info!("Reconnect requested");
                self.channel.disconnect();
                self.channel.connect();
                Ok(())
            }
        };

        if let Err(rejection) = outcome {
            tracing::debug!(?event, ?rejection, "Input not applied");
        }
    }

    /// Advance effect countdowns. Only Live mode animates.
    pub fn tick(&mut self) {
        if !self.modes.is_live() {
            return;
        }
        if let Some(frame) = self.effects.tick(self.clock.now()) {
            self.renderer.on_effects_for_display(&frame);
        }
    }

    /// Connect and process channel events, input and effect ticks until the
    /// input side closes.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ChannelEvent>,
        mut input: mpsc::Receiver<InputEvent>,
    ) {
        let span = tracing::info_span!("scene_session", session_id = %self.id);
        async move {
            tracing::info!(url = %self.channel.url(), "Scene session starting");
            self.channel.connect();

            let mut ticker = time::interval(self.effect_tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => self.handle_channel_event(event),
                        None => break,
                    },
                    event = input.recv() => match event {
                        Some(event) => self.handle_input(event),
                        None => break,
                    },
                    _ = ticker.tick() => self.tick(),
                }
            }

            self.channel.disconnect();
            tracing::info!("Scene session ended");
        }
        .instrument(span)
        .await
    }
}
