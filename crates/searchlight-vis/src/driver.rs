//! Per-card playback drivers with cancellable auto-play.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use searchlight_steps::{AlgorithmId, Step};

use crate::error::Result;
use crate::playback::{Advance, Playback, PlaybackConfig, PlaybackStatus};
use crate::render::{Presenter, Renderer, StatusLine};
use crate::simulation::{Outcome, Params, Run, Selection};

/// Owned result of one advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tick {
    Step { step: Step },
    Finished { outcome: Outcome },
}

/// Everything the frontend needs to paint a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSnapshot {
    pub id: AlgorithmId,
    pub status: StatusLine,
    /// `None` until the card has been prepared
    pub playback: Option<PlaybackStatus>,
    pub playing: bool,
    pub presenter: Presenter,
    /// Most recently applied step
    pub step: Option<Step>,
    /// Raw target text, for sequence cards
    pub target: Option<String>,
}

struct CardState {
    selection: Selection,
    playback: Option<Playback>,
    presenter: Presenter,
    status: StatusLine,
    timer: Option<JoinHandle<()>>,
}

impl CardState {
    fn new(selection: Selection) -> Self {
        Self {
            presenter: Presenter::for_params(&selection.params),
            selection,
            playback: None,
            status: StatusLine::ready(),
            timer: None,
        }
    }

    fn cancel_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }

    fn snapshot(&self, id: AlgorithmId) -> CardSnapshot {
        let target = match &self.selection.params {
            Params::Sequence { target, .. } => target.clone(),
            Params::Graph(_) => None,
        };
        CardSnapshot {
            id,
            status: self.status.clone(),
            playback: self.playback.as_ref().map(PlaybackStatus::from),
            playing: self.timer.is_some(),
            presenter: self.presenter.clone(),
            step: self.playback.as_ref().and_then(Playback::current).cloned(),
            target,
        }
    }
}

/// Playback driver for one card.
///
/// Cloning yields another handle to the same card. At most one auto-play
/// task is live per card; starting one cancels any previous task first.
#[derive(Clone)]
pub struct Driver {
    id: AlgorithmId,
    config: PlaybackConfig,
    state: Arc<Mutex<CardState>>,
    updates: broadcast::Sender<CardSnapshot>,
}

impl Driver {
    pub fn new(
        selection: Selection,
        config: PlaybackConfig,
        updates: broadcast::Sender<CardSnapshot>,
    ) -> Self {
        Self {
            id: selection.algorithm,
            config,
            state: Arc::new(Mutex::new(CardState::new(selection))),
            updates,
        }
    }

    /// A driver whose updates go nowhere until someone subscribes.
    pub fn standalone(selection: Selection, config: PlaybackConfig) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self::new(selection, config, updates)
    }

    /// Get the algorithm this card shows.
    pub fn id(&self) -> AlgorithmId {
        self.id
    }

    /// Get the auto-play configuration.
    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    /// Receive a snapshot after every change to this card.
    pub fn subscribe(&self) -> broadcast::Receiver<CardSnapshot> {
        self.updates.subscribe()
    }

    /// Replace the card's input. Drops any prepared run.
    pub async fn select(&self, selection: Selection) -> CardSnapshot {
        let mut state = self.state.lock().await;
        state.cancel_timer();
        state.presenter = Presenter::for_params(&selection.params);
        state.selection = selection;
        state.playback = None;
        state.status = StatusLine::ready();
        debug!(algorithm = %self.id, "input selected");
        self.publish(&state)
    }

    /// Get the current input.
    pub async fn selection(&self) -> Selection {
        self.state.lock().await.selection.clone()
    }

    /// Run the generator once and rewind to idle.
    pub async fn prepare(&self) -> Result<CardSnapshot> {
        let mut state = self.state.lock().await;
        state.cancel_timer();
        state.playback = None;
        match self.load(&mut state) {
            Ok(playback) => {
                state.playback = Some(playback);
                Ok(self.publish(&state))
            }
            Err(err) => {
                self.publish(&state);
                Err(err)
            }
        }
    }

    /// Edit the card's parameters and prepare the result, all under one lock.
    ///
    /// When `update` fails the card is left untouched.
    pub async fn update_selection<F>(&self, update: F) -> Result<CardSnapshot>
    where
        F: FnOnce(&mut Params) -> Result<()>,
    {
        let mut state = self.state.lock().await;
        let mut params = state.selection.params.clone();
        update(&mut params)?;

        state.cancel_timer();
        state.presenter = Presenter::for_params(&params);
        state.selection.params = params;
        state.playback = None;
        debug!(algorithm = %self.id, "input updated");
        match self.load(&mut state) {
            Ok(playback) => {
                state.playback = Some(playback);
                Ok(self.publish(&state))
            }
            Err(err) => {
                self.publish(&state);
                Err(err)
            }
        }
    }

    /// Apply the next step, preparing first if needed.
    pub async fn advance(&self) -> Result<Tick> {
        let mut state = self.state.lock().await;
        let tick = self.advance_locked(&mut state);
        self.publish(&state);
        tick
    }

    /// Stop auto-play, rewind to idle and clear highlighting.
    pub async fn reset(&self) -> CardSnapshot {
        let mut state = self.state.lock().await;
        state.cancel_timer();
        if let Some(playback) = state.playback.as_mut() {
            playback.rewind();
        }
        state.presenter.reset();
        state.status = StatusLine::new("Reset", "Back at the start.");
        debug!(algorithm = %self.id, "reset");
        self.publish(&state)
    }

    /// Pause a running card, or start auto-play on a stopped one.
    ///
    /// Returns whether the card is playing afterwards. Starting an exhausted
    /// run replays it from the beginning.
    pub async fn toggle_play(&self) -> Result<bool> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if state.cancel_timer() {
            state.status = StatusLine::new("Paused", "Playback paused.");
            info!(algorithm = %self.id, "paused");
            self.publish(state);
            return Ok(false);
        }

        let mut playback = match state.playback.take() {
            Some(playback) => playback,
            None => match self.load(state) {
                Ok(playback) => playback,
                Err(err) => {
                    self.publish(state);
                    return Err(err);
                }
            },
        };
        if playback.is_exhausted() {
            playback.rewind();
            state.presenter.reset();
        }
        state.playback = Some(playback);

        state.timer = Some(self.spawn_autoplay());
        state.status = StatusLine::new("Running", "Simulation running …");
        info!(algorithm = %self.id, interval = ?self.config.interval, "playing");
        self.publish(state);
        Ok(true)
    }

    /// Check if auto-play is running.
    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.timer.is_some()
    }

    /// Get the current card state.
    pub async fn snapshot(&self) -> CardSnapshot {
        self.state.lock().await.snapshot(self.id)
    }

    fn load(&self, state: &mut CardState) -> Result<Playback> {
        match Run::prepare(&state.selection) {
            Ok(run) => {
                debug!(algorithm = %self.id, steps = run.len(), "prepared");
                state.presenter.reset();
                state.status = StatusLine::ready();
                Ok(Playback::new(run))
            }
            Err(err) => {
                warn!(algorithm = %self.id, error = %err, "rejected input");
                state.status = StatusLine::warning("Hint", err.to_string());
                Err(err)
            }
        }
    }

    fn advance_locked(&self, state: &mut CardState) -> Result<Tick> {
        let playback = match state.playback.take() {
            Some(playback) => playback,
            None => self.load(state)?,
        };
        let playback = state.playback.insert(playback);

        let tick = match playback.advance() {
            Advance::Step(step) => {
                state.presenter.apply(step);
                state.status = StatusLine::for_step(step);
                Tick::Step { step: step.clone() }
            }
            Advance::Finished(outcome) => {
                let outcome = outcome.clone();
                state.status = playback.run().summary();
                Tick::Finished { outcome }
            }
        };
        debug!(algorithm = %self.id, position = playback.position(), "advanced");
        Ok(tick)
    }

    fn spawn_autoplay(&self) -> JoinHandle<()> {
        let driver = self.clone();
        let period = self.config.interval;
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let mut state = driver.state.lock().await;
                let done = match driver.advance_locked(&mut state) {
                    Ok(_) => state.playback.as_ref().map_or(true, Playback::is_exhausted),
                    Err(_) => true,
                };
                if done {
                    state.timer = None;
                    info!(algorithm = %driver.id, "playback finished");
                }
                driver.publish(&state);
                if done {
                    break;
                }
            }
        })
    }

    fn publish(&self, state: &CardState) -> CardSnapshot {
        let snapshot = state.snapshot(self.id);
        // No subscribers is fine
        let _ = self.updates.send(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::playback::PlaybackState;
    use searchlight_steps::{Catalog, StepKind};
    use std::time::Duration;

    fn selection(algorithm: AlgorithmId, data: &[i64], target: Option<&str>) -> Selection {
        Selection::new(
            algorithm,
            Params::Sequence {
                data: data.to_vec(),
                target: target.map(str::to_owned),
            },
        )
    }

    fn binary(target: Option<&str>) -> Driver {
        Driver::standalone(
            selection(AlgorithmId::Binary, &[3, 9, 12, 17, 23, 31, 44, 52, 67, 88], target),
            PlaybackConfig::default(),
        )
    }

    fn state_of(snapshot: &CardSnapshot) -> PlaybackState {
        snapshot.playback.as_ref().unwrap().state
    }

    #[tokio::test]
    async fn prepare_starts_idle() {
        let driver = binary(Some("44"));
        let snapshot = tokio_test::assert_ok!(driver.prepare().await);
        assert_eq!(state_of(&snapshot), PlaybackState::Idle);
        assert_eq!(snapshot.status, StatusLine::ready());
        assert!(!snapshot.playing);
    }

    #[tokio::test]
    async fn prepare_reports_hint_for_bad_target() {
        let driver = binary(Some("abc"));
        let err = tokio_test::assert_err!(driver.prepare().await);
        assert!(matches!(err, Error::InvalidTarget(_)));

        let snapshot = driver.snapshot().await;
        assert!(snapshot.playback.is_none());
        assert_eq!(snapshot.status.label, "Hint");
        assert_eq!(snapshot.status.message, err.to_string());
    }

    #[tokio::test]
    async fn advance_prepares_on_demand() {
        let driver = binary(Some("44"));
        let tick = driver.advance().await.unwrap();
        assert!(matches!(
            tick,
            Tick::Step { step } if step.kind == StepKind::Window { low: 0, high: 9, mid: Some(4) }
        ));
    }

    #[tokio::test]
    async fn advancing_length_times_exhausts() {
        let driver = binary(Some("44"));
        let total = driver.prepare().await.unwrap().playback.unwrap().total;

        for _ in 0..total {
            assert!(matches!(driver.advance().await.unwrap(), Tick::Step { .. }));
        }
        let snapshot = driver.snapshot().await;
        assert_eq!(state_of(&snapshot), PlaybackState::Exhausted);
        assert_eq!(snapshot.status.label, "Found");

        let again = driver.advance().await.unwrap();
        assert_eq!(again, Tick::Finished { outcome: Outcome::Found { index: 6 } });
        assert_eq!(driver.advance().await.unwrap(), again);
        assert_eq!(
            driver.snapshot().await.status.message,
            "The value 44 was found at index 6."
        );
    }

    #[tokio::test]
    async fn reset_rewinds_and_clears_highlighting() {
        let driver = binary(Some("44"));
        let pristine = driver.snapshot().await.presenter;
        driver.advance().await.unwrap();
        driver.advance().await.unwrap();

        let snapshot = driver.reset().await;
        assert_eq!(state_of(&snapshot), PlaybackState::Idle);
        assert_eq!(snapshot.presenter, pristine);
        assert_eq!(snapshot.status.label, "Reset");
        assert!(snapshot.step.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn autoplay_advances_on_interval() {
        let driver = binary(Some("44"));
        assert!(driver.toggle_play().await.unwrap());
        assert!(driver.is_playing().await);

        time::sleep(Duration::from_millis(900 * 2 + 450)).await;
        let snapshot = driver.snapshot().await;
        assert_eq!(snapshot.playback.unwrap().position, 2);
        assert!(snapshot.playing);
    }

    #[tokio::test(start_paused = true)]
    async fn autoplay_stops_when_exhausted() {
        let driver = binary(Some("44"));
        let mut updates = driver.subscribe();
        driver.toggle_play().await.unwrap();

        time::sleep(Duration::from_secs(30)).await;
        let snapshot = driver.snapshot().await;
        assert!(!snapshot.playing);
        assert_eq!(state_of(&snapshot), PlaybackState::Exhausted);
        assert_eq!(snapshot.step.unwrap().kind, StepKind::Found { index: 6 });

        let mut last = None;
        while let Ok(update) = updates.try_recv() {
            last = Some(update);
        }
        assert!(!last.unwrap().playing);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_pauses_without_resetting() {
        let driver = binary(Some("44"));
        driver.toggle_play().await.unwrap();
        time::sleep(Duration::from_millis(900 + 450)).await;

        assert!(!driver.toggle_play().await.unwrap());
        time::sleep(Duration::from_secs(10)).await;

        let snapshot = driver.snapshot().await;
        assert!(!snapshot.playing);
        assert_eq!(snapshot.playback.unwrap().position, 1);
        assert_eq!(snapshot.status.label, "Paused");
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_autoplay() {
        let driver = binary(Some("44"));
        driver.toggle_play().await.unwrap();
        driver.reset().await;
        assert!(!driver.is_playing().await);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.snapshot().await.playback.unwrap().position, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replay_after_exhaustion_starts_over() {
        let driver = binary(Some("3"));
        driver.toggle_play().await.unwrap();
        time::sleep(Duration::from_secs(30)).await;
        assert!(!driver.is_playing().await);

        assert!(driver.toggle_play().await.unwrap());
        assert_eq!(driver.snapshot().await.playback.unwrap().position, 0);
    }

    #[tokio::test]
    async fn toggle_play_rejects_missing_target() {
        let driver = binary(None);
        assert!(matches!(driver.toggle_play().await, Err(Error::MissingTarget)));
        assert!(!driver.is_playing().await);
    }

    #[tokio::test]
    async fn select_drops_prepared_run() {
        let driver = binary(Some("44"));
        driver.advance().await.unwrap();

        let snapshot = driver
            .select(selection(AlgorithmId::Binary, &[1, 2, 3], Some("2")))
            .await;
        assert!(snapshot.playback.is_none());
        assert_eq!(snapshot.target.as_deref(), Some("2"));
        assert!(matches!(&snapshot.presenter, Presenter::Array(a) if a.cells().len() == 3));
    }

    #[tokio::test(start_paused = true)]
    async fn update_selection_restarts_running_card() {
        let driver = binary(Some("44"));
        driver.toggle_play().await.unwrap();
        time::sleep(Duration::from_millis(900 + 450)).await;

        let mut updates = driver.subscribe();
        let snapshot = tokio_test::assert_ok!(
            driver
                .update_selection(|params| {
                    if let Params::Sequence { target, .. } = params {
                        *target = Some("3".into());
                    }
                    Ok(())
                })
                .await
        );
        assert_eq!(state_of(&snapshot), PlaybackState::Idle);
        assert_eq!(snapshot.target.as_deref(), Some("3"));
        assert!(!snapshot.playing);

        // One update for the whole edit
        assert_eq!(updates.try_recv().unwrap(), snapshot);
        assert!(updates.try_recv().is_err());

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(driver.snapshot().await.playback.unwrap().position, 0);
    }

    #[tokio::test]
    async fn update_selection_keeps_card_when_edit_fails() {
        let driver = binary(Some("44"));
        driver.advance().await.unwrap();

        let err = tokio_test::assert_err!(
            driver
                .update_selection(|_| Err(Error::MissingTarget))
                .await
        );
        assert!(matches!(err, Error::MissingTarget));

        let snapshot = driver.snapshot().await;
        assert_eq!(snapshot.playback.unwrap().position, 1);
        assert_eq!(snapshot.target.as_deref(), Some("44"));
    }

    #[tokio::test]
    async fn dijkstra_card_plays_to_route() {
        let catalog = Catalog::builtin();
        let info = catalog.get(AlgorithmId::Dijkstra).unwrap();
        let driver = Driver::standalone(Selection::from_fixture(info), PlaybackConfig::default());

        let mut tick = driver.advance().await.unwrap();
        while let Tick::Step { .. } = tick {
            tick = driver.advance().await.unwrap();
        }
        assert!(matches!(tick, Tick::Finished { outcome: Outcome::Routed { route } } if route.cost == 11));

        let snapshot = driver.snapshot().await;
        let Presenter::Graph(graph) = &snapshot.presenter else {
            panic!("expected a graph presenter");
        };
        assert!(graph.node("C").unwrap().active);
        assert!(graph.edges().iter().filter(|e| e.active).count() >= 3);
    }

    #[test]
    fn tick_serializes_with_type() {
        let tick = Tick::Finished { outcome: Outcome::NotFound };
        let json = serde_json::to_value(&tick).unwrap();
        assert_eq!(json["type"], "finished");
        assert_eq!(json["outcome"]["type"], "not_found");
    }
}
