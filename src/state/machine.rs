//! Core state machine implementation
//!
//! Handles transitions between Idle, Connecting, Ivr, Playing and Result.
//! Each state that waits on a timer owns exactly one [`StateTimer`], which
//! is cancelled before the machine leaves the state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Timing;
use crate::draw::{Outcome, OutcomeGenerator};
use crate::events::{GameEvent, IdleReason};
use crate::sound::{Cue, CueHandle, SoundCues};
use crate::timer::{StateTimer, TimerFired, TimerKind, TimerScheduler};

/// Upper bound of the draw progress bar
pub const PROGRESS_MAX: u8 = 100;

/// The five screens of a simulated call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Waiting for the player to start a call
    #[default]
    Idle,
    /// Call placed, phone ringing
    Connecting,
    /// IVR announcement playing
    Ivr,
    /// Draw in progress
    Playing,
    /// Outcome on screen
    Result,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::Idle => write!(f, "Idle"),
            GameState::Connecting => write!(f, "Connecting"),
            GameState::Ivr => write!(f, "Ivr"),
            GameState::Playing => write!(f, "Playing"),
            GameState::Result => write!(f, "Result"),
        }
    }
}

/// Rejected player actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("cannot {action} while in {state}")]
    InvalidTransition {
        action: &'static str,
        state: GameState,
    },
}

/// The state machine behind the game screen
pub struct GameMachine {
    /// Current state
    state: GameState,
    /// Draw progress, meaningful while Playing
    progress: u8,
    /// Present only in Result
    outcome: Option<Outcome>,
    /// Bumped on every transition; stamps the timers of the current state
    epoch: u64,
    /// Pending timer of the current state
    timer: Option<StateTimer>,
    /// Ringing phone while Connecting
    ring: Option<CueHandle>,
    /// Time when current non-Idle state was entered
    state_entered_at: Option<Instant>,
    timing: Timing,
    generator: OutcomeGenerator,
    timers: TimerScheduler,
    sounds: Arc<dyn SoundCues>,
    event_tx: broadcast::Sender<GameEvent>,
}

impl GameMachine {
    pub fn new(
        timing: Timing,
        generator: OutcomeGenerator,
        timers: TimerScheduler,
        sounds: Arc<dyn SoundCues>,
        event_tx: broadcast::Sender<GameEvent>,
    ) -> Self {
        Self {
            state: GameState::Idle,
            progress: 0,
            outcome: None,
            epoch: 0,
            timer: None,
            ring: None,
            state_entered_at: None,
            timing,
            generator,
            timers,
            sounds,
            event_tx,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Place the call: Idle -> Connecting
    pub fn start(&mut self) -> Result<(), GameError> {
        self.require(GameState::Idle, "start")?;
        self.sounds.play(Cue::ButtonClick);
        self.transition_to(GameState::Connecting);
        Ok(())
    }

    /// Play again: Result -> Idle
    pub fn replay(&mut self) -> Result<(), GameError> {
        self.require(GameState::Result, "replay")?;
        self.sounds.play(Cue::ButtonClick);
        self.transition_to(GameState::Idle);
        self.emit(GameEvent::ReturnedToIdle {
            reason: IdleReason::Replay,
        });
        Ok(())
    }

    /// Hang up from any state
    pub fn exit(&mut self) {
        self.sounds.play(Cue::ButtonClick);
        if self.state == GameState::Idle {
            return;
        }

        self.transition_to(GameState::Idle);
        self.emit(GameEvent::ReturnedToIdle {
            reason: IdleReason::Exit,
        });
    }

    /// Handle a timer firing; firings from a state already left are dropped
    pub fn on_timer(&mut self, fired: TimerFired) {
        let current = self.timer.as_ref().is_some_and(|t| t.matches(&fired));
        if !current {
            debug!(
                kind = ?fired.kind,
                epoch = fired.epoch,
                current_epoch = self.epoch,
                "dropping stale timer"
            );
            return;
        }

        match (self.state, fired.kind) {
            (GameState::Connecting, TimerKind::Connect) => self.transition_to(GameState::Ivr),
            (GameState::Ivr, TimerKind::Ivr) => self.transition_to(GameState::Playing),
            (GameState::Playing, TimerKind::ProgressTick) => self.advance_progress(),
            (state, kind) => warn!(%state, ?kind, "timer does not apply to state"),
        }
    }

    fn require(&self, expected: GameState, action: &'static str) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn advance_progress(&mut self) {
        self.progress = self
            .progress
            .saturating_add(self.timing.progress_step)
            .min(PROGRESS_MAX);

        debug!(progress = self.progress, "draw progress");
        self.sounds.play(Cue::Progress);
        self.emit(GameEvent::ProgressAdvanced {
            progress: self.progress,
        });

        if self.progress >= PROGRESS_MAX {
            self.transition_to(GameState::Result);
        }
    }

    /// Perform a state transition
    fn transition_to(&mut self, new_state: GameState) {
        let old_state = self.state;
        let duration_ms = self
            .state_entered_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(
            from = %old_state,
            to = %new_state,
            duration_ms = duration_ms,
            "state transition"
        );

        self.leave();

        self.epoch += 1;
        self.state = new_state;
        self.state_entered_at = if new_state != GameState::Idle {
            Some(Instant::now())
        } else {
            None
        };

        self.enter(new_state);
    }

    /// Release everything owned by the state being left
    fn leave(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        if let Some(ring) = self.ring.take() {
            self.sounds.stop(ring);
        }
        self.outcome = None;
    }

    /// Set up the state just entered
    fn enter(&mut self, state: GameState) {
        match state {
            GameState::Idle => {
                self.progress = 0;
            }
            GameState::Connecting => {
                self.progress = 0;
                self.ring = self.sounds.play_looped(Cue::PhoneRing);
                self.timer = Some(self.timers.after(
                    TimerKind::Connect,
                    self.epoch,
                    self.timing.connect,
                ));
                self.emit(GameEvent::CallStarted);
            }
            GameState::Ivr => {
                self.sounds.play(Cue::Ivr);
                self.timer = Some(self.timers.after(TimerKind::Ivr, self.epoch, self.timing.ivr));
                self.emit(GameEvent::Connected);
                self.emit(GameEvent::IvrStarted);
            }
            GameState::Playing => {
                self.progress = 0;
                self.timer = Some(self.timers.every(
                    TimerKind::ProgressTick,
                    self.epoch,
                    self.timing.tick,
                ));
                self.emit(GameEvent::DrawStarted);
            }
            GameState::Result => {
                let outcome = self.generator.draw();
                info!(winner = outcome.is_winner, amount = outcome.amount, "draw complete");

                self.outcome = Some(outcome);
                self.sounds.play(if outcome.is_winner { Cue::Win } else { Cue::Lose });
                self.emit(GameEvent::ResultAnnounced { outcome });
            }
        }
    }

    fn emit(&self, event: GameEvent) {
        debug!(%event, "emitting event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::draw::{
        Odds, PrizeTable, JACKPOT_AMOUNT, STANDARD_PRIZE_MAX, STANDARD_PRIZE_MIN,
    };
    use crate::sound::RecordingCues;

    struct Harness {
        machine: GameMachine,
        timer_rx: mpsc::UnboundedReceiver<TimerFired>,
        event_rx: broadcast::Receiver<GameEvent>,
        sounds: Arc<RecordingCues>,
    }

    impl Harness {
        fn new(odds: Odds, seed: u64) -> Self {
            let (timers, timer_rx) = TimerScheduler::channel();
            let (event_tx, event_rx) = broadcast::channel(64);
            let sounds = Arc::new(RecordingCues::default());
            let generator = OutcomeGenerator::seeded(odds, PrizeTable::default(), seed);
            let machine = GameMachine::new(
                Timing::default(),
                generator,
                timers,
                sounds.clone(),
                event_tx,
            );

            Self {
                machine,
                timer_rx,
                event_rx,
                sounds,
            }
        }

        /// Wait for the next timer and feed it to the machine
        async fn pump(&mut self) -> TimerFired {
            let fired = self.timer_rx.recv().await.unwrap();
            self.machine.on_timer(fired);
            self.assert_outcome_invariant();
            fired
        }

        /// Drive a fresh session all the way to Result
        async fn play_to_result(&mut self) {
            self.machine.start().unwrap();
            while self.machine.state() != GameState::Result {
                self.pump().await;
            }
        }

        fn assert_outcome_invariant(&self) {
            assert_eq!(
                self.machine.outcome().is_some(),
                self.machine.state() == GameState::Result
            );
        }

        fn events(&mut self) -> Vec<GameEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.event_rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    #[test]
    fn test_initial_state() {
        let (timers, _rx) = TimerScheduler::channel();
        let (tx, _) = broadcast::channel(4);
        let machine = GameMachine::new(
            Timing::default(),
            OutcomeGenerator::seeded(Odds::standard(), PrizeTable::default(), 0),
            timers,
            Arc::new(RecordingCues::default()),
            tx,
        );

        assert_eq!(machine.state(), GameState::Idle);
        assert_eq!(machine.progress(), 0);
        assert!(machine.outcome().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_session() {
        let mut h = Harness::new(Odds::standard(), 1);
        let started = Instant::now();

        assert_ok!(h.machine.start());
        assert_eq!(h.machine.state(), GameState::Connecting);

        h.pump().await;
        assert_eq!(h.machine.state(), GameState::Ivr);
        assert!(started.elapsed() >= Duration::from_millis(2000));

        h.pump().await;
        assert_eq!(h.machine.state(), GameState::Playing);
        assert_eq!(h.machine.progress(), 0);
        assert!(started.elapsed() >= Duration::from_millis(5000));

        for tick in 1..=10u8 {
            let before = h.machine.progress();
            h.pump().await;
            assert_eq!(h.machine.progress(), tick * 10);
            assert!(h.machine.progress() > before);
            if tick < 10 {
                assert_eq!(h.machine.state(), GameState::Playing);
            }
        }

        assert_eq!(h.machine.state(), GameState::Result);
        assert_eq!(h.machine.progress(), 100);
        let outcome = h.machine.outcome().unwrap();
        if outcome.is_winner {
            assert!(
                outcome.amount == JACKPOT_AMOUNT
                    || (STANDARD_PRIZE_MIN..=STANDARD_PRIZE_MAX).contains(&outcome.amount)
            );
        } else {
            assert_eq!(outcome.amount, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_result() {
        let mut h = Harness::new(Odds::standard(), 2);
        h.play_to_result().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(h.timer_rx.try_recv().is_err());
        assert_eq!(h.machine.progress(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_resets() {
        let mut h = Harness::new(Odds::standard(), 3);
        h.play_to_result().await;

        assert_ok!(h.machine.replay());
        assert_eq!(h.machine.state(), GameState::Idle);
        assert_eq!(h.machine.progress(), 0);
        assert!(h.machine.outcome().is_none());

        // A second session works from the reset state
        h.play_to_result().await;
        assert!(h.machine.outcome().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_during_connecting_cancels_timer() {
        let mut h = Harness::new(Odds::standard(), 4);
        h.machine.start().unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        h.machine.exit();
        assert_eq!(h.machine.state(), GameState::Idle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(h.timer_rx.try_recv().is_err());
        assert_eq!(h.machine.state(), GameState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_firing_after_exit_is_dropped() {
        let mut h = Harness::new(Odds::standard(), 5);
        h.machine.start().unwrap();

        // The connect timer has fired but its message is not handled yet
        let fired = h.timer_rx.recv().await.unwrap();
        h.machine.exit();
        h.machine.on_timer(fired);

        assert_eq!(h.machine.state(), GameState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_firing_does_not_leak_into_new_session() {
        let mut h = Harness::new(Odds::standard(), 6);
        h.machine.start().unwrap();
        let stale = h.timer_rx.recv().await.unwrap();

        h.machine.exit();
        h.machine.start().unwrap();
        h.machine.on_timer(stale);

        assert_eq!(h.machine.state(), GameState::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_while_playing() {
        let mut h = Harness::new(Odds::standard(), 7);
        h.machine.start().unwrap();
        h.pump().await;
        h.pump().await;
        h.pump().await;
        assert_eq!(h.machine.state(), GameState::Playing);
        assert_eq!(h.machine.progress(), 10);

        h.machine.exit();
        assert_eq!(h.machine.progress(), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(h.timer_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_from_result_clears_outcome() {
        let mut h = Harness::new(Odds::standard(), 8);
        h.play_to_result().await;

        h.machine.exit();
        assert_eq!(h.machine.state(), GameState::Idle);
        assert!(h.machine.outcome().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_actions() {
        let mut h = Harness::new(Odds::standard(), 9);

        assert_err!(h.machine.replay());
        h.machine.start().unwrap();
        assert_eq!(
            h.machine.start(),
            Err(GameError::InvalidTransition {
                action: "start",
                state: GameState::Connecting,
            })
        );
        assert_eq!(h.machine.state(), GameState::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_win_configuration() {
        let mut h = Harness::new(Odds::new(0.0, 1.0).unwrap(), 10);

        for _ in 0..5 {
            h.play_to_result().await;
            assert_eq!(h.machine.outcome(), Some(Outcome::loss()));
            h.machine.replay().unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_jackpot_configuration() {
        let mut h = Harness::new(Odds::new(1.0, 1.0).unwrap(), 11);

        for _ in 0..5 {
            h.play_to_result().await;
            assert_eq!(h.machine.outcome(), Some(Outcome::win(JACKPOT_AMOUNT)));
            h.machine.replay().unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_sequence() {
        let mut h = Harness::new(Odds::new(0.0, 0.0).unwrap(), 12);
        h.play_to_result().await;
        h.machine.replay().unwrap();

        let events = h.events();
        assert_eq!(events[0], GameEvent::CallStarted);
        assert_eq!(events[1], GameEvent::Connected);
        assert_eq!(events[2], GameEvent::IvrStarted);
        assert_eq!(events[3], GameEvent::DrawStarted);
        assert_eq!(events[4], GameEvent::ProgressAdvanced { progress: 10 });
        assert_eq!(events[13], GameEvent::ProgressAdvanced { progress: 100 });
        assert_eq!(
            events[14],
            GameEvent::ResultAnnounced {
                outcome: Outcome::loss()
            }
        );
        assert_eq!(
            events[15],
            GameEvent::ReturnedToIdle {
                reason: IdleReason::Replay
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sound_cues() {
        let mut h = Harness::new(Odds::new(1.0, 1.0).unwrap(), 13);
        h.play_to_result().await;

        let calls = h.sounds.calls();
        assert_eq!(calls[0], "play button_click");
        assert_eq!(calls[1], "loop phone_ring");
        assert_eq!(calls[2], "stop 0");
        assert_eq!(calls[3], "play ivr");
        assert_eq!(calls.iter().filter(|c| *c == "play progress").count(), 10);
        assert_eq!(calls.last().map(String::as_str), Some("play win"));
    }
}
