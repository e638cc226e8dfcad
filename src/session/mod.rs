//! Session loop owning the router and the game machine
//!
//! All player actions and timer firings are funneled into one task, so the
//! controller state is only ever touched from a single place.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{info, warn};

use crate::config::Config;
use crate::draw::{Outcome, OutcomeGenerator};
use crate::events::GameEvent;
use crate::navigation::{NavigationError, Route, Router};
use crate::sound::SoundCues;
use crate::state::{GameError, GameMachine, GameState};
use crate::timer::{TimerFired, TimerKind, TimerScheduler};

/// Player actions, from the console or a socket client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SubmitPhone { number: String },
    AcceptRules,
    DeclineRules,
    Start,
    Replay,
    Exit,
}

/// Input to the session loop
#[derive(Debug)]
pub struct Command {
    pub action: Action,
    /// Receives the result once the action has been applied
    pub reply: Option<oneshot::Sender<Result<SessionStatus, SessionError>>>,
}

impl Command {
    pub fn new(action: Action) -> (Self, oneshot::Receiver<Result<SessionStatus, SessionError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                action,
                reply: Some(tx),
            },
            rx,
        )
    }
}

/// Rejected actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("{action} is only available in the game view (current view: {route})")]
    NotInGame { action: &'static str, route: Route },
}

impl SessionError {
    /// Stable code for socket clients
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Navigation(NavigationError::PhoneRequired) => "phone_required",
            SessionError::Navigation(NavigationError::WrongRoute { .. }) => "wrong_route",
            SessionError::Game(GameError::InvalidTransition { .. }) => "invalid_transition",
            SessionError::NotInGame { .. } => "not_in_game",
        }
    }
}

/// Snapshot published after every change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub version: String,
    pub route: Route,
    /// A dial from the landing view is pending
    pub dialing: bool,
    pub phone: Option<String>,
    pub state: GameState,
    pub progress: u8,
    pub outcome: Option<Outcome>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            route: Route::default(),
            dialing: false,
            phone: None,
            state: GameState::default(),
            progress: 0,
            outcome: None,
        }
    }
}

/// Owns the router and the game machine
pub struct Session {
    router: Router,
    game: GameMachine,
    status_tx: watch::Sender<SessionStatus>,
}

impl Session {
    pub fn new(
        config: &Config,
        sounds: Arc<dyn SoundCues>,
        timers: TimerScheduler,
        event_tx: broadcast::Sender<GameEvent>,
    ) -> Self {
        let router = Router::new(
            config.timing.dial,
            timers.clone(),
            Arc::clone(&sounds),
            event_tx.clone(),
        );
        let game = GameMachine::new(
            config.timing,
            OutcomeGenerator::new(config.odds, config.prizes),
            timers,
            sounds,
            event_tx,
        );

        Self::from_parts(router, game)
    }

    fn from_parts(router: Router, game: GameMachine) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::default());
        Self {
            router,
            game,
            status_tx,
        }
    }

    /// Receiver for status snapshots
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            route: self.router.route(),
            dialing: self.router.is_dialing(),
            phone: self.router.phone().map(|p| p.as_str().to_string()),
            state: self.game.state(),
            progress: self.game.progress(),
            outcome: self.game.outcome(),
            ..SessionStatus::default()
        }
    }

    /// Run until the command channel closes
    pub async fn run(
        &mut self,
        mut command_rx: mpsc::Receiver<Command>,
        mut timer_rx: mpsc::UnboundedReceiver<TimerFired>,
    ) {
        info!("session started on the landing view");

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else { break };
                    let result = self.handle(command.action);
                    if let Some(reply) = command.reply {
                        let _ = reply.send(result);
                    }
                }
                Some(fired) = timer_rx.recv() => {
                    self.on_timer(fired);
                }
            }
        }

        info!("session stopped");
    }

    /// Apply one player action
    pub fn handle(&mut self, action: Action) -> Result<SessionStatus, SessionError> {
        let result = self.apply(&action);
        if let Err(e) = &result {
            warn!(?action, error = %e, "action rejected");
        }
        self.publish();
        result.map(|_| self.status())
    }

    fn apply(&mut self, action: &Action) -> Result<(), SessionError> {
        match action {
            Action::SubmitPhone { number } => self.router.submit_phone(number)?,
            Action::AcceptRules => self.router.accept_rules()?,
            Action::DeclineRules => self.router.decline_rules()?,
            Action::Start => {
                self.require_game("start")?;
                self.game.start()?;
            }
            Action::Replay => {
                self.require_game("replay")?;
                self.game.replay()?;
            }
            Action::Exit => {
                if self.router.route() == Route::Game {
                    self.game.exit();
                }
                self.router.go_home();
            }
        }
        Ok(())
    }

    fn on_timer(&mut self, fired: TimerFired) {
        match fired.kind {
            TimerKind::Dial => self.router.on_timer(fired),
            TimerKind::Connect | TimerKind::Ivr | TimerKind::ProgressTick => {
                self.game.on_timer(fired)
            }
        }
        self.publish();
    }

    fn require_game(&self, action: &'static str) -> Result<(), SessionError> {
        let route = self.router.route();
        if route == Route::Game {
            Ok(())
        } else {
            Err(SessionError::NotInGame { action, route })
        }
    }

    fn publish(&self) {
        let status = self.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }
}
