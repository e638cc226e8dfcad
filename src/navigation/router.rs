//! Route tracking and the simulated dial from the landing view

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::copy;
use crate::events::GameEvent;
use crate::sound::{Cue, SoundCues};
use crate::timer::{StateTimer, TimerFired, TimerKind, TimerScheduler};

/// The three views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Informational page with the phone number form
    #[default]
    Landing,
    /// Rules and consent
    Rules,
    /// Simulated call
    Game,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Landing => write!(f, "/"),
            Route::Rules => write!(f, "/regolamento"),
            Route::Game => write!(f, "/game"),
        }
    }
}

/// Rejected navigation actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("phone number is required")]
    PhoneRequired,

    #[error("cannot {action} from {route}")]
    WrongRoute { action: &'static str, route: Route },
}

/// A non-empty phone number as typed by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, NavigationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NavigationError::PhoneRequired);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tracks the active view
pub struct Router {
    route: Route,
    phone: Option<PhoneNumber>,
    /// Pending dial from the landing view
    dial: Option<StateTimer>,
    epoch: u64,
    dial_delay: Duration,
    timers: TimerScheduler,
    sounds: Arc<dyn SoundCues>,
    event_tx: broadcast::Sender<GameEvent>,
}

impl Router {
    pub fn new(
        dial_delay: Duration,
        timers: TimerScheduler,
        sounds: Arc<dyn SoundCues>,
        event_tx: broadcast::Sender<GameEvent>,
    ) -> Self {
        Self {
            route: Route::Landing,
            phone: None,
            dial: None,
            epoch: 0,
            dial_delay,
            timers,
            sounds,
            event_tx,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Whether a dial is pending on the landing view
    pub fn is_dialing(&self) -> bool {
        self.dial.is_some()
    }

    /// Validate the number and start the simulated dial
    pub fn submit_phone(&mut self, raw: &str) -> Result<(), NavigationError> {
        self.require(Route::Landing, "submit a phone number")?;
        let phone = PhoneNumber::parse(raw)?;

        debug!(phone = phone.as_str(), "dialing");
        self.phone = Some(phone);
        self.epoch += 1;
        self.dial = Some(self.timers.after(TimerKind::Dial, self.epoch, self.dial_delay));
        self.emit(GameEvent::notice(copy::DIALING_TITLE, copy::DIALING_MESSAGE));
        Ok(())
    }

    /// Handle the dial timer
    pub fn on_timer(&mut self, fired: TimerFired) {
        if !self.dial.as_ref().is_some_and(|t| t.matches(&fired)) {
            debug!(epoch = fired.epoch, "dropping stale dial timer");
            return;
        }

        self.dial = None;
        self.navigate(Route::Rules);
    }

    pub fn accept_rules(&mut self) -> Result<(), NavigationError> {
        self.require(Route::Rules, "accept the rules")?;
        self.sounds.play(Cue::ButtonClick);
        self.navigate(Route::Game);
        Ok(())
    }

    pub fn decline_rules(&mut self) -> Result<(), NavigationError> {
        self.require(Route::Rules, "decline the rules")?;
        self.sounds.play(Cue::ButtonClick);
        self.go_home();
        Ok(())
    }

    /// Back to the landing view from anywhere, dropping a pending dial
    pub fn go_home(&mut self) {
        if let Some(dial) = self.dial.take() {
            dial.cancel();
        }
        self.phone = None;
        if self.route != Route::Landing {
            self.navigate(Route::Landing);
        }
    }

    fn require(&self, expected: Route, action: &'static str) -> Result<(), NavigationError> {
        if self.route == expected {
            Ok(())
        } else {
            Err(NavigationError::WrongRoute {
                action,
                route: self.route,
            })
        }
    }

    fn navigate(&mut self, to: Route) {
        info!(from = %self.route, to = %to, "navigate");
        self.route = to;
        self.emit(GameEvent::Navigated { route: to });
    }

    fn emit(&self, event: GameEvent) {
        let _ = self.event_tx.send(event);
    }
}
