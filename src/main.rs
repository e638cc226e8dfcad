//! moblotto: terminal simulator of the MOB.LOTTO 4.0 telephone lottery
//!
//! Walks a player through a fictitious IVR call:
//! - Landing view with phone number entry, rules and consent
//! - Explicit state machine: Idle, Connecting, Ivr, Playing, Result
//! - Cosmetic random draw with configurable odds
//! - Terminal bell sound cues
//! - Unix socket for remote control and event subscription
//!
//! No real telephony, no persistence and no money movement.

mod config;
mod console;
mod copy;
mod draw;
mod events;
mod ipc;
mod lifecycle;
mod navigation;
mod session;
mod sound;
mod state;
mod timer;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::console::{ConsoleInput, Screen};
use crate::events::GameEvent;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::session::Session;
use crate::sound::{Muted, SoundCues, SoundError, TerminalBell};
use crate::timer::TimerScheduler;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the screen
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "moblotto starting");

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        socket_path = ?config.socket_path,
        win_chance = config.odds.win(),
        jackpot_chance = config.odds.jackpot(),
        "configuration loaded"
    );

    let shutdown = ShutdownSignal::new();

    // Session -> screen and socket subscribers
    let (event_tx, _event_rx) = broadcast::channel::<GameEvent>(64);
    // Console and socket clients -> session
    let (command_tx, command_rx) = mpsc::channel(32);
    // Timers -> session
    let (timers, timer_rx) = TimerScheduler::channel();

    // Sound service lives for the whole process and is disposed on teardown
    let mut audio_unavailable = false;
    let bell = match TerminalBell::open(config.sound) {
        Ok(bell) => Some(Arc::new(bell)),
        Err(SoundError::Disabled) => {
            info!("sound disabled");
            None
        }
        Err(e) => {
            warn!(error = %e, "continuing without sound");
            audio_unavailable = true;
            None
        }
    };
    let sounds: Arc<dyn SoundCues> = match &bell {
        Some(bell) => Arc::clone(bell) as Arc<dyn SoundCues>,
        None => Arc::new(Muted),
    };

    let mut session = Session::new(&config, sounds, timers, event_tx.clone());
    let status_rx = session.subscribe_status();

    let screen = Screen::new(status_rx.clone(), event_tx.subscribe());
    let server = Server::new(&config.socket_path, command_tx.clone(), status_rx, event_tx.clone())?;

    let input = ConsoleInput::new(command_tx, shutdown.clone());
    input.start()?;

    let screen_task = tokio::spawn(screen.run());
    if audio_unavailable {
        let _ = event_tx.send(GameEvent::notice(
            copy::AUDIO_UNAVAILABLE_TITLE,
            copy::AUDIO_UNAVAILABLE_MESSAGE,
        ));
    }

    info!("simulator initialized, entering main loop");

    tokio::select! {
        _ = session.run(command_rx, timer_rx) => {
            info!("session exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                warn!(?e, "control socket error");
            }
        }

        result = shutdown.wait() => {
            result?;
            info!("shutdown requested");
        }
    }

    info!("shutting down...");

    input.stop();
    server.shutdown().await;
    screen_task.abort();
    if let Some(bell) = bell {
        bell.dispose();
    }

    info!("moblotto stopped");

    Ok(())
}
