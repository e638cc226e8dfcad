//! Game screen state machine
//!
//! Five states driven by timers:
//! - Idle: waiting for the player to start
//! - Connecting: call placed, phone ringing
//! - Ivr: age-verification announcement
//! - Playing: draw in progress, progress ticking up
//! - Result: outcome shown until replay or exit

mod machine;

pub use machine::{GameError, GameMachine, GameState};
