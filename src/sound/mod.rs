//! Sound cues played at state entry and exit points
//!
//! The session only ever talks to [`SoundCues`]; playback failures stay
//! inside the implementation and never block a transition.

mod bell;
mod cues;

pub use bell::{Muted, SoundError, TerminalBell};
pub use cues::{Cue, CueHandle, SoundCues};

#[cfg(test)]
pub use cues::RecordingCues;
