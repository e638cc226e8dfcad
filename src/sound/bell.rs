//! Terminal bell playback
//!
//! Cues become short bell patterns on stderr. Looped cues re-ring from a
//! background task until stopped or until the player is disposed.

use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cues::{Cue, CueHandle, SoundCues};

const BEL: u8 = 0x07;

/// Gap between repetitions of a looped cue
const LOOP_PERIOD: Duration = Duration::from_secs(1);

/// Reasons the bell player could not be opened
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("sound disabled by configuration")]
    Disabled,

    #[error("stderr is not a terminal")]
    NoTerminal,
}

type Output = Arc<Mutex<Box<dyn Write + Send>>>;

/// Plays cues as terminal bell patterns
pub struct TerminalBell {
    out: Output,
    loops: Mutex<HashMap<u64, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl TerminalBell {
    /// Open the player on stderr
    pub fn open(enabled: bool) -> Result<Self, SoundError> {
        if !enabled {
            return Err(SoundError::Disabled);
        }
        if !std::io::stderr().is_terminal() {
            return Err(SoundError::NoTerminal);
        }

        info!("terminal bell sound enabled");
        Ok(Self::with_output(Box::new(std::io::stderr())))
    }

    fn with_output(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            loops: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Stop every looping cue; called once on teardown
    pub fn dispose(&self) {
        let mut loops = self.loops.lock();
        for (_, task) in loops.drain() {
            task.abort();
        }
        debug!("sound player disposed");
    }

    fn pattern(cue: Cue) -> &'static [u8] {
        match cue {
            Cue::Win => &[BEL, BEL, BEL],
            Cue::PhoneRing | Cue::Ivr => &[BEL, BEL],
            Cue::ButtonClick | Cue::Lose | Cue::Progress => &[BEL],
        }
    }

    fn ring(out: &Output, cue: Cue) {
        let mut out = out.lock();
        let result = out
            .write_all(Self::pattern(cue))
            .and_then(|_| out.flush());

        if let Err(e) = result {
            warn!(?e, %cue, "sound playback failed");
        }
    }
}

impl SoundCues for TerminalBell {
    fn play(&self, cue: Cue) {
        debug!(%cue, volume = cue.volume(), "play cue");
        Self::ring(&self.out, cue);
    }

    fn play_looped(&self, cue: Cue) -> Option<CueHandle> {
        if !cue.looped() {
            debug!(%cue, "looping a one-shot cue");
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(?e, %cue, "no runtime for looped cue");
                return None;
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let out = Arc::clone(&self.out);
        let task = runtime.spawn(async move {
            loop {
                Self::ring(&out, cue);
                tokio::time::sleep(LOOP_PERIOD).await;
            }
        });

        debug!(%cue, id, "looped cue started");
        self.loops.lock().insert(id, task);
        Some(CueHandle(id))
    }

    fn stop(&self, handle: CueHandle) {
        if let Some(task) = self.loops.lock().remove(&handle.0) {
            task.abort();
            debug!(id = handle.0, "looped cue stopped");
        }
    }
}

impl Drop for TerminalBell {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Silent fallback when no audio output is available
#[derive(Debug, Default)]
pub struct Muted;

impl SoundCues for Muted {
    fn play(&self, _cue: Cue) {}

    fn play_looped(&self, _cue: Cue) -> Option<CueHandle> {
        None
    }

    fn stop(&self, _handle: CueHandle) {}
}
