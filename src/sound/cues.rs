//! Cue names and the playback trait

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    ButtonClick,
    PhoneRing,
    Win,
    Lose,
    Progress,
    Ivr,
}

impl Cue {
    /// Playback volume in [0, 1]
    pub fn volume(&self) -> f32 {
        match self {
            Cue::ButtonClick => 0.5,
            Cue::PhoneRing => 0.7,
            Cue::Win => 0.8,
            Cue::Lose => 0.6,
            Cue::Progress => 0.3,
            Cue::Ivr => 0.6,
        }
    }

    /// Whether the cue is meant to repeat until stopped
    pub fn looped(&self) -> bool {
        matches!(self, Cue::PhoneRing)
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cue::ButtonClick => write!(f, "button_click"),
            Cue::PhoneRing => write!(f, "phone_ring"),
            Cue::Win => write!(f, "win"),
            Cue::Lose => write!(f, "lose"),
            Cue::Progress => write!(f, "progress"),
            Cue::Ivr => write!(f, "ivr"),
        }
    }
}

/// Handle to a looping cue, used to stop it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueHandle(pub(crate) u64);

/// Fire-and-forget sound playback
pub trait SoundCues: Send + Sync {
    /// Play a cue once
    fn play(&self, cue: Cue);

    /// Start a looping cue; `None` when it could not be started
    fn play_looped(&self, cue: Cue) -> Option<CueHandle>;

    /// Stop a looping cue; unknown handles are ignored
    fn stop(&self, handle: CueHandle);
}

/// Records every call, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingCues {
    log: parking_lot::Mutex<Vec<String>>,
    next: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl RecordingCues {
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[cfg(test)]
impl SoundCues for RecordingCues {
    fn play(&self, cue: Cue) {
        self.log.lock().push(format!("play {cue}"));
    }

    fn play_looped(&self, cue: Cue) -> Option<CueHandle> {
        let id = self.next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.log.lock().push(format!("loop {cue}"));
        Some(CueHandle(id))
    }

    fn stop(&self, handle: CueHandle) {
        self.log.lock().push(format!("stop {}", handle.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ring_loops() {
        assert!(Cue::PhoneRing.looped());
        assert!(!Cue::Win.looped());
        assert!(!Cue::ButtonClick.looped());
    }

    #[test]
    fn test_volumes_in_range() {
        for cue in [
            Cue::ButtonClick,
            Cue::PhoneRing,
            Cue::Win,
            Cue::Lose,
            Cue::Progress,
            Cue::Ivr,
        ] {
            assert!((0.0..=1.0).contains(&cue.volume()));
        }
    }
}
