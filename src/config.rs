//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::draw::{Odds, PrizeTable};

/// Pause between a valid phone number and the rules page
pub const DIAL_DELAY: Duration = Duration::from_millis(1500);
/// Time spent Connecting before the IVR answers
pub const CONNECT_DELAY: Duration = Duration::from_millis(2000);
/// Length of the IVR announcement
pub const IVR_DELAY: Duration = Duration::from_millis(3000);
/// Interval between progress ticks while Playing
pub const PROGRESS_TICK: Duration = Duration::from_millis(300);
/// Progress added per tick
pub const PROGRESS_STEP: u8 = 10;

/// Invalid configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown odds preset {0:?} (expected \"standard\" or \"promo\")")]
    UnknownPreset(String),

    #[error("{name} must be a probability between 0 and 1, got {value}")]
    Probability { name: &'static str, value: String },

    #[error("MOBLOTTO_SPEED must be a positive number, got {0:?}")]
    Speed(String),

    #[error("MOBLOTTO_SOUND must be \"on\" or \"off\", got {0:?}")]
    Sound(String),
}

/// Delays driving the simulated call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub dial: Duration,
    pub connect: Duration,
    pub ivr: Duration,
    pub tick: Duration,
    /// Progress added per tick, in 1..=100
    pub progress_step: u8,
}

impl Timing {
    /// Divide every delay by `speed`
    pub fn scaled(speed: f64) -> Self {
        let scale = |d: Duration| Duration::from_nanos((d.as_nanos() as f64 / speed).round() as u64);
        let base = Self::default();
        Self {
            dial: scale(base.dial),
            connect: scale(base.connect),
            ivr: scale(base.ivr),
            tick: scale(base.tick),
            progress_step: base.progress_step,
        }
    }

    /// A zero period would stall the timers
    fn has_zero_delay(&self) -> bool {
        [self.dial, self.connect, self.ivr, self.tick].contains(&Duration::ZERO)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            dial: DIAL_DELAY,
            connect: CONNECT_DELAY,
            ivr: IVR_DELAY,
            tick: PROGRESS_TICK,
            progress_step: PROGRESS_STEP,
        }
    }
}

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for remote control
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Win and jackpot probabilities
    pub odds: Odds,

    /// Prize amounts
    pub prizes: PrizeTable,

    pub timing: Timing,

    /// Whether to attempt sound playback
    pub sound: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup("MOBLOTTO_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").context("HOME is not set")?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("moblotto")
            }
        };

        let socket_path = lookup("MOBLOTTO_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("moblotto.sock"));

        let preset = match lookup("MOBLOTTO_ODDS").as_deref() {
            None | Some("standard") => Odds::standard(),
            Some("promo") => Odds::promo(),
            Some(other) => return Err(ConfigError::UnknownPreset(other.to_string()).into()),
        };

        let win = parse_probability(&lookup, "MOBLOTTO_WIN_CHANCE", preset.win())?;
        let jackpot = parse_probability(&lookup, "MOBLOTTO_JACKPOT_CHANCE", preset.jackpot())?;
        let odds = Odds::new(win, jackpot).context("odds out of range")?;

        let timing = match lookup("MOBLOTTO_SPEED") {
            None => Timing::default(),
            Some(raw) => {
                let speed: f64 = raw
                    .parse()
                    .map_err(|_| ConfigError::Speed(raw.clone()))?;
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(ConfigError::Speed(raw).into());
                }
                let timing = Timing::scaled(speed);
                if timing.has_zero_delay() {
                    return Err(ConfigError::Speed(raw).into());
                }
                timing
            }
        };

        let sound = match lookup("MOBLOTTO_SOUND").as_deref() {
            None | Some("on") => true,
            Some("off") => false,
            Some(other) => return Err(ConfigError::Sound(other.to_string()).into()),
        };

        Ok(Self {
            socket_path,
            data_dir,
            odds,
            prizes: PrizeTable::default(),
            timing,
            sound,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

fn parse_probability(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };

    match raw.parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(ConfigError::Probability { name, value: raw }),
    }
}
