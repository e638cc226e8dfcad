//! Static cards shown on the landing view

use crate::copy::{self, format_euro};

/// Demo statistics; hard-coded, not measured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameStats {
    pub total_plays: u64,
    pub total_wins: u64,
    pub jackpot_wins: u64,
    pub last_win_amount: Option<u64>,
}

impl GameStats {
    pub const DEMO: GameStats = GameStats {
        total_plays: 12_450,
        total_wins: 3_750,
        jackpot_wins: 12,
        last_win_amount: Some(75_000),
    };

    /// Percentage of winning plays, 0 when nothing was played
    pub fn win_rate(&self) -> f64 {
        if self.total_plays == 0 {
            return 0.0;
        }
        self.total_wins as f64 / self.total_plays as f64 * 100.0
    }

    pub fn render(&self) -> String {
        let mut out = String::from("== Statistiche di gioco ==\n");
        out.push_str(&format!("  Giocate totali: {}\n", self.total_plays));
        out.push_str(&format!("  Vincite:        {}\n", self.total_wins));
        out.push_str(&format!(
            "  Tasso di vincita: {:.1}% {}\n",
            self.win_rate(),
            progress_bar(self.win_rate().round() as u8, 10)
        ));
        out.push_str(&format!("  Jackpot vinti:  {}\n", self.jackpot_wins));
        if let Some(amount) = self.last_win_amount {
            out.push_str(&format!("  Ultima vincita: {}\n", format_euro(amount)));
        }
        out
    }
}

/// Progress of a step in the IVR flow card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

impl StepStatus {
    fn label(&self) -> &'static str {
        match self {
            StepStatus::Completed => "Completato",
            StepStatus::Current => "In corso",
            StepStatus::Pending => "In attesa",
        }
    }

    fn marker(&self) -> char {
        match self {
            StepStatus::Completed => '✓',
            StepStatus::Current => '●',
            StepStatus::Pending => '○',
        }
    }
}

/// The IVR flow card as shown on the landing view
pub fn render_ivr_flow() -> String {
    const STATUSES: [StepStatus; 5] = [
        StepStatus::Completed,
        StepStatus::Completed,
        StepStatus::Current,
        StepStatus::Pending,
        StepStatus::Pending,
    ];

    let mut out = String::from("== Flusso IVR ==\n");
    for (i, ((title, description), status)) in copy::IVR_STEPS.iter().zip(STATUSES).enumerate() {
        out.push_str(&format!(
            "  {} {}. {} [{}]\n     {}\n",
            status.marker(),
            i + 1,
            title,
            status.label(),
            description
        ));
    }
    out
}

/// Text progress bar for a percentage
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * width / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
