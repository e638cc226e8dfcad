//! Text rendering of the current view

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::copy::{self, format_euro};
use crate::events::GameEvent;
use crate::navigation::{NavigationError, Route};
use crate::session::{SessionError, SessionStatus};
use crate::state::GameState;

use super::cards::{progress_bar, render_ivr_flow, GameStats};
use super::input::HELP;

const BAR_WIDTH: usize = 30;

/// Prints the view on every status change and notices on events
pub struct Screen {
    status_rx: watch::Receiver<SessionStatus>,
    event_rx: broadcast::Receiver<GameEvent>,
}

impl Screen {
    pub fn new(
        status_rx: watch::Receiver<SessionStatus>,
        event_rx: broadcast::Receiver<GameEvent>,
    ) -> Self {
        Self {
            status_rx,
            event_rx,
        }
    }

    pub async fn run(mut self) {
        let mut shown = self.status_rx.borrow_and_update().clone();
        println!("{}", render(&shown));

        loop {
            tokio::select! {
                changed = self.status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = self.status_rx.borrow_and_update().clone();
                    if same_view(&shown, &status) {
                        if status.state == GameState::Playing && status.progress != shown.progress {
                            println!("{}", render_progress(status.progress));
                        }
                    } else {
                        println!("{}", render(&status));
                    }
                    shown = status;
                }
                event = self.event_rx.recv() => {
                    match event {
                        Ok(event) => {
                            if let Some(line) = render_event(&event) {
                                println!("{}", line);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "screen lagged behind events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }

        debug!("screen stopped");
    }
}

fn same_view(a: &SessionStatus, b: &SessionStatus) -> bool {
    a.route == b.route && a.state == b.state && a.dialing == b.dialing
}

/// Full text of the view described by `status`
pub fn render(status: &SessionStatus) -> String {
    match status.route {
        Route::Landing => render_landing(status),
        Route::Rules => render_rules(),
        Route::Game => render_game(status),
    }
}

fn render_landing(status: &SessionStatus) -> String {
    let mut out = format!("\n##### {} #####\n{}\n\n", copy::BRAND, copy::TAGLINE);

    out.push_str("== Gioca ora ==\n");
    out.push_str("  Chiama il numero dedicato o simula una chiamata qui\n");
    out.push_str(&format!("  {}\n", copy::CALL_COST));
    out.push_str("  Come giocare:\n");
    for line in copy::HOW_TO_PLAY {
        out.push_str(&format!("   • {}\n", line));
    }
    if status.dialing {
        out.push_str(&format!("  {}\n", copy::DIALING_MESSAGE));
    } else {
        out.push_str("  > chiama <numero>   (es. chiama 3331234567)\n");
    }
    out.push('\n');

    out.push_str(&render_ivr_flow());
    out.push('\n');
    out.push_str(&GameStats::DEMO.render());
    out.push('\n');

    out.push_str("== Garanzie di sistema ==\n");
    for (title, text) in copy::GUARANTEES {
        out.push_str(&format!("  {}: {}\n", title, text));
    }
    out
}

fn render_rules() -> String {
    let mut out = format!("\n##### {} #####\n{}\n\n", copy::RULES_TITLE, copy::RULES_SUBTITLE);

    for (heading, items) in copy::RULES {
        out.push_str(&format!("== {} ==\n", heading));
        for (item, text) in items {
            out.push_str(&format!("  {}\n    {}\n", item, text));
        }
        out.push('\n');
    }

    out.push_str("== Accettazione delle condizioni ==\n");
    out.push_str(&format!("  {}\n", copy::RULES_CONSENT));
    out.push_str("  > accetta | rifiuta\n");
    out
}

fn render_game(status: &SessionStatus) -> String {
    let mut out = format!("\n##### {} #####\n{}\n\n", copy::BRAND, copy::GAME_SUBTITLE);

    match status.state {
        GameState::Idle => {
            out.push_str(&format!("{}\n\nFlusso di gioco:\n", copy::IDLE_INTRO));
            for (i, step) in copy::GAME_FLOW.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, step));
            }
            out.push_str("\n  > gioca | esci\n");
        }
        GameState::Connecting => {
            out.push_str(&format!("{}\n{}\n", copy::CONNECTING_TITLE, copy::CONNECTING_MESSAGE));
        }
        GameState::Ivr => {
            out.push_str(&format!("{}\n", copy::IVR_TITLE));
            for line in copy::IVR_SCRIPT {
                out.push_str(&format!("  | {}\n", line));
            }
            out.push_str("  Simulazione del messaggio IVR...\n");
        }
        GameState::Playing => {
            out.push_str(&format!("{}\n{}\n", copy::PLAYING_TITLE, copy::PLAYING_MESSAGE));
            out.push_str(&render_progress(status.progress));
        }
        GameState::Result => {
            match status.outcome {
                Some(outcome) if outcome.is_winner => {
                    out.push_str(&format!(
                        "*** {} ***\n    {}\n{}\n{}\n",
                        copy::WIN_TITLE,
                        format_euro(outcome.amount),
                        copy::WIN_MESSAGE,
                        copy::WIN_FOLLOWUP
                    ));
                }
                _ => {
                    out.push_str(&format!("{}\n{}\n", copy::LOSE_TITLE, copy::LOSE_MESSAGE));
                }
            }
            out.push_str("\n  > ancora | esci\n");
        }
    }
    out
}

fn render_progress(progress: u8) -> String {
    format!("  {} {}%", progress_bar(progress, BAR_WIDTH), progress)
}

fn render_event(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::Notice { title, message } => Some(format!("[!] {}: {}", title, message)),
        GameEvent::Connected => Some(format!(
            "[!] {}: {}",
            copy::CONNECTED_TITLE,
            copy::CONNECTED_MESSAGE
        )),
        _ => None,
    }
}

/// Visible warning for a rejected action
pub fn render_error(error: &SessionError) -> String {
    match error {
        SessionError::Navigation(NavigationError::PhoneRequired) => format!(
            "[!] {}: {}",
            copy::PHONE_REQUIRED_TITLE,
            copy::PHONE_REQUIRED_MESSAGE
        ),
        other => format!("[!] Azione non disponibile: {}", other),
    }
}

/// Command reference for the console
pub fn render_help() -> String {
    HELP.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Outcome;
    use crate::state::GameError;

    fn status(route: Route, state: GameState) -> SessionStatus {
        SessionStatus {
            route,
            state,
            ..SessionStatus::default()
        }
    }

    #[test]
    fn test_landing_view() {
        let text = render(&SessionStatus::default());
        assert!(text.contains(copy::BRAND));
        assert!(text.contains("Statistiche di gioco"));
        assert!(text.contains("Flusso IVR"));
        assert!(text.contains("chiama <numero>"));
    }

    #[test]
    fn test_rules_view() {
        let text = render(&status(Route::Rules, GameState::Idle));
        assert!(text.contains(copy::RULES_TITLE));
        assert!(text.contains("Requisiti di età"));
        assert!(text.contains("accetta | rifiuta"));
    }

    #[test]
    fn test_ivr_view() {
        let text = render(&status(Route::Game, GameState::Ivr));
        assert!(text.contains("premi 3"));
    }

    #[test]
    fn test_playing_view_shows_progress() {
        let mut s = status(Route::Game, GameState::Playing);
        s.progress = 40;
        assert!(render(&s).contains("40%"));
    }

    #[test]
    fn test_result_views() {
        let mut s = status(Route::Game, GameState::Result);
        s.outcome = Some(Outcome::win(100_000));
        let text = render(&s);
        assert!(text.contains(copy::WIN_TITLE));
        assert!(text.contains("€100.000"));

        s.outcome = Some(Outcome::loss());
        assert!(render(&s).contains(copy::LOSE_TITLE));
    }

    #[test]
    fn test_render_errors() {
        let missing = SessionError::Navigation(NavigationError::PhoneRequired);
        assert!(render_error(&missing).contains(copy::PHONE_REQUIRED_TITLE));

        let invalid = SessionError::Game(GameError::InvalidTransition {
            action: "replay",
            state: GameState::Idle,
        });
        assert!(render_error(&invalid).contains("replay"));
    }

    #[test]
    fn test_only_notices_are_printed() {
        assert!(render_event(&GameEvent::Connected).is_some());
        assert!(render_event(&GameEvent::notice("a", "b")).is_some());
        assert!(render_event(&GameEvent::DrawStarted).is_none());
    }
}
