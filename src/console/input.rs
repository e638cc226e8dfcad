//! Console command reader
//!
//! Reads stdin on a dedicated thread and forwards player actions to the
//! session loop. Rejected actions are printed as warnings.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::lifecycle::ShutdownSignal;
use crate::session::{Action, Command};

use super::screen::{render_error, render_help};

pub const HELP: &str = "\
Comandi:
  chiama <numero>   simula una chiamata dalla pagina iniziale (call)
  accetta           accetta il regolamento (accept)
  rifiuta           rifiuta il regolamento (decline)
  gioca             inizia a giocare (play)
  ancora            gioca ancora (again)
  esci              torna alla pagina iniziale (exit)
  aiuto             mostra questo elenco (help)
  quit              chiude il simulatore";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Action(Action),
    Help,
    Quit,
}

/// Parse one line of input; `None` for unknown commands
pub fn parse_line(line: &str) -> Option<ConsoleCommand> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let action = match word.to_lowercase().as_str() {
        "chiama" | "call" => Action::SubmitPhone {
            number: rest.to_string(),
        },
        "accetta" | "accept" => Action::AcceptRules,
        "rifiuta" | "decline" => Action::DeclineRules,
        "gioca" | "play" => Action::Start,
        "ancora" | "again" => Action::Replay,
        "esci" | "exit" => Action::Exit,
        "aiuto" | "help" | "?" => return Some(ConsoleCommand::Help),
        "quit" | "q" => return Some(ConsoleCommand::Quit),
        _ => return None,
    };

    Some(ConsoleCommand::Action(action))
}

/// Errors that can occur when starting the reader
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("console reader is already running")]
    AlreadyRunning,

    #[error("failed to spawn reader thread: {0}")]
    ThreadSpawn(String),
}

/// Reads player commands from stdin
pub struct ConsoleInput {
    command_tx: mpsc::Sender<Command>,
    shutdown: ShutdownSignal,
    running: Arc<AtomicBool>,
}

impl ConsoleInput {
    pub fn new(command_tx: mpsc::Sender<Command>, shutdown: ShutdownSignal) -> Self {
        Self {
            command_tx,
            shutdown,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the reader thread
    ///
    /// The thread blocks on stdin and exits on end of input, on `quit`, or on
    /// the first line read after `stop()`.
    pub fn start(&self) -> Result<(), ConsoleError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ConsoleError::AlreadyRunning);
        }

        let command_tx = self.command_tx.clone();
        let shutdown = self.shutdown.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                info!("console reader started");
                read_loop(std::io::stdin().lock(), &command_tx, &shutdown, &running);
                running.store(false, Ordering::SeqCst);
                info!("console reader stopped");
            })
            .map_err(|e| ConsoleError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Ask the reader to stop
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn read_loop(
    input: impl BufRead,
    command_tx: &mpsc::Sender<Command>,
    shutdown: &ShutdownSignal,
    running: &AtomicBool,
) {
    for line in input.lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(?e, "failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Some(ConsoleCommand::Action(action)) => {
                debug!(?action, "console action");
                let (command, reply) = Command::new(action);
                if command_tx.blocking_send(command).is_err() {
                    warn!("session closed, stopping console reader");
                    break;
                }
                if let Ok(Err(e)) = reply.blocking_recv() {
                    println!("{}", render_error(&e));
                }
            }
            Some(ConsoleCommand::Help) => println!("{}", render_help()),
            Some(ConsoleCommand::Quit) => {
                shutdown.trigger();
                break;
            }
            None => println!("[!] Comando sconosciuto: {}\n{}", line.trim(), render_help()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!(
            parse_line("chiama 3331234567"),
            Some(ConsoleCommand::Action(Action::SubmitPhone {
                number: "3331234567".into()
            }))
        );
        assert_eq!(
            parse_line("  CALL   333 "),
            Some(ConsoleCommand::Action(Action::SubmitPhone {
                number: "333".into()
            }))
        );
        assert_eq!(
            parse_line("chiama"),
            Some(ConsoleCommand::Action(Action::SubmitPhone {
                number: String::new()
            }))
        );
        assert_eq!(parse_line("accetta"), Some(ConsoleCommand::Action(Action::AcceptRules)));
        assert_eq!(parse_line("decline"), Some(ConsoleCommand::Action(Action::DeclineRules)));
        assert_eq!(parse_line("gioca"), Some(ConsoleCommand::Action(Action::Start)));
        assert_eq!(parse_line("again"), Some(ConsoleCommand::Action(Action::Replay)));
        assert_eq!(parse_line("esci"), Some(ConsoleCommand::Action(Action::Exit)));
    }

    #[test]
    fn test_parse_meta_commands() {
        assert_eq!(parse_line("aiuto"), Some(ConsoleCommand::Help));
        assert_eq!(parse_line("quit"), Some(ConsoleCommand::Quit));
        assert_eq!(parse_line("balla"), None);
    }

    #[test]
    fn test_reader_creation() {
        let (tx, _rx) = mpsc::channel(4);
        let input = ConsoleInput::new(tx, ShutdownSignal::new());
        assert!(!input.is_running());
    }

    #[test]
    fn test_read_loop_forwards_actions() {
        let (tx, mut rx) = mpsc::channel::<Command>(8);
        let running = AtomicBool::new(true);
        let shutdown = ShutdownSignal::new();

        let responder = thread::spawn(move || {
            let mut actions = Vec::new();
            while let Some(command) = rx.blocking_recv() {
                actions.push(command.action);
            }
            actions
        });

        let input = "chiama 333\n\nbogus\naccetta\nquit\ngioca\n".as_bytes();
        read_loop(input, &tx, &shutdown, &running);
        drop(tx);

        let actions = responder.join().unwrap();
        assert_eq!(
            actions,
            vec![
                Action::SubmitPhone {
                    number: "333".into()
                },
                Action::AcceptRules,
            ]
        );
        assert!(shutdown.is_triggered());
    }
}
