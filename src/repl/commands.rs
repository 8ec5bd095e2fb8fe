//! Built-in REPL commands

use anyhow::Result;
use colored::*;

use crate::repl::display::DisplayManager;
use crate::repl::session::{ExchangeStatus, SessionState};

/// REPL command types
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Sources,
    /// `/topk` alone shows the current value
    TopK { value: Option<usize> },
    Threshold { value: Option<f32> },
    History { limit: Option<usize> },
    Clear,
    Exit,
    Invalid { message: String },
    Unknown { input: String },
}

/// Slash-prefixed input is a command
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Bare `exit`/`quit` also leave the chat
pub fn is_exit_word(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Command handler for parsing and executing REPL commands
#[derive(Default)]
pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();
        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown {
                input: input.to_string(),
            };
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        let Some(name) = parts.first() else {
            return Command::Unknown {
                input: input.to_string(),
            };
        };

        match name.to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "sources" | "src" => Command::Sources,
            "topk" | "k" => match parts.get(1).map(|s| s.parse::<usize>()) {
                None => Command::TopK { value: None },
                Some(Ok(n)) if n > 0 => Command::TopK { value: Some(n) },
                Some(_) => Command::Invalid {
                    message: "top-k must be a positive integer".to_string(),
                },
            },
            "threshold" | "t" => match parts.get(1).map(|s| s.parse::<f32>()) {
                None => Command::Threshold { value: None },
                Some(Ok(x)) if (-1.0..=1.0).contains(&x) => Command::Threshold { value: Some(x) },
                Some(_) => Command::Invalid {
                    message: "threshold must be a number between -1 and 1".to_string(),
                },
            },
            "history" => Command::History {
                limit: parts.get(1).and_then(|s| s.parse().ok()),
            },
            "clear" | "cls" => Command::Clear,
            "exit" | "quit" | "q" => Command::Exit,
            _ => Command::Unknown {
                input: input.to_string(),
            },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(
        &self,
        command: Command,
        state: &mut SessionState,
        display: &DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => self.show_help(),
            Command::Sources => display.show_passages(state.last_passages()),
            Command::TopK { value: Some(n) } => {
                state.set_top_k(n);
                println!("{}", format!("top-k set to {}", n).cyan());
            }
            Command::TopK { value: None } => {
                println!("top-k: {}", state.params().top_k.to_string().green());
            }
            Command::Threshold { value: Some(x) } => {
                state.set_min_score(x);
                println!("{}", format!("threshold set to {}", x).cyan());
            }
            Command::Threshold { value: None } => {
                println!("threshold: {}", state.params().min_score.to_string().green());
            }
            Command::History { limit } => self.show_history(state, limit.unwrap_or(10)),
            Command::Clear => {
                state.reset();
                display.clear_screen()?;
            }
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                return Ok(false);
            }
            Command::Invalid { message } => println!("{}", message.red()),
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }
        Ok(true)
    }

    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/sources", "Show the passages behind the last answer"),
            ("/topk [n]", "Show or set how many passages are retrieved"),
            ("/threshold [x]", "Show or set the minimum similarity score"),
            ("/history [n]", "Show last n questions (default: 10)"),
            ("/clear, /cls", "Clear screen, history and sources"),
            ("/exit, /quit, /q", "Exit"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type your question directly (no / prefix)");
        println!("  - Use {} for previous questions", "UP/DOWN arrows".cyan());
        println!("  - Press {} or type {} to exit", "Ctrl-D".cyan(), "exit".cyan());
        println!();
    }

    fn show_history(&self, state: &SessionState, limit: usize) {
        let history = state.recent(limit);
        if history.is_empty() {
            println!("{}", "No questions asked yet.".yellow());
            return;
        }

        println!("\n{}", format!("History (last {}):", history.len()).bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        for (i, exchange) in history.iter().enumerate() {
            let icon = match exchange.status {
                ExchangeStatus::Answered => "✓".green(),
                ExchangeStatus::SmallTalk => "·".cyan(),
                ExchangeStatus::NoRelevantDocuments => "∅".yellow(),
                ExchangeStatus::GenerationFailed | ExchangeStatus::RetrievalFailed => "✗".red(),
            };
            println!(
                "  {}. {} {} {}",
                (i + 1).to_string().cyan(),
                icon,
                exchange.question,
                format!("({}ms)", exchange.duration_ms).dimmed()
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::SearchParams;

    fn parse(input: &str) -> Command {
        CommandHandler::new().parse(input)
    }

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse("/help"), Command::Help);
        assert_eq!(parse("  /sources "), Command::Sources);
        assert_eq!(parse("/EXIT"), Command::Exit);
        assert_eq!(parse("/clear"), Command::Clear);
        assert_eq!(parse("/history 3"), Command::History { limit: Some(3) });
    }

    #[test]
    fn test_parse_topk() {
        assert_eq!(parse("/topk 8"), Command::TopK { value: Some(8) });
        assert_eq!(parse("/topk"), Command::TopK { value: None });
        assert!(matches!(parse("/topk 0"), Command::Invalid { .. }));
        assert!(matches!(parse("/topk many"), Command::Invalid { .. }));
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse("/threshold 0.3"), Command::Threshold { value: Some(0.3) });
        assert_eq!(parse("/threshold -0.5"), Command::Threshold { value: Some(-0.5) });
        assert!(matches!(parse("/threshold 2"), Command::Invalid { .. }));
    }

    #[test]
    fn test_unknown_and_plain_text() {
        assert!(matches!(parse("/frobnicate"), Command::Unknown { .. }));
        assert!(matches!(parse("/"), Command::Unknown { .. }));
        assert!(matches!(parse("what is Telnet"), Command::Unknown { .. }));
    }

    #[test]
    fn test_command_detection() {
        assert!(is_command("/help"));
        assert!(!is_command("help me"));
        assert!(is_exit_word(" Quit "));
        assert!(is_exit_word("exit"));
        assert!(!is_exit_word("exit now"));
    }

    #[test]
    fn test_execute_updates_state() {
        let handler = CommandHandler::new();
        let display = DisplayManager::new();
        let mut state = SessionState::new(SearchParams::default());

        assert!(handler.execute(parse("/topk 2"), &mut state, &display).unwrap());
        assert!(handler.execute(parse("/threshold 0.5"), &mut state, &display).unwrap());
        assert_eq!(state.params().top_k, 2);
        assert_eq!(state.params().min_score, 0.5);

        assert!(!handler.execute(Command::Exit, &mut state, &display).unwrap());
    }
}
