//! Interactive chat loop
//!
//! Reads questions with rustyline, dispatches `/` commands, and sends
//! everything else through the [`ChatPipeline`] with the session's current
//! search parameters.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::rag::{ChatPipeline, SearchParams};
use crate::repl::commands::{is_command, is_exit_word, Command, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputHandler, InputLine};
pub use crate::repl::session::{Exchange, ExchangeStatus, SessionState};

/// What to do with one line of input
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Skip,
    Exit,
    Command(Command),
    Question(String),
}

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    state: SessionState,
    display: DisplayManager,
}

impl ReplSession {
    pub fn new(params: SearchParams, display: DisplayManager) -> Result<Self> {
        Ok(Self::from_parts(InputHandler::new()?, params, display))
    }

    /// Session whose question history persists in `history_path`
    pub fn with_history(history_path: PathBuf, params: SearchParams, display: DisplayManager) -> Result<Self> {
        Ok(Self::from_parts(InputHandler::with_history(history_path)?, params, display))
    }

    fn from_parts(input_handler: InputHandler, params: SearchParams, display: DisplayManager) -> Self {
        Self {
            input_handler,
            command_handler: CommandHandler::new(),
            state: SessionState::new(params),
            display,
        }
    }

    pub fn show_welcome(&self, version: &str, model: &str, chunks: usize, documents: usize) {
        self.display.show_banner(version, model, chunks, documents);
    }

    /// Classify a line of input
    pub fn classify(&self, input: &str) -> InputAction {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            InputAction::Skip
        } else if is_exit_word(trimmed) {
            InputAction::Exit
        } else if is_command(trimmed) {
            InputAction::Command(self.command_handler.parse(trimmed))
        } else {
            InputAction::Question(trimmed.to_string())
        }
    }

    /// Run until `/exit`, `exit`, `quit`, a goodbye or Ctrl-D
    pub async fn run(&mut self, pipeline: &ChatPipeline) -> Result<()> {
        loop {
            let line = match self.input_handler.read_line()? {
                InputLine::Text(line) => line,
                InputLine::Interrupted => continue,
                InputLine::Eof => break,
            };

            match self.classify(&line) {
                InputAction::Skip => {}
                InputAction::Exit => {
                    self.command_handler
                        .execute(Command::Exit, &mut self.state, &self.display)?;
                    break;
                }
                InputAction::Command(command) => {
                    if !self
                        .command_handler
                        .execute(command, &mut self.state, &self.display)?
                    {
                        break;
                    }
                }
                InputAction::Question(question) => {
                    if !self.ask(pipeline, &question).await {
                        break;
                    }
                }
            }
        }

        self.save()
    }

    /// Answer one question and record it in the session.
    ///
    /// Returns false when the reply ends the conversation.
    pub async fn ask(&mut self, pipeline: &ChatPipeline, question: &str) -> bool {
        let start = Instant::now();
        self.display.start_spinner("Searching documents...");
        let params = *self.state.params();

        match pipeline.answer_with_params(question, &params).await {
            Ok(reply) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                self.state.record_reply(question, &reply, duration_ms);
                self.display.show_reply(&reply, duration_ms);
                !reply.ends_conversation()
            }
            Err(e) => {
                let message = ChatPipeline::fallback_message(question, &e);
                self.state
                    .record_failure(question, message, start.elapsed().as_millis() as u64);
                self.display.show_error(message);
                true
            }
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }
}
