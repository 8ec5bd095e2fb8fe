//! Terminal output for answers, sources and search results

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::generation::Passage;
use crate::rag::{ChatReply, ScoredChunk};
use crate::store::chunk::preview_text;

/// Characters of passage text shown by `/sources` and `search`
pub const PREVIEW_CHARS: usize = 400;

/// Display manager for REPL UI
pub struct DisplayManager {
    spinner: Option<ProgressBar>,
    show_progress: bool,
    show_scores: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        Self {
            spinner: None,
            show_progress: true,
            show_scores: false,
        }
    }

    /// Spinner and score display switches, from the verbosity flags
    pub fn with_options(show_progress: bool, show_scores: bool) -> Self {
        Self {
            spinner: None,
            show_progress,
            show_scores,
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, chunks: usize, documents: usize) {
        let rule = "=".repeat(64);
        println!("\n{}", rule.cyan());
        println!("{}", format!("  docchat {} - chat with your documents", version).bold().cyan());
        println!(
            "{}",
            format!("  Model: {} | {} chunks from {} documents", model, chunks, documents).dimmed()
        );
        println!("{}\n", rule.cyan());
        println!(
            "Ask a question (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Spinner while retrieval and generation run
    pub fn start_spinner(&mut self, message: &str) {
        self.finish_current();
        if !self.show_progress {
            return;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    pub fn finish_current(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a pipeline reply
    pub fn show_reply(&mut self, reply: &ChatReply, duration_ms: u64) {
        self.finish_current();
        println!();
        match reply {
            ChatReply::Answered { text, passages, .. } => {
                println!("{}", text);
                if self.show_scores {
                    let sources: Vec<String> = passages
                        .iter()
                        .map(|p| format!("{} ({:.3})", p.source_document, p.score))
                        .collect();
                    println!("\n{} {}", "Sources:".dimmed(), sources.join(", ").dimmed());
                }
            }
            ChatReply::SmallTalk { .. } => println!("{}", reply.message().cyan()),
            ChatReply::NoRelevantDocuments { .. } => println!("{}", reply.message().yellow()),
            ChatReply::GenerationFailed { reason, .. } => {
                println!("{}", reply.message().red());
                if self.show_scores {
                    println!("{} {}", "Reason:".dimmed(), reason.dimmed());
                }
            }
        }
        println!("{}\n", format_duration(duration_ms).dimmed());
    }

    /// Passages behind the last answer
    pub fn show_passages(&self, passages: &[Passage]) {
        if passages.is_empty() {
            println!("{}", "No sources for the last answer.".yellow());
            return;
        }

        self.show_section(&format!("Sources ({})", passages.len()));
        for (i, passage) in passages.iter().enumerate() {
            println!("{}", format_passage_header(i + 1, &passage.source_document, passage.score).cyan());
            println!("{}\n", preview_text(&passage.text, PREVIEW_CHARS));
        }
    }

    /// Ranked chunks from `search`
    pub fn show_search_results(&self, query: &str, results: &[ScoredChunk<'_>], min_score: f32) {
        self.show_section(&format!("Results for \"{}\"", query));
        if results.is_empty() {
            println!("{}", "The chunk store is empty.".yellow());
            return;
        }

        for (i, result) in results.iter().enumerate() {
            let header = format_passage_header(i + 1, result.chunk.source_document(), result.score);
            if result.score > min_score {
                println!("{}", header.green());
            } else {
                println!("{} {}", header.dimmed(), "(below threshold)".dimmed());
            }
            println!("{}\n", result.chunk.preview(PREVIEW_CHARS));
        }
    }

    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }

    pub fn show_error(&mut self, error: &str) {
        self.finish_current();
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        print!("\x1B[2J\x1B[1;1H");
        io::stdout().flush()
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// `[1] a.pdf  score 0.812`
pub fn format_passage_header(rank: usize, source: &str, score: f32) -> String {
    format!("[{}] {}  score {:.3}", rank, source, score)
}

pub fn format_duration(duration_ms: u64) -> String {
    if duration_ms >= 1000 {
        format!("({:.1}s)", duration_ms as f64 / 1000.0)
    } else {
        format!("({}ms)", duration_ms)
    }
}
