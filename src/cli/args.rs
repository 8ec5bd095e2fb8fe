//! Command-line argument parsing for docchat
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docchat - ask questions about your documents with a local Ollama model
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(version)]
#[command(about = "Chat with your documents using retrieval-augmented generation over Ollama", long_about = None)]
pub struct Args {
    /// Chat model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama host
    #[arg(long)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long)]
    pub port: Option<u16>,

    /// Chunk file produced by `docchat ingest`
    #[arg(long, value_name = "FILE")]
    pub chunks: Option<PathBuf>,

    /// Number of passages to retrieve per question
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Passages must score strictly above this similarity
    #[arg(long, allow_hyphen_values = true)]
    pub min_score: Option<f32>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print answers and errors
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,

    /// Answer a single question and exit
    Ask {
        #[arg(required = true, value_name = "QUESTION")]
        question: Vec<String>,
    },

    /// Show the ranked passages for a query without generating an answer
    Search {
        #[arg(required = true, value_name = "QUERY")]
        query: Vec<String>,
    },

    /// Build the chunk file from a directory of .txt/.md documents
    Ingest {
        /// Directory holding the documents
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output chunk file (defaults to the configured chunk file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run diagnostics: Ollama, models, chunk file
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run; chat when none is given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }
}

impl Commands {
    /// Words of `ask`/`search` joined back into one string
    pub fn text(&self) -> Option<String> {
        match self {
            Commands::Ask { question } => Some(question.join(" ")),
            Commands::Search { query } => Some(query.join(" ")),
            _ => None,
        }
    }
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default log filter for this level (RUST_LOG takes precedence)
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show retrieval scores next to answers
    pub fn show_scores(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
