//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storyboard_core::PromptLength;

/// Storyboard - turn a story into consistent per-scene image prompts
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(about = "Turn a story into consistent per-scene image prompts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to layered storyboard.toml lookup)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the model and use the deterministic fallbacks only
    #[arg(long, global = true)]
    pub offline: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a story into scene lines
    Segment {
        /// Story file, or `-` for stdin
        file: PathBuf,
    },

    /// Extract the deduplicated character registry
    Characters {
        /// Story file, or `-` for stdin
        file: PathBuf,
    },

    /// Theme, scene lines and characters in one report
    Analyze {
        /// Story file, or `-` for stdin
        file: PathBuf,
    },

    /// Build one image prompt per scene line
    Prompts {
        /// Story file, or `-` for stdin
        file: PathBuf,

        /// Style block replacing the configured style lock
        #[arg(long)]
        style: Option<String>,

        /// Length preset for refined prompts
        #[arg(long, default_value_t = PromptLength::Balanced)]
        length: PromptLength,

        /// Ask the model to rewrite each assembled prompt
        #[arg(long)]
        refine: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}
