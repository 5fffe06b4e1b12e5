//! Command-line interface.
//!
//! Command definitions live in `commands`; handlers in `run` write JSON to
//! any `Write` so they can be exercised without a terminal.

mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{
    StoryboardSession, build_generator, load_config, read_story, run_analyze, run_characters,
    run_config, run_prompts, run_segment,
};
