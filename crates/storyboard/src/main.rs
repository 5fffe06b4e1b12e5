//! Storyboard CLI binary.
//!
//! Reads a story and prints JSON to stdout:
//! - `segment` scene lines
//! - `characters` the character registry
//! - `analyze` theme, lines and characters
//! - `prompts` one image prompt per scene line

use anyhow::Result;
use clap::Parser;
use storyboard::cli::{
    Cli, Commands, StoryboardSession, load_config, read_story, run_analyze, run_characters,
    run_config, run_prompts, run_segment,
};
use storyboard::{ObservabilityConfig, PromptRefiner, init_observability_with_config};
use tracing::{debug, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // API keys may live in .env
    let _ = dotenvy::dotenv();

    init_observability_with_config(
        ObservabilityConfig::verbose(cli.verbose).with_json_logs(cli.json_logs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Config => {
            run_config(&config, &mut stdout)?;
        }

        Commands::Segment { file } => {
            let story = read_story(&file)?;
            let session = StoryboardSession::new(config, cli.offline)?;
            run_segment(&session, &story, &mut stdout).await?;
        }

        Commands::Characters { file } => {
            let story = read_story(&file)?;
            let session = StoryboardSession::new(config, cli.offline)?;
            run_characters(&session, &story, &mut stdout).await?;
        }

        Commands::Analyze { file } => {
            let story = read_story(&file)?;
            let session = StoryboardSession::new(config, cli.offline)?;
            run_analyze(&session, &story, &mut stdout).await?;
        }

        Commands::Prompts {
            file,
            style,
            length,
            refine,
        } => {
            let story = read_story(&file)?;
            let mut session = StoryboardSession::new(config, cli.offline)?;
            if let Some(style) = style {
                session = session.with_style(style);
            }
            if refine {
                session = session.with_refiner(PromptRefiner::new(length));
            }

            // Ctrl-C stops the run; prompts already built are still printed
            let control = session.control().clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling run");
                    control.cancel();
                }
            });

            run_prompts(&session, &story, &mut stdout).await?;
        }
    }

    Ok(())
}
