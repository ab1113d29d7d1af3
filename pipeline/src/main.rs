//! `simword`: generate and publish daily word puzzles.
//!
//! # Commands
//!
//! - `daily` (default): publish the next puzzle
//! - `candidates`: export the candidate word pool
//! - `rank`: write the top ranking for one word

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use simword_pipeline::{
    DailyPipeline, PipelineConfig, RunOutcome, export_candidates, load_context, write_ranking,
};

#[derive(Parser)]
#[command(name = "simword")]
#[command(about = "Generate daily semantic word puzzles")]
#[command(version)]
struct Cli {
    /// Config file, overriding $SIMWORD_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a target, rank it and publish the next puzzle
    Daily {
        /// Puzzle store root
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export the candidate pool, one word per line
    Candidates {
        #[arg(long, default_value = "candidate_words.txt")]
        output: PathBuf,
    },
    /// Rank the vocabulary against a word
    ///
    /// Without WORD a target is drawn from the candidate pool.
    Rank {
        word: Option<String>,

        /// Directory for top1000_<word>.json
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = PipelineConfig::load_from(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Daily { output: None }) {
        Commands::Daily { output } => {
            if let Some(root) = output {
                config = config.with_output_dir(root);
            }
            let pipeline = DailyPipeline::new(config)
                .await
                .context("failed to initialize pipeline")?;
            match pipeline.run().await.context("daily run failed")? {
                RunOutcome::Published(puzzle) => println!("{}", puzzle.index),
                RunOutcome::AlreadyPublished { index, .. } => println!("{index}"),
            }
        }
        Commands::Candidates { output } => {
            let context = load_context(&config.lexicon).await?;
            let written =
                export_candidates(&context, config.lexicon.candidate_threshold, &output).await?;
            println!("{written}");
        }
        Commands::Rank { word, output } => {
            let pipeline = DailyPipeline::new(config)
                .await
                .context("failed to initialize pipeline")?;
            let ranking = pipeline.rank_word(word.as_deref()).await?;
            let path = write_ranking(&ranking, &output).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
