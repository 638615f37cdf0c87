//! Jackpot CLI
//!
//! Play the jackpot reveal sequence headlessly and inspect its configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jackpot_animation::CountUp;
use jackpot_sequence::show::canonical_stages;
use jackpot_sequence::{JackpotConfig, JackpotShow, TriggerOutcome};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod render;

const DEFAULT_CONFIG: &str = "jackpot.toml";

#[derive(Parser)]
#[command(name = "jackpot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jackpot reveal sequence player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the show once and report how every stage settled
    Play {
        /// Config file (defaults apply when it does not exist)
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Override the frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Print frames while the show plays
        #[arg(long)]
        frames: bool,

        /// Override the amount the counter runs up to
        #[arg(long)]
        amount: Option<f32>,
    },

    /// List the stages and their timeouts
    Stages {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            config,
            fps,
            frames,
            amount,
        } => cmd_play(&config, fps, frames, amount),

        Commands::Stages { config } => cmd_stages(&config),

        Commands::Config { config } => cmd_config(&config),
    }
}

fn load_config(path: &Path) -> Result<JackpotConfig> {
    JackpotConfig::load_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn cmd_play(path: &Path, fps: Option<u32>, frames: bool, amount: Option<f32>) -> Result<()> {
    let mut config = load_config(path)?;
    if let Some(fps) = fps {
        config.render.fps = fps;
    }
    if let Some(amount) = amount {
        config.counter.to = amount;
    }
    config.validate().context("Invalid command-line overrides")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(play(config, frames))
}

async fn play(config: JackpotConfig, frames: bool) -> Result<()> {
    let linger = config.linger();
    let tick = render::tick_interval(config.render.fps);
    let (show, mut landed) = JackpotShow::new(config);

    info!(stages = show.controller().stages().len(), "Playing jackpot show");

    let outcome = {
        let play = show.play();
        tokio::pin!(play);
        let mut ticker = tokio::time::interval(tick);
        loop {
            tokio::select! {
                outcome = &mut play => break outcome,
                _ = ticker.tick(), if frames => render::print_frame(&show.frame()),
            }
        }
    };

    let report = match outcome {
        TriggerOutcome::Played(report) => report,
        TriggerOutcome::Ignored => anyhow::bail!("Show was already playing"),
    };

    // Keep drawing while the particles come down
    let deadline = tokio::time::Instant::now() + linger;
    let mut landings = 0;
    let mut ticker = tokio::time::interval(tick);
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,
            id = landed.recv() => match id {
                Some(id) => {
                    landings += 1;
                    tracing::debug!(particle = %id, "particle landed");
                }
                None => break,
            },
            _ = ticker.tick(), if frames => render::print_frame(&show.frame()),
        }
    }

    render::print_report(&report);
    println!("Final frame:  {}", render::frame_line(&show.frame()));
    println!("Landed:       {landings}/{}", show.burst().particles().len());

    if !report.completed {
        warn!("Sequence did not complete");
    }
    Ok(())
}

fn cmd_stages(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let stages = canonical_stages(&config, &CountUp::new(config.count_up()));

    println!("Jackpot stages");
    println!("==============");
    for (index, stage) in stages.iter().enumerate() {
        println!("  {index}. {:<8} timeout {}", stage.id(), render::timeout_label(stage.timeout()));
    }
    match jackpot_sequence::controller::timeout_budget(&stages) {
        Some(budget) => println!("\nWorst case: {}", render::millis(budget)),
        None => println!("\nWorst case: unbounded"),
    }
    Ok(())
}

fn cmd_config(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let printed = config.to_toml().context("Failed to serialize configuration")?;
    print!("{printed}");
    Ok(())
}
