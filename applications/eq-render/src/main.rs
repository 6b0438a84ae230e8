//! Simple EQ Render - offline host for the three-band equalizer

use anyhow::Context;
use clap::{Parser, Subcommand};
use simple_eq_render::{build_parameters, config, render, response_points, ParamOverride, RenderOptions};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "simple-eq-render")]
#[command(about = "Render audio through the Simple EQ three-band equalizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the equalizer
    Render {
        /// Input WAV (mono or stereo)
        #[arg(short, long)]
        input: PathBuf,
        /// Output WAV, same format as the input
        #[arg(short, long)]
        output: PathBuf,
        /// State file to start from
        #[arg(short, long)]
        state: Option<PathBuf>,
        /// Parameter override, e.g. --set "Peak Gain=6"
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<ParamOverride>,
        /// Frames per processing block
        #[arg(short, long, default_value_t = 512)]
        block_size: usize,
        /// Configuration file (TOML)
        #[arg(short, long, env = "SIMPLE_EQ_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the magnitude response as JSON
    Response {
        /// State file to start from
        #[arg(short, long)]
        state: Option<PathBuf>,
        /// Parameter override, e.g. --set "LowCut Freq=80"
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<ParamOverride>,
        /// Sample rate the filters are designed for
        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f64,
        /// Number of log-spaced frequencies
        #[arg(long, default_value_t = 200)]
        points: usize,
        /// Configuration file (TOML)
        #[arg(short, long, env = "SIMPLE_EQ_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Write a state file
    SaveState {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
        /// Parameter override, e.g. --set "Peak Freq=1200"
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<ParamOverride>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simple_eq=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            state,
            overrides,
            block_size,
            config,
        } => {
            let config = config::load(config.as_deref())?;
            let params = build_parameters(state.as_deref(), &overrides)?;
            let options = RenderOptions {
                input,
                output,
                block_size,
            };
            render(&options, params, &config)?;
        }
        Commands::Response {
            state,
            overrides,
            sample_rate,
            points,
            config,
        } => {
            let config = config::load(config.as_deref())?;
            let params = build_parameters(state.as_deref(), &overrides)?;
            let response = response_points(params, &config, sample_rate, points)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::SaveState { output, overrides } => {
            let params = build_parameters(None, &overrides)?;
            let blob = params.save_state()?;
            std::fs::write(&output, blob).with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("Saved state to {}", output.display());
        }
    }

    Ok(())
}
