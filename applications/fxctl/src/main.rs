/// fxctl - Tonebridge effects inspection tool
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use fxctl::{commands, config};
use std::path::PathBuf;
use tonebridge_core::EffectType;
use tonebridge_effects::PolicyPreset;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fxctl")]
#[command(about = "Inspect Tonebridge effect capabilities and persisted state", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tonebridge_effects=trace`
    #[arg(long, global = true, env = "FXCTL_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print capability tables as JSON
    Caps {
        /// Only this effect type
        #[arg(short, long)]
        effect: Option<EffectType>,

        /// Backend policy, overriding the configuration
        #[arg(short, long, value_enum)]
        policy: Option<Policy>,
    },
    /// Print the default persisted state of an effect as base64
    Defaults {
        /// Effect type, e.g. `equalizer`
        effect: EffectType,
    },
    /// Decode a base64 persisted state record
    Inspect {
        /// Effect type the record belongs to
        effect: EffectType,
        /// Base64 record as printed by `defaults`
        data: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Hybrid,
    PipelineOnly,
}

impl From<Policy> for PolicyPreset {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Hybrid => PolicyPreset::Hybrid,
            Policy::PipelineOnly => PolicyPreset::PipelineOnly,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let filter = match &cli.log_level {
        Some(level) => tracing_subscriber::EnvFilter::try_new(level)
            .with_context(|| format!("invalid log filter '{}'", level))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "fxctl=info,tonebridge=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut factory_config =
        config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Caps { effect, policy } => {
            if let Some(policy) = policy {
                config::apply_policy(&mut factory_config, policy.into());
            }
            let tables = commands::caps(&factory_config, effect)?;
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
        Commands::Defaults { effect } => {
            let encoded = commands::defaults(&factory_config, effect)
                .with_context(|| format!("failed to build default {} state", effect))?;
            println!("{}", encoded);
        }
        Commands::Inspect { effect, data } => {
            let value = commands::inspect(&factory_config, effect, &data)
                .with_context(|| format!("failed to decode {} state", effect))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
