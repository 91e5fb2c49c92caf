//! dicer - roll tabletop dice formulas from the command line

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dicer::feedback::LogSounds;
use dicer::skin::SkinRegistry;
use dicer::source::{DiceSource, Stalled, Tumbler};
use dicer::{parse, Config, RollController, RollOutcome, RollResult, Visibility};

/// Dice formula roller
#[derive(Parser, Debug)]
#[command(name = "dicer", version, about = "Roll tabletop dice formulas")]
struct Args {
    /// TOML config file (default: ./dicer.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a formula such as "2d6+3" or "4dF+1"
    Roll {
        formula: String,

        /// Label shown with the result (default: "Roll of <formula>")
        #[arg(short, long)]
        label: Option<String>,

        /// Who is rolling
        #[arg(short, long, default_value = "Player")]
        author: String,

        /// Dice skin id (see `dicer skins`)
        #[arg(long)]
        skin: Option<String>,

        /// Who may see the roll: public or private
        #[arg(long)]
        visibility: Option<Visibility>,

        /// Use a dice source that never answers, forcing the watchdog
        #[arg(long)]
        stall: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how a formula is parsed
    Parse { formula: String },
    /// List available dice skins
    Skins,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dicer=info".into()),
        )
        .with(
            args.log_json
                .then(|| fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with((!args.log_json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    match args.command {
        Command::Roll {
            formula,
            label,
            author,
            skin,
            visibility,
            stall,
            json,
        } => {
            let mut config = Config::load(args.config.as_deref())?;
            if let Some(skin) = skin {
                if !SkinRegistry::new().contains(&skin) {
                    bail!("unknown skin {:?}; see `dicer skins`", skin);
                }
                config.preferences.skin_id = skin;
            }
            if let Some(visibility) = visibility {
                config.preferences.visibility = visibility;
            }

            // The library drops unrollable formulas silently; tell the user why
            let parsed = parse(&formula);
            if parsed.is_empty() {
                bail!("no dice to roll in {:?}", formula);
            }
            if parsed.total_dice() > u64::from(config.max_dice) {
                bail!(
                    "{:?} asks for {} dice, at most {} allowed",
                    formula,
                    parsed.total_dice(),
                    config.max_dice
                );
            }

            let label = label.unwrap_or_else(|| format!("Roll of {}", formula));
            let result = if stall {
                roll(Stalled, &config, &formula, &label, &author).await?
            } else {
                let tumbler = Tumbler::new(&config.tumbler);
                roll(tumbler, &config, &formula, &label, &author).await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Command::Parse { formula } => {
            let parsed = parse(&formula);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Skins => {
            for skin in SkinRegistry::new().list() {
                println!("{:<16} {:<18} {} on {}", skin.id, skin.name, skin.text_color, skin.hex_color);
            }
        }
    }

    Ok(())
}

async fn roll<S: DiceSource>(
    source: S,
    config: &Config,
    formula: &str,
    label: &str,
    author: &str,
) -> Result<RollResult> {
    let controller = RollController::with_sounds(source, config, LogSounds);
    match controller.roll(formula, label, author).await {
        Some(result) => Ok(result),
        None => bail!("roll of {:?} did not complete", formula),
    }
}

fn print_result(result: &RollResult) {
    println!("{}", result.label);
    println!("  {}", result.total);
    println!("  {}", result.breakdown);
    match result.outcome {
        RollOutcome::CriticalSuccess => println!("  CRITICAL SUCCESS"),
        RollOutcome::CriticalFailure => println!("  CRITICAL FAILURE"),
        RollOutcome::Neutral => {}
    }
    if result.approximate {
        println!("  (dice source timed out; fallback dice used)");
    }
}
