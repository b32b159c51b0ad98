mod report;

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use blackjack_drivers::{parse_config_from_file, Config};
use blackjack_strategy::{build_strategy_with, Rule, SimulationConfig};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of rounds to simulate, overriding the config file
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Seed of the shuffles, overriding the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Player cards, e.g. "10 A 5 6"
    #[arg(short, long)]
    player: Option<String>,

    /// Dealer card, e.g. "7"
    #[arg(short, long, default_value_t = String::from("7"))]
    dealer: String,

    /// Write the matrix as YAML to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Loads the config. The default path may be absent, in which case built-in
/// defaults are used; an explicitly given path must exist.
fn load_config(args: &CommandLineArgs) -> Result<Config, Box<dyn Error>> {
    if args.config != DEFAULT_CONFIG_PATH {
        return Ok(parse_config_from_file(&args.config)?);
    }
    let home_dir = home::home_dir().ok_or("Cannot find home directory")?;
    let config_file_path = home_dir.join(".blackjack.yml");
    if !config_file_path.exists() {
        info!(path = %config_file_path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    if config_file_path.is_dir() {
        return Err("This should be a path rather than a directory".into());
    }
    Ok(parse_config_from_file(&config_file_path)?)
}

fn run(args: CommandLineArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;
    let rule: Rule = config
        .rule
        .try_into()
        .map_err(blackjack_drivers::ConfigError::from)?;
    let mut simulation_config: SimulationConfig = config.strategy_builder.into();
    if let Some(rounds) = args.rounds {
        simulation_config.number_of_rounds = rounds;
    }
    if let Some(seed) = args.seed {
        simulation_config.seed = seed;
    }

    let matrix = build_strategy_with(&rule, &simulation_config)?;

    println!("Strategy Matrix:");
    println!("{}", matrix);

    if let Some(output) = &args.output {
        fs::write(output, serde_yaml::to_string(&matrix.entries())?)?;
        info!(path = %output.display(), cells = matrix.len(), "matrix written");
    }

    if let Some(player) = &args.player {
        println!(
            "{}",
            report::describe_recommendation(&matrix, player, &args.dealer)?
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
