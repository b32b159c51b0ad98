use blackjack_strategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Most cards accepted per hand on the command line.
pub const MAX_CARDS_PER_HAND: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value: {0}")]
    InvalidValue(#[from] serde::de::value::Error),
}

/// Problems with the cards typed on the command line.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("you can enter up to 4 cards for each hand, got {0}")]
    TooManyCards(usize),
    #[error("no dealer card given")]
    MissingDealerCard,
    #[error(transparent)]
    Strategy(#[from] blackjack_strategy::StrategyError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub strategy_builder: ConfigStrategyBuilder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub count_threshold: i32,
    pub tie_break: String,
}

impl Default for ConfigRule {
    fn default() -> Self {
        let rule = blackjack_strategy::Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            count_threshold: rule.count_threshold,
            tie_break: rule.tie_break.to_string(),
        }
    }
}

impl TryInto<blackjack_strategy::Rule> for ConfigRule {
    type Error = serde::de::value::Error;

    fn try_into(self) -> Result<blackjack_strategy::Rule, Self::Error> {
        let rule = blackjack_strategy::Rule {
            number_of_decks: self.number_of_decks,
            count_threshold: self.count_threshold,
            tie_break: self.tie_break.parse()?,
        };

        Ok(rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigStrategyBuilder {
    pub number_of_rounds: u64,
    pub number_of_threads: usize,
    pub seed: u64,
}

impl Default for ConfigStrategyBuilder {
    fn default() -> Self {
        let config = blackjack_strategy::SimulationConfig::default();
        ConfigStrategyBuilder {
            number_of_rounds: config.number_of_rounds,
            number_of_threads: config.number_of_threads,
            seed: config.seed,
        }
    }
}

impl From<ConfigStrategyBuilder> for blackjack_strategy::SimulationConfig {
    fn from(config: ConfigStrategyBuilder) -> Self {
        blackjack_strategy::SimulationConfig {
            number_of_rounds: config.number_of_rounds,
            number_of_threads: config.number_of_threads,
            seed: config.seed,
        }
    }
}

/// Parses the content of a config file. Missing fields take their defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    let filename = filename.as_ref();
    let file_content = fs::read_to_string(filename).map_err(|source| ConfigError::Io {
        path: filename.display().to_string(),
        source,
    })?;
    parse_config(&file_content)
}

/// Splits free text such as "10 A 5" into card symbols.
pub fn split_cards(input: &str) -> Result<Vec<&str>, InputError> {
    let cards: Vec<&str> = input.split_whitespace().collect();
    if cards.len() > MAX_CARDS_PER_HAND {
        return Err(InputError::TooManyCards(cards.len()));
    }
    Ok(cards)
}
