pub mod card;
pub mod matrix;
pub mod simulation;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;
use thiserror::Error;

pub use card::{hand_total, value, DealerUpCard, Face};
pub use matrix::{reduce, MatrixEntry, StrategyMatrix};
pub use simulation::tally::{ActionCounts, ActionTally};
pub use simulation::{simulate, RoundObservation, SimulationConfig};

pub const DEFAULT_NUMBER_OF_DECKS: u8 = 6;
pub const DEFAULT_NUMBER_OF_ROUNDS: u64 = 100_000;
pub const DEFAULT_COUNT_THRESHOLD: i32 = 5;

/// Lowest and highest player totals that can appear in a strategy matrix.
pub const MIN_PLAYER_TOTAL: u16 = 4;
pub const MAX_PLAYER_TOTAL: u16 = 21;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub number_of_decks: u8,
    /// The Double override fires when the running count is strictly greater than this.
    pub count_threshold: i32,
    pub tie_break: TieBreak,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: DEFAULT_NUMBER_OF_DECKS,
            count_threshold: DEFAULT_COUNT_THRESHOLD,
            tie_break: TieBreak::FixedPriority,
        }
    }
}

impl Rule {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.number_of_decks == 0 {
            return Err(StrategyError::InvalidRule(String::from(
                "number_of_decks must be at least 1",
            )));
        }
        Ok(())
    }
}

/// How the reducer picks between actions observed equally often.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum TieBreak {
    /// Prefer Stand, then Hit, then Double, then Split.
    FixedPriority,
    /// Prefer whichever tied action was recorded first for the cell.
    FirstSeen,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize_enum_str, Deserialize_enum_str,
)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
}

impl Action {
    /// Rank used by `TieBreak::FixedPriority`. Lower wins.
    pub fn priority(&self) -> u8 {
        match self {
            Action::Stand => 0,
            Action::Hit => 1,
            Action::Double => 2,
            Action::Split => 3,
        }
    }

    /// One-letter code used when rendering a matrix.
    pub fn abbreviation(&self) -> char {
        match self {
            Action::Hit => 'H',
            Action::Stand => 'S',
            Action::Double => 'D',
            Action::Split => 'P',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("invalid hand: player total {total} is outside [4, 21]")]
    InvalidHand { total: u16 },
    #[error("no simulated data for player total {player_total} against dealer {dealer_up}")]
    MissingEntry {
        player_total: u16,
        dealer_up: DealerUpCard,
    },
    #[error("invalid card: {0:?}")]
    InvalidCard(String),
    #[error("not enough cards in shoe: needed {needed}, available {available}")]
    NotEnoughCards { needed: usize, available: usize },
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

/// Simulates `number_of_rounds` rounds from `number_of_decks`-deck shoes and
/// reduces them into a strategy matrix, using the default seed and threads.
pub fn build_strategy(
    number_of_rounds: u64,
    number_of_decks: u8,
) -> Result<StrategyMatrix, StrategyError> {
    let rule = Rule {
        number_of_decks,
        ..Default::default()
    };
    let config = SimulationConfig {
        number_of_rounds,
        ..Default::default()
    };
    build_strategy_with(&rule, &config)
}

pub fn build_strategy_with(
    rule: &Rule,
    config: &SimulationConfig,
) -> Result<StrategyMatrix, StrategyError> {
    let tally = simulate(rule, config)?;
    Ok(reduce(&tally, rule.tie_break))
}

/// Parses raw card faces and looks the hand up in `matrix`.
pub fn recommend(
    matrix: &StrategyMatrix,
    player_cards: &[&str],
    dealer_card: &str,
) -> Result<Action, StrategyError> {
    let player_hand = player_cards
        .iter()
        .map(|card| card.parse::<Face>())
        .collect::<Result<Vec<_>, _>>()?;
    let dealer_up: Face = dealer_card.parse()?;
    matrix.lookup(&player_hand, dealer_up)
}
