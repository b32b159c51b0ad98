use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::card::{hand_total, DealerUpCard, Face};
use crate::simulation::tally::{ActionCounts, ActionTally};
use crate::{Action, StrategyError, TieBreak, MAX_PLAYER_TOTAL, MIN_PLAYER_TOTAL};

/// Recommended action per (player total, dealer up card). Cells that were
/// never observed during simulation are absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StrategyMatrix {
    data: BTreeMap<(u16, DealerUpCard), Action>,
}

/// One cell of a matrix in a flat, serialisable form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixEntry {
    pub player_total: u16,
    pub dealer_up: DealerUpCard,
    pub action: Action,
}

/// Collapses the tally into one action per cell, picking the most frequent
/// action. Cells with a player total outside [4, 21] are dropped.
pub fn reduce(tally: &ActionTally, tie_break: TieBreak) -> StrategyMatrix {
    let mut data = BTreeMap::new();
    let mut dropped = 0;
    for (&(player_total, dealer_up), counts) in tally.iter() {
        if !(MIN_PLAYER_TOTAL..=MAX_PLAYER_TOTAL).contains(&player_total) {
            dropped += 1;
            continue;
        }
        if let Some(action) = most_common_action(counts, tie_break) {
            data.insert((player_total, dealer_up), action);
        }
    }
    if dropped > 0 {
        warn!(dropped, "ignored tally cells with out-of-range player totals");
    }
    StrategyMatrix { data }
}

fn most_common_action(counts: &ActionCounts, tie_break: TieBreak) -> Option<Action> {
    let mut best: Option<(Action, u64)> = None;
    for (action, count) in counts.iter() {
        best = match best {
            None => Some((action, count)),
            Some((_, best_count)) if count > best_count => Some((action, count)),
            Some((best_action, best_count)) if count == best_count => match tie_break {
                TieBreak::FixedPriority if action.priority() < best_action.priority() => {
                    Some((action, count))
                }
                _ => best,
            },
            _ => best,
        };
    }
    best.map(|(action, _)| action)
}

impl StrategyMatrix {
    pub fn get(&self, player_total: u16, dealer_up: DealerUpCard) -> Option<Action> {
        self.data.get(&(player_total, dealer_up)).copied()
    }

    pub fn contains_state(&self, player_total: u16, dealer_up: DealerUpCard) -> bool {
        self.data.contains_key(&(player_total, dealer_up))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Looks up the recommendation for a player hand against a dealer up card.
    ///
    /// Fails with `InvalidHand` when the hand totals outside [4, 21] and with
    /// `MissingEntry` when the cell was never observed.
    pub fn lookup(&self, player_hand: &[Face], dealer_up: Face) -> Result<Action, StrategyError> {
        let total = hand_total(player_hand);
        if !(MIN_PLAYER_TOTAL..=MAX_PLAYER_TOTAL).contains(&total) {
            return Err(StrategyError::InvalidHand { total });
        }
        let dealer_up = DealerUpCard::from(dealer_up);
        self.get(total, dealer_up)
            .ok_or(StrategyError::MissingEntry {
                player_total: total,
                dealer_up,
            })
    }

    pub fn entries(&self) -> Vec<MatrixEntry> {
        self.data
            .iter()
            .map(|(&(player_total, dealer_up), &action)| MatrixEntry {
                player_total,
                dealer_up,
                action,
            })
            .collect()
    }
}

/// Renders the matrix as a grid: one row per player total, one column per
/// dealer up card. Missing cells are shown as `-`.
impl fmt::Display for StrategyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "")?;
        for dealer_up in DealerUpCard::all() {
            write!(f, "{:>4}", dealer_up.to_string())?;
        }
        writeln!(f)?;
        for player_total in MIN_PLAYER_TOTAL..=MAX_PLAYER_TOTAL {
            write!(f, "{:>5}", player_total)?;
            for dealer_up in DealerUpCard::all() {
                let cell = self
                    .get(player_total, dealer_up)
                    .map_or('-', |action| action.abbreviation());
                write!(f, "{:>4}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
