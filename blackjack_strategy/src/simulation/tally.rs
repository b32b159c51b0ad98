use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Index;

use crate::card::DealerUpCard;
use crate::Action;

use super::RoundObservation;

/// Occurrence counts of each action for one (player total, dealer up card)
/// cell, kept in the order the actions were first recorded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionCounts {
    counts: Vec<(Action, u64)>,
}

impl ActionCounts {
    pub fn add(&mut self, action: Action, count: u64) {
        match self.counts.iter_mut().find(|(a, _)| *a == action) {
            Some((_, c)) => *c += count,
            None => self.counts.push((action, count)),
        }
    }

    pub fn get(&self, action: Action) -> u64 {
        self.counts
            .iter()
            .find(|(a, _)| *a == action)
            .map_or(0, |(_, c)| *c)
    }

    /// Actions with their counts, in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, u64)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

/// Frequency table built by the Monte Carlo aggregator. Keyed by
/// (player total, dealer up card).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionTally {
    data: BTreeMap<(u16, DealerUpCard), ActionCounts>,
}

impl ActionTally {
    pub fn new() -> ActionTally {
        ActionTally {
            data: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, observation: &RoundObservation) {
        self.data
            .entry((observation.player_total, observation.dealer_up))
            .or_default()
            .add(observation.action, 1);
    }

    /// Adds every count of `other` into `self`. Actions that are new to a cell
    /// are appended after the ones `self` already has, so merging worker
    /// tallies in round order keeps the first-recorded order of a sequential run.
    pub fn merge(&mut self, other: ActionTally) {
        for (key, counts) in other.data {
            let cell = self.data.entry(key).or_default();
            for (action, count) in counts.counts {
                cell.add(action, count);
            }
        }
    }

    pub fn get(&self, player_total: u16, dealer_up: DealerUpCard) -> Option<&ActionCounts> {
        self.data.get(&(player_total, dealer_up))
    }

    pub fn contains_state(&self, player_total: u16, dealer_up: DealerUpCard) -> bool {
        self.data.contains_key(&(player_total, dealer_up))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, (u16, DealerUpCard), ActionCounts> {
        self.data.iter()
    }

    /// Number of distinct cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of rounds recorded.
    pub fn total_rounds(&self) -> u64 {
        self.data.values().map(ActionCounts::total).sum()
    }
}

impl Index<(u16, DealerUpCard)> for ActionTally {
    type Output = ActionCounts;
    fn index(&self, index: (u16, DealerUpCard)) -> &Self::Output {
        &self.data[&index]
    }
}

impl FromIterator<RoundObservation> for ActionTally {
    fn from_iter<I: IntoIterator<Item = RoundObservation>>(iter: I) -> Self {
        let mut tally = ActionTally::new();
        for observation in iter {
            tally.record(&observation);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(player_total: u16, dealer_up: DealerUpCard, action: Action) -> RoundObservation {
        RoundObservation {
            player_total,
            dealer_up,
            action,
        }
    }

    #[test]
    fn records_keep_first_seen_order() {
        let mut tally = ActionTally::new();
        tally.record(&observation(12, DealerUpCard::Ace, Action::Split));
        tally.record(&observation(12, DealerUpCard::Ace, Action::Hit));
        tally.record(&observation(12, DealerUpCard::Ace, Action::Split));

        let cell = &tally[(12, DealerUpCard::Ace)];
        assert_eq!(
            cell.iter().collect::<Vec<_>>(),
            vec![(Action::Split, 2), (Action::Hit, 1)]
        );
        assert_eq!(cell.get(Action::Stand), 0);
        assert_eq!(tally.total_rounds(), 3);
        assert_eq!(tally.len(), 1);
    }

    #[test]
    fn ace_and_ten_are_different_cells() {
        let mut tally = ActionTally::new();
        tally.record(&observation(15, DealerUpCard::Ace, Action::Hit));
        tally.record(&observation(15, DealerUpCard::Value(10), Action::Hit));
        assert_eq!(tally.len(), 2);
        assert_eq!(
            tally.get(15, DealerUpCard::Ace).map(|cell| cell.get(Action::Hit)),
            Some(1)
        );
        assert!(tally.get(15, DealerUpCard::Value(9)).is_none());
        assert!(!tally.contains_state(15, DealerUpCard::Value(11)));
    }

    #[test]
    fn merge_matches_sequential_recording() {
        let observations = vec![
            observation(10, DealerUpCard::Value(6), Action::Hit),
            observation(16, DealerUpCard::Value(6), Action::Split),
            observation(10, DealerUpCard::Value(6), Action::Double),
            observation(16, DealerUpCard::Value(6), Action::Stand),
            observation(20, DealerUpCard::Ace, Action::Stand),
        ];
        let sequential: ActionTally = observations.iter().copied().collect();

        let mut merged: ActionTally = observations[..2].iter().copied().collect();
        merged.merge(observations[2..].iter().copied().collect());
        assert_eq!(merged, sequential);

        // Counts are the same whichever side is merged into.
        let mut reversed: ActionTally = observations[2..].iter().copied().collect();
        reversed.merge(observations[..2].iter().copied().collect());
        for (key, counts) in sequential.iter() {
            for (action, count) in counts.iter() {
                assert_eq!(reversed[*key].get(action), count);
            }
        }
    }
}
