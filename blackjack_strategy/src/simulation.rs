pub mod shoe;
pub mod tally;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::card::{hand_total, DealerUpCard, Face};
use crate::strategy::{CountingStrategy, InitialSituation, Strategy};
use crate::{Action, Rule, StrategyError, DEFAULT_NUMBER_OF_ROUNDS};

use self::shoe::{new_shoe, Shoe};
use self::tally::ActionTally;

pub const DEFAULT_SEED: u64 = 0x5EED_B1AC_4AC4;

/// Cards dealt per round: two for the player, two for the dealer.
const CARDS_PER_ROUND: usize = 4;

/// What one simulated round produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundObservation {
    pub player_total: u16,
    pub dealer_up: DealerUpCard,
    pub action: Action,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub number_of_rounds: u64,
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            number_of_rounds: DEFAULT_NUMBER_OF_ROUNDS,
            number_of_threads: 0,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    fn resolve_number_of_threads(&self) -> usize {
        let number_of_threads = {
            if self.number_of_threads == 0 {
                let parallelism = std::thread::available_parallelism();
                match parallelism {
                    Ok(n) => n.get(),
                    Err(_) => 1,
                }
            } else {
                self.number_of_threads
            }
        };
        let max_useful = usize::try_from(self.number_of_rounds)
            .unwrap_or(usize::MAX)
            .max(1);
        number_of_threads.min(max_useful)
    }
}

/// Plays one round from the top of `shoe`: player, player, dealer, dealer.
/// The running count is taken over the cards left after the deal.
pub fn play_round<T: Strategy>(
    rule: &Rule,
    strategy: &T,
    shoe: &mut Shoe,
) -> Result<RoundObservation, StrategyError> {
    let available = shoe.remaining().len();
    let mut deal = || {
        shoe.deal_card().ok_or(StrategyError::NotEnoughCards {
            needed: CARDS_PER_ROUND,
            available,
        })
    };
    let player_hand: [Face; 2] = [deal()?, deal()?];
    let dealer_hand: [Face; 2] = [deal()?, deal()?];

    let situation = InitialSituation {
        hand_cards: (player_hand[0], player_hand[1]),
        dealer_up_card: DealerUpCard::from(dealer_hand[0]),
        running_count: shoe.running_count(),
    };
    let action = strategy.make_decision(rule, &situation);

    Ok(RoundObservation {
        player_total: hand_total(&player_hand),
        dealer_up: situation.dealer_up_card,
        action,
    })
}

/// Runs rounds `start..end`. Round `i` is dealt from a fresh shoe shuffled by
/// an RNG seeded with `seed + i`, so the outcome of a round does not depend on
/// which worker runs it.
fn simulate_rounds<T: Strategy>(
    rule: &Rule,
    strategy: &T,
    seed: u64,
    start: u64,
    end: u64,
) -> Result<ActionTally, StrategyError> {
    let mut tally = ActionTally::new();
    for round in start..end {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(round));
        let mut shoe = new_shoe(rule.number_of_decks, &mut rng);
        let observation = play_round(rule, strategy, &mut shoe)?;
        tally.record(&observation);
    }
    Ok(tally)
}

/// Monte Carlo aggregation with the counting strategy. Rounds are split into
/// contiguous chunks, one per thread, and the per-thread tallies are merged in
/// chunk order. The result only depends on the rule, the seed and the number
/// of rounds.
pub fn simulate(rule: &Rule, config: &SimulationConfig) -> Result<ActionTally, StrategyError> {
    simulate_with_strategy(rule, &CountingStrategy, config)
}

pub fn simulate_with_strategy<T: Strategy + Sync>(
    rule: &Rule,
    strategy: &T,
    config: &SimulationConfig,
) -> Result<ActionTally, StrategyError> {
    rule.validate()?;
    let number_of_rounds = config.number_of_rounds;
    let number_of_threads = config.resolve_number_of_threads();
    info!(
        number_of_rounds,
        number_of_threads,
        number_of_decks = rule.number_of_decks,
        seed = config.seed,
        "starting simulation"
    );
    let start_time = Instant::now();

    let chunk = number_of_rounds.div_ceil(number_of_threads as u64);
    let tally = if number_of_threads <= 1 {
        simulate_rounds(rule, strategy, config.seed, 0, number_of_rounds)?
    } else {
        let partials = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(number_of_threads);
            for worker in 0..number_of_threads as u64 {
                let start = worker * chunk;
                if start >= number_of_rounds {
                    break;
                }
                let end = ((worker + 1) * chunk).min(number_of_rounds);
                handles.push(scope.spawn(move || {
                    debug!(worker, start, end, "worker started");
                    simulate_rounds(rule, strategy, config.seed, start, end)
                }));
            }
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(partial) => partial,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect::<Vec<_>>()
        });

        let mut tally = ActionTally::new();
        for partial in partials {
            tally.merge(partial?);
        }
        tally
    };

    info!(
        rounds = tally.total_rounds(),
        cells = tally.len(),
        elapsed = ?start_time.elapsed(),
        "simulation complete"
    );
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(symbols: &[&str]) -> Vec<Face> {
        symbols.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn round_deals_player_then_dealer() {
        let mut shoe = Shoe::from_cards(faces(&["10", "6", "A", "9", "2"]));
        let observation = play_round(&Rule::default(), &CountingStrategy, &mut shoe).unwrap();
        assert_eq!(observation.player_total, 16);
        assert_eq!(observation.dealer_up, DealerUpCard::Ace);
        assert_eq!(observation.action, Action::Hit);
        assert_eq!(shoe.remaining(), &[Face::Two]);
    }

    #[test]
    fn short_shoe_is_an_error() {
        let mut shoe = Shoe::from_cards(faces(&["10", "6", "A"]));
        assert_eq!(
            play_round(&Rule::default(), &CountingStrategy, &mut shoe),
            Err(StrategyError::NotEnoughCards {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn pair_of_eights_splits_with_forced_high_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut cards = faces(&["8", "8", "6", "10"]);
        cards.extend(faces(&["2", "3", "4", "5", "6", "2", "3", "4"]));
        let mut shoe = Shoe::from_cards(cards);
        assert!(shoe.remaining()[4..].iter().map(|f| f.hi_lo()).sum::<i32>() > 5);
        let observation = play_round(&Rule::default(), &CountingStrategy, &mut shoe).unwrap();
        assert_eq!(observation.player_total, 16);
        assert_eq!(observation.dealer_up, DealerUpCard::Value(6));
        assert_eq!(observation.action, Action::Split);

        // Same hand from a full shuffled shoe.
        let mut shoe = Shoe::new(6);
        shoe.shuffle_with_firsts(&faces(&["8", "8", "6"]), &mut rng).unwrap();
        let observation = play_round(&Rule::default(), &CountingStrategy, &mut shoe).unwrap();
        assert_eq!(observation.action, Action::Split);
    }

    #[test]
    fn nine_doubles_with_forced_high_count() {
        for dealer in ["2", "6", "7", "10", "K", "A"] {
            let mut cards = faces(&["5", "4", dealer, "9"]);
            cards.extend(faces(&["2", "3", "4", "5", "6", "2", "7"]));
            let mut shoe = Shoe::from_cards(cards);
            let observation = play_round(&Rule::default(), &CountingStrategy, &mut shoe).unwrap();
            assert_eq!(shoe.running_count(), 6);
            assert_eq!(observation.player_total, 9);
            assert_eq!(observation.action, Action::Double);
        }
    }

    #[test]
    fn nine_hits_without_high_count() {
        let mut shoe = Shoe::from_cards(faces(&["5", "4", "7", "9", "K", "2"]));
        let observation = play_round(&Rule::default(), &CountingStrategy, &mut shoe).unwrap();
        assert_eq!(observation.action, Action::Hit);
    }

    #[test]
    fn simulation_counts_every_round() {
        let config = SimulationConfig {
            number_of_rounds: 2_000,
            number_of_threads: 1,
            seed: 5,
        };
        let tally = simulate(&Rule::default(), &config).unwrap();
        assert_eq!(tally.total_rounds(), 2_000);
        for ((player_total, _), _) in tally.iter() {
            assert!((4..=21).contains(player_total));
        }
    }

    #[test]
    fn zero_rounds_gives_empty_tally() {
        let config = SimulationConfig {
            number_of_rounds: 0,
            ..Default::default()
        };
        assert!(simulate(&Rule::default(), &config).unwrap().is_empty());
    }

    #[test]
    fn same_seed_gives_same_tally() {
        let config = SimulationConfig {
            number_of_rounds: 3_000,
            number_of_threads: 1,
            seed: 99,
        };
        let rule = Rule::default();
        let a = simulate(&rule, &config).unwrap();
        let b = simulate(&rule, &config).unwrap();
        assert_eq!(a, b);

        let c = simulate(
            &rule,
            &SimulationConfig {
                seed: 100,
                ..config
            },
        )
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn thread_count_does_not_change_tally() {
        let rule = Rule::default();
        let sequential = simulate(
            &rule,
            &SimulationConfig {
                number_of_rounds: 5_001,
                number_of_threads: 1,
                seed: 8,
            },
        )
        .unwrap();
        for number_of_threads in [2, 3, 8] {
            let parallel = simulate(
                &rule,
                &SimulationConfig {
                    number_of_rounds: 5_001,
                    number_of_threads,
                    seed: 8,
                },
            )
            .unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn more_threads_than_rounds() {
        let config = SimulationConfig {
            number_of_rounds: 3,
            number_of_threads: 16,
            seed: 1,
        };
        assert_eq!(
            simulate(&Rule::default(), &config).unwrap().total_rounds(),
            3
        );
    }
}
