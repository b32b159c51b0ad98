use crate::card::{hand_total, value, DealerUpCard, Face};
use crate::{Action, Rule};

/// Everything a strategy gets to see in a round: the player's first two cards,
/// the dealer's up card and the running count of the undealt cards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InitialSituation {
    pub hand_cards: (Face, Face),
    pub dealer_up_card: DealerUpCard,
    pub running_count: i32,
}

impl InitialSituation {
    pub fn player_total(&self) -> u16 {
        hand_total(&[self.hand_cards.0, self.hand_cards.1])
    }
}

pub trait Strategy {
    fn make_decision(&self, rule: &Rule, situation: &InitialSituation) -> Action;
}

/// Basic strategy, then the count-based Double override, then the pair Split
/// override. Each layer may replace the action of the layer before it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingStrategy;

impl Strategy for CountingStrategy {
    fn make_decision(&self, rule: &Rule, situation: &InitialSituation) -> Action {
        let player_total = situation.player_total();
        let mut decision = basic_strategy(player_total, situation.dealer_up_card);

        if situation.running_count > rule.count_threshold && (9..=11).contains(&player_total) {
            decision = Action::Double;
        }

        let (first, second) = situation.hand_cards;
        if first == second && (first == Face::Eight || first == Face::Ace) {
            decision = Action::Split;
        }

        decision
    }
}

/// Hit on 11 or less, stand on 17 or more. In between, hit against a 7 or
/// higher and against an ace.
pub fn basic_strategy(player_total: u16, dealer_up_card: DealerUpCard) -> Action {
    if player_total <= 11 {
        Action::Hit
    } else if player_total >= 17 {
        Action::Stand
    } else {
        match dealer_up_card {
            DealerUpCard::Ace => Action::Hit,
            DealerUpCard::Value(v) if v >= value(Face::Seven) => Action::Hit,
            DealerUpCard::Value(_) => Action::Stand,
        }
    }
}
