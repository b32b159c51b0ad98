use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use strum_macros::EnumIter;

use crate::StrategyError;

const BLACKJACK: u16 = 21;

/// A card face. Suits play no part in the simulation, so they are not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Face {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Face {
    pub fn symbol(&self) -> &'static str {
        match self {
            Face::Two => "2",
            Face::Three => "3",
            Face::Four => "4",
            Face::Five => "5",
            Face::Six => "6",
            Face::Seven => "7",
            Face::Eight => "8",
            Face::Nine => "9",
            Face::Ten => "10",
            Face::Jack => "J",
            Face::Queen => "Q",
            Face::King => "K",
            Face::Ace => "A",
        }
    }

    /// Hi-Lo tag of this face.
    pub fn hi_lo(&self) -> i32 {
        match self {
            Face::Two | Face::Three | Face::Four | Face::Five | Face::Six => 1,
            Face::Seven | Face::Eight | Face::Nine => 0,
            Face::Ten | Face::Jack | Face::Queen | Face::King | Face::Ace => -1,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Accepts exactly "2".."10", "J", "Q", "K" and "A". No trimming or case folding.
impl FromStr for Face {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let face = match s {
            "2" => Face::Two,
            "3" => Face::Three,
            "4" => Face::Four,
            "5" => Face::Five,
            "6" => Face::Six,
            "7" => Face::Seven,
            "8" => Face::Eight,
            "9" => Face::Nine,
            "10" => Face::Ten,
            "J" => Face::Jack,
            "Q" => Face::Queen,
            "K" => Face::King,
            "A" => Face::Ace,
            _ => return Err(StrategyError::InvalidCard(String::from(s))),
        };
        Ok(face)
    }
}

/// Blackjack value of a single card. An ace counts 11 here; it is only
/// demoted to 1 inside `hand_total`.
pub fn value(face: Face) -> u8 {
    match face {
        Face::Two => 2,
        Face::Three => 3,
        Face::Four => 4,
        Face::Five => 5,
        Face::Six => 6,
        Face::Seven => 7,
        Face::Eight => 8,
        Face::Nine => 9,
        Face::Ten | Face::Jack | Face::Queen | Face::King => 10,
        Face::Ace => 11,
    }
}

/// Best total of a hand. Aces are demoted from 11 to 1 one at a time while
/// the total is over 21. The result exceeds 21 only when no ace is left to
/// demote, and saturates at `u16::MAX`. An empty hand totals 0.
pub fn hand_total(hand: &[Face]) -> u16 {
    let mut total: u32 = hand
        .iter()
        .fold(0u32, |sum, face| sum.saturating_add(value(*face) as u32));
    let mut number_of_aces = hand.iter().filter(|face| **face == Face::Ace).count();

    while total > BLACKJACK as u32 && number_of_aces > 0 {
        total -= 10;
        number_of_aces -= 1;
    }

    u16::try_from(total).unwrap_or(u16::MAX)
}

/// The dealer's up card as used for strategy keys. Aces get their own tag so
/// they can never be confused with a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DealerUpCard {
    /// 2 to 10 inclusive.
    Value(u8),
    Ace,
}

impl DealerUpCard {
    /// All up cards in column order: 2..=10 then A.
    pub fn all() -> impl Iterator<Item = DealerUpCard> {
        (2..=10).map(DealerUpCard::Value).chain(std::iter::once(DealerUpCard::Ace))
    }
}

impl From<Face> for DealerUpCard {
    fn from(face: Face) -> Self {
        match face {
            Face::Ace => DealerUpCard::Ace,
            _ => DealerUpCard::Value(value(face)),
        }
    }
}

impl fmt::Display for DealerUpCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealerUpCard::Value(v) => write!(f, "{}", v),
            DealerUpCard::Ace => write!(f, "A"),
        }
    }
}

impl Serialize for DealerUpCard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
