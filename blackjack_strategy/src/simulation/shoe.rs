use crate::card::Face;
use crate::StrategyError;

use strum::IntoEnumIterator;

use rand::seq::SliceRandom;
use rand::Rng;

/// Represents a shoe in the real world. Cards before `current_index` have been
/// dealt, the rest are still in the shoe.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Face>,
    current_index: usize,
}

impl Shoe {
    /// Creates a new shoe with ordered cards.
    pub fn new(number_of_decks: u8) -> Shoe {
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for _suit in 0..4 {
                for face in Face::iter() {
                    cards.push(face);
                }
            }
        }
        Shoe {
            cards,
            current_index: 0,
        }
    }

    /// Creates a shoe that deals exactly `cards`, in order.
    pub fn from_cards(cards: Vec<Face>) -> Shoe {
        Shoe {
            cards,
            current_index: 0,
        }
    }

    /// Returns the dealt cards back into the shoe and shuffles all of them.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.current_index = 0;
    }

    /// Returns the dealt cards back into the shoe, and shuffles. The given faces
    /// are placed at the frontmost positions, in order, and only the rest of the
    /// shoe is shuffled.
    pub fn shuffle_with_firsts<R: Rng + ?Sized>(
        &mut self,
        firsts: &[Face],
        rng: &mut R,
    ) -> Result<(), StrategyError> {
        self.current_index = 0;
        for (idx, face) in firsts.iter().enumerate() {
            let found = self.cards[idx..]
                .iter()
                .position(|card| card == face)
                .ok_or(StrategyError::NotEnoughCards {
                    needed: firsts.iter().filter(|f| *f == face).count(),
                    available: self.cards.iter().filter(|card| *card == face).count(),
                })?;
            self.cards.swap(idx, idx + found);
        }
        self.cards[firsts.len()..].shuffle(rng);
        Ok(())
    }

    /// Deals a card if the shoe is not empty. Returns None if empty.
    pub fn deal_card(&mut self) -> Option<Face> {
        let card = self.cards.get(self.current_index).copied()?;
        self.current_index += 1;
        Some(card)
    }

    /// Cards that have not been dealt yet.
    pub fn remaining(&self) -> &[Face] {
        &self.cards[self.current_index..]
    }

    /// Hi-Lo running count over the cards still in the shoe.
    pub fn running_count(&self) -> i32 {
        self.remaining().iter().map(|face| face.hi_lo()).sum()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Builds a `number_of_decks`-deck shoe and shuffles it with `rng`.
pub fn new_shoe<R: Rng + ?Sized>(number_of_decks: u8, rng: &mut R) -> Shoe {
    let mut shoe = Shoe::new(number_of_decks);
    shoe.shuffle(rng);
    shoe
}
