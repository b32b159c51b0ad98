use blackjack_drivers::{split_cards, InputError};
use blackjack_strategy::{hand_total, DealerUpCard, Face, StrategyMatrix};

/// Turns free-text player and dealer cards into a one-line recommendation.
/// Only the first dealer card is used.
pub fn describe_recommendation(
    matrix: &StrategyMatrix,
    player_input: &str,
    dealer_input: &str,
) -> Result<String, InputError> {
    let player_cards = split_cards(player_input)?;
    let dealer_cards = split_cards(dealer_input)?;
    let dealer_card = *dealer_cards.first().ok_or(InputError::MissingDealerCard)?;

    let player_hand = player_cards
        .iter()
        .map(|card| card.parse::<Face>())
        .collect::<Result<Vec<_>, _>>()?;
    let dealer_face: Face = dealer_card.parse()?;
    let action = matrix.lookup(&player_hand, dealer_face)?;

    Ok(format!(
        "Recommended action for player total {} against dealer card {}: {}",
        hand_total(&player_hand),
        DealerUpCard::from(dealer_face),
        action
    ))
}
