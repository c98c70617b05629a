use std::collections::BTreeMap;

use super::gametable::Gametable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NearWin {
    Applied(usize),
    DebugDisabled,
    NoCards,
    NoGroupFound,
}

pub fn prepare_near_win(gametable: &mut Gametable) -> NearWin {
    let mut by_group: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (key, card) in gametable.cards() {
        if card.is_in_game() && !card.is_matched {
            by_group.entry(card.matching_id()).or_default().push(*key);
        }
    }
    if by_group.is_empty() {
        return NearWin::NoCards;
    }
    let cards_by_match = gametable.cards_by_match();
    let Some(kept) = by_group
        .values()
        .find(|keys| keys.len() >= cards_by_match)
        .cloned()
    else {
        return NearWin::NoGroupFound;
    };

    let keys: Vec<usize> = gametable.cards().keys().copied().collect();
    for key in keys {
        if let Ok(card) = gametable.card_mut(key) {
            card.is_face_up = false;
            if !kept.contains(&key) && card.is_in_game() {
                card.is_matched = true;
                card.is_out_of_game = true;
            }
        }
    }
    NearWin::Applied(kept.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{CardImages, CardViewModel, MatchingCardsModel};
    use crate::game::colors::CardColor;
    use crate::game::geometry::Location2D;
    use std::sync::Arc;

    #[test]
    fn one_group_survives() {
        let mut table = Gametable::new(2);
        for group in 0..3 {
            let model = Arc::new(MatchingCardsModel::new(
                CardImages::Single(format!("img{group}")),
                CardColor::White,
            ));
            for side in 0..2 {
                table.insert(CardViewModel::new(model.clone(), Location2D::new(group, side)));
            }
        }
        table.card_mut(3).unwrap().is_face_up = true;
        assert_eq!(prepare_near_win(&mut table), NearWin::Applied(2));
        assert_eq!(table.number_of_cards_to_play(), 2);
        assert!(table.cards().values().all(|card| !card.is_face_up));
    }

    #[test]
    fn empty_or_broken_tables() {
        assert_eq!(prepare_near_win(&mut Gametable::new(2)), NearWin::NoCards);
        let mut table = Gametable::new(3);
        let model = Arc::new(MatchingCardsModel::new(
            CardImages::Single("odd".into()),
            CardColor::White,
        ));
        table.insert(CardViewModel::new(model.clone(), Location2D::new(0, 0)));
        table.insert(CardViewModel::new(model, Location2D::new(0, 1)));
        assert_eq!(prepare_near_win(&mut table), NearWin::NoGroupFound);
    }
}
