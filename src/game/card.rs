use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::colors::CardColor;
use super::geometry::Location2D;

static NEXT_MATCHING_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CardImages {
    Single(String),
    Double(String, String),
}

impl CardImages {
    pub fn names(&self) -> Vec<&str> {
        match self {
            CardImages::Single(name) => vec![name.as_str()],
            CardImages::Double(left, right) => vec![left.as_str(), right.as_str()],
        }
    }
}

#[derive(Debug)]
pub struct MatchingCardsModel {
    id: u64,
    images: CardImages,
    color: CardColor,
}

impl MatchingCardsModel {
    pub fn new(images: CardImages, color: CardColor) -> Self {
        MatchingCardsModel {
            id: NEXT_MATCHING_ID.fetch_add(1, Ordering::Relaxed),
            images,
            color,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn images(&self) -> &CardImages {
        &self.images
    }

    pub fn color(&self) -> CardColor {
        self.color
    }
}

impl PartialEq for MatchingCardsModel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MatchingCardsModel {}

#[derive(Clone, Debug, PartialEq)]
pub struct CardViewModel {
    pub model: Arc<MatchingCardsModel>,
    pub location: Location2D,
    pub is_face_up: bool,
    pub is_matched: bool,
    pub is_out_of_game: bool,
}

impl CardViewModel {
    pub fn new(model: Arc<MatchingCardsModel>, location: Location2D) -> Self {
        CardViewModel {
            model,
            location,
            is_face_up: false,
            is_matched: false,
            is_out_of_game: false,
        }
    }

    pub fn matching_id(&self) -> u64 {
        self.model.id()
    }

    // Matched cards still shown on the table count as in game.
    pub fn is_in_game(&self) -> bool {
        !self.is_out_of_game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_per_construction() {
        let ids: HashSet<u64> = (0..64)
            .map(|_| MatchingCardsModel::new(CardImages::Single("owl".into()), CardColor::Blue).id())
            .collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn identity_is_by_id_only() {
        let a = MatchingCardsModel::new(CardImages::Single("owl".into()), CardColor::Blue);
        let b = MatchingCardsModel::new(CardImages::Single("owl".into()), CardColor::Blue);
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn cards_share_the_group_model() {
        let model = Arc::new(MatchingCardsModel::new(
            CardImages::Double("owl".into(), "fox".into()),
            CardColor::White,
        ));
        let left = CardViewModel::new(model.clone(), Location2D::new(0, 0));
        let right = CardViewModel::new(model, Location2D::new(0, 1));
        assert_eq!(left.matching_id(), right.matching_id());
        assert_ne!(left, right);
        assert_eq!(left.model.images().names(), vec!["owl", "fox"]);
    }
}
