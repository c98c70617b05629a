use log::{debug, info};

use super::card::CardViewModel;
use super::deck::Deck;
use super::error::GameError;
use super::gametable::{ExpandingDirection, Gametable};
use super::geometry::Location2D;
use super::observer::{SharedObserver, TableEvent, deliver_all};

pub struct Dealer {
    deck: Box<dyn Deck>,
    observer: Option<SharedObserver>,
}

impl Dealer {
    pub fn new(deck: Box<dyn Deck>, observer: Option<SharedObserver>) -> Self {
        Dealer { deck, observer }
    }

    pub fn deck(&self) -> &dyn Deck {
        self.deck.as_ref()
    }

    pub fn deck_mut(&mut self) -> &mut dyn Deck {
        self.deck.as_mut()
    }

    pub fn set_observer(&mut self, observer: Option<SharedObserver>) {
        self.observer = observer;
    }

    pub fn new_deal(&mut self, renewing_images: bool) {
        self.deck.new_deal(renewing_images);
    }

    pub fn add_cards_in_gametable(
        &mut self,
        gametable: &mut Gametable,
        direction: ExpandingDirection,
    ) -> Result<Vec<(usize, CardViewModel)>, GameError> {
        let mut events = Vec::new();
        let added = self.add_cards_collecting_events(gametable, direction, &mut events);
        deliver_all(self.observer.as_ref(), &events);
        added
    }

    // Same as `add_cards_in_gametable`, for callers holding the table lock.
    // Notifications are left in `events` for delivery once it is released.
    pub fn add_cards_collecting_events(
        &mut self,
        gametable: &mut Gametable,
        direction: ExpandingDirection,
        events: &mut Vec<TableEvent>,
    ) -> Result<Vec<(usize, CardViewModel)>, GameError> {
        gametable.adjust_size_to_include_all_cards_locations();

        let model = self.deck.unique_matching_cards_model();
        if self.deck.remaining_matching_cards_models() == 0 {
            info!("[Dealer] deck is empty");
            events.push(TableEvent::DeckEmpty);
        }
        let model = model.ok_or(GameError::DeckExhausted)?;

        let mut locations = Vec::with_capacity(gametable.cards_by_match());
        for _ in 0..gametable.cards_by_match() {
            let location = match free_location(gametable, &locations) {
                Some(location) => location,
                None => {
                    gametable.expand(direction);
                    debug!("[Dealer] table grown to {:?}", gametable.size());
                    free_location(gametable, &locations).ok_or(GameError::NoFreeLocation)?
                }
            };
            locations.push(location);
        }

        let added: Vec<(usize, CardViewModel)> = locations
            .into_iter()
            .map(|location| {
                let card = CardViewModel::new(model.clone(), location);
                (gametable.insert(card.clone()), card)
            })
            .collect();
        debug!(
            "[Dealer] group {} dealt on keys {:?}",
            model.id(),
            added.iter().map(|(key, _)| *key).collect::<Vec<_>>()
        );
        Ok(added)
    }
}

fn free_location(gametable: &Gametable, reserved: &[Location2D]) -> Option<Location2D> {
    gametable
        .size()
        .find_first_location(|location| gametable.is_free(location) && !reserved.contains(&location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::colors::ColorsLibrary;
    use crate::game::deck::{ImagesPicker, SingleImageDeck};
    use crate::game::geometry::Size2D;
    use crate::game::observer::RecordingObserver;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dealer(images: &[&str], observer: Option<SharedObserver>) -> Dealer {
        let deck = SingleImageDeck::with_rng(
            ImagesPicker::new(images.iter().copied()),
            ColorsLibrary::default(),
            1,
            StdRng::seed_from_u64(11),
        );
        Dealer::new(Box::new(deck), observer)
    }

    #[test]
    fn first_group_expanding_columns() {
        let mut dealer = dealer(&["owl", "fox"], None);
        let mut table = Gametable::new(2);
        let added = dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Column)
            .unwrap();
        assert_eq!(added.len(), 2);
        assert_ne!(added[0].0, added[1].0);
        assert_eq!(added[0].1.matching_id(), added[1].1.matching_id());
        assert_eq!(added[0].1.location, Location2D::new(0, 0));
        assert_eq!(added[1].1.location, Location2D::new(0, 1));
        assert_eq!(table.size(), Size2D::new(1, 2));
    }

    #[test]
    fn automatic_growth_stays_square() {
        let mut dealer = dealer(&["owl", "fox"], None);
        let mut table = Gametable::new(2);
        let mut locations = Vec::new();
        for _ in 0..2 {
            let added = dealer
                .add_cards_in_gametable(&mut table, ExpandingDirection::Any)
                .unwrap();
            locations.extend(added.into_iter().map(|(_, card)| card.location));
        }
        assert_eq!(
            locations,
            vec![
                Location2D::new(0, 0),
                Location2D::new(1, 0),
                Location2D::new(0, 1),
                Location2D::new(1, 1),
            ]
        );
        assert_eq!(table.size(), Size2D::new(2, 2));
    }

    #[test]
    fn exhausted_deck_is_an_error_and_leaves_the_table_alone() {
        let mut dealer = dealer(&["owl"], None);
        let mut table = Gametable::new(2);
        dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Any)
            .unwrap();
        let before = table.clone();
        let result = dealer.add_cards_in_gametable(&mut table, ExpandingDirection::Any);
        assert!(matches!(result, Err(GameError::DeckExhausted)));
        assert_eq!(table, before);
    }

    #[test]
    fn deck_empty_fires_on_the_last_successful_pull() {
        let observer = RecordingObserver::new();
        let shared: SharedObserver = observer.clone();
        let mut dealer = dealer(&["owl", "fox"], Some(shared));
        let mut table = Gametable::new(2);
        dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Any)
            .unwrap();
        assert!(observer.events().is_empty());
        dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Any)
            .unwrap();
        assert_eq!(observer.events(), vec![TableEvent::DeckEmpty]);
        let _ = dealer.add_cards_in_gametable(&mut table, ExpandingDirection::Any);
        assert_eq!(observer.events().len(), 2);
    }

    #[test]
    fn whole_group_is_placed_before_insertion() {
        let mut dealer = dealer(&["owl"], None);
        let mut table = Gametable::new(3);
        let added = dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Column)
            .unwrap();
        let locations: Vec<Location2D> = added.iter().map(|(_, card)| card.location).collect();
        assert_eq!(
            locations,
            vec![Location2D::new(0, 0), Location2D::new(0, 1), Location2D::new(0, 2)]
        );
        assert_eq!(added.iter().map(|(key, _)| *key).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(table.size(), Size2D::new(1, 3));
    }

    #[test]
    fn collected_events_are_not_delivered() {
        let observer = RecordingObserver::new();
        let shared: SharedObserver = observer.clone();
        let mut dealer = dealer(&["owl"], Some(shared));
        let mut table = Gametable::new(2);
        let mut events = Vec::new();
        dealer
            .add_cards_collecting_events(&mut table, ExpandingDirection::Any, &mut events)
            .unwrap();
        assert_eq!(events, vec![TableEvent::DeckEmpty]);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn freed_cells_are_reused_before_growing() {
        let mut dealer = dealer(&["owl", "fox"], None);
        let mut table = Gametable::new(2);
        dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Row)
            .unwrap();
        for key in [0, 1] {
            let card = table.card_mut(key).unwrap();
            card.is_matched = true;
            card.is_out_of_game = true;
        }
        let size = table.size();
        dealer
            .add_cards_in_gametable(&mut table, ExpandingDirection::Row)
            .unwrap();
        assert_eq!(table.size(), size);
    }
}
