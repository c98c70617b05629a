use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;

use super::card::CardViewModel;
use super::error::GameError;
use super::geometry::{Location2D, Size2D};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExpandingDirection {
    Row,
    Column,
    #[default]
    Any,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gametable {
    cards_by_match: usize,
    size: Size2D,
    cards: BTreeMap<usize, CardViewModel>,
}

impl Gametable {
    pub fn new(cards_by_match: usize) -> Self {
        Gametable {
            cards_by_match,
            size: Size2D::default(),
            cards: BTreeMap::new(),
        }
    }

    pub fn cards_by_match(&self) -> usize {
        self.cards_by_match
    }

    pub fn size(&self) -> Size2D {
        self.size
    }

    pub fn cards(&self) -> &BTreeMap<usize, CardViewModel> {
        &self.cards
    }

    pub fn card(&self, key: usize) -> Result<&CardViewModel, GameError> {
        self.cards.get(&key).ok_or(GameError::UnknownCardKey(key))
    }

    pub fn card_mut(&mut self, key: usize) -> Result<&mut CardViewModel, GameError> {
        self.cards.get_mut(&key).ok_or(GameError::UnknownCardKey(key))
    }

    pub fn contains_key(&self, key: usize) -> bool {
        self.cards.contains_key(&key)
    }

    pub fn new_key(&self) -> usize {
        self.cards.keys().next_back().map_or(0, |last| last + 1)
    }

    pub fn insert(&mut self, card: CardViewModel) -> usize {
        let key = self.new_key();
        self.size = self.size.including(card.location);
        self.cards.insert(key, card);
        key
    }

    pub fn adjust_size_to_include_all_cards_locations(&mut self) {
        for card in self.cards.values() {
            self.size = self.size.including(card.location);
        }
    }

    pub fn is_free(&self, location: Location2D) -> bool {
        !self
            .cards
            .values()
            .any(|card| card.is_in_game() && card.location == location)
    }

    pub fn find_free_location(&self) -> Option<Location2D> {
        self.size.find_first_location(|location| self.is_free(location))
    }

    pub fn expand(&mut self, direction: ExpandingDirection) {
        let grow_columns = match direction {
            ExpandingDirection::Row => false,
            ExpandingDirection::Column => true,
            ExpandingDirection::Any => self.size.columns < self.size.rows,
        };
        if grow_columns {
            self.size.columns += 1;
            self.size.rows = self.size.rows.max(1);
        } else {
            self.size.rows += 1;
            self.size.columns = self.size.columns.max(1);
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let keys: Vec<usize> = self
            .cards
            .iter()
            .filter(|(_, card)| card.is_in_game())
            .map(|(key, _)| *key)
            .collect();
        let mut locations: Vec<Location2D> =
            keys.iter().map(|key| self.cards[key].location).collect();
        locations.shuffle(rng);
        for (key, location) in keys.into_iter().zip(locations) {
            if let Some(card) = self.cards.get_mut(&key) {
                card.location = location;
            }
        }
    }

    pub fn unmatched_cards_keys(&self) -> BTreeSet<usize> {
        self.cards
            .iter()
            .filter(|(_, card)| !card.is_matched)
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn unmatched_and_faced_up_cards_keys(&self) -> BTreeSet<usize> {
        self.cards
            .iter()
            .filter(|(_, card)| !card.is_matched && card.is_face_up)
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn matched_in_game_cards_keys(&self) -> BTreeSet<usize> {
        self.cards
            .iter()
            .filter(|(_, card)| card.is_matched && !card.is_out_of_game)
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn number_of_cards_to_play(&self) -> usize {
        self.cards.values().filter(|card| !card.is_matched).count()
    }

    pub fn cards_matches(&self, keys: &[usize]) -> bool {
        if keys.len() < 2 {
            return false;
        }
        let distinct: BTreeSet<usize> = keys.iter().copied().collect();
        if distinct.len() != keys.len() {
            return false;
        }
        let mut ids = keys.iter().map(|key| self.cards.get(key).map(CardViewModel::matching_id));
        let Some(Some(first)) = ids.next() else {
            return false;
        };
        ids.all(|id| id == Some(first))
    }
}
