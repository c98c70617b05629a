use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::error::GameError;
use super::gametable::Gametable;
use super::observer::{SharedObserver, TableEvent, deliver_all};
use super::scoring::{GameScoreModel, ScoreEffect, ScoringEngine};

#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub played_keys: BTreeSet<usize>,
    pub matches_found: usize,
    pub effects: Vec<ScoreEffect>,
    pub table_empty: bool,
}

struct PlayingState {
    gametable: Gametable,
    scoring: ScoringEngine,
}

impl PlayingState {
    fn put_unmatched_cards_not_face_up_if_round_is_over(&mut self, events: &mut Vec<TableEvent>) {
        let face_up = self.gametable.unmatched_and_faced_up_cards_keys();
        if face_up.len() < self.gametable.cards_by_match() {
            return;
        }
        for key in &face_up {
            if let Ok(card) = self.gametable.card_mut(*key) {
                card.is_face_up = false;
            }
        }
        debug!("[Playing] cards {:?} back face down", face_up);
        events.push(TableEvent::CardsUpdated(face_up));
    }

    fn put_matched_cards_out_of_play(&mut self, events: &mut Vec<TableEvent>) {
        let matched = self.gametable.matched_in_game_cards_keys();
        if matched.is_empty() {
            return;
        }
        for key in &matched {
            if let Ok(card) = self.gametable.card_mut(*key) {
                card.is_out_of_game = true;
            }
        }
        events.push(TableEvent::CardsUpdated(matched));
    }

    fn face_up(
        &mut self,
        key: usize,
        events: &mut Vec<TableEvent>,
    ) -> Result<Option<RoundResult>, GameError> {
        self.gametable.card(key)?;
        self.put_unmatched_cards_not_face_up_if_round_is_over(events);
        self.put_matched_cards_out_of_play(events);
        if self.gametable.card(key)?.is_face_up {
            return Ok(None);
        }

        self.gametable.card_mut(key)?.is_face_up = true;
        self.scoring.card_is_facing_up(key, &self.gametable);
        events.push(TableEvent::CardsUpdated(BTreeSet::from([key])));

        let round = self.gametable.unmatched_and_faced_up_cards_keys();
        if round.len() < self.gametable.cards_by_match() {
            return Ok(None);
        }

        let keys: Vec<usize> = round.iter().copied().collect();
        let matched = self.gametable.cards_matches(&keys);
        let mut table_empty = false;
        if matched {
            for key in &keys {
                self.gametable.card_mut(*key)?.is_matched = true;
            }
            events.push(TableEvent::CardsUpdated(round.clone()));
            events.push(TableEvent::NewMatch(round.clone()));
            table_empty = self.gametable.number_of_cards_to_play() == 0;
        }

        let matches_found = usize::from(matched);
        let effects = self
            .scoring
            .round_is_over(matches_found, &round, &self.gametable);
        events.push(TableEvent::RoundOver(round.clone(), effects.clone()));

        if table_empty {
            self.put_matched_cards_out_of_play(events);
            let score = self.scoring.game_is_over(&self.gametable);
            info!(
                "[Playing] table empty after {} rounds, score {:.3}",
                self.scoring.round_count(),
                score.score()
            );
            events.push(TableEvent::TableEmpty);
        }

        Ok(Some(RoundResult {
            played_keys: round,
            matches_found,
            effects,
            table_empty,
        }))
    }
}

// Turn state machine for one player. `face_up` calls are serialized; the
// observer is notified once the table lock has been released.
pub struct PlayingEngine {
    state: Mutex<PlayingState>,
    observer: Option<SharedObserver>,
}

impl PlayingEngine {
    pub fn new(gametable: Gametable, observer: Option<SharedObserver>) -> Self {
        PlayingEngine {
            state: Mutex::new(PlayingState {
                gametable,
                scoring: ScoringEngine::new(),
            }),
            observer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn face_up(&self, key: usize) -> Result<Option<RoundResult>, GameError> {
        let mut events = Vec::new();
        let result = self.lock().face_up(key, &mut events);
        deliver_all(self.observer.as_ref(), &events);
        result
    }

    pub fn put_unmatched_cards_not_face_up_if_round_is_over(&self) {
        let mut events = Vec::new();
        self.lock()
            .put_unmatched_cards_not_face_up_if_round_is_over(&mut events);
        deliver_all(self.observer.as_ref(), &events);
    }

    pub fn with_gametable<R>(&self, f: impl FnOnce(&mut Gametable) -> R) -> R {
        f(&mut self.lock().gametable)
    }

    pub fn gametable_snapshot(&self) -> Gametable {
        self.lock().gametable.clone()
    }

    pub fn scoring_snapshot(&self) -> ScoringEngine {
        self.lock().scoring.clone()
    }

    pub fn final_score(&self) -> Option<GameScoreModel> {
        self.lock().scoring.final_score().cloned()
    }

    pub fn is_game_over(&self) -> bool {
        self.lock().scoring.final_score().is_some()
    }
}
