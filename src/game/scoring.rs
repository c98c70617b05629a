use std::collections::BTreeSet;

use log::debug;

use super::gametable::Gametable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreEffect {
    Match(usize),
    LuckyMatch(usize),
    ConsecutiveMatchesLost(usize),
    BadMove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ScoreRank {
    #[default]
    Zero,
    One,
    Two,
    Three,
    Four,
}

impl ScoreRank {
    pub fn from_score(score: f64) -> Self {
        if score > 0.99 {
            ScoreRank::Four
        } else if score > 0.90 {
            ScoreRank::Three
        } else if score > 0.70 {
            ScoreRank::Two
        } else if score > 0.50 {
            ScoreRank::One
        } else {
            ScoreRank::Zero
        }
    }

    pub fn stars(self) -> u8 {
        match self {
            ScoreRank::Zero => 0,
            ScoreRank::One => 1,
            ScoreRank::Two => 2,
            ScoreRank::Three => 3,
            ScoreRank::Four => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct GameScoreModel {
    pub bad_moves: usize,
    pub consecutive_matches: Vec<usize>,
    pub number_of_cards: usize,
}

impl GameScoreModel {
    pub fn score(&self) -> f64 {
        if self.bad_moves == 0 {
            return 1.0;
        }
        let streaks = self.consecutive_matches.len().max(1) as f64;
        let penalty = (self.bad_moves as f64 / streaks).max(0.0);
        let cards = self.number_of_cards.max(1) as f64;
        (1.0 / (1.0 + penalty / cards)).min(0.99)
    }

    pub fn points(&self) -> f64 {
        let points = ((self.score() - 0.5) * 8.0).exp();
        if self.bad_moves == 0 { points * 2.0 } else { points }
    }

    pub fn rank(&self) -> ScoreRank {
        ScoreRank::from_score(self.score())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScoringEngine {
    played_cards: Vec<usize>,
    previous_round_played_cards: BTreeSet<usize>,
    previous_round_consecutive_match: usize,
    unknown_keys: Option<BTreeSet<usize>>,
    consecutive_matches: Vec<usize>,
    round_count: usize,
    bad_moves: usize,
    final_score: Option<GameScoreModel>,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played_cards(&self) -> &[usize] {
        &self.played_cards
    }

    pub fn round_count(&self) -> usize {
        self.round_count
    }

    pub fn bad_moves(&self) -> usize {
        self.bad_moves
    }

    pub fn consecutive_matches(&self) -> &[usize] {
        &self.consecutive_matches
    }

    pub fn current_streak(&self) -> usize {
        self.previous_round_consecutive_match
    }

    pub fn final_score(&self) -> Option<&GameScoreModel> {
        self.final_score.as_ref()
    }

    pub fn card_is_facing_up(&mut self, key: usize, gametable: &Gametable) {
        self.played_cards.push(key);
        self.unknown_keys
            .get_or_insert_with(|| gametable.cards().keys().copied().collect())
            .remove(&key);
    }

    pub fn round_is_over(
        &mut self,
        matches_found: usize,
        round_played_cards: &BTreeSet<usize>,
        _gametable: &Gametable,
    ) -> Vec<ScoreEffect> {
        self.round_count += 1;
        let mut effects = Vec::new();

        if matches_found > 0 {
            let streak = self.previous_round_consecutive_match + matches_found;
            if streak == 2 {
                self.consecutive_matches.push(streak);
            } else if streak > 2
                && let Some(last) = self.consecutive_matches.last_mut()
            {
                *last = streak;
            }
            if self.last_card_was_a_guess() {
                effects.push(ScoreEffect::LuckyMatch(streak));
            } else {
                effects.push(ScoreEffect::Match(streak));
            }
            self.previous_round_consecutive_match = streak;
        } else {
            if self.previous_round_consecutive_match > 1 {
                effects.push(ScoreEffect::ConsecutiveMatchesLost(
                    self.previous_round_consecutive_match,
                ));
            }
            self.previous_round_consecutive_match = 0;
            if !round_played_cards.is_disjoint(&self.previous_round_played_cards) {
                self.bad_moves += 1;
                effects.push(ScoreEffect::BadMove);
            }
        }

        self.previous_round_played_cards
            .extend(round_played_cards.iter().copied());
        debug!(
            "[Scoring] round {} over: {:?} (bad moves {})",
            self.round_count, effects, self.bad_moves
        );
        effects
    }

    pub fn game_is_over(&mut self, gametable: &Gametable) -> GameScoreModel {
        let score = GameScoreModel {
            bad_moves: self.bad_moves,
            consecutive_matches: self.consecutive_matches.clone(),
            number_of_cards: gametable.cards().len(),
        };
        self.final_score = Some(score.clone());
        score
    }

    fn last_card_was_a_guess(&self) -> bool {
        let Some(&last) = self.played_cards.last() else {
            return false;
        };
        let first_time = self.played_cards.iter().filter(|&&key| key == last).count() == 1;
        let unseen_left = self
            .unknown_keys
            .as_ref()
            .is_some_and(|keys| !keys.is_empty());
        first_time && unseen_left
    }
}
