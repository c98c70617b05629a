use std::fmt;
use std::sync::Arc;

use log::{info, warn};

use super::catalog::ImageCategory;
use super::error::GameError;
use super::images::ImagesLibraryModel;
use super::scoring::GameScoreModel;
use super::store::{LevelsStateRecord, ProgressStore};

pub const NEEDED_POINTS_TO_COMPLETE: f64 = 109.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelKey {
    pub stage: usize,
    pub level: usize,
}

impl LevelKey {
    pub const fn new(stage: usize, level: usize) -> Self {
        LevelKey { stage, level }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stage, self.level)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvariantId(pub String);

impl InvariantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InvariantId {
    fn from(id: &str) -> Self {
        InvariantId(id.to_string())
    }
}

impl From<String> for InvariantId {
    fn from(id: String) -> Self {
        InvariantId(id)
    }
}

impl fmt::Display for InvariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardsType {
    SingleImage,
    MultiColor { colors_by_deal: usize },
    DoubleImage { double_order: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GamePlayingMode {
    #[default]
    SinglePlayer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelState {
    level_key: LevelKey,
    unlocked: bool,
    points: f64,
    best_score: Option<f64>,
}

impl LevelState {
    pub fn new(level_key: LevelKey) -> Self {
        LevelState {
            level_key,
            unlocked: false,
            points: 0.0,
            best_score: None,
        }
    }

    pub fn level_key(&self) -> LevelKey {
        self.level_key
    }

    pub fn unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    pub fn completed(&self) -> bool {
        self.points >= NEEDED_POINTS_TO_COMPLETE
    }

    pub fn rekeyed(&self, level_key: LevelKey) -> Self {
        LevelState {
            level_key,
            ..self.clone()
        }
    }

    pub fn replace(&mut self, other: LevelState) -> Result<(), GameError> {
        if other.level_key != self.level_key {
            return Err(GameError::LevelKeyMismatch {
                expected: self.level_key,
                found: other.level_key,
            });
        }
        *self = other;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelModel {
    pub key: LevelKey,
    pub invariant_id: InvariantId,
    pub cards_to_deal: usize,
    pub cards_by_match: usize,
    pub user_can_deal_cards: bool,
    pub cards_type: CardsType,
    pub game_playing_mode: GamePlayingMode,
    pub image_category: Option<ImageCategory>,
    state: LevelState,
}

impl LevelModel {
    pub fn new(key: LevelKey, invariant_id: impl Into<InvariantId>) -> Self {
        LevelModel {
            key,
            invariant_id: invariant_id.into(),
            cards_to_deal: 12,
            cards_by_match: 2,
            user_can_deal_cards: false,
            cards_type: CardsType::SingleImage,
            game_playing_mode: GamePlayingMode::SinglePlayer,
            image_category: None,
            state: LevelState::new(key),
        }
    }

    pub fn with_cards(mut self, cards_to_deal: usize, cards_by_match: usize) -> Self {
        self.cards_to_deal = cards_to_deal;
        self.cards_by_match = cards_by_match;
        self
    }

    pub fn with_cards_type(mut self, cards_type: CardsType) -> Self {
        self.cards_type = cards_type;
        self
    }

    pub fn with_dealing(mut self, user_can_deal_cards: bool) -> Self {
        self.user_can_deal_cards = user_can_deal_cards;
        self
    }

    pub fn with_image_category(mut self, category: ImageCategory) -> Self {
        self.image_category = Some(category);
        self
    }

    pub fn state(&self) -> &LevelState {
        &self.state
    }

    pub fn groups_to_deal(&self) -> usize {
        self.cards_to_deal / self.cards_by_match.max(1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StageModel {
    pub key: usize,
    pub invariant_id: InvariantId,
    pub levels: Vec<LevelModel>,
}

impl StageModel {
    pub fn new(key: usize, invariant_id: impl Into<InvariantId>, levels: Vec<LevelModel>) -> Self {
        StageModel {
            key,
            invariant_id: invariant_id.into(),
            levels,
        }
    }

    fn agreed<T: PartialEq>(&self, param: impl Fn(&LevelModel) -> T) -> Option<T> {
        let mut values = self.levels.iter().map(param);
        let first = values.next()?;
        values.all(|value| value == first).then_some(first)
    }

    pub fn cards_by_match(&self) -> Option<usize> {
        self.agreed(|level| level.cards_by_match)
    }

    pub fn cards_to_deal(&self) -> Option<usize> {
        self.agreed(|level| level.cards_to_deal)
    }

    pub fn user_can_deal_cards(&self) -> Option<bool> {
        self.agreed(|level| level.user_can_deal_cards)
    }

    pub fn cards_type(&self) -> Option<CardsType> {
        self.agreed(|level| level.cards_type)
    }

    pub fn game_playing_mode(&self) -> Option<GamePlayingMode> {
        self.agreed(|level| level.game_playing_mode)
    }

    pub fn unlocked(&self) -> bool {
        self.levels.iter().any(|level| level.state.unlocked)
    }

    pub fn completed(&self) -> bool {
        !self.levels.is_empty() && self.levels.iter().all(|level| level.state.completed())
    }

    pub fn points(&self) -> f64 {
        self.levels.iter().map(|level| level.state.points).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameReward {
    NewBestScore(f64),
    LevelCompleted(LevelKey),
    NewLevelUnlocked(LevelKey),
    NewStageUnlocked(usize),
    NewImage(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PotentialReward {
    BestScore,
    LevelCompletion,
    LevelUnlock(LevelKey),
    StageUnlock(usize),
    Image,
}

pub struct LevelsLibraryModel {
    stages: Vec<StageModel>,
    store: Arc<dyn ProgressStore>,
}

impl LevelsLibraryModel {
    pub fn load(stages: Vec<StageModel>, store: Arc<dyn ProgressStore>) -> Self {
        let mut library = LevelsLibraryModel { stages, store };
        library.reload();
        library
    }

    pub fn reload(&mut self) {
        let record = match self.store.load_levels_state() {
            Ok(record) => record,
            Err(err) => {
                warn!("[Levels] could not load progress, starting fresh: {}", err);
                LevelsStateRecord::default()
            }
        };
        let first = self.first_level_key();
        for stage in &mut self.stages {
            for level in &mut stage.levels {
                let id = level.invariant_id.as_str();
                level.state = LevelState {
                    level_key: level.key,
                    unlocked: record.unlocked_ids.contains(id) || Some(level.key) == first,
                    points: record.points.get(id).copied().unwrap_or(0.0),
                    best_score: record.best_scores.get(id).copied(),
                };
            }
        }
        self.correct_unlocked_levels_if_necessary();
    }

    pub fn record(&self) -> LevelsStateRecord {
        let mut record = LevelsStateRecord::default();
        for level in self.stages.iter().flat_map(|stage| &stage.levels) {
            let id = level.invariant_id.0.clone();
            if level.state.unlocked {
                record.unlocked_ids.insert(id.clone());
            }
            if level.state.points > 0.0 {
                record.points.insert(id.clone(), level.state.points);
            }
            if let Some(best) = level.state.best_score {
                record.best_scores.insert(id, best);
            }
        }
        record
    }

    fn save(&self) -> Result<(), GameError> {
        self.store.save_levels_state(&self.record())?;
        Ok(())
    }

    pub fn stages(&self) -> &[StageModel] {
        &self.stages
    }

    pub fn stage(&self, stage: usize) -> Option<&StageModel> {
        self.stages.get(stage)
    }

    pub fn level(&self, key: LevelKey) -> Result<&LevelModel, GameError> {
        self.stages
            .get(key.stage)
            .and_then(|stage| stage.levels.get(key.level))
            .ok_or(GameError::UnknownLevel(key))
    }

    fn level_mut(&mut self, key: LevelKey) -> Result<&mut LevelModel, GameError> {
        self.stages
            .get_mut(key.stage)
            .and_then(|stage| stage.levels.get_mut(key.level))
            .ok_or(GameError::UnknownLevel(key))
    }

    fn replace_state(&mut self, key: LevelKey, state: LevelState) -> Result<(), GameError> {
        self.level_mut(key)?.state.replace(state)
    }

    pub fn level_keys(&self) -> Vec<LevelKey> {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(stage, model)| {
                (0..model.levels.len()).map(move |level| LevelKey::new(stage, level))
            })
            .collect()
    }

    fn first_level_key(&self) -> Option<LevelKey> {
        self.level_keys().first().copied()
    }

    pub fn next_level_key(&self, key: LevelKey) -> Option<LevelKey> {
        self.level_keys().into_iter().find(|candidate| *candidate > key)
    }

    // Unlocks the successor of every completed level. Content updates can
    // leave a completed level followed by a locked one. Images are not
    // unlocked retroactively.
    pub fn correct_unlocked_levels_if_necessary(&mut self) -> bool {
        let mut corrected = false;
        for key in self.level_keys() {
            let Ok(level) = self.level(key) else {
                continue;
            };
            if !level.state.completed() {
                continue;
            }
            let Some(next) = self.next_level_key(key) else {
                continue;
            };
            let Ok(next_level) = self.level(next) else {
                continue;
            };
            if next_level.state.unlocked {
                continue;
            }
            let mut unlocked = next_level.state.rekeyed(next);
            unlocked.unlocked = true;
            match self.replace_state(next, unlocked) {
                Ok(()) => {
                    corrected = true;
                    info!("[Levels] unlocked {} after completed {}", next, key);
                }
                Err(err) => warn!("[Levels] cannot heal {}: {}", next, err),
            }
        }
        if corrected && let Err(err) = self.save() {
            warn!("[Levels] could not save corrected unlocks: {}", err);
        }
        corrected
    }

    // Applies a finished session to the level. Either every change is kept
    // and persisted, or the library is reloaded and nothing is rewarded.
    pub fn game_achievement(
        &mut self,
        key: LevelKey,
        final_score: &GameScoreModel,
        images: &mut ImagesLibraryModel,
    ) -> Vec<GameReward> {
        match self.try_game_achievement(key, final_score, images) {
            Ok(rewards) => rewards,
            Err(err) => {
                warn!("[Levels] achievement on {} rolled back: {}", key, err);
                self.reload();
                images.reload();
                Vec::new()
            }
        }
    }

    fn try_game_achievement(
        &mut self,
        key: LevelKey,
        final_score: &GameScoreModel,
        images: &mut ImagesLibraryModel,
    ) -> Result<Vec<GameReward>, GameError> {
        let mut rewards = Vec::new();
        let saved = self.record();
        let level = self.level(key)?;
        let previous = level.state.rekeyed(key);
        let category = level.image_category;

        let mut updated = previous.clone();
        updated.points += final_score.points();
        let score = final_score.score();
        match previous.best_score {
            None => updated.best_score = Some(score),
            Some(best) if score > best => {
                updated.best_score = Some(score);
                rewards.push(GameReward::NewBestScore(score));
            }
            Some(_) => {}
        }
        let just_completed = !previous.completed() && updated.completed();
        self.replace_state(key, updated)?;

        let mut image_unlocked = false;
        if just_completed {
            info!("[Levels] level {} completed", key);
            rewards.push(GameReward::LevelCompleted(key));
            let next = self.next_level_key(key);
            let mut next_category = None;
            if let Some(next) = next {
                let next_level = self.level(next)?;
                next_category = next_level.image_category;
                if !next_level.state.unlocked {
                    let mut unlocked = next_level.state.rekeyed(next);
                    unlocked.unlocked = true;
                    self.replace_state(next, unlocked)?;
                    rewards.push(GameReward::NewLevelUnlocked(next));
                    if next.stage != key.stage {
                        rewards.push(GameReward::NewStageUnlocked(next.stage));
                    }
                }
            }
            if let Some(name) = images.unlock_new_image_unsaved(category, next_category) {
                rewards.push(GameReward::NewImage(name));
                image_unlocked = true;
            }
        }

        self.save()?;
        if image_unlocked && let Err(err) = images.save() {
            if let Err(undo) = self.store.save_levels_state(&saved) {
                warn!("[Levels] could not restore saved progress: {}", undo);
            }
            return Err(err);
        }
        Ok(rewards)
    }

    pub fn potential_reward(
        &self,
        key: LevelKey,
        images: &ImagesLibraryModel,
    ) -> Vec<PotentialReward> {
        let Ok(level) = self.level(key) else {
            return Vec::new();
        };
        let mut rewards = Vec::new();
        if level.state.best_score.is_some_and(|best| best < 1.0) {
            rewards.push(PotentialReward::BestScore);
        }
        if level.state.completed() {
            return rewards;
        }
        rewards.push(PotentialReward::LevelCompletion);
        let mut next_category = None;
        if let Some(next) = self.next_level_key(key)
            && let Ok(next_level) = self.level(next)
        {
            next_category = next_level.image_category;
            if !next_level.state.unlocked {
                rewards.push(PotentialReward::LevelUnlock(next));
                if next.stage != key.stage {
                    rewards.push(PotentialReward::StageUnlock(next.stage));
                }
            }
        }
        if images.has_locked_image(level.image_category, next_category) {
            rewards.push(PotentialReward::Image);
        }
        rewards
    }
}
