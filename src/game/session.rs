use std::sync::Arc;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::card::CardViewModel;
use super::catalog::{ImageCatalog, builtin_stages};
use super::colors::ColorsLibrary;
use super::dealer::Dealer;
use super::debug::{NearWin, prepare_near_win};
use super::deck::{Deck, DoubleImageDeck, ImagesPicker, SingleImageDeck};
use super::error::GameError;
use super::gametable::{ExpandingDirection, Gametable};
use super::images::ImagesLibraryModel;
use super::levels::{
    CardsType, GameReward, LevelKey, LevelModel, LevelsLibraryModel, PotentialReward, StageModel,
};
use super::observer::{SharedObserver, deliver_all};
use super::playing::{PlayingEngine, RoundResult};
use super::scoring::{GameScoreModel, ScoreRank};
use super::settings::GameSettings;
use super::store::{JsonFileStore, ProgressStore};

fn build_deck(level: &LevelModel, images: &ImagesLibraryModel, rng: &mut StdRng) -> Box<dyn Deck> {
    let picker = ImagesPicker::new(images.images_for_category(level.image_category));
    let deck_rng = StdRng::from_rng(rng);
    match level.cards_type {
        CardsType::SingleImage => Box::new(SingleImageDeck::with_rng(
            picker,
            ColorsLibrary::default(),
            1,
            deck_rng,
        )),
        CardsType::MultiColor { colors_by_deal } => Box::new(SingleImageDeck::with_rng(
            picker,
            ColorsLibrary::default(),
            colors_by_deal,
            deck_rng,
        )),
        CardsType::DoubleImage { double_order } => Box::new(DoubleImageDeck::with_rng(
            picker,
            ColorsLibrary::default(),
            double_order,
            deck_rng,
        )),
    }
}

pub struct LevelViewModel {
    level: LevelModel,
    dealer: Dealer,
    engine: Arc<PlayingEngine>,
    observer: Option<SharedObserver>,
    renew_images: bool,
    debug: bool,
    started: bool,
    rng: StdRng,
}

impl LevelViewModel {
    pub fn new(
        level: &LevelModel,
        images: &ImagesLibraryModel,
        settings: &GameSettings,
        observer: Option<SharedObserver>,
    ) -> Self {
        Self::with_rng(level, images, settings, observer, StdRng::from_os_rng())
    }

    pub fn with_rng(
        level: &LevelModel,
        images: &ImagesLibraryModel,
        settings: &GameSettings,
        observer: Option<SharedObserver>,
        mut rng: StdRng,
    ) -> Self {
        let deck = build_deck(level, images, &mut rng);
        LevelViewModel {
            level: level.clone(),
            dealer: Dealer::new(deck, observer.clone()),
            engine: Arc::new(PlayingEngine::new(
                Gametable::new(level.cards_by_match),
                observer.clone(),
            )),
            observer,
            renew_images: settings.renew_images,
            debug: settings.debug,
            started: false,
            rng,
        }
    }

    pub fn level(&self) -> &LevelModel {
        &self.level
    }

    pub fn engine(&self) -> &Arc<PlayingEngine> {
        &self.engine
    }

    pub fn remaining_matching_cards_models(&self) -> usize {
        self.dealer.deck().remaining_matching_cards_models()
    }

    pub fn start(&mut self) -> Result<usize, GameError> {
        if self.started {
            debug!("[Level] {} already started", self.level.key);
            return Ok(self.engine.gametable_snapshot().cards().len());
        }
        self.started = true;
        let groups = self.level.groups_to_deal();
        let key = self.level.key;
        let dealer = &mut self.dealer;
        let rng = &mut self.rng;
        let mut events = Vec::new();
        let dealt = self.engine.with_gametable(|table| -> Result<usize, GameError> {
            for _ in 0..groups {
                match dealer.add_cards_collecting_events(table, ExpandingDirection::Any, &mut events) {
                    Ok(_) => {}
                    Err(GameError::DeckExhausted) => {
                        warn!("[Level] {} ran out of images while dealing", key);
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }
            table.shuffle(rng);
            Ok(table.cards().len())
        });
        deliver_all(self.observer.as_ref(), &events);
        let dealt = dealt?;
        info!("[Level] {} started with {} cards", key, dealt);
        Ok(dealt)
    }

    pub fn restart(&mut self) -> Result<usize, GameError> {
        self.dealer.new_deal(self.renew_images);
        self.engine = Arc::new(PlayingEngine::new(
            Gametable::new(self.level.cards_by_match),
            self.observer.clone(),
        ));
        self.started = false;
        self.start()
    }

    pub fn face_up(&self, key: usize) -> Result<Option<RoundResult>, GameError> {
        self.engine.face_up(key)
    }

    pub fn deal_more_cards(&mut self) -> Result<Vec<(usize, CardViewModel)>, GameError> {
        if !self.level.user_can_deal_cards || self.engine.is_game_over() {
            return Err(GameError::DealingNotAllowed(self.level.key));
        }
        let dealer = &mut self.dealer;
        let mut events = Vec::new();
        let added = self.engine.with_gametable(|table| {
            dealer.add_cards_collecting_events(table, ExpandingDirection::Any, &mut events)
        });
        deliver_all(self.observer.as_ref(), &events);
        added
    }

    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    pub fn final_score(&self) -> Option<GameScoreModel> {
        self.engine.final_score()
    }

    pub fn gametable_snapshot(&self) -> Gametable {
        self.engine.gametable_snapshot()
    }

    pub fn debug_prepare_near_win(&self) -> NearWin {
        if !self.debug {
            return NearWin::DebugDisabled;
        }
        let result = self.engine.with_gametable(prepare_near_win);
        match result {
            NearWin::Applied(remaining) => {
                info!("[Debug][{}] board prepared: one group left ({} cards)", self.level.key, remaining)
            }
            other => info!("[Debug][{}] near-win skipped: {:?}", self.level.key, other),
        }
        result
    }
}

pub struct EndOfGameViewModel {
    level_key: LevelKey,
    gametable: Gametable,
    score: GameScoreModel,
    potential_rewards: Vec<PotentialReward>,
    rewards: Option<Vec<GameReward>>,
}

impl EndOfGameViewModel {
    pub fn new(
        level: &LevelViewModel,
        levels: &LevelsLibraryModel,
        images: &ImagesLibraryModel,
    ) -> Option<Self> {
        let score = level.final_score()?;
        let level_key = level.level().key;
        Some(EndOfGameViewModel {
            level_key,
            gametable: level.gametable_snapshot(),
            score,
            potential_rewards: levels.potential_reward(level_key, images),
            rewards: None,
        })
    }

    pub fn level_key(&self) -> LevelKey {
        self.level_key
    }

    pub fn gametable(&self) -> &Gametable {
        &self.gametable
    }

    pub fn score(&self) -> &GameScoreModel {
        &self.score
    }

    pub fn rank(&self) -> ScoreRank {
        self.score.rank()
    }

    pub fn potential_rewards(&self) -> &[PotentialReward] {
        &self.potential_rewards
    }

    pub fn has_mystery_card(&self) -> bool {
        self.potential_rewards.contains(&PotentialReward::Image)
    }

    pub fn rewards(&self) -> Option<&[GameReward]> {
        self.rewards.as_deref()
    }

    pub fn apply_rewards(
        &mut self,
        levels: &mut LevelsLibraryModel,
        images: &mut ImagesLibraryModel,
    ) -> &[GameReward] {
        let level_key = self.level_key;
        let score = &self.score;
        self.rewards
            .get_or_insert_with(|| levels.game_achievement(level_key, score, images))
    }
}

pub struct GameSession {
    settings: GameSettings,
    store: Arc<dyn ProgressStore>,
    images: ImagesLibraryModel,
    levels: LevelsLibraryModel,
}

impl GameSession {
    pub fn new(
        settings: GameSettings,
        store: Arc<dyn ProgressStore>,
        catalog: ImageCatalog,
        stages: Vec<StageModel>,
    ) -> Self {
        let images = ImagesLibraryModel::load(catalog, store.clone());
        let levels = LevelsLibraryModel::load(stages, store.clone());
        GameSession {
            settings,
            store,
            images,
            levels,
        }
    }

    pub fn open(settings: GameSettings) -> Self {
        let store = Arc::new(JsonFileStore::new(settings.data_dir.clone()));
        Self::new(settings, store, ImageCatalog::builtin(), builtin_stages())
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn ProgressStore> {
        &self.store
    }

    pub fn images(&self) -> &ImagesLibraryModel {
        &self.images
    }

    pub fn levels(&self) -> &LevelsLibraryModel {
        &self.levels
    }

    pub fn play(
        &self,
        key: LevelKey,
        observer: Option<SharedObserver>,
    ) -> Result<LevelViewModel, GameError> {
        self.play_with_rng(key, observer, StdRng::from_os_rng())
    }

    pub fn play_with_rng(
        &self,
        key: LevelKey,
        observer: Option<SharedObserver>,
        rng: StdRng,
    ) -> Result<LevelViewModel, GameError> {
        let level = self.levels.level(key)?;
        if !level.state().unlocked() {
            return Err(GameError::LevelLocked(key));
        }
        Ok(LevelViewModel::with_rng(
            level,
            &self.images,
            &self.settings,
            observer,
            rng,
        ))
    }

    pub fn end_of_game(&self, level: &LevelViewModel) -> Option<EndOfGameViewModel> {
        EndOfGameViewModel::new(level, &self.levels, &self.images)
    }

    pub fn apply_rewards(&mut self, end: &mut EndOfGameViewModel) -> Vec<GameReward> {
        end.apply_rewards(&mut self.levels, &mut self.images).to_vec()
    }
}
