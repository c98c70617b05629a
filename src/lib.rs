pub mod game;

pub use game::card::{CardImages, CardViewModel, MatchingCardsModel};
pub use game::catalog::{CatalogImage, ImageCatalog, ImageCategory, builtin_stages};
pub use game::colors::{CardColor, ColorsLibrary};
pub use game::dealer::Dealer;
pub use game::debug::NearWin;
pub use game::deck::{Deck, DoubleImageDeck, ImagesPicker, SingleImageDeck};
pub use game::error::{GameError, StoreError};
pub use game::gametable::{ExpandingDirection, Gametable};
pub use game::geometry::{Location2D, Size2D};
pub use game::images::ImagesLibraryModel;
pub use game::levels::{
    CardsType, GamePlayingMode, GameReward, InvariantId, LevelKey, LevelModel, LevelState,
    LevelsLibraryModel, PotentialReward, StageModel,
};
pub use game::observer::{RecordingObserver, SharedObserver, TableEvent, TableObserver};
pub use game::playing::{PlayingEngine, RoundResult};
pub use game::scoring::{GameScoreModel, ScoreEffect, ScoreRank, ScoringEngine};
pub use game::session::{EndOfGameViewModel, GameSession, LevelViewModel};
pub use game::settings::GameSettings;
pub use game::store::{JsonFileStore, LevelsStateRecord, MemoryStore, ProgressStore};
