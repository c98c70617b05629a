use std::fs;
use std::path::Path;
use std::sync::Arc;

use matchcards::{
    GameReward, GameSession, GameSettings, ImageCatalog, JsonFileStore, LevelKey,
    LevelViewModel, LevelsStateRecord, ProgressStore, builtin_stages,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn settings(dir: &Path) -> GameSettings {
    GameSettings {
        data_dir: dir.to_path_buf(),
        ..GameSettings::default()
    }
}

fn play_perfectly(level: &LevelViewModel) {
    while !level.is_game_over() {
        let table = level.gametable_snapshot();
        let Some(first) = table.cards().values().find(|card| !card.is_matched) else {
            break;
        };
        let group: Vec<usize> = table
            .cards()
            .iter()
            .filter(|(_, card)| card.matching_id() == first.matching_id())
            .map(|(key, _)| *key)
            .collect();
        for key in group {
            level.face_up(key).unwrap();
        }
    }
}

fn finish(session: &mut GameSession, key: LevelKey, seed: u64) -> Vec<GameReward> {
    let mut level = session
        .play_with_rng(key, None, StdRng::seed_from_u64(seed))
        .unwrap();
    level.start().unwrap();
    play_perfectly(&level);
    let mut end = session.end_of_game(&level).unwrap();
    session.apply_rewards(&mut end)
}

#[test]
fn progress_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = GameSession::open(settings(dir.path()));
    let rewards = finish(&mut session, LevelKey::new(0, 0), 1);
    assert!(rewards.contains(&GameReward::NewLevelUnlocked(LevelKey::new(0, 1))));
    let image = rewards
        .iter()
        .find_map(|reward| match reward {
            GameReward::NewImage(name) => Some(name.clone()),
            _ => None,
        })
        .unwrap();

    let reopened = GameSession::open(settings(dir.path()));
    let next = reopened.levels().level(LevelKey::new(0, 1)).unwrap();
    assert!(next.state().unlocked());
    assert!(reopened.levels().level(LevelKey::new(0, 0)).unwrap().state().completed());
    assert!(reopened.images().unlocked_set().contains(&image));
    assert!(reopened.images().available_set().contains(&image));

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn completing_a_stage_unlocks_the_next_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = GameSession::open(settings(dir.path()));
    let last_pairs = session.levels().stage(0).unwrap().levels.len() - 1;
    for level in 0..last_pairs {
        let rewards = finish(&mut session, LevelKey::new(0, level), level as u64);
        assert!(!rewards.iter().any(|r| matches!(r, GameReward::NewStageUnlocked(_))));
    }
    let rewards = finish(&mut session, LevelKey::new(0, last_pairs), 99);
    assert!(rewards.contains(&GameReward::NewLevelUnlocked(LevelKey::new(1, 0))));
    assert!(rewards.contains(&GameReward::NewStageUnlocked(1)));
    assert!(session.levels().stage(0).unwrap().completed());
    assert!(session.levels().stage(1).unwrap().unlocked());
    assert!(!session.levels().level(LevelKey::new(1, 1)).unwrap().state().unlocked());
}

#[test]
fn legacy_unlock_flags_are_migrated() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("levels.json"),
        r#"{"levels_unlocked": {"pairs.2": true, "pairs.3": false}, "points": {"pairs.1": 12.0}}"#,
    )
    .unwrap();

    let mut session = GameSession::open(settings(dir.path()));
    assert!(session.levels().level(LevelKey::new(0, 1)).unwrap().state().unlocked());
    assert!(!session.levels().level(LevelKey::new(0, 2)).unwrap().state().unlocked());
    assert_eq!(session.levels().level(LevelKey::new(0, 0)).unwrap().state().points(), 12.0);

    finish(&mut session, LevelKey::new(0, 0), 4);
    let raw = fs::read_to_string(dir.path().join("levels.json")).unwrap();
    assert!(!raw.contains("levels_unlocked"));
    let record: LevelsStateRecord = serde_json::from_str(&raw).unwrap();
    assert!(record.unlocked_ids.contains("pairs.2"));
}

#[test]
fn malformed_files_start_fresh() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("levels.json"), "not json").unwrap();
    fs::write(dir.path().join("images.json"), "[1, 2").unwrap();

    let session = GameSession::open(settings(dir.path()));
    let unlocked: Vec<LevelKey> = session
        .levels()
        .level_keys()
        .into_iter()
        .filter(|key| session.levels().level(*key).unwrap().state().unlocked())
        .collect();
    assert_eq!(unlocked, vec![LevelKey::new(0, 0)]);
    assert!(session.images().unlocked_set().is_empty());
    assert_eq!(
        session.images().available_set(),
        ImageCatalog::builtin().starter_set()
    );
}

#[test]
fn unwritable_store_rolls_the_achievement_back() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "a file where the data directory should be").unwrap();

    let mut session = GameSession::open(settings(&blocker));
    let rewards = finish(&mut session, LevelKey::new(0, 0), 2);
    assert!(rewards.is_empty());
    let first = session.levels().level(LevelKey::new(0, 0)).unwrap();
    assert_eq!(first.state().points(), 0.0);
    assert_eq!(first.state().best_score(), None);
    assert!(!session.levels().level(LevelKey::new(0, 1)).unwrap().state().unlocked());
    assert!(session.images().unlocked_set().is_empty());
}

#[test]
fn preview_matches_what_is_earned() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ProgressStore> = Arc::new(JsonFileStore::new(dir.path()));
    let mut session = GameSession::new(
        settings(dir.path()),
        store,
        ImageCatalog::builtin(),
        builtin_stages(),
    );
    let key = LevelKey::new(0, 0);
    let mut level = session
        .play_with_rng(key, None, StdRng::seed_from_u64(8))
        .unwrap();
    level.start().unwrap();
    play_perfectly(&level);

    let mut end = session.end_of_game(&level).unwrap();
    assert!(end.has_mystery_card());
    assert!(end.rewards().is_none());
    session.apply_rewards(&mut end);
    assert!(end.rewards().is_some());

    let mut replay = session
        .play_with_rng(key, None, StdRng::seed_from_u64(9))
        .unwrap();
    replay.start().unwrap();
    play_perfectly(&replay);
    let mut end = session.end_of_game(&replay).unwrap();
    assert!(end.potential_rewards().is_empty());
    assert!(!end.has_mystery_card());
    assert!(session.apply_rewards(&mut end).is_empty());
}
