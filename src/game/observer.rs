use std::collections::BTreeSet;
use std::sync::Arc;

use super::scoring::ScoreEffect;

pub trait TableObserver: Send + Sync {
    fn on_cards_updated(&self, _keys: &BTreeSet<usize>) {}
    fn on_new_match(&self, _keys: &BTreeSet<usize>) {}
    fn on_round_over(&self, _played_keys: &BTreeSet<usize>, _effects: &[ScoreEffect]) {}
    fn on_table_empty(&self) {}
    fn on_deck_empty(&self) {}
}

pub type SharedObserver = Arc<dyn TableObserver>;

#[derive(Clone, Debug, PartialEq)]
pub enum TableEvent {
    CardsUpdated(BTreeSet<usize>),
    NewMatch(BTreeSet<usize>),
    RoundOver(BTreeSet<usize>, Vec<ScoreEffect>),
    TableEmpty,
    DeckEmpty,
}

impl TableEvent {
    pub fn deliver(&self, observer: &dyn TableObserver) {
        match self {
            TableEvent::CardsUpdated(keys) => observer.on_cards_updated(keys),
            TableEvent::NewMatch(keys) => observer.on_new_match(keys),
            TableEvent::RoundOver(keys, effects) => observer.on_round_over(keys, effects),
            TableEvent::TableEmpty => observer.on_table_empty(),
            TableEvent::DeckEmpty => observer.on_deck_empty(),
        }
    }
}

pub fn deliver_all(observer: Option<&SharedObserver>, events: &[TableEvent]) {
    let Some(observer) = observer else {
        return;
    };
    for event in events {
        event.deliver(observer.as_ref());
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: std::sync::Mutex<Vec<TableEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TableEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn push(&self, event: TableEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl TableObserver for RecordingObserver {
    fn on_cards_updated(&self, keys: &BTreeSet<usize>) {
        self.push(TableEvent::CardsUpdated(keys.clone()));
    }

    fn on_new_match(&self, keys: &BTreeSet<usize>) {
        self.push(TableEvent::NewMatch(keys.clone()));
    }

    fn on_round_over(&self, played_keys: &BTreeSet<usize>, effects: &[ScoreEffect]) {
        self.push(TableEvent::RoundOver(played_keys.clone(), effects.to_vec()));
    }

    fn on_table_empty(&self) {
        self.push(TableEvent::TableEmpty);
    }

    fn on_deck_empty(&self) {
        self.push(TableEvent::DeckEmpty);
    }
}
