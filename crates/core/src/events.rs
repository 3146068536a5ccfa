use crate::{CardId, DeckPhase, DiscardOrigin};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RefillSource {
    Discard,
    Counts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    BaseCountChanged { card: CardId, count: u32, total: u32 },
    ModifierCountChanged { card: CardId, count: u32, used: u32 },
    NullCountChanged { count: u32 },
    CapacityChanged { capacity: u32 },
    HandLimitChanged { limit: usize },
    CompositionReset,
    PhaseChanged { from: DeckPhase, to: DeckPhase },
    DeckBuilt { size: usize },
    DeckShuffled { size: usize },
    DeckRefilled { source: RefillSource, size: usize },
    CardDrawn { card: CardId },
    CardsDiscarded { cards: Vec<CardId>, origin: DiscardOrigin },
    ReturnedToHand { cards: Vec<CardId> },
    ReturnedToDeck { cards: Vec<CardId>, shuffled: bool },
    SpentToggled { card: CardId, spent: bool },
    BaseSelected { card: CardId },
    ModifierAttached { card: CardId, used: u32 },
    ModifierDetached { card: CardId, used: u32 },
    PlayFinalized { base: CardId, modifiers: Vec<CardId> },
    PlayCancelled,
    DeckSaved { name: String },
    DeckLoaded { name: String },
    DeckDeleted { name: String },
    CountsImported,
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
