use crate::{CardId, DeckBuilder, DeckError, Event, EventBus, HandCard, RefillSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeckPhase {
    #[default]
    Unlocked,
    LockedUnbuilt,
    LockedBuilt,
    LockedReady,
}

impl DeckPhase {
    /// Reads the stored `locked`/`built`/`shuffled` flags; impossible combinations
    /// collapse to the furthest phase the flags can justify.
    pub fn from_flags(locked: bool, built: bool, shuffled: bool) -> Self {
        match (locked, built, shuffled) {
            (false, _, _) => Self::Unlocked,
            (true, false, _) => Self::LockedUnbuilt,
            (true, true, false) => Self::LockedBuilt,
            (true, true, true) => Self::LockedReady,
        }
    }

    /// `(locked, built, shuffled)`
    pub fn flags(self) -> (bool, bool, bool) {
        match self {
            Self::Unlocked => (false, false, false),
            Self::LockedUnbuilt => (true, false, false),
            Self::LockedBuilt => (true, true, false),
            Self::LockedReady => (true, true, true),
        }
    }

    pub fn is_locked(self) -> bool {
        !matches!(self, Self::Unlocked)
    }

    pub fn is_built(self) -> bool {
        matches!(self, Self::LockedBuilt | Self::LockedReady)
    }

    pub fn is_shuffled(self) -> bool {
        matches!(self, Self::LockedReady)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unlocked => "unlocked",
            Self::LockedUnbuilt => "locked (unbuilt)",
            Self::LockedBuilt => "locked (built)",
            Self::LockedReady => "ready",
        }
    }

    pub fn next_step(self) -> &'static str {
        match self {
            Self::Unlocked => "edit counts, then lock",
            Self::LockedUnbuilt => "build the deck",
            Self::LockedBuilt => "shuffle the deck",
            Self::LockedReady => "draw and play",
        }
    }
}

impl DeckBuilder {
    pub fn lock(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        if self.state.is_locked() {
            return Err(DeckError::AlreadyLocked);
        }
        self.validate_composition()?;
        let mut deck = self.materialize_deck();
        self.rng_mut().shuffle(&mut deck);
        self.state.deck = deck;
        self.state.hand.clear();
        self.state.discard.clear();
        self.state.active_play = None;
        self.set_phase(DeckPhase::LockedUnbuilt, events);
        Ok(())
    }

    pub fn unlock(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        if !self.state.is_locked() {
            return Err(DeckError::AlreadyUnlocked);
        }
        if self.state.active_play.take().is_some() {
            events.push(Event::PlayCancelled);
        }
        self.set_phase(DeckPhase::Unlocked, events);
        Ok(())
    }

    pub fn build(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        if !self.state.is_locked() {
            return Err(DeckError::NotLocked("building"));
        }
        self.state.deck = self.materialize_deck();
        self.state.hand.clear();
        self.state.discard.clear();
        self.state.active_play = None;
        events.push(Event::DeckBuilt {
            size: self.state.deck.len(),
        });
        self.set_phase(DeckPhase::LockedBuilt, events);
        Ok(())
    }

    pub fn shuffle(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        match self.state.phase {
            DeckPhase::Unlocked => return Err(DeckError::NotLocked("shuffling")),
            DeckPhase::LockedUnbuilt => return Err(DeckError::NotBuilt("shuffling")),
            DeckPhase::LockedBuilt | DeckPhase::LockedReady => {}
        }
        let mut deck = std::mem::take(&mut self.state.deck);
        self.rng_mut().shuffle(&mut deck);
        self.state.deck = deck;
        events.push(Event::DeckShuffled {
            size: self.state.deck.len(),
        });
        self.set_phase(DeckPhase::LockedReady, events);
        Ok(())
    }

    pub fn draw(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        match self.state.phase {
            DeckPhase::Unlocked => return Err(DeckError::NotLocked("drawing")),
            DeckPhase::LockedUnbuilt => return Err(DeckError::NotBuilt("drawing")),
            DeckPhase::LockedBuilt => return Err(DeckError::NotShuffled),
            DeckPhase::LockedReady => {}
        }
        if self.state.hand_is_full() {
            return Err(DeckError::HandFull {
                limit: self.state.hand_limit,
            });
        }
        if self.state.deck.is_empty() {
            self.refill_deck(events);
        }
        let Some(card) = self.state.deck.pop() else {
            return Err(DeckError::DeckEmpty);
        };
        self.state.hand.push(HandCard::fresh(card.clone()));
        events.push(Event::CardDrawn { card });
        Ok(())
    }

    /// Draws until `count` cards moved or a draw is rejected. The rejection is
    /// only reported when nothing could be drawn.
    pub fn draw_many(&mut self, count: usize, events: &mut EventBus) -> Result<usize, DeckError> {
        let mut drawn = 0;
        while drawn < count {
            match self.draw(events) {
                Ok(()) => drawn += 1,
                Err(err) if drawn == 0 => return Err(err),
                Err(_) => break,
            }
        }
        Ok(drawn)
    }

    /// Bases, then modifiers, then nulls; the first base ends up at the bottom.
    pub fn materialize_deck(&self) -> Vec<CardId> {
        let mut deck = Vec::with_capacity(self.state.composed_size());
        for (id, count) in self
            .state
            .base_counts
            .iter()
            .chain(self.state.modifier_counts.iter())
        {
            for _ in 0..*count {
                deck.push(id.clone());
            }
        }
        for _ in 0..self.state.null_count {
            deck.push(self.rules.null_card_id.clone());
        }
        deck
    }

    fn refill_deck(&mut self, events: &mut EventBus) {
        let source = if self.state.discard.is_empty() {
            self.state.deck = self.materialize_deck();
            RefillSource::Counts
        } else {
            let cards: Vec<CardId> = self.state.discard.drain(..).map(|entry| entry.card).collect();
            self.state.deck = cards;
            RefillSource::Discard
        };
        let mut deck = std::mem::take(&mut self.state.deck);
        self.rng_mut().shuffle(&mut deck);
        self.state.deck = deck;
        tracing::debug!(?source, size = self.state.deck.len(), "deck refilled");
        events.push(Event::DeckRefilled {
            source,
            size: self.state.deck.len(),
        });
    }

    fn set_phase(&mut self, next: DeckPhase, events: &mut EventBus) {
        let from = self.state.phase;
        self.state.phase = next;
        if from != next {
            events.push(Event::PhaseChanged { from, to: next });
        }
    }
}
