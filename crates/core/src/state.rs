use crate::{ActivePlay, CardId, DeckPhase, DeckRules};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type CardCounts = BTreeMap<CardId, u32>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandCard {
    pub card: CardId,
    #[serde(default)]
    pub spent: bool,
}

impl HandCard {
    pub fn fresh(card: CardId) -> Self {
        Self { card, spent: false }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscardOrigin {
    Played,
    Discarded,
}

impl DiscardOrigin {
    pub fn label(self) -> &'static str {
        match self {
            Self::Played => "played",
            Self::Discarded => "discarded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscardedCard {
    pub card: CardId,
    pub origin: DiscardOrigin,
}

/// Frozen copy of a composition and its materialised deck.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedDeck {
    #[serde(default)]
    pub base_counts: CardCounts,
    #[serde(default)]
    pub modifier_counts: CardCounts,
    #[serde(default)]
    pub null_count: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub deck: Vec<CardId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckState {
    pub base_counts: CardCounts,
    pub modifier_counts: CardCounts,
    pub null_count: u32,
    pub capacity: u32,
    /// Last element is the top of the deck.
    pub deck: Vec<CardId>,
    pub hand: Vec<HandCard>,
    pub discard: Vec<DiscardedCard>,
    pub phase: DeckPhase,
    pub hand_limit: usize,
    pub saved_decks: BTreeMap<String, SavedDeck>,
    pub active_play: Option<ActivePlay>,
}

impl DeckState {
    pub fn new(rules: &DeckRules) -> Self {
        Self {
            base_counts: CardCounts::new(),
            modifier_counts: CardCounts::new(),
            null_count: rules.clamp_nulls(rules.min_nulls),
            capacity: rules.clamp_capacity(rules.default_capacity),
            deck: Vec::new(),
            hand: Vec::new(),
            discard: Vec::new(),
            phase: DeckPhase::Unlocked,
            hand_limit: rules.clamp_hand_limit(rules.default_hand_limit),
            saved_decks: BTreeMap::new(),
            active_play: None,
        }
    }

    pub fn base_count(&self, id: &str) -> u32 {
        self.base_counts.get(id).copied().unwrap_or(0)
    }

    pub fn modifier_count(&self, id: &str) -> u32 {
        self.modifier_counts.get(id).copied().unwrap_or(0)
    }

    pub fn base_total(&self) -> u32 {
        self.base_counts.values().sum()
    }

    pub fn modifier_total(&self) -> u32 {
        self.modifier_counts.values().sum()
    }

    /// Size of a deck materialised from the current counts.
    pub fn composed_size(&self) -> usize {
        (self.base_total() + self.modifier_total() + self.null_count) as usize
    }

    pub fn is_locked(&self) -> bool {
        self.phase.is_locked()
    }

    pub fn hand_is_full(&self) -> bool {
        self.hand.len() >= self.hand_limit
    }

    pub fn hand_room(&self) -> usize {
        self.hand_limit.saturating_sub(self.hand.len())
    }

    pub fn snapshot(&self) -> SavedDeck {
        SavedDeck {
            base_counts: self.base_counts.clone(),
            modifier_counts: self.modifier_counts.clone(),
            null_count: self.null_count,
            capacity: self.capacity,
            deck: self.deck.clone(),
        }
    }
}

pub(crate) fn set_count(counts: &mut CardCounts, id: &str, value: u32) {
    if value == 0 {
        counts.remove(id);
    } else {
        counts.insert(id.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_uses_rule_defaults() {
        let rules = DeckRules::player();
        let state = DeckState::new(&rules);
        assert_eq!(state.null_count, 5);
        assert_eq!(state.capacity, 10);
        assert_eq!(state.hand_limit, 7);
        assert_eq!(state.phase, DeckPhase::Unlocked);
        assert_eq!(state.composed_size(), 5);
    }

    #[test]
    fn zero_counts_are_dropped() {
        let mut counts = CardCounts::new();
        set_count(&mut counts, "strike", 2);
        assert_eq!(counts.get("strike"), Some(&2));
        set_count(&mut counts, "strike", 0);
        assert!(counts.is_empty());
    }
}
