use crate::{KeyValueStore, StoreError};
use deckhand_core::{
    CardCatalog, CardCounts, CardId, CardKind, DeckPhase, DeckRules, DeckState, DiscardedCard,
    HandCard, SavedDeck,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DECK_SCHEMA_VERSION: u32 = 1;

/// Stored shape of a deck. The lifecycle phase is kept as the three flags
/// older saves already carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedDeck {
    pub version: u32,
    pub base_counts: CardCounts,
    pub modifier_counts: CardCounts,
    pub null_count: u32,
    pub capacity: u32,
    pub deck: Vec<CardId>,
    pub hand: Vec<HandCard>,
    pub discard: Vec<DiscardedCard>,
    pub locked: bool,
    pub built: bool,
    pub shuffled: bool,
    pub hand_limit: usize,
    pub saved_decks: BTreeMap<String, SavedDeck>,
}

impl PersistedDeck {
    pub fn from_state(state: &DeckState) -> Self {
        let (locked, built, shuffled) = state.phase.flags();
        Self {
            version: DECK_SCHEMA_VERSION,
            base_counts: state.base_counts.clone(),
            modifier_counts: state.modifier_counts.clone(),
            null_count: state.null_count,
            capacity: state.capacity,
            deck: state.deck.clone(),
            hand: state.hand.clone(),
            discard: state.discard.clone(),
            locked,
            built,
            shuffled,
            hand_limit: state.hand_limit,
            saved_decks: state.saved_decks.clone(),
        }
    }
}

pub fn encode_deck(state: &DeckState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&PersistedDeck::from_state(state))
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(field = key, %err, "ignoring malformed stored field");
            None
        }
    }
}

/// Never fails: every field is read on its own and replaced by its default
/// when absent or malformed, then the result is fitted to `rules` and `catalog`.
pub fn decode_deck(raw: &str, rules: &DeckRules, catalog: &CardCatalog) -> DeckState {
    let defaults = DeckState::new(rules);
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            tracing::warn!("stored deck is not an object, using defaults");
            return defaults;
        }
        Err(err) => {
            tracing::warn!(%err, "stored deck unreadable, using defaults");
            return defaults;
        }
    };
    let version = field::<u32>(&object, "version").unwrap_or(DECK_SCHEMA_VERSION);
    if version > DECK_SCHEMA_VERSION {
        tracing::warn!(version, "stored deck is from a newer version, using defaults");
        return defaults;
    }
    let locked = field(&object, "locked").unwrap_or(false);
    let built = field(&object, "built").unwrap_or(false);
    let shuffled = field(&object, "shuffled").unwrap_or(false);
    let mut state = DeckState {
        base_counts: field(&object, "base_counts").unwrap_or(defaults.base_counts),
        modifier_counts: field(&object, "modifier_counts").unwrap_or(defaults.modifier_counts),
        null_count: field(&object, "null_count").unwrap_or(defaults.null_count),
        capacity: field(&object, "capacity").unwrap_or(defaults.capacity),
        deck: field(&object, "deck").unwrap_or(defaults.deck),
        hand: field(&object, "hand").unwrap_or(defaults.hand),
        discard: field(&object, "discard").unwrap_or(defaults.discard),
        phase: DeckPhase::from_flags(locked, built, shuffled),
        hand_limit: field(&object, "hand_limit").unwrap_or(defaults.hand_limit),
        saved_decks: field(&object, "saved_decks").unwrap_or(defaults.saved_decks),
        active_play: None,
    };
    fit_to_rules(&mut state, rules, catalog);
    state
}

fn kind_of(id: &str, rules: &DeckRules, catalog: &CardCatalog) -> Option<CardKind> {
    if id == rules.null_card_id {
        return Some(CardKind::Null);
    }
    catalog.kind_of(id)
}

fn fit_counts(counts: &mut CardCounts, kind: CardKind, rules: &DeckRules, catalog: &CardCatalog) {
    counts.retain(|id, count| {
        if *count == 0 {
            return false;
        }
        let keep = kind_of(id, rules, catalog) == Some(kind);
        if !keep {
            tracing::warn!(card = %id, kind = kind.label(), "dropping stored count");
        }
        keep
    });
    for count in counts.values_mut() {
        *count = (*count).min(rules.max_copies);
    }
}

fn charge_of(id: &str, rules: &DeckRules, catalog: &CardCatalog) -> u32 {
    rules.charge(catalog.cost_of(id).unwrap_or(0))
}

fn used_capacity(counts: &CardCounts, rules: &DeckRules, catalog: &CardCatalog) -> u32 {
    counts
        .iter()
        .map(|(id, count)| count.saturating_mul(charge_of(id, rules, catalog)))
        .sum()
}

/// Removes modifier copies, last id first, until they fit `capacity`.
fn trim_to_capacity(
    counts: &mut CardCounts,
    capacity: u32,
    rules: &DeckRules,
    catalog: &CardCatalog,
) {
    if !rules.capacity_checks_enabled() {
        return;
    }
    while used_capacity(counts, rules, catalog) > capacity {
        let Some(id) = counts
            .keys()
            .rev()
            .find(|id| charge_of(id, rules, catalog) > 0)
            .cloned()
        else {
            break;
        };
        tracing::warn!(card = %id, capacity, "stored modifiers exceed capacity, trimming one copy");
        match counts.get_mut(&id) {
            Some(count) if *count > 1 => *count -= 1,
            _ => {
                counts.remove(&id);
            }
        }
    }
}

/// Drops references the catalog no longer knows and clamps values into the
/// ranges the rules allow. Modifiers are trimmed to fit the clamped capacity.
pub fn fit_to_rules(state: &mut DeckState, rules: &DeckRules, catalog: &CardCatalog) {
    fit_counts(&mut state.base_counts, CardKind::Base, rules, catalog);
    fit_counts(&mut state.modifier_counts, CardKind::Modifier, rules, catalog);
    state.null_count = rules.clamp_nulls(state.null_count);
    state.capacity = rules.clamp_capacity(state.capacity);
    trim_to_capacity(&mut state.modifier_counts, state.capacity, rules, catalog);
    state.hand_limit = rules.clamp_hand_limit(state.hand_limit);

    let known = |id: &CardId| kind_of(id, rules, catalog).is_some();
    state.deck.retain(|id| known(id));
    state.hand.retain(|entry| known(&entry.card));
    state.discard.retain(|entry| known(&entry.card));
    if state.hand.len() > state.hand_limit {
        let overflow = state.hand.split_off(state.hand_limit);
        tracing::warn!(
            count = overflow.len(),
            "stored hand exceeds its limit, returning extras to the deck"
        );
        state.deck.extend(overflow.into_iter().map(|entry| entry.card));
    }
    for saved in state.saved_decks.values_mut() {
        fit_counts(&mut saved.base_counts, CardKind::Base, rules, catalog);
        fit_counts(&mut saved.modifier_counts, CardKind::Modifier, rules, catalog);
        saved.capacity = rules.clamp_capacity(saved.capacity);
        trim_to_capacity(&mut saved.modifier_counts, saved.capacity, rules, catalog);
        saved.deck.retain(|id| known(id));
    }
    state.active_play = None;
}

pub fn load_deck_state(
    store: &dyn KeyValueStore,
    key: &str,
    rules: &DeckRules,
    catalog: &CardCatalog,
) -> DeckState {
    match store.get(key) {
        Ok(Some(raw)) => decode_deck(&raw, rules, catalog),
        Ok(None) => DeckState::new(rules),
        Err(err) => {
            tracing::warn!(%err, key, "deck storage unreadable, using defaults");
            DeckState::new(rules)
        }
    }
}

pub fn save_deck_state(
    store: &mut dyn KeyValueStore,
    key: &str,
    state: &DeckState,
) -> Result<(), StoreError> {
    let body = encode_deck(state).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use deckhand_core::{ActivePlay, Card, DeckBuilder, DiscardOrigin, EventBus, RngState};

    fn catalog() -> CardCatalog {
        CardCatalog::new(vec![
            Card::base("strike", "Strike"),
            Card::modifier("keen", "Keen", 2),
        ])
        .expect("catalog")
    }

    fn sample_state(rules: &DeckRules) -> DeckState {
        let mut state = DeckState::new(rules);
        state.base_counts.insert("strike".to_string(), 26);
        state.modifier_counts.insert("keen".to_string(), 2);
        state.deck = vec!["strike".to_string(), "null".to_string()];
        state.hand = vec![HandCard {
            card: "keen".to_string(),
            spent: true,
        }];
        state.discard = vec![DiscardedCard {
            card: "strike".to_string(),
            origin: DiscardOrigin::Played,
        }];
        state.phase = DeckPhase::LockedReady;
        state.saved_decks.insert("main".to_string(), state.snapshot());
        state
    }

    #[test]
    fn state_survives_a_reload() {
        let rules = DeckRules::player();
        let mut store = MemoryStore::new();
        let state = sample_state(&rules);
        save_deck_state(&mut store, "deck", &state).expect("save");
        let loaded = load_deck_state(&store, "deck", &rules, &catalog());
        assert_eq!(loaded, state);
    }

    #[test]
    fn active_play_is_not_restored() {
        let rules = DeckRules::player();
        let mut state = sample_state(&rules);
        state.active_play = Some(ActivePlay::new(0));
        let raw = encode_deck(&state).expect("encode");
        let loaded = decode_deck(&raw, &rules, &catalog());
        assert_eq!(loaded.active_play, None);
    }

    #[test]
    fn missing_key_and_garbage_fall_back_to_defaults() {
        let rules = DeckRules::player();
        let store = MemoryStore::new();
        assert_eq!(
            load_deck_state(&store, "deck", &rules, &catalog()),
            DeckState::new(&rules)
        );
        assert_eq!(
            decode_deck("not json", &rules, &catalog()),
            DeckState::new(&rules)
        );
        assert_eq!(decode_deck("[1,2]", &rules, &catalog()), DeckState::new(&rules));
    }

    #[test]
    fn fields_default_independently() {
        let rules = DeckRules::player();
        let raw = r#"{
            "base_counts": {"strike": 12},
            "null_count": "many",
            "hand_limit": 3,
            "locked": true
        }"#;
        let state = decode_deck(raw, &rules, &catalog());
        assert_eq!(state.base_count("strike"), 12);
        assert_eq!(state.null_count, 5);
        assert_eq!(state.hand_limit, 3);
        assert_eq!(state.capacity, 10);
        assert_eq!(state.phase, DeckPhase::LockedUnbuilt);
    }

    #[test]
    fn values_are_clamped_and_unknown_cards_dropped() {
        let rules = DeckRules::player();
        let raw = r#"{
            "base_counts": {"strike": 99, "ghost": 4, "keen": 1},
            "modifier_counts": {"keen": 1},
            "null_count": 1,
            "hand_limit": 100,
            "deck": ["strike", "ghost", "null"]
        }"#;
        let state = decode_deck(raw, &rules, &catalog());
        assert_eq!(state.base_counts.len(), 1);
        assert_eq!(state.base_count("strike"), 26);
        assert_eq!(state.modifier_count("keen"), 1);
        assert_eq!(state.null_count, 5);
        assert_eq!(state.hand_limit, 15);
        assert_eq!(state.deck, vec!["strike".to_string(), "null".to_string()]);
    }

    #[test]
    fn modifiers_are_trimmed_to_a_lowered_capacity() {
        let rules = DeckRules {
            max_capacity: 6,
            ..DeckRules::player()
        };
        let raw = r#"{"modifier_counts": {"keen": 3}, "capacity": 9}"#;
        let state = decode_deck(raw, &rules, &catalog());
        assert_eq!(state.capacity, 6);
        assert_eq!(state.modifier_count("keen"), 3);

        let rules = DeckRules {
            max_capacity: 5,
            ..DeckRules::player()
        };
        let mut state = decode_deck(raw, &rules, &catalog());
        assert_eq!(state.capacity, 5);
        assert_eq!(state.modifier_count("keen"), 2);

        let mut builder =
            DeckBuilder::with_state(rules, catalog(), state.clone(), RngState::from_seed(2));
        let mut events = EventBus::default();
        assert_eq!(builder.capacity_used(), 4);
        builder.adjust_capacity(-3, &mut events).expect("capacity");
        assert_eq!(builder.state.capacity, 4);

        state.saved_decks.insert(
            "wide".to_string(),
            SavedDeck {
                modifier_counts: [("keen".to_string(), 4)].into_iter().collect(),
                capacity: 30,
                ..state.snapshot()
            },
        );
        fit_to_rules(&mut state, &builder.rules, &builder.catalog);
        let saved = &state.saved_decks["wide"];
        assert_eq!(saved.capacity, 5);
        assert_eq!(saved.modifier_counts["keen"], 2);
    }

    #[test]
    fn oversized_hand_returns_extras_to_deck() {
        let rules = DeckRules::player();
        let raw = r#"{
            "hand_limit": 1,
            "hand": [{"card": "strike"}, {"card": "keen", "spent": true}],
            "deck": []
        }"#;
        let state = decode_deck(raw, &rules, &catalog());
        assert_eq!(state.hand, vec![HandCard::fresh("strike".to_string())]);
        assert_eq!(state.deck, vec!["keen".to_string()]);
    }

    #[test]
    fn newer_versions_are_ignored() {
        let rules = DeckRules::player();
        let raw = r#"{"version": 9, "base_counts": {"strike": 3}}"#;
        assert_eq!(decode_deck(raw, &rules, &catalog()), DeckState::new(&rules));
    }

    #[test]
    fn stored_flags_use_snake_case_keys() {
        let rules = DeckRules::player();
        let raw = encode_deck(&sample_state(&rules)).expect("encode");
        let value: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["version"], 1);
        assert_eq!(value["locked"], true);
        assert_eq!(value["built"], true);
        assert_eq!(value["shuffled"], true);
        assert_eq!(value["discard"][0]["origin"], "played");
    }
}
