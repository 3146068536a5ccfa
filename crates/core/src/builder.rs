use crate::{
    CardCatalog, CardId, CardKind, DeckError, DeckRules, DeckState, DiscardOrigin, Event,
    EventBus, RngState,
};
use serde::{Deserialize, Serialize};

/// Every user-facing deck operation, in a form that can be recorded or replayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeckAction {
    AdjustBase {
        card: CardId,
        delta: i32,
    },
    AdjustModifier {
        card: CardId,
        delta: i32,
    },
    AdjustNulls {
        delta: i32,
    },
    AdjustCapacity {
        delta: i32,
    },
    AdjustHandLimit {
        delta: i32,
    },
    ResetComposition,
    Lock,
    Unlock,
    Build,
    Shuffle,
    Draw,
    DrawMany {
        count: usize,
    },
    Discard {
        card: CardId,
        origin: DiscardOrigin,
        #[serde(default)]
        all: bool,
    },
    DiscardAt {
        index: usize,
        origin: DiscardOrigin,
    },
    DiscardHand {
        origin: DiscardOrigin,
    },
    ReturnToHand {
        index: usize,
    },
    ReturnAllToHand,
    ReturnToDeck {
        index: usize,
        #[serde(default)]
        shuffle: bool,
    },
    ReturnAllToDeck {
        #[serde(default)]
        shuffle: bool,
    },
    ToggleSpent {
        index: usize,
    },
    SelectBase {
        index: usize,
    },
    Attach {
        index: usize,
    },
    Detach {
        index: usize,
    },
    FinalizePlay,
    CancelPlay,
    SaveDeck {
        name: String,
    },
    LoadDeck {
        name: String,
    },
    DeleteDeck {
        name: String,
    },
}

#[derive(Debug, Clone)]
pub struct DeckBuilder {
    pub rules: DeckRules,
    pub catalog: CardCatalog,
    pub state: DeckState,
    rng: RngState,
}

impl DeckBuilder {
    pub fn new(rules: DeckRules, catalog: CardCatalog, seed: u64) -> Self {
        let state = DeckState::new(&rules);
        Self::with_state(rules, catalog, state, RngState::from_seed(seed))
    }

    pub fn with_state(
        rules: DeckRules,
        catalog: CardCatalog,
        state: DeckState,
        rng: RngState,
    ) -> Self {
        Self {
            rules,
            catalog,
            state,
            rng,
        }
    }

    pub fn rng_seed(&self) -> u64 {
        self.rng.seed()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut RngState {
        &mut self.rng
    }

    /// The configured null id is a null card whether or not the catalog lists it.
    pub fn card_kind(&self, id: &str) -> Option<CardKind> {
        if id == self.rules.null_card_id {
            return Some(CardKind::Null);
        }
        self.catalog.kind_of(id)
    }

    pub fn charge_for(&self, id: &str) -> u32 {
        self.rules.charge(self.catalog.cost_of(id).unwrap_or(0))
    }

    pub fn capacity_used(&self) -> u32 {
        self.state
            .modifier_counts
            .iter()
            .map(|(id, count)| count.saturating_mul(self.charge_for(id)))
            .sum()
    }

    pub fn capacity_remaining(&self) -> u32 {
        self.state.capacity.saturating_sub(self.capacity_used())
    }

    pub fn validate_composition(&self) -> Result<(), DeckError> {
        let total = self.state.base_total();
        if !self.rules.simple_counters && total != self.rules.base_target {
            return Err(DeckError::BaseTargetMismatch {
                total,
                target: self.rules.base_target,
            });
        }
        let used = self.capacity_used();
        if self.rules.capacity_checks_enabled() && used > self.state.capacity {
            return Err(DeckError::CapacityExceeded {
                used,
                capacity: self.state.capacity,
                needed: used - self.state.capacity,
            });
        }
        Ok(())
    }

    pub fn composition_is_valid(&self) -> bool {
        self.validate_composition().is_ok()
    }

    pub fn apply(&mut self, action: DeckAction, events: &mut EventBus) -> Result<(), DeckError> {
        tracing::debug!(?action, phase = ?self.state.phase, "applying deck action");
        let result = match action {
            DeckAction::AdjustBase { card, delta } => self.adjust_base(&card, delta, events),
            DeckAction::AdjustModifier { card, delta } => {
                self.adjust_modifier(&card, delta, events)
            }
            DeckAction::AdjustNulls { delta } => self.adjust_nulls(delta, events),
            DeckAction::AdjustCapacity { delta } => self.adjust_capacity(delta, events),
            DeckAction::AdjustHandLimit { delta } => self.adjust_hand_limit(delta, events),
            DeckAction::ResetComposition => self.reset_composition(events),
            DeckAction::Lock => self.lock(events),
            DeckAction::Unlock => self.unlock(events),
            DeckAction::Build => self.build(events),
            DeckAction::Shuffle => self.shuffle(events),
            DeckAction::Draw => self.draw(events),
            DeckAction::DrawMany { count } => self.draw_many(count, events).map(|_| ()),
            DeckAction::Discard { card, origin, all } => {
                self.discard(&card, origin, all, events).map(|_| ())
            }
            DeckAction::DiscardAt { index, origin } => self.discard_at(index, origin, events),
            DeckAction::DiscardHand { origin } => self.discard_hand(origin, events),
            DeckAction::ReturnToHand { index } => self.return_to_hand(index, events),
            DeckAction::ReturnAllToHand => self.return_all_to_hand(events),
            DeckAction::ReturnToDeck { index, shuffle } => {
                self.return_to_deck(index, shuffle, events)
            }
            DeckAction::ReturnAllToDeck { shuffle } => self.return_all_to_deck(shuffle, events),
            DeckAction::ToggleSpent { index } => self.toggle_spent(index, events),
            DeckAction::SelectBase { index } => self.select_base(index, events),
            DeckAction::Attach { index } => self.attach(index, events),
            DeckAction::Detach { index } => self.detach(index, events),
            DeckAction::FinalizePlay => self.finalize_play(events),
            DeckAction::CancelPlay => self.cancel_play(events),
            DeckAction::SaveDeck { name } => self.save_deck(&name, events),
            DeckAction::LoadDeck { name } => self.load_deck(&name, events),
            DeckAction::DeleteDeck { name } => self.delete_deck(&name, events),
        };
        if let Err(err) = &result {
            tracing::debug!(%err, "deck action rejected");
        }
        result
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), DeckError> {
        if self.state.is_locked() {
            return Err(DeckError::Locked);
        }
        Ok(())
    }

    pub(crate) fn ensure_no_pending_play(&self) -> Result<(), DeckError> {
        if self.state.active_play.is_some() {
            return Err(DeckError::PlayPending);
        }
        Ok(())
    }

    pub(crate) fn expect_kind(&self, id: &str, kind: CardKind) -> Result<(), DeckError> {
        let Some(actual) = self.card_kind(id) else {
            return Err(DeckError::UnknownCard(id.to_string()));
        };
        if actual == kind {
            return Ok(());
        }
        Err(match kind {
            CardKind::Modifier => DeckError::NotModifier(id.to_string()),
            CardKind::Base | CardKind::Null => DeckError::NotBase(id.to_string()),
        })
    }
}

/// Pure form of [`DeckBuilder::apply`]: the input is left untouched and the
/// successor builder is returned together with the emitted events.
pub fn transition(
    builder: &DeckBuilder,
    action: DeckAction,
) -> Result<(DeckBuilder, Vec<Event>), DeckError> {
    let mut next = builder.clone();
    let mut events = EventBus::default();
    next.apply(action, &mut events)?;
    let emitted = events.drain().collect();
    Ok((next, emitted))
}
