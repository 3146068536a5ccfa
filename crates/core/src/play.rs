use crate::{CardId, CardKind, DeckBuilder, DeckError, DeckState, DiscardOrigin, Event, EventBus};
use std::collections::BTreeSet;

/// A base card and its attached modifiers, tracked by hand position so that
/// duplicate ids stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePlay {
    pub base: usize,
    pub modifiers: BTreeSet<usize>,
}

impl ActivePlay {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            modifiers: BTreeSet::new(),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.base == index || self.modifiers.contains(&index)
    }

    pub fn base_id<'a>(&self, state: &'a DeckState) -> Option<&'a CardId> {
        state.hand.get(self.base).map(|entry| &entry.card)
    }

    pub fn modifier_ids<'a>(&self, state: &'a DeckState) -> Vec<&'a CardId> {
        self.modifiers
            .iter()
            .filter_map(|idx| state.hand.get(*idx).map(|entry| &entry.card))
            .collect()
    }
}

impl DeckBuilder {
    /// Capacity already claimed by the attached modifiers of the current play.
    pub fn play_capacity_used(&self) -> u32 {
        let Some(play) = self.state.active_play.as_ref() else {
            return 0;
        };
        play.modifier_ids(&self.state)
            .into_iter()
            .map(|id| self.charge_for(id))
            .sum()
    }

    /// Starts a play, replacing any selection already in progress.
    pub fn select_base(&mut self, index: usize, events: &mut EventBus) -> Result<(), DeckError> {
        let card = self.hand_card(index)?;
        match self.card_kind(&card) {
            Some(CardKind::Null) => return Err(DeckError::NullNotPlayable),
            Some(CardKind::Modifier) => return Err(DeckError::ModifierAsBase),
            Some(CardKind::Base) => {}
            None => return Err(DeckError::UnknownCard(card)),
        }
        self.state.active_play = Some(ActivePlay::new(index));
        events.push(Event::BaseSelected { card });
        Ok(())
    }

    pub fn attach(&mut self, index: usize, events: &mut EventBus) -> Result<(), DeckError> {
        let Some(play) = self.state.active_play.as_ref() else {
            return Err(DeckError::NoBaseSelected);
        };
        let card = self.hand_card(index)?;
        match self.card_kind(&card) {
            Some(CardKind::Null) => return Err(DeckError::NullNotAttachable),
            Some(CardKind::Base) => return Err(DeckError::NotAttachable),
            Some(CardKind::Modifier) => {}
            None => return Err(DeckError::UnknownCard(card)),
        }
        if play.contains(index) {
            return Err(DeckError::AlreadyAttached);
        }
        let used = self.play_capacity_used();
        let needed = self.charge_for(&card);
        if self.rules.play_capacity_check
            && self.rules.capacity_checks_enabled()
            && used.saturating_add(needed) > self.state.capacity
        {
            return Err(DeckError::CapacityExceeded {
                used,
                capacity: self.state.capacity,
                needed,
            });
        }
        if let Some(play) = self.state.active_play.as_mut() {
            play.modifiers.insert(index);
        }
        events.push(Event::ModifierAttached {
            card,
            used: used.saturating_add(needed),
        });
        Ok(())
    }

    pub fn detach(&mut self, index: usize, events: &mut EventBus) -> Result<(), DeckError> {
        let Some(play) = self.state.active_play.as_mut() else {
            return Err(DeckError::NoActivePlay);
        };
        if !play.modifiers.remove(&index) {
            return Err(DeckError::NotAttached);
        }
        let card = self.hand_card(index)?;
        let used = self.play_capacity_used();
        events.push(Event::ModifierDetached { card, used });
        Ok(())
    }

    /// Moves the base and its modifiers to the discard pile as played cards.
    pub fn finalize_play(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        let Some(play) = self.state.active_play.as_ref() else {
            return Err(DeckError::NoActivePlay);
        };
        let mut order = Vec::with_capacity(play.modifiers.len() + 1);
        order.push(play.base);
        order.extend(play.modifiers.iter().copied());
        if let Some(bad) = order.iter().find(|idx| **idx >= self.state.hand.len()) {
            return Err(DeckError::InvalidHandIndex(*bad));
        }
        self.state.active_play = None;
        let moved = self.move_hand_to_discard(&order, DiscardOrigin::Played);
        let Some((base, modifiers)) = moved.split_first() else {
            return Err(DeckError::NoActivePlay);
        };
        events.push(Event::PlayFinalized {
            base: base.clone(),
            modifiers: modifiers.to_vec(),
        });
        Ok(())
    }

    pub fn cancel_play(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        if self.state.active_play.take().is_none() {
            return Err(DeckError::NoActivePlay);
        }
        events.push(Event::PlayCancelled);
        Ok(())
    }

    fn hand_card(&self, index: usize) -> Result<CardId, DeckError> {
        self.state
            .hand
            .get(index)
            .map(|entry| entry.card.clone())
            .ok_or(DeckError::InvalidHandIndex(index))
    }
}
