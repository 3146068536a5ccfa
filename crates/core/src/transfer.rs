use crate::{CardId, DeckBuilder, DeckError, DiscardOrigin, DiscardedCard, Event, EventBus, HandCard};
use std::collections::BTreeMap;

impl DeckBuilder {
    /// Moves the first hand entry with `card` (or every one when `all`) to the
    /// discard pile. Returns how many cards moved.
    pub fn discard(
        &mut self,
        card: &str,
        origin: DiscardOrigin,
        all: bool,
        events: &mut EventBus,
    ) -> Result<usize, DeckError> {
        self.ensure_no_pending_play()?;
        let mut positions: Vec<usize> = self
            .state
            .hand
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.card == card)
            .map(|(idx, _)| idx)
            .collect();
        if positions.is_empty() {
            return Err(DeckError::NotInHand(card.to_string()));
        }
        if !all {
            positions.truncate(1);
        }
        let moved = self.move_hand_to_discard(&positions, origin);
        let count = moved.len();
        events.push(Event::CardsDiscarded {
            cards: moved,
            origin,
        });
        Ok(count)
    }

    pub fn discard_at(
        &mut self,
        index: usize,
        origin: DiscardOrigin,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        self.ensure_no_pending_play()?;
        if index >= self.state.hand.len() {
            return Err(DeckError::InvalidHandIndex(index));
        }
        let moved = self.move_hand_to_discard(&[index], origin);
        events.push(Event::CardsDiscarded {
            cards: moved,
            origin,
        });
        Ok(())
    }

    pub fn discard_hand(
        &mut self,
        origin: DiscardOrigin,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        self.ensure_no_pending_play()?;
        if self.state.hand.is_empty() {
            return Ok(());
        }
        let positions: Vec<usize> = (0..self.state.hand.len()).collect();
        let moved = self.move_hand_to_discard(&positions, origin);
        events.push(Event::CardsDiscarded {
            cards: moved,
            origin,
        });
        Ok(())
    }

    pub fn return_to_hand(&mut self, index: usize, events: &mut EventBus) -> Result<(), DeckError> {
        if index >= self.state.discard.len() {
            return Err(DeckError::InvalidDiscardIndex(index));
        }
        if self.state.hand_is_full() {
            return Err(DeckError::HandFull {
                limit: self.state.hand_limit,
            });
        }
        let entry = self.state.discard.remove(index);
        self.state.hand.push(HandCard::fresh(entry.card.clone()));
        events.push(Event::ReturnedToHand {
            cards: vec![entry.card],
        });
        Ok(())
    }

    /// All or nothing: rejected when the whole pile does not fit in the hand.
    pub fn return_all_to_hand(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        if self.state.discard.is_empty() {
            return Err(DeckError::DiscardEmpty);
        }
        let needed = self.state.discard.len();
        let free = self.state.hand_room();
        if needed > free {
            return Err(DeckError::HandOverflow { needed, free });
        }
        let cards: Vec<CardId> = self.state.discard.drain(..).map(|entry| entry.card).collect();
        self.state
            .hand
            .extend(cards.iter().cloned().map(HandCard::fresh));
        events.push(Event::ReturnedToHand { cards });
        Ok(())
    }

    pub fn return_to_deck(
        &mut self,
        index: usize,
        shuffle: bool,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        if index >= self.state.discard.len() {
            return Err(DeckError::InvalidDiscardIndex(index));
        }
        let entry = self.state.discard.remove(index);
        self.state.deck.push(entry.card.clone());
        self.finish_return_to_deck(vec![entry.card], shuffle, events);
        Ok(())
    }

    pub fn return_all_to_deck(
        &mut self,
        shuffle: bool,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        if self.state.discard.is_empty() {
            return Err(DeckError::DiscardEmpty);
        }
        let cards: Vec<CardId> = self.state.discard.drain(..).map(|entry| entry.card).collect();
        self.state.deck.extend(cards.iter().cloned());
        self.finish_return_to_deck(cards, shuffle, events);
        Ok(())
    }

    pub fn toggle_spent(&mut self, index: usize, events: &mut EventBus) -> Result<(), DeckError> {
        let Some(entry) = self.state.hand.get_mut(index) else {
            return Err(DeckError::InvalidHandIndex(index));
        };
        entry.spent = !entry.spent;
        events.push(Event::SpentToggled {
            card: entry.card.clone(),
            spent: entry.spent,
        });
        Ok(())
    }

    /// Removes the given hand positions and appends them to the discard pile
    /// in the order listed. Positions must be valid.
    pub(crate) fn move_hand_to_discard(
        &mut self,
        order: &[usize],
        origin: DiscardOrigin,
    ) -> Vec<CardId> {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut taken: BTreeMap<usize, CardId> = BTreeMap::new();
        for pos in sorted.into_iter().rev() {
            taken.insert(pos, self.state.hand.remove(pos).card);
        }
        let moved: Vec<CardId> = order.iter().filter_map(|pos| taken.remove(pos)).collect();
        self.state
            .discard
            .extend(moved.iter().cloned().map(|card| DiscardedCard { card, origin }));
        moved
    }

    fn finish_return_to_deck(&mut self, cards: Vec<CardId>, shuffle: bool, events: &mut EventBus) {
        if shuffle {
            let mut deck = std::mem::take(&mut self.state.deck);
            self.rng_mut().shuffle(&mut deck);
            self.state.deck = deck;
        }
        events.push(Event::ReturnedToDeck {
            cards,
            shuffled: shuffle,
        });
    }
}
