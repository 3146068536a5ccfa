use crate::{DeckBuilder, DeckError, Event, EventBus};

fn normalize_name(name: &str) -> Result<String, DeckError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DeckError::EmptyDeckName);
    }
    Ok(trimmed.to_string())
}

impl DeckBuilder {
    /// Saving overwrites any deck already stored under the same name.
    pub fn save_deck(&mut self, name: &str, events: &mut EventBus) -> Result<(), DeckError> {
        let name = normalize_name(name)?;
        let snapshot = self.state.snapshot();
        self.state.saved_decks.insert(name.clone(), snapshot);
        events.push(Event::DeckSaved { name });
        Ok(())
    }

    pub fn load_deck(&mut self, name: &str, events: &mut EventBus) -> Result<(), DeckError> {
        self.ensure_editable()?;
        let name = normalize_name(name)?;
        let Some(saved) = self.state.saved_decks.get(&name).cloned() else {
            return Err(DeckError::UnknownSavedDeck(name));
        };
        self.state.base_counts = saved.base_counts;
        self.state.modifier_counts = saved.modifier_counts;
        self.state.null_count = self.rules.clamp_nulls(saved.null_count);
        self.state.capacity = self.rules.clamp_capacity(saved.capacity);
        self.state.deck = saved.deck;
        self.state.hand.clear();
        self.state.discard.clear();
        self.state.active_play = None;
        events.push(Event::DeckLoaded { name });
        Ok(())
    }

    pub fn delete_deck(&mut self, name: &str, events: &mut EventBus) -> Result<(), DeckError> {
        let name = normalize_name(name)?;
        if self.state.saved_decks.remove(&name).is_none() {
            return Err(DeckError::UnknownSavedDeck(name));
        }
        events.push(Event::DeckDeleted { name });
        Ok(())
    }

    pub fn saved_deck_names(&self) -> impl Iterator<Item = &str> {
        self.state.saved_decks.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, CardCatalog, DeckRules};

    fn builder() -> DeckBuilder {
        let catalog = CardCatalog::new(vec![
            Card::base("strike", "Strike"),
            Card::modifier("keen", "Keen", 2),
        ])
        .expect("catalog");
        DeckBuilder::new(DeckRules::player(), catalog, 21)
    }

    #[test]
    fn save_then_load_restores_counts() {
        let mut builder = builder();
        let mut events = EventBus::default();
        builder.adjust_base("strike", 26, &mut events).expect("strike");
        builder.adjust_modifier("keen", 2, &mut events).expect("keen");
        builder.save_deck("  aggro ", &mut events).expect("save");
        builder.reset_composition(&mut events).expect("reset");
        builder.load_deck("aggro", &mut events).expect("load");
        assert_eq!(builder.state.base_count("strike"), 26);
        assert_eq!(builder.state.modifier_count("keen"), 2);
        assert_eq!(builder.saved_deck_names().collect::<Vec<_>>(), vec!["aggro"]);
    }

    #[test]
    fn load_is_rejected_while_locked() {
        let mut builder = builder();
        let mut events = EventBus::default();
        builder.adjust_base("strike", 26, &mut events).expect("strike");
        builder.save_deck("main", &mut events).expect("save");
        builder.lock(&mut events).expect("lock");
        assert_eq!(builder.load_deck("main", &mut events), Err(DeckError::Locked));
        builder.save_deck("locked copy", &mut events).expect("save while locked");
        assert_eq!(builder.state.saved_decks["locked copy"].deck.len(), 31);
    }

    #[test]
    fn names_are_validated() {
        let mut builder = builder();
        let mut events = EventBus::default();
        assert_eq!(builder.save_deck("   ", &mut events), Err(DeckError::EmptyDeckName));
        assert_eq!(
            builder.delete_deck("nope", &mut events),
            Err(DeckError::UnknownSavedDeck("nope".to_string()))
        );
        builder.save_deck("tmp", &mut events).expect("save");
        builder.delete_deck("tmp", &mut events).expect("delete");
        assert!(builder.state.saved_decks.is_empty());
    }
}
