use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub type CardId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Base,
    Modifier,
    Null,
}

impl CardKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Modifier => "modifier",
            Self::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    /// Capacity consumed when the card is attached or counted as a modifier.
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub details: Vec<String>,
}

impl Card {
    pub fn base(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: CardKind::Base,
            cost: 0,
            details: Vec::new(),
        }
    }

    pub fn modifier(id: &str, name: &str, cost: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: CardKind::Modifier,
            cost,
            details: Vec::new(),
        }
    }

    pub fn null(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: CardKind::Null,
            cost: 0,
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: &[&str]) -> Self {
        self.details = details.iter().map(|line| line.to_string()).collect();
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("card id must not be empty")]
    EmptyId,
    #[error("duplicate card id {0}")]
    DuplicateId(CardId),
}

/// Immutable card reference data, kept in load order.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl CardCatalog {
    pub fn new(cards: Vec<Card>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(cards.len());
        for (idx, card) in cards.iter().enumerate() {
            if card.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if index.insert(card.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateId(card.id.clone()));
            }
        }
        Ok(Self { cards, index })
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.index.get(id).map(|idx| &self.cards[*idx])
    }

    pub fn kind_of(&self, id: &str) -> Option<CardKind> {
        self.get(id).map(|card| card.kind)
    }

    pub fn cost_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|card| card.cost)
    }

    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|card| card.name.as_str()).unwrap_or(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn of_kind(&self, kind: CardKind) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |card| card.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_ids() {
        let err = CardCatalog::new(vec![Card::base("strike", "Strike"), Card::base("strike", "Again")])
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("strike".to_string()));
    }

    #[test]
    fn rejects_blank_ids() {
        let err = CardCatalog::new(vec![Card::base("  ", "Blank")]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyId);
    }

    #[test]
    fn lookups_follow_load_order() {
        let catalog = CardCatalog::new(vec![
            Card::modifier("keen", "Keen", 2),
            Card::base("strike", "Strike"),
            Card::modifier("heavy", "Heavy", 3),
        ])
        .expect("catalog");
        assert_eq!(catalog.kind_of("strike"), Some(CardKind::Base));
        assert_eq!(catalog.cost_of("heavy"), Some(3));
        assert_eq!(catalog.kind_of("missing"), None);
        assert_eq!(catalog.name_of("missing"), "missing");
        let modifiers: Vec<&str> = catalog
            .of_kind(CardKind::Modifier)
            .map(|card| card.id.as_str())
            .collect();
        assert_eq!(modifiers, vec!["keen", "heavy"]);
    }

    #[test]
    fn card_kind_serializes_snake_case() {
        let raw = serde_json::to_string(&CardKind::Modifier).expect("serialize");
        assert_eq!(raw, "\"modifier\"");
    }
}
