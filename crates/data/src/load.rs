use crate::RoleRules;
use anyhow::Context;
use deckhand_core::{Card, CardCatalog};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const BUILTIN_CARDS: &str = include_str!("../../../assets/cards.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    cards: Vec<Card>,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

pub fn parse_catalog(raw: &str) -> anyhow::Result<CardCatalog> {
    let file: CatalogFile = serde_json::from_str(raw).context("parse card catalog")?;
    let catalog = CardCatalog::new(file.cards).context("validate card catalog")?;
    Ok(catalog)
}

pub fn load_catalog(path: &Path) -> anyhow::Result<CardCatalog> {
    let file: CatalogFile = load_json(path)?;
    let catalog = CardCatalog::new(file.cards)
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(catalog)
}

/// The sample catalog bundled with the binaries.
pub fn builtin_catalog() -> anyhow::Result<CardCatalog> {
    parse_catalog(BUILTIN_CARDS)
}

pub fn load_rules(path: &Path) -> anyhow::Result<RoleRules> {
    load_json(path)
}
