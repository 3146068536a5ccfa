use deckhand_core::{
    CardCounts, CardKind, DeckBuilder, DeckError, DeckState, Event, EventBus,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const COUNTS_SCHEMA_VERSION: u32 = 1;

/// Portable deck list: counts only, no piles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountsExport {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub base: CardCounts,
    #[serde(default)]
    pub modifiers: CardCounts,
    #[serde(default)]
    pub nulls: Option<u32>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

fn default_version() -> u32 {
    COUNTS_SCHEMA_VERSION
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("unsupported deck list version {0}")]
    Version(u32),
    #[error("{card}: {count} copies exceeds the limit of {max}")]
    TooManyCopies { card: String, count: u32, max: u32 },
    #[error("null count {count} outside {min}..={max}")]
    NullsOutOfRange { count: u32, min: u32, max: u32 },
    #[error("capacity {capacity} outside {min}..={max}")]
    CapacityOutOfRange { capacity: u32, min: u32, max: u32 },
    #[error("base total {total} exceeds the target of {target}")]
    BaseOverTarget { total: u32, target: u32 },
    #[error(transparent)]
    Deck(#[from] DeckError),
}

pub fn export_counts(state: &DeckState) -> CountsExport {
    CountsExport {
        version: COUNTS_SCHEMA_VERSION,
        base: state.base_counts.clone(),
        modifiers: state.modifier_counts.clone(),
        nulls: Some(state.null_count),
        capacity: Some(state.capacity),
    }
}

pub fn parse_counts(raw: &str) -> Result<CountsExport, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Replaces the composition with `export` when every entry passes the rules;
/// nothing changes otherwise. Omitted null count and capacity keep their
/// current values.
pub fn import_counts(
    builder: &mut DeckBuilder,
    export: &CountsExport,
    events: &mut EventBus,
) -> Result<(), ImportError> {
    if export.version > COUNTS_SCHEMA_VERSION {
        return Err(ImportError::Version(export.version));
    }
    if builder.state.is_locked() {
        return Err(DeckError::Locked.into());
    }
    let rules = &builder.rules;
    for (counts, kind) in [
        (&export.base, CardKind::Base),
        (&export.modifiers, CardKind::Modifier),
    ] {
        for (card, count) in counts {
            match builder.card_kind(card) {
                None => return Err(DeckError::UnknownCard(card.clone()).into()),
                Some(actual) if actual != kind => {
                    return Err(match kind {
                        CardKind::Modifier => DeckError::NotModifier(card.clone()),
                        CardKind::Base | CardKind::Null => DeckError::NotBase(card.clone()),
                    }
                    .into())
                }
                Some(_) => {}
            }
            if *count > rules.max_copies {
                return Err(ImportError::TooManyCopies {
                    card: card.clone(),
                    count: *count,
                    max: rules.max_copies,
                });
            }
        }
    }
    let total: u32 = export.base.values().sum();
    if !rules.simple_counters && total > rules.base_target {
        return Err(ImportError::BaseOverTarget {
            total,
            target: rules.base_target,
        });
    }
    let nulls = export.nulls.unwrap_or(builder.state.null_count);
    if nulls < rules.min_nulls || nulls > rules.max_nulls {
        return Err(ImportError::NullsOutOfRange {
            count: nulls,
            min: rules.min_nulls,
            max: rules.max_nulls,
        });
    }
    let capacity = export.capacity.unwrap_or(builder.state.capacity);
    if capacity < rules.min_capacity || capacity > rules.max_capacity {
        return Err(ImportError::CapacityOutOfRange {
            capacity,
            min: rules.min_capacity,
            max: rules.max_capacity,
        });
    }

    let mut candidate = builder.clone();
    candidate.state.base_counts = export.base.clone();
    candidate.state.base_counts.retain(|_, count| *count > 0);
    candidate.state.modifier_counts = export.modifiers.clone();
    candidate.state.modifier_counts.retain(|_, count| *count > 0);
    candidate.state.null_count = nulls;
    candidate.state.capacity = capacity;
    let used = candidate.capacity_used();
    if candidate.rules.capacity_checks_enabled() && used > capacity {
        return Err(DeckError::CapacityExceeded {
            used,
            capacity,
            needed: used - capacity,
        }
        .into());
    }
    builder.state = candidate.state;
    events.push(Event::CountsImported);
    Ok(())
}
