use crate::CardId;
use thiserror::Error;

/// Rejections are advisory: the display string is what the player sees and
/// the state is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("Unlock the deck to edit it")]
    Locked,
    #[error("Deck is already locked")]
    AlreadyLocked,
    #[error("Deck is not locked")]
    AlreadyUnlocked,
    #[error("Lock the deck before {0}")]
    NotLocked(&'static str),
    #[error("Build the deck before {0}")]
    NotBuilt(&'static str),
    #[error("Shuffle the deck before drawing")]
    NotShuffled,
    #[error("Unknown card {0}")]
    UnknownCard(CardId),
    #[error("{0} is not a base card")]
    NotBase(CardId),
    #[error("{0} is not a modifier card")]
    NotModifier(CardId),
    #[error("Base deck is full ({total}/{target})")]
    BaseTargetReached { total: u32, target: u32 },
    #[error("Base deck needs exactly {target} cards (has {total})")]
    BaseTargetMismatch { total: u32, target: u32 },
    #[error("Not enough capacity ({used}/{capacity} used, needs {needed} more)")]
    CapacityExceeded { used: u32, capacity: u32, needed: u32 },
    #[error("Hand is full ({limit} cards)")]
    HandFull { limit: usize },
    #[error("Not enough room in hand for {needed} cards ({free} free)")]
    HandOverflow { needed: usize, free: usize },
    #[error("Deck is empty")]
    DeckEmpty,
    #[error("Discard pile is empty")]
    DiscardEmpty,
    #[error("Card {0} is not in hand")]
    NotInHand(CardId),
    #[error("No card at hand position {0}")]
    InvalidHandIndex(usize),
    #[error("No card at discard position {0}")]
    InvalidDiscardIndex(usize),
    #[error("Null cards cannot be played")]
    NullNotPlayable,
    #[error("Modifiers must be attached to a base card")]
    ModifierAsBase,
    #[error("Select a base card first")]
    NoBaseSelected,
    #[error("Null cards cannot be attached")]
    NullNotAttachable,
    #[error("Only modifier cards can be attached")]
    NotAttachable,
    #[error("Modifier is already attached")]
    AlreadyAttached,
    #[error("Modifier is not attached")]
    NotAttached,
    #[error("No play in progress")]
    NoActivePlay,
    #[error("Finish or cancel the current play first")]
    PlayPending,
    #[error("Saved deck name must not be empty")]
    EmptyDeckName,
    #[error("No saved deck named {0}")]
    UnknownSavedDeck(String),
}
