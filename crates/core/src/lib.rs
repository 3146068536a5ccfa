//! Deck composition, lifecycle and play rules. Keep this crate free of IO and platform concerns.

pub mod builder;
pub mod cards;
pub mod compose;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod play;
pub mod rng;
pub mod saved;
pub mod state;
pub mod transfer;

pub use builder::*;
pub use cards::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use lifecycle::*;
pub use play::*;
pub use rng::*;
pub use state::*;
