//! Storage, persisted-state schema and content loading for deck builders.

pub mod counts;
pub mod load;
pub mod persist;
pub mod profile;
pub mod store;

pub use counts::*;
pub use load::*;
pub use persist::*;
pub use profile::*;
pub use store::*;
