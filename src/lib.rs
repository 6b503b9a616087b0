//! An in-memory triple-store: interned atoms, three sorted indices (SPO/POS/OSP), a
//! pattern-matching cursor over them, and an append-only log for durability.
//!
//! See `add_fact`/`remove_fact`/`match_pattern` on [`Store`] for the operations this
//! crate builds around; `atom`/`fact`/`index` hold the pieces they're built from.

mod atom;
mod cursor;
mod error;
mod fact;
mod index;
mod log;
mod pattern;
mod store;

pub use atom::{Atom, AtomPool};
pub use cursor::{Bindings, Cursor};
pub use error::Error;
pub use fact::{Fact, OspKey, PosKey, SpoKey};
pub use log::{Log, Op, Record};
pub use pattern::{IndexChoice, PatternCursor};
pub use store::{Store, StoreConfig};
