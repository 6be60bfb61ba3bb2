//! Domain types for geodetic mark lookup.
//!
//! Mark codes are validated and normalized at construction time, so the
//! caches and sources can use them as keys without re-checking.

mod mark_code;
mod record;

pub use mark_code::{InvalidMarkCode, MarkCode};
pub use record::{InvalidPayload, MarkRecord};
