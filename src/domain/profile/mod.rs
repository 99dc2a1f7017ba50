//! Profile domain module.
//!
//! The belief state about the counterpart: stance, confidence, register,
//! readiness to change and what they care about. A `Profile` is always a
//! complete record; generation output is coerced into one at the boundary.

mod coercion;
mod model;
mod stance;

pub use coercion::ProfileDraft;
pub use model::{Confidence, Guidance, Profile, Readiness, MAX_LIST_ITEMS, MAX_PHRASE_LENGTH};
pub use stance::Stance;
