//! Session domain module.
//!
//! The session aggregate and its lifecycle, the events that drive it and
//! the finalized record handed to persistence.

mod aggregate;
mod errors;
mod events;
mod record;
mod status;

pub use aggregate::{PendingTurn, Session};
pub use errors::SessionError;
pub use events::SessionEvent;
pub use record::FinalizedSession;
pub use status::SessionStatus;
