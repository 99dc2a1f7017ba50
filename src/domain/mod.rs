//! Domain layer containing the conversation engine's pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machine trait)
//! - `profile` - Belief state about the counterpart and its coercion rules
//! - `topic` - Read-only topic descriptor
//! - `survey` - Survey ratings, answers and stance bands
//! - `conversation` - History, stage selection, reply policy and text checks
//! - `session` - Session aggregate, lifecycle, events and finalized record

pub mod conversation;
pub mod foundation;
pub mod profile;
pub mod session;
pub mod survey;
pub mod topic;
