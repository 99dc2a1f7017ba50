//! Counterpoint - adaptive-profiling conversation engine.
//!
//! Drives a multi-turn dialogue that tries to shift a counterpart's stated
//! position on a topic while re-estimating their profile every turn. The
//! crate follows a hexagonal layout: pure `domain` logic, `ports` for the
//! generation service, topic catalog and session archive, `adapters`
//! implementing them, and the `application` layer running the turn loop.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
