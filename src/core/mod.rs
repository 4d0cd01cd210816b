//! Core primitives.
//!
//! Reproducible randomness and world coordinates. Nothing in here knows
//! about players, roles or the host.

pub mod position;
pub mod rng;

// Re-export core types
pub use position::Position;
pub use rng::{DeterministicRng, RandomSource, derive_round_seed, shuffle};
