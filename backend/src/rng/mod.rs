//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic random number
//! generation. CRITICAL: all randomness in the simulation MUST go through
//! this module — status transitions, occupancy exchanges, and fleet seeding
//! are reproducible from a single seed.

mod xorshift;

pub use xorshift::SimRng;
