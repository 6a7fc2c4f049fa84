//! Deterministic pen walks steered by primality.
//!
//! Each case maps an iteration index `k` to an integer `n`. The pen turns 90°
//! counter-clockwise whenever the primality verdict of `n` differs from the
//! previous one, and every visited position is recorded in a per-case point store.
//! The whole computation can be checkpointed and resumed.

pub mod checkpoint;
pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod oracle;
pub mod state;
pub mod stats;
pub mod store;
pub mod turn;
