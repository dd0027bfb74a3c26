//! Internal utilities.
//!
//! Deterministic RNG and the entropy abstraction the desk simulation draws
//! room numbers and wake-up offsets from.

pub mod det_rng;
pub mod entropy;

pub use det_rng::DetRng;
pub use entropy::{DetEntropy, EntropySource, OsEntropy};
