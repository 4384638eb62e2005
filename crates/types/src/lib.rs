#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core data types shared across the rottag workspace
//!
//! This crate defines the timestamp model, the on-disk encoding tag,
//! per-file outcome classifications and the aggregated run statistics.
//! It deliberately has no I/O so every other crate can depend on it.

pub mod encoding;
pub mod outcome;
pub mod stats;
pub mod timestamp;

pub use encoding::Encoding;
pub use outcome::Outcome;
pub use stats::RunStats;
pub use timestamp::{Resolution, Timestamp};
