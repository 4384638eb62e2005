#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the rottag workspace
//!
//! Fine-grained error enums organized by domain. Every failure is local
//! to the file being processed; nothing here aborts a run.

pub mod attrs;
pub mod hash;

pub use attrs::AttrError;
pub use hash::HashError;
