#![warn(missing_docs)]

//! This crate constitutes a library of light weight helpers that are shared
//! across the other sigil crates. Its chief quality is that it has virtually
//! zero dependencies.

pub mod time;
pub use time::{Clock, ManualClock, SystemClock, unix_seconds};
