//! Shared foundational types used across the Lumen analysis service.
//!
//! This crate provides content hashing for dependency fingerprints, the
//! three-state [`CancellableOutcome`] used as the return channel for every
//! asynchronous operation, and the cooperative [`CancelFlag`] polled by
//! long-running analyzer work.

#![warn(missing_docs)]

pub mod cancel;
pub mod hash;
pub mod outcome;

pub use cancel::CancelFlag;
pub use hash::ContentHash;
pub use outcome::{CancellableOutcome, OutcomeKind};
