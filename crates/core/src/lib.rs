//! Core types and traits for litestore
//!
//! This crate defines the foundational pieces shared by both store backends:
//! - Error: error type hierarchy and the crate-wide Result alias
//! - RecordCodec: value <-> byte-sequence conversion, pluggable per store
//! - Predicate: boolean tests over decoded records
//! - PredicateSet: per-call predicate container for engine push-down

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod predicate;

pub use codec::{BincodeCodec, JsonCodec, RecordCodec};
pub use error::{Error, Result};
pub use predicate::{FalliblePredicate, Predicate, PredicateSet};
