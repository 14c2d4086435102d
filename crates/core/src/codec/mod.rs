//! Record codec abstraction.
//!
//! Every value crossing a store boundary goes through the store's codec:
//! `encode` on write, `decode` on read. A store is configured with exactly
//! one codec at construction and it is immutable thereafter.
//!
//! Provided codecs:
//!
//! - [`BincodeCodec`]: compact binary encoding via serde + bincode (default)
//! - [`JsonCodec`]: human-readable encoding via serde_json
//!
//! # Usage
//!
//! ```
//! use litestore_core::codec::{BincodeCodec, RecordCodec};
//!
//! let codec = BincodeCodec::<String>::new();
//! let value = "hello world".to_string();
//!
//! let encoded = codec.encode(&value).unwrap();
//! let decoded = codec.decode(&encoded).unwrap();
//!
//! assert_eq!(value, decoded);
//! ```

mod bincode_codec;
mod json;
mod traits;

pub use bincode_codec::BincodeCodec;
pub use json::JsonCodec;
pub use traits::RecordCodec;
