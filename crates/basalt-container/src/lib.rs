//! Concurrent container primitives for the Basalt storage engine.
//!
//! This crate provides keyed data structures shared by the storage
//! components:
//!
//! - **Extendible Hash Table**: a dynamically growing hash map whose
//!   directory doubles in place and whose buckets split on demand
//!
//! # Example
//!
//! ```rust
//! use basalt_container::hash::ExtendibleHashTable;
//!
//! let table: ExtendibleHashTable<u64, String> = ExtendibleHashTable::new(4);
//! table.insert(1, "one".to_string());
//! assert_eq!(table.find(&1), Some("one".to_string()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod hash;

pub use hash::ExtendibleHashTable;
