//! Hash-based containers.

mod extendible;

pub use extendible::ExtendibleHashTable;
