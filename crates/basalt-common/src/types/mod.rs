//! Core types for Basalt.
//!
//! This module provides type-safe identifiers shared by the storage
//! components.

mod ids;

pub use ids::PageId;
