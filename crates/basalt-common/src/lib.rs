//! # basalt-common
//!
//! Common types and constants for the Basalt storage engine.
//!
//! This crate provides the foundational types shared by the Basalt
//! components:
//!
//! - **Types**: Core identifiers (`PageId`)
//! - **Constants**: Page geometry and buffer pool defaults
//!
//! ## Example
//!
//! ```rust
//! use basalt_common::types::PageId;
//!
//! let page_id = PageId::new(42);
//! assert!(page_id.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use types::PageId;
