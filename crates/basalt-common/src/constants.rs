//! System-wide constants for Basalt.
//!
//! This module defines constants used across the storage engine.

// =============================================================================
// Page Geometry
// =============================================================================

/// Page size in bytes (4 KB).
///
/// This matches the typical OS page size and SSD block size. All disk I/O
/// happens in units of this size.
pub const PAGE_SIZE: usize = 4 * 1024;

/// Minimum supported page size in bytes (4 KB).
pub const MIN_PAGE_SIZE: usize = 4 * 1024;

/// Maximum supported page size in bytes (64 KB).
pub const MAX_PAGE_SIZE: usize = 64 * 1024;

// =============================================================================
// Buffer Pool Defaults
// =============================================================================

/// Default number of frames in the buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 128;

/// Default K for the LRU-K replacement policy.
///
/// K = 2 distinguishes pages that are genuinely re-referenced from pages
/// touched once by a scan.
pub const DEFAULT_REPLACER_K: usize = 2;

/// Bucket capacity for the page table's extendible hash directory.
pub const PAGE_TABLE_BUCKET_SIZE: usize = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_constants() {
        // Page size must be a power of 2 for offset arithmetic
        assert!(PAGE_SIZE.is_power_of_two());
        assert!(MIN_PAGE_SIZE.is_power_of_two());
        assert!(MAX_PAGE_SIZE.is_power_of_two());
        assert!(PAGE_SIZE >= MIN_PAGE_SIZE);
        assert!(PAGE_SIZE <= MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pool_defaults() {
        assert!(DEFAULT_POOL_SIZE > 0);
        assert!(DEFAULT_REPLACER_K >= 1);
        assert!(PAGE_TABLE_BUCKET_SIZE > 0);
    }
}
