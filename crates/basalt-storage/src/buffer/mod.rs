//! Buffer pool for the Basalt storage engine.
//!
//! The buffer pool keeps a fixed-size pool of in-memory page frames in
//! front of the disk manager:
//!
//! - **Page Caching**: resident pages are found through an extendible
//!   hash page table
//! - **Pin/Unpin**: reference counting keeps a frame in place while a
//!   client uses it
//! - **Dirty Tracking**: modified pages are written back before their
//!   frame is reused
//! - **Eviction Policy**: LRU-K ranks victims by backward K-distance
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                  BufferPoolManager                    │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │    Page Table: ExtendibleHashTable<PageId,      │  │
//! │  │                 FrameId>                        │  │
//! │  └─────────────────────────────────────────────────┘  │
//! │                          │                            │
//! │                          ▼                            │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │                 Frame Array                     │  │
//! │  │  ┌────────┐ ┌────────┐       ┌────────┐        │  │
//! │  │  │Frame 0 │ │Frame 1 │  ...  │Frame N │        │  │
//! │  │  │page_id │ │page_id │       │page_id │        │  │
//! │  │  │data[]  │ │data[]  │       │data[]  │        │  │
//! │  │  │dirty   │ │dirty   │       │dirty   │        │  │
//! │  │  │pin_cnt │ │pin_cnt │       │pin_cnt │        │  │
//! │  │  └────────┘ └────────┘       └────────┘        │  │
//! │  └─────────────────────────────────────────────────┘  │
//! │                          │                            │
//! │                          ▼                            │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │   LruKReplacer (eviction candidates + history)  │  │
//! │  └─────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use basalt_common::types::PageId;
//! use basalt_storage::buffer::{BufferPoolConfig, BufferPoolManager};
//! use basalt_storage::disk::MemoryDiskManager;
//!
//! let disk = Arc::new(MemoryDiskManager::new());
//! let pool = BufferPoolManager::new(BufferPoolConfig::new(64), disk).unwrap();
//!
//! let (page_id, handle) = pool.new_page().unwrap();
//! handle.data_mut()[0] = 42;
//! pool.unpin_page(page_id, true);
//! ```

mod config;
mod error;
mod frame;
mod guard;
mod pool;
mod replacer;

pub use config::BufferPoolConfig;
pub use error::{BufferError, BufferResult};
pub use frame::{Frame, FrameId};
pub use guard::{PageHandle, PageReadGuard, PageWriteGuard};
pub use pool::BufferPoolManager;
pub use replacer::LruKReplacer;

/// Statistics for buffer pool monitoring.
#[derive(Debug, Clone, Default)]
pub struct BufferPoolStats {
    /// Total number of page fetches.
    pub fetches: u64,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (required disk read).
    pub misses: u64,
    /// Number of pages evicted.
    pub evictions: u64,
    /// Number of page writes to disk (flushes and victim write-backs).
    pub flushes: u64,
    /// Current number of pinned frames.
    pub pinned_frames: usize,
    /// Current number of dirty frames.
    pub dirty_frames: usize,
}

impl BufferPoolStats {
    /// Returns the cache hit ratio (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        if self.fetches == 0 {
            0.0
        } else {
            self.hits as f64 / self.fetches as f64
        }
    }
}
