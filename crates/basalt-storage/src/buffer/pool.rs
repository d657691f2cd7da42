//! Buffer pool manager.
//!
//! The buffer pool owns a fixed array of page frames and mediates between
//! the disk manager and in-memory clients. A page table (extendible hash)
//! maps resident page ids to frames; an LRU-K replacer picks victims when
//! no free frame remains. A dirty victim is always written back before
//! its frame is reused.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use basalt_common::constants::PAGE_SIZE;
use basalt_common::types::PageId;
use basalt_container::hash::ExtendibleHashTable;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::config::BufferPoolConfig;
use super::error::{BufferError, BufferResult};
use super::frame::{Frame, FrameId};
use super::guard::{PageHandle, PageReadGuard, PageWriteGuard};
use super::replacer::LruKReplacer;
use super::BufferPoolStats;
use crate::disk::DiskManager;

/// State guarded by the pool latch.
struct PoolInner {
    /// Frames not holding any page. LIFO: the most recently freed frame
    /// is reused first.
    free_list: Vec<FrameId>,
}

/// The buffer pool manages page caching for the storage engine.
///
/// Every public operation is serialized by a single pool latch, and disk
/// I/O happens while holding it. That trades throughput for a simple
/// correctness argument; disk latency dominates the critical section
/// either way.
pub struct BufferPoolManager {
    /// Number of frames.
    pool_size: usize,
    /// K for the replacement policy.
    replacer_k: usize,
    /// Array of buffer frames.
    frames: Vec<Arc<Frame>>,
    /// Page table: maps PageId -> FrameId.
    page_table: ExtendibleHashTable<PageId, FrameId>,
    /// LRU-K replacer for eviction.
    replacer: LruKReplacer,
    /// Disk collaborator.
    disk: Arc<dyn DiskManager>,
    /// Pool latch: free list plus orchestration of the parts above.
    latch: Mutex<PoolInner>,
    /// Fetch counter for statistics.
    fetch_count: AtomicU64,
    /// Hit counter for statistics.
    hit_count: AtomicU64,
    /// Miss counter for statistics.
    miss_count: AtomicU64,
    /// Eviction counter for statistics.
    eviction_count: AtomicU64,
    /// Flush counter for statistics (explicit flushes and write-backs).
    flush_count: AtomicU64,
}

impl BufferPoolManager {
    /// Creates a buffer pool with the given configuration and disk
    /// collaborator. Every frame starts on the free list.
    pub fn new(config: BufferPoolConfig, disk: Arc<dyn DiskManager>) -> BufferResult<Self> {
        config.validate().map_err(BufferError::config)?;

        let frames: Vec<Arc<Frame>> = (0..config.pool_size)
            .map(|i| Arc::new(Frame::new(FrameId::new(i), PAGE_SIZE)))
            .collect();
        let free_list = (0..config.pool_size).rev().map(FrameId::new).collect();

        Ok(Self {
            pool_size: config.pool_size,
            replacer_k: config.replacer_k,
            frames,
            page_table: ExtendibleHashTable::new(config.bucket_size),
            replacer: LruKReplacer::new(config.pool_size, config.replacer_k),
            disk,
            latch: Mutex::new(PoolInner { free_list }),
            fetch_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            eviction_count: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
        })
    }

    /// Allocates a fresh page pinned in a frame.
    ///
    /// Returns `None` when every frame is pinned. The page starts zeroed
    /// and clean with a pin count of 1.
    pub fn new_page(&self) -> Option<(PageId, PageHandle)> {
        let mut inner = self.latch.lock();
        let frame_id = self.acquire_frame(&mut inner)?;

        let frame = &self.frames[frame_id.index()];
        let page_id = self.disk.allocate_page();
        frame.write_data().fill(0);
        self.install(frame, frame_id, page_id);

        trace!(page_id = %page_id, frame_id = frame_id.index(), "allocated new page");
        Some((page_id, PageHandle::new(Arc::clone(frame))))
    }

    /// Fetches the page, pinning its frame.
    ///
    /// On a hit the existing frame is re-pinned; on a miss the page is
    /// read from disk into a free or evicted frame. Returns `None` when
    /// the page is not resident and every frame is pinned.
    pub fn fetch_page(&self, page_id: PageId) -> Option<PageHandle> {
        if !page_id.is_valid() {
            return None;
        }

        let mut inner = self.latch.lock();
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        if let Some(frame_id) = self.page_table.find(&page_id) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            let frame = &self.frames[frame_id.index()];
            frame.pin();
            self.replacer.record_access(frame_id);
            self.replacer.set_evictable(frame_id, false);
            return Some(PageHandle::new(Arc::clone(frame)));
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let frame_id = self.acquire_frame(&mut inner)?;

        let frame = &self.frames[frame_id.index()];
        {
            let mut data = frame.write_data();
            self.disk.read_page(page_id, &mut data);
        }
        self.install(frame, frame_id, page_id);

        Some(PageHandle::new(Arc::clone(frame)))
    }

    /// Releases one pin on the page.
    ///
    /// Returns false if the page is not resident or not pinned. When the
    /// pin count reaches 0 the frame becomes evictable. `is_dirty` is
    /// OR-ed into the page's dirty flag; unpinning clean never clears a
    /// dirty flag set earlier.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let _inner = self.latch.lock();
        let Some(frame_id) = self.page_table.find(&page_id) else {
            return false;
        };
        let frame = &self.frames[frame_id.index()];
        if frame.pin_count() == 0 {
            return false;
        }

        if frame.unpin() == 0 {
            self.replacer.set_evictable(frame_id, true);
        }
        if is_dirty {
            frame.set_dirty(true);
        }
        true
    }

    /// Writes the page to disk and clears its dirty flag.
    ///
    /// The write is unconditional; pin state is untouched. Returns false
    /// for the invalid page id or a page that is not resident.
    pub fn flush_page(&self, page_id: PageId) -> bool {
        if !page_id.is_valid() {
            return false;
        }
        let _inner = self.latch.lock();
        self.flush_resident(page_id)
    }

    /// Flushes every resident page.
    pub fn flush_all_pages(&self) {
        let _inner = self.latch.lock();
        for frame in &self.frames {
            let page_id = frame.page_id();
            if page_id.is_valid() {
                self.flush_resident(page_id);
            }
        }
    }

    /// Drops the page from the pool and deallocates it on disk.
    ///
    /// Returns true if the page was absent (vacuous success) or removed;
    /// false if it is pinned. Dirty contents are discarded, not written
    /// back: callers needing durability flush first.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut inner = self.latch.lock();
        let Some(frame_id) = self.page_table.find(&page_id) else {
            return true;
        };
        let frame = &self.frames[frame_id.index()];
        if frame.pin_count() > 0 {
            return false;
        }

        self.page_table.remove(&page_id);
        self.replacer.remove(frame_id);
        inner.free_list.push(frame_id);
        frame.reset();
        frame.write_data().fill(0);
        self.disk.deallocate_page(page_id);

        debug!(page_id = %page_id, frame_id = frame_id.index(), "deleted page");
        true
    }

    /// Fetches the page behind a read guard that unpins on drop.
    pub fn read_page(&self, page_id: PageId) -> Option<PageReadGuard<'_>> {
        self.fetch_page(page_id)
            .map(|handle| PageReadGuard::new(self, handle))
    }

    /// Fetches the page behind a write guard that unpins on drop and
    /// reports dirtiness automatically.
    pub fn write_page(&self, page_id: PageId) -> Option<PageWriteGuard<'_>> {
        self.fetch_page(page_id)
            .map(|handle| PageWriteGuard::new(self, handle))
    }

    /// Allocates a fresh page behind a write guard.
    pub fn create_page(&self) -> Option<PageWriteGuard<'_>> {
        self.new_page()
            .map(|(_, handle)| PageWriteGuard::new(self, handle))
    }

    /// Returns true if the page is resident.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.page_table.find(&page_id).is_some()
    }

    /// Returns the number of frames.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the K of the replacement policy.
    pub fn replacer_k(&self) -> usize {
        self.replacer_k
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> BufferPoolStats {
        let mut pinned = 0;
        let mut dirty = 0;
        for frame in &self.frames {
            if frame.is_pinned() {
                pinned += 1;
            }
            if frame.is_dirty() {
                dirty += 1;
            }
        }

        BufferPoolStats {
            fetches: self.fetch_count.load(Ordering::Relaxed),
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            evictions: self.eviction_count.load(Ordering::Relaxed),
            flushes: self.flush_count.load(Ordering::Relaxed),
            pinned_frames: pinned,
            dirty_frames: dirty,
        }
    }

    // -------------------------------------------------------------------------
    // Private helpers
    // -------------------------------------------------------------------------

    /// Obtains a frame for a new resident: the free list first, then an
    /// eviction victim. A dirty victim is written back before its frame
    /// is handed out.
    fn acquire_frame(&self, inner: &mut PoolInner) -> Option<FrameId> {
        if let Some(frame_id) = inner.free_list.pop() {
            return Some(frame_id);
        }

        let frame_id = self.replacer.evict()?;
        let frame = &self.frames[frame_id.index()];
        let old_page_id = frame.page_id();
        debug_assert!(old_page_id.is_valid(), "evicted a free frame");

        if frame.is_dirty() {
            debug!(page_id = %old_page_id, frame_id = frame_id.index(), "writing back dirty victim");
            let data = frame.read_data();
            self.disk.write_page(old_page_id, &data);
            drop(data);
            self.flush_count.fetch_add(1, Ordering::Relaxed);
        }

        self.page_table.remove(&old_page_id);
        frame.reset();
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
        trace!(page_id = %old_page_id, frame_id = frame_id.index(), "evicted page");
        Some(frame_id)
    }

    /// Installs `page_id` into the frame: metadata, replacer bookkeeping,
    /// and the page-table mapping. The frame leaves pinned once and
    /// non-evictable.
    fn install(&self, frame: &Arc<Frame>, frame_id: FrameId, page_id: PageId) {
        frame.set_page_id(page_id);
        frame.set_dirty(false);
        frame.pin();
        self.replacer.record_access(frame_id);
        self.replacer.set_evictable(frame_id, false);
        self.page_table.insert(page_id, frame_id);
    }

    /// Flush body shared by `flush_page` and `flush_all_pages`; assumes
    /// the pool latch is held.
    fn flush_resident(&self, page_id: PageId) -> bool {
        let Some(frame_id) = self.page_table.find(&page_id) else {
            return false;
        };
        let frame = &self.frames[frame_id.index()];
        {
            let data = frame.read_data();
            self.disk.write_page(page_id, &data);
        }
        frame.set_dirty(false);
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl std::fmt::Debug for BufferPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("pool_size", &self.pool_size)
            .field("replacer_k", &self.replacer_k)
            .field("free_frames", &self.latch.lock().free_list.len())
            .field("stats", &self.stats())
            .finish()
    }
}
