//! Buffer frame - a slot in the buffer pool that holds a page.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use basalt_common::types::PageId;
use parking_lot::RwLock;

/// Frame identifier - index into the buffer pool's frame array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Invalid frame ID.
    pub const INVALID: Self = Self(usize::MAX);

    /// Creates a new frame ID.
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Checks if this is a valid frame ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != usize::MAX
    }
}

impl From<usize> for FrameId {
    fn from(id: usize) -> Self {
        Self::new(id)
    }
}

impl From<FrameId> for usize {
    fn from(id: FrameId) -> Self {
        id.0
    }
}

/// A buffer frame holds a single page in memory.
///
/// Each frame has a data buffer for the page contents plus metadata:
/// the resident page id (`INVALID` when the frame is free), a pin count,
/// and a dirty flag. A frame is in exactly one of three states: free,
/// occupied and pinned (`pin_count > 0`), or occupied and unpinned.
///
/// Metadata uses atomics so handles can inspect a frame without taking
/// the pool latch; mutations happen under it.
pub struct Frame {
    /// Frame ID (index in the frame array).
    frame_id: FrameId,
    /// Page data buffer.
    data: RwLock<Vec<u8>>,
    /// Page ID stored in this frame (INVALID if free).
    page_id: AtomicU64,
    /// Pin count (number of active references).
    pin_count: AtomicU32,
    /// Whether the page was modified since its last write-back.
    dirty: AtomicBool,
}

impl Frame {
    /// Creates a new free frame with a zeroed page buffer.
    pub fn new(frame_id: FrameId, page_size: usize) -> Self {
        Self {
            frame_id,
            data: RwLock::new(vec![0u8; page_size]),
            page_id: AtomicU64::new(PageId::INVALID.as_u64()),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Returns the page ID stored in this frame.
    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId::new(self.page_id.load(Ordering::Acquire))
    }

    /// Sets the page ID for this frame.
    #[inline]
    pub fn set_page_id(&self, page_id: PageId) {
        self.page_id.store(page_id.as_u64(), Ordering::Release);
    }

    /// Returns true if this frame is free (no page assigned).
    #[inline]
    pub fn is_free(&self) -> bool {
        !self.page_id().is_valid()
    }

    /// Returns the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    /// Increments the pin count and returns the new value.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrements the pin count and returns the new value.
    ///
    /// Unpinning a frame whose count is already 0 is a programmer error.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "unpinned frame with pin_count = 0");
        old - 1
    }

    /// Returns true if the frame is pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    /// Returns true if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Sets or clears the dirty flag.
    #[inline]
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    /// Returns a read lock on the page data.
    #[inline]
    pub fn read_data(&self) -> parking_lot::RwLockReadGuard<'_, Vec<u8>> {
        self.data.read()
    }

    /// Returns a write lock on the page data.
    #[inline]
    pub fn write_data(&self) -> parking_lot::RwLockWriteGuard<'_, Vec<u8>> {
        self.data.write()
    }

    /// Copies data into the frame.
    pub fn copy_from(&self, data: &[u8]) {
        let mut guard = self.data.write();
        guard[..data.len()].copy_from_slice(data);
    }

    /// Copies data out of the frame.
    pub fn copy_to(&self, buf: &mut [u8]) {
        let guard = self.data.read();
        buf.copy_from_slice(&guard[..buf.len()]);
    }

    /// Resets the frame's metadata to the free state.
    ///
    /// The data buffer is left as-is; callers that need zeroed contents
    /// (page deletion, fresh allocation) fill it explicitly.
    pub fn reset(&self) {
        self.page_id
            .store(PageId::INVALID.as_u64(), Ordering::Release);
        self.pin_count.store(0, Ordering::Release);
        self.dirty.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("frame_id", &self.frame_id)
            .field("page_id", &self.page_id())
            .field("pin_count", &self.pin_count())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert_eq!(frame.frame_id().index(), 0);
        assert!(!frame.page_id().is_valid());
        assert!(frame.is_free());
        assert_eq!(frame.pin_count(), 0);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_pin_unpin() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert!(!frame.is_pinned());

        assert_eq!(frame.pin(), 1);
        assert!(frame.is_pinned());
        assert_eq!(frame.pin(), 2);

        assert_eq!(frame.unpin(), 1);
        assert!(frame.is_pinned());
        assert_eq!(frame.unpin(), 0);
        assert!(!frame.is_pinned());
    }

    #[test]
    fn test_dirty_flag() {
        let frame = Frame::new(FrameId::new(0), 4096);
        assert!(!frame.is_dirty());

        frame.set_dirty(true);
        assert!(frame.is_dirty());

        frame.set_dirty(false);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_data_access() {
        let frame = Frame::new(FrameId::new(0), 4096);

        {
            let mut data = frame.write_data();
            data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        }
        {
            let data = frame.read_data();
            assert_eq!(&data[0..4], &[1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_copy_operations() {
        let frame = Frame::new(FrameId::new(0), 4096);

        let input = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        frame.copy_from(&input);

        let mut output = vec![0u8; 8];
        frame.copy_to(&mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn test_reset() {
        let frame = Frame::new(FrameId::new(0), 4096);
        frame.set_page_id(PageId::new(42));
        frame.pin();
        frame.set_dirty(true);

        frame.reset();

        assert!(frame.is_free());
        assert_eq!(frame.pin_count(), 0);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_frame_id() {
        assert!(!FrameId::INVALID.is_valid());
        assert!(FrameId::new(0).is_valid());
        assert_eq!(FrameId::new(42).index(), 42);
    }
}
