//! Page handles and RAII guards.
//!
//! The pool's primitive contract is explicit: `fetch_page`/`new_page`
//! pin a frame and hand back a [`PageHandle`]; the caller releases the
//! pin with `unpin_page`. The guards layered on top tie the unpin to a
//! scope instead, so a caller cannot leak a pin on an early return.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use basalt_common::types::PageId;

use super::frame::{Frame, FrameId};
use super::pool::BufferPoolManager;

/// A pinned page, released by an explicit `unpin_page` call.
///
/// The handle stays valid until the caller's corresponding unpin; data
/// references obtained from it must not be retained past that point.
pub struct PageHandle {
    frame: Arc<Frame>,
}

impl PageHandle {
    pub(crate) fn new(frame: Arc<Frame>) -> Self {
        Self { frame }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.frame.page_id()
    }

    /// Returns the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame.frame_id()
    }

    /// Returns the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.frame.pin_count()
    }

    /// Returns true if the page is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.frame.is_dirty()
    }

    /// Returns a reference to the page data.
    #[inline]
    pub fn data(&self) -> impl Deref<Target = [u8]> + '_ {
        PageDataRef {
            guard: self.frame.read_data(),
        }
    }

    /// Returns a mutable reference to the page data.
    ///
    /// The dirty flag is not touched here; the caller reports
    /// modifications through `unpin_page(page_id, true)`.
    #[inline]
    pub fn data_mut(&self) -> impl DerefMut<Target = [u8]> + '_ {
        PageDataMut {
            guard: self.frame.write_data(),
        }
    }
}

impl std::fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHandle")
            .field("page_id", &self.page_id())
            .field("frame_id", &self.frame_id())
            .field("pin_count", &self.pin_count())
            .finish()
    }
}

/// Helper struct to provide Deref for page data.
struct PageDataRef<'a> {
    guard: parking_lot::RwLockReadGuard<'a, Vec<u8>>,
}

impl Deref for PageDataRef<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Helper struct to provide DerefMut for page data.
struct PageDataMut<'a> {
    guard: parking_lot::RwLockWriteGuard<'a, Vec<u8>>,
}

impl Deref for PageDataMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for PageDataMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

/// Read guard for a page: keeps the frame pinned, unpins clean on drop.
pub struct PageReadGuard<'a> {
    pool: &'a BufferPoolManager,
    handle: PageHandle,
    page_id: PageId,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPoolManager, handle: PageHandle) -> Self {
        let page_id = handle.page_id();
        Self {
            pool,
            handle,
            page_id,
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns a reference to the page data.
    #[inline]
    pub fn data(&self) -> impl Deref<Target = [u8]> + '_ {
        self.handle.data()
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        self.pool.unpin_page(self.page_id, false);
    }
}

impl std::fmt::Debug for PageReadGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageReadGuard")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.handle.frame_id())
            .finish()
    }
}

/// Write guard for a page: keeps the frame pinned, unpins on drop and
/// reports the page dirty iff its data was borrowed mutably.
pub struct PageWriteGuard<'a> {
    pool: &'a BufferPoolManager,
    handle: PageHandle,
    page_id: PageId,
    modified: bool,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPoolManager, handle: PageHandle) -> Self {
        let page_id = handle.page_id();
        Self {
            pool,
            handle,
            page_id,
            modified: false,
        }
    }

    /// Returns the page ID.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns a reference to the page data.
    #[inline]
    pub fn data(&self) -> impl Deref<Target = [u8]> + '_ {
        self.handle.data()
    }

    /// Returns a mutable reference to the page data and marks the page
    /// as modified.
    #[inline]
    pub fn data_mut(&mut self) -> impl DerefMut<Target = [u8]> + '_ {
        self.modified = true;
        self.handle.data_mut()
    }

    /// Marks the page as modified without borrowing its data.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.modified = true;
    }

    /// Returns true if the page was modified through this guard.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        self.pool.unpin_page(self.page_id, self.modified);
    }
}

impl std::fmt::Debug for PageWriteGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageWriteGuard")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.handle.frame_id())
            .field("modified", &self.modified)
            .finish()
    }
}
