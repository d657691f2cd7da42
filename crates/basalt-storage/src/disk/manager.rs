//! The disk manager contract consumed by the buffer pool.

use basalt_common::types::PageId;

/// Block-addressable page storage plus page-id allocation.
///
/// The buffer pool performs page I/O through this trait while holding its
/// own latch, so implementations must be thread-safe but may assume calls
/// for a given pool are serialized. Reads and writes are infallible from
/// the pool's perspective; an implementation that hits an I/O fault
/// handles it internally (logging, fault counters) rather than
/// propagating it through the cache API.
pub trait DiskManager: Send + Sync {
    /// Reads the page's contents into `buf`.
    ///
    /// A page that was allocated but never written reads back as zeroes.
    /// `buf` must be exactly one page long.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]);

    /// Writes `buf` as the page's contents.
    ///
    /// `buf` must be exactly one page long.
    fn write_page(&self, page_id: PageId, buf: &[u8]);

    /// Allocates a fresh page id.
    ///
    /// Ids are strictly monotonically increasing, starting at 0.
    fn allocate_page(&self) -> PageId;

    /// Reclaims the page's storage. May be a no-op.
    fn deallocate_page(&self, page_id: PageId);
}
