//! Blocking file-backed disk manager.
//!
//! Pages live in a single data file at offset `page_id * page_size`. All
//! I/O goes through a seek-then-read/write sequence under a mutex; the
//! buffer pool already serializes its calls, so the mutex only guards
//! against concurrent use of the same manager by multiple pools or tests.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use basalt_common::constants::PAGE_SIZE;
use basalt_common::types::PageId;
use parking_lot::Mutex;
use tracing::error;

use super::error::{DiskError, DiskResult};
use super::manager::DiskManager;

/// Disk manager backed by a single data file.
///
/// Reopening an existing file resumes page-id allocation after the last
/// page the file holds, so ids stay strictly increasing across restarts.
pub struct FileDiskManager {
    /// The data file, guarded for seek+read/write sequences.
    file: Mutex<File>,
    /// The data file path.
    path: PathBuf,
    /// Next page id to hand out.
    next_page_id: AtomicU64,
    /// Completed page reads.
    read_count: AtomicU64,
    /// Completed page writes.
    write_count: AtomicU64,
    /// I/O faults swallowed per the infallible-read/write contract.
    fault_count: AtomicU64,
}

impl FileDiskManager {
    /// Opens (creating if absent) the data file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DiskResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| DiskError::Open {
                path: path.clone(),
                source,
            })?;

        let len = file
            .metadata()
            .map_err(|source| DiskError::Open {
                path: path.clone(),
                source,
            })?
            .len();
        if len % PAGE_SIZE as u64 != 0 {
            return Err(DiskError::Misaligned { path, len });
        }

        Ok(Self {
            file: Mutex::new(file),
            path,
            next_page_id: AtomicU64::new(len / PAGE_SIZE as u64),
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            fault_count: AtomicU64::new(0),
        })
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of completed page reads.
    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::Relaxed)
    }

    /// Returns the number of completed page writes.
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Returns the number of I/O faults absorbed so far.
    pub fn fault_count(&self) -> u64 {
        self.fault_count.load(Ordering::Relaxed)
    }

    fn try_read(&self, page_id: PageId, buf: &mut [u8]) -> std::io::Result<()> {
        let offset = page_id.as_u64() * PAGE_SIZE as u64;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        // Read up to a full page; a short read means the tail of the page
        // was never written, which reads back as zeroes.
        let mut filled = 0;
        while filled < buf.len() {
            let n = file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf[filled..].fill(0);
        Ok(())
    }

    fn try_write(&self, page_id: PageId, buf: &[u8]) -> std::io::Result<()> {
        let offset = page_id.as_u64() * PAGE_SIZE as u64;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        file.flush()
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        match self.try_read(page_id, buf) {
            Ok(()) => {
                self.read_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.fault_count.fetch_add(1, Ordering::Relaxed);
                error!(page_id = %page_id, error = %e, "page read failed");
                buf.fill(0);
            }
        }
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) {
        debug_assert_eq!(buf.len(), PAGE_SIZE);
        match self.try_write(page_id, buf) {
            Ok(()) => {
                self.write_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.fault_count.fetch_add(1, Ordering::Relaxed);
                error!(page_id = %page_id, error = %e, "page write failed");
            }
        }
    }

    fn allocate_page(&self) -> PageId {
        PageId::new(self.next_page_id.fetch_add(1, Ordering::SeqCst))
    }

    fn deallocate_page(&self, _page_id: PageId) {
        // Storage is not reclaimed; the file keeps its length.
    }
}

impl std::fmt::Debug for FileDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiskManager")
            .field("path", &self.path)
            .field("next_page_id", &self.next_page_id.load(Ordering::Relaxed))
            .field("reads", &self.read_count())
            .field("writes", &self.write_count())
            .finish()
    }
}
