//! LRU-K replacement policy.
//!
//! LRU-K ranks eviction candidates by their backward K-distance: the gap
//! between the current timestamp and the K-th most recent access. A frame
//! with fewer than K recorded accesses has infinite distance. The victim
//! is the frame with the largest distance; ties fall back to the earliest
//! first-ever access, which degenerates to classic LRU when several
//! frames are below K accesses.
//!
//! Compared to plain LRU this keeps hot pages resident across a scan:
//! a page touched once by the scan has infinite distance and is evicted
//! long before a page that earned its K accesses.

use std::collections::{HashMap, HashSet, VecDeque};

use parking_lot::Mutex;

use super::frame::FrameId;

/// State guarded by the replacer latch.
struct ReplacerInner {
    /// Exclusive upper bound on valid frame ids.
    replacer_size: usize,
    /// The K in LRU-K.
    k: usize,
    /// Logical clock, advanced by one on every recorded access.
    current_timestamp: u64,
    /// Per-frame access timestamps, oldest first. The full history is
    /// kept: the infinite-distance tie-break needs the first-ever access,
    /// not just the most recent K.
    history: HashMap<FrameId, VecDeque<u64>>,
    /// Frames currently eligible for eviction.
    evictable: HashSet<FrameId>,
}

/// Tracks frame accesses and selects eviction victims by backward
/// K-distance.
///
/// Frame ids at or above the replacer size are ignored silently; the
/// buffer pool is the only legitimate caller and never passes one.
pub struct LruKReplacer {
    inner: Mutex<ReplacerInner>,
}

impl LruKReplacer {
    /// Creates a replacer for frame ids `0..replacer_size` with the given
    /// K.
    pub fn new(replacer_size: usize, k: usize) -> Self {
        assert!(k >= 1, "k must be >= 1");
        Self {
            inner: Mutex::new(ReplacerInner {
                replacer_size,
                k,
                current_timestamp: 0,
                history: HashMap::new(),
                evictable: HashSet::new(),
            }),
        }
    }

    /// Records an access to the frame at the current timestamp.
    pub fn record_access(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock();
        if frame_id.index() >= inner.replacer_size {
            return;
        }
        let timestamp = inner.current_timestamp;
        inner.history.entry(frame_id).or_default().push_back(timestamp);
        inner.current_timestamp += 1;
    }

    /// Marks the frame as evictable or not. Idempotent.
    pub fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        let mut inner = self.inner.lock();
        if frame_id.index() >= inner.replacer_size {
            return;
        }
        if evictable {
            inner.evictable.insert(frame_id);
        } else {
            inner.evictable.remove(&frame_id);
        }
    }

    /// Evicts the frame with the largest backward K-distance, forgetting
    /// its history.
    ///
    /// Returns `None` iff no frame is evictable.
    pub fn evict(&self) -> Option<FrameId> {
        let mut inner = self.inner.lock();

        // (frame, finite distance or None for infinity, first access)
        let mut victim: Option<(FrameId, Option<u64>, u64)> = None;
        for &frame_id in &inner.evictable {
            let (distance, first_access) = match inner.history.get(&frame_id) {
                Some(history) if !history.is_empty() => {
                    let distance = if history.len() >= inner.k {
                        Some(inner.current_timestamp - history[history.len() - inner.k])
                    } else {
                        None
                    };
                    (distance, history[0])
                }
                // Evictable but never accessed: infinite distance, loses
                // ties to any frame with a recorded first access.
                _ => (None, u64::MAX),
            };

            let better = match &victim {
                None => true,
                Some((_, best_distance, best_first)) => match (distance, *best_distance) {
                    (None, Some(_)) => true,
                    (Some(_), None) => false,
                    (None, None) => first_access < *best_first,
                    (Some(d), Some(best)) => {
                        d > best || (d == best && first_access < *best_first)
                    }
                },
            };
            if better {
                victim = Some((frame_id, distance, first_access));
            }
        }

        let (frame_id, _, _) = victim?;
        inner.evictable.remove(&frame_id);
        inner.history.remove(&frame_id);
        Some(frame_id)
    }

    /// Drops the frame from the evictable set and forgets its history.
    ///
    /// No-op if the frame is not currently evictable.
    pub fn remove(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock();
        if !inner.evictable.remove(&frame_id) {
            return;
        }
        inner.history.remove(&frame_id);
    }

    /// Returns the number of evictable frames.
    pub fn size(&self) -> usize {
        self.inner.lock().evictable.len()
    }
}

impl std::fmt::Debug for LruKReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LruKReplacer")
            .field("replacer_size", &inner.replacer_size)
            .field("k", &inner.k)
            .field("evictable", &inner.evictable.len())
            .field("tracked", &inner.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn f(id: usize) -> FrameId {
        FrameId::new(id)
    }

    #[test]
    fn test_eviction_order_and_promotion() {
        let replacer = LruKReplacer::new(7, 2);

        // Track frames 1..=6; 1..=5 evictable, 6 not.
        for id in 1..=6 {
            replacer.record_access(f(id));
        }
        for id in 1..=5 {
            replacer.set_evictable(f(id), true);
        }
        replacer.set_evictable(f(6), false);
        assert_eq!(replacer.size(), 5);

        // A second access promotes frame 1: every other frame still has
        // infinite distance, so the eviction order becomes [2,3,4,5,1].
        replacer.record_access(f(1));

        assert_eq!(replacer.evict(), Some(f(2)));
        assert_eq!(replacer.evict(), Some(f(3)));
        assert_eq!(replacer.evict(), Some(f(4)));
        assert_eq!(replacer.size(), 2);

        // Re-track 3 and 4, touch 5 and 4 again; order is now [3,1,5,4].
        replacer.record_access(f(3));
        replacer.record_access(f(4));
        replacer.record_access(f(5));
        replacer.record_access(f(4));
        replacer.set_evictable(f(3), true);
        replacer.set_evictable(f(4), true);
        assert_eq!(replacer.size(), 4);

        assert_eq!(replacer.evict(), Some(f(3)));
        assert_eq!(replacer.size(), 3);

        // Frame 6 still has a single ancient access: max distance.
        replacer.set_evictable(f(6), true);
        assert_eq!(replacer.size(), 4);
        assert_eq!(replacer.evict(), Some(f(6)));
        assert_eq!(replacer.size(), 3);

        replacer.set_evictable(f(1), false);
        assert_eq!(replacer.size(), 2);
        assert_eq!(replacer.evict(), Some(f(5)));
        assert_eq!(replacer.size(), 1);

        replacer.record_access(f(1));
        replacer.record_access(f(1));
        replacer.set_evictable(f(1), true);
        assert_eq!(replacer.size(), 2);
        assert_eq!(replacer.evict(), Some(f(4)));
        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.evict(), Some(f(1)));
        assert_eq!(replacer.size(), 0);

        // Nothing left to evict; removing an untracked frame is a no-op.
        assert_eq!(replacer.evict(), None);
        assert_eq!(replacer.size(), 0);
        replacer.remove(f(1));
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_set_evictable_is_idempotent() {
        let replacer = LruKReplacer::new(5, 2);

        replacer.record_access(f(1));
        replacer.record_access(f(1));
        replacer.set_evictable(f(1), true);
        assert_eq!(replacer.size(), 1);

        replacer.set_evictable(f(1), true);
        assert_eq!(replacer.size(), 1);

        replacer.set_evictable(f(1), false);
        assert_eq!(replacer.size(), 0);

        replacer.set_evictable(f(1), false);
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_remove_non_evictable_keeps_history() {
        let replacer = LruKReplacer::new(5, 2);

        replacer.record_access(f(1));
        replacer.remove(f(1));
        assert_eq!(replacer.size(), 0);

        // The frame is still tracked: making it evictable and evicting
        // must succeed.
        replacer.set_evictable(f(1), true);
        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.evict(), Some(f(1)));
    }

    #[test]
    fn test_out_of_range_ids_ignored() {
        let replacer = LruKReplacer::new(4, 2);

        replacer.record_access(f(4));
        replacer.record_access(f(100));
        replacer.set_evictable(f(4), true);
        replacer.set_evictable(f(100), true);

        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_eviction_forgets_history() {
        let replacer = LruKReplacer::new(4, 2);

        replacer.record_access(f(0));
        replacer.set_evictable(f(0), true);
        assert_eq!(replacer.evict(), Some(f(0)));

        // A new access after eviction must not resurrect the frame in the
        // evictable set.
        replacer.record_access(f(0));
        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_infinite_distance_falls_back_to_first_access() {
        let replacer = LruKReplacer::new(4, 3);

        // All frames have fewer than 3 accesses: classic LRU by first
        // access, regardless of later touches.
        replacer.record_access(f(0));
        replacer.record_access(f(1));
        replacer.record_access(f(2));
        replacer.record_access(f(0));
        replacer.record_access(f(1));
        for id in 0..3 {
            replacer.set_evictable(f(id), true);
        }

        assert_eq!(replacer.evict(), Some(f(0)));
        assert_eq!(replacer.evict(), Some(f(1)));
        assert_eq!(replacer.evict(), Some(f(2)));
    }

    #[test]
    fn test_finite_distance_prefers_larger() {
        let replacer = LruKReplacer::new(4, 2);

        // Frame 0: accesses at t=0,1. Frame 1: accesses at t=2,3.
        // Frame 0's second-most-recent access is older, so it goes first.
        replacer.record_access(f(0));
        replacer.record_access(f(0));
        replacer.record_access(f(1));
        replacer.record_access(f(1));
        replacer.set_evictable(f(0), true);
        replacer.set_evictable(f(1), true);

        assert_eq!(replacer.evict(), Some(f(0)));
        assert_eq!(replacer.evict(), Some(f(1)));
    }

    #[test]
    fn test_concurrent_evictable_toggles() {
        let replacer = Arc::new(LruKReplacer::new(100, 2));

        // Disjoint ranges first: two threads mark everything evictable.
        let handles: Vec<_> = [(0usize, 50usize), (50, 100)]
            .into_iter()
            .map(|(start, end)| {
                let replacer = Arc::clone(&replacer);
                std::thread::spawn(move || {
                    for id in start..end {
                        replacer.record_access(f(id));
                        replacer.set_evictable(f(id), true);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(replacer.size(), 100);

        // Overlapping ranges: three threads clear the same middle band.
        // set_evictable is idempotent, so every serialization agrees.
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let replacer = Arc::clone(&replacer);
                std::thread::spawn(move || {
                    for id in 25..75 {
                        replacer.set_evictable(f(id), false);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(replacer.size(), 50);
    }
}
