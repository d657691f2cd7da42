//! Extendible hash table.
//!
//! An extendible hash table grows by doubling a directory of bucket
//! references rather than rehashing every entry. The directory is indexed
//! by the low `global_depth` bits of a key's hash; each bucket
//! discriminates only its `local_depth` low bits, so several directory
//! entries may share one bucket. When a bucket overflows it is split in
//! two and only its own entries are redistributed, which keeps growth
//! incremental.
//!
//! Buckets live in an append-only arena and the directory stores arena
//! slots. A slot stays valid for as long as any directory entry refers to
//! it, which models the shared-bucket pointer graph without per-bucket
//! reference counting.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::mem;

use parking_lot::Mutex;

/// A bucket holds up to `bucket_size` key/value pairs and discriminates
/// the low `depth` bits of the hash.
struct Bucket<K, V> {
    depth: usize,
    items: Vec<(K, V)>,
}

impl<K, V> Bucket<K, V> {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            items: Vec::new(),
        }
    }
}

/// Directory state guarded by the table latch.
struct Directory<K, V> {
    /// Number of hash bits used to index the directory.
    global_depth: usize,
    /// Maximum number of pairs per bucket.
    bucket_size: usize,
    /// Number of live key/value pairs.
    num_entries: usize,
    /// Directory entries, each an arena slot. Length is `2^global_depth`.
    dir: Vec<usize>,
    /// Bucket arena. Slots are never reused.
    buckets: Vec<Bucket<K, V>>,
}

impl<K, V> Directory<K, V> {
    fn index_of(&self, hash: u64) -> usize {
        let mask = (1usize << self.global_depth) - 1;
        (hash as usize) & mask
    }
}

/// A latch-protected extendible hash table.
///
/// Keys hash with the table's `BuildHasher` (`RandomState` by default);
/// the low `global_depth` bits of the hash select a directory entry.
/// `insert` upserts and always succeeds, splitting buckets and doubling
/// the directory as needed. All operations are serialized by a single
/// internal latch.
///
/// # Example
///
/// ```rust
/// use basalt_container::hash::ExtendibleHashTable;
///
/// let table: ExtendibleHashTable<u64, u64> = ExtendibleHashTable::new(2);
/// table.insert(1, 10);
/// table.insert(1, 11); // upsert
/// assert_eq!(table.find(&1), Some(11));
/// assert!(table.remove(&1));
/// ```
pub struct ExtendibleHashTable<K, V, S = RandomState> {
    inner: Mutex<Directory<K, V>>,
    hash_builder: S,
}

impl<K, V> ExtendibleHashTable<K, V>
where
    K: Hash + Eq,
{
    /// Creates a table with the given bucket capacity and the default
    /// hasher.
    ///
    /// The table starts with a single empty bucket of local depth 0 and a
    /// one-entry directory.
    pub fn new(bucket_size: usize) -> Self {
        Self::with_hasher(bucket_size, RandomState::new())
    }
}

impl<K, V, S> ExtendibleHashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a table with the given bucket capacity and hasher state.
    pub fn with_hasher(bucket_size: usize, hash_builder: S) -> Self {
        assert!(bucket_size > 0, "bucket_size must be > 0");
        Self {
            inner: Mutex::new(Directory {
                global_depth: 0,
                bucket_size,
                num_entries: 0,
                dir: vec![0],
                buckets: vec![Bucket::new(0)],
            }),
            hash_builder,
        }
    }

    /// Returns the value most recently inserted for `key`, if any.
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let hash = self.hash_builder.hash_one(key);
        let inner = self.inner.lock();
        let slot = inner.dir[inner.index_of(hash)];
        inner.buckets[slot]
            .items
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v.clone())
    }

    /// Inserts or updates the value for `key`.
    ///
    /// If the key is present its value is replaced in place. Otherwise the
    /// pair is added, splitting the target bucket (and doubling the
    /// directory when the bucket's local depth has caught up with the
    /// global depth) until a slot with spare capacity exists. Insertion
    /// never fails; the table has no capacity bound.
    pub fn insert(&self, key: K, value: V) {
        let hash = self.hash_builder.hash_one(&key);
        let mut inner = self.inner.lock();

        loop {
            let index = inner.index_of(hash);
            let slot = inner.dir[index];
            let bucket_size = inner.bucket_size;
            let bucket = &mut inner.buckets[slot];

            if let Some(pair) = bucket.items.iter_mut().find(|(k, _)| *k == key) {
                pair.1 = value;
                return;
            }
            if bucket.items.len() < bucket_size {
                bucket.items.push((key, value));
                inner.num_entries += 1;
                return;
            }

            self.split(&mut inner, slot);
        }
    }

    /// Removes all pairs stored under `key`; returns whether any were
    /// removed.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        let mut inner = self.inner.lock();
        let slot = inner.dir[inner.index_of(hash)];
        let items = &mut inner.buckets[slot].items;
        let before = items.len();
        items.retain(|(k, _)| k.borrow() != key);
        let removed = before - items.len();
        inner.num_entries -= removed;
        removed > 0
    }

    /// Splits the overflowing bucket at `slot`, doubling the directory
    /// first if the bucket already discriminates every directory bit.
    fn split(&self, inner: &mut Directory<K, V>, slot: usize) {
        if inner.buckets[slot].depth == inner.global_depth {
            // Double the directory: dir[j + 2^d] aliases dir[j].
            let len = inner.dir.len();
            for j in 0..len {
                let target = inner.dir[j];
                inner.dir.push(target);
            }
            inner.global_depth += 1;
        }

        let new_depth = inner.buckets[slot].depth + 1;
        inner.buckets[slot].depth = new_depth;
        let new_slot = inner.buckets.len();
        inner.buckets.push(Bucket::new(new_depth));

        // Entries whose newly discriminated bit is set move to the new
        // bucket.
        let bit = 1usize << (new_depth - 1);
        for j in 0..inner.dir.len() {
            if inner.dir[j] == slot && j & bit != 0 {
                inner.dir[j] = new_slot;
            }
        }

        // Redistribute by re-hashing under the current global depth. Each
        // half receives at most bucket_size pairs, so these pushes cannot
        // overflow.
        let items = mem::take(&mut inner.buckets[slot].items);
        for (k, v) in items {
            let hash = self.hash_builder.hash_one(&k);
            let target = inner.dir[inner.index_of(hash)];
            inner.buckets[target].items.push((k, v));
        }
    }

    /// Returns the number of hash bits used to index the directory.
    pub fn global_depth(&self) -> usize {
        self.inner.lock().global_depth
    }

    /// Returns the local depth of the bucket referenced by directory
    /// entry `dir_index`.
    pub fn local_depth(&self, dir_index: usize) -> usize {
        let inner = self.inner.lock();
        let slot = inner.dir[dir_index];
        inner.buckets[slot].depth
    }

    /// Returns the number of buckets allocated so far.
    pub fn num_buckets(&self) -> usize {
        self.inner.lock().buckets.len()
    }

    /// Returns the number of key/value pairs in the table.
    pub fn len(&self) -> usize {
        self.inner.lock().num_entries
    }

    /// Returns true if the table holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> std::fmt::Debug for ExtendibleHashTable<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ExtendibleHashTable")
            .field("global_depth", &inner.global_depth)
            .field("num_buckets", &inner.buckets.len())
            .field("num_entries", &inner.num_entries)
            .finish()
    }
}
