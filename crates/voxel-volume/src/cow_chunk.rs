//! Copy-on-write wrapper around [`ChunkData`], giving every chunk entry in a
//! [`crate::chunk_table::ChunkTable`] a payload that can be cheaply shared
//! across forked tables and a `data_id` that only advances when the sample
//! array actually changes (not merely when the table forks).

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::chunk_data::ChunkData;

/// Global source of `data_id` values. A plain (non-atomic-in-spirit, but
/// `AtomicU64` is the simplest monotone counter in `std`) counter is fine:
/// the crate's concurrency contract is single-threaded-cooperative (see the
/// crate's concurrency notes), so there is never real contention on this.
static NEXT_DATA_ID: AtomicU64 = AtomicU64::new(1);

fn next_data_id() -> u64 {
    NEXT_DATA_ID.fetch_add(1, Ordering::Relaxed)
}

/// A chunk's payload plus its invalidation token. Cloning a `CowChunk` is an
/// `Rc` bump; the payload is only deep-copied on [`CowChunk::get_mut`] when
/// it is shared with another owner.
#[derive(Clone, Debug)]
pub struct CowChunk {
    data: Rc<ChunkData>,
    data_id: u64,
}

impl CowChunk {
    /// A fresh, fully transparent chunk with a new `data_id`.
    pub fn new() -> Self {
        Self {
            data: Rc::new(ChunkData::new()),
            data_id: next_data_id(),
        }
    }

    /// A cheap alias sharing this chunk's payload and `data_id`: used when
    /// forking a chunk table for copy-on-write, where unmutated chunks must
    /// keep their `data_id` (see `data_id` on unmodified clones in the
    /// crate's design notes).
    pub fn clone_shared(&self) -> Self {
        Self {
            data: Rc::clone(&self.data),
            data_id: self.data_id,
        }
    }

    pub fn get(&self) -> &ChunkData {
        &self.data
    }

    /// Mutable access, forking the payload first if it's shared with another
    /// `CowChunk`. Every call bumps `data_id`, on the assumption (true of
    /// every call site in this crate) that the caller is about to write.
    pub fn get_mut(&mut self) -> &mut ChunkData {
        self.data_id = next_data_id();
        Rc::make_mut(&mut self.data)
    }

    pub fn data_id(&self) -> u64 {
        self.data_id
    }

    /// A new `Rc` pointing at the same payload, for callers (the accessor,
    /// the iterators) that want to hold a chunk's data across a borrow of
    /// the owning table without aliasing `&mut`.
    pub fn share_rc(&self) -> Rc<ChunkData> {
        Rc::clone(&self.data)
    }

    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.data)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Default for CowChunk {
    fn default() -> Self {
        Self::new()
    }
}
