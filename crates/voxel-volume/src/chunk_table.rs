//! Central owner for all chunks of one volume, keyed by tile origin.
//!
//! The [`ChunkTable`] provides expected O(1) chunk lookup, insert, and
//! removal using an [`FxHashMap`](rustc_hash::FxHashMap) for fast hashing of
//! small fixed-size keys.

use glam::IVec3;
use rustc_hash::FxHashMap;

use crate::chunk_data::CHUNK_SIZE;
use crate::cow_chunk::CowChunk;

/// Rounds `p` down to the nearest multiple of `CHUNK_SIZE` on every axis —
/// the origin of the tile containing `p`.
pub(crate) fn tile_origin(p: IVec3) -> IVec3 {
    let n = CHUNK_SIZE as i32;
    IVec3::new(
        p.x - p.x.rem_euclid(n),
        p.y - p.y.rem_euclid(n),
        p.z - p.z.rem_euclid(n),
    )
}

/// One chunk's entry in the table: its payload plus the per-volume integer
/// id external consumers correlate GPU resources with.
#[derive(Clone, Debug)]
pub struct ChunkEntry {
    pub chunk_id: u32,
    pub chunk: CowChunk,
}

/// Maps tile origin to chunk. Origins are always multiples of [`CHUNK_SIZE`].
#[derive(Clone, Debug, Default)]
pub struct ChunkTable {
    chunks: FxHashMap<IVec3, ChunkEntry>,
    next_chunk_id: u32,
}

impl ChunkTable {
    pub fn new() -> Self {
        Self {
            chunks: FxHashMap::default(),
            next_chunk_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, origin: IVec3) -> Option<&ChunkEntry> {
        debug_assert!(is_aligned(origin));
        self.chunks.get(&origin)
    }

    pub fn get_mut(&mut self, origin: IVec3) -> Option<&mut ChunkEntry> {
        debug_assert!(is_aligned(origin));
        self.chunks.get_mut(&origin)
    }

    /// Inserts a fresh, empty chunk at `origin`. Asserts no chunk already
    /// occupies that origin — callers must check first if insertion might
    /// be redundant.
    pub fn insert_new(&mut self, origin: IVec3) -> &mut ChunkEntry {
        debug_assert!(is_aligned(origin));
        assert!(
            !self.chunks.contains_key(&origin),
            "chunk table already has an entry at {origin:?}"
        );
        let chunk_id = self.next_chunk_id;
        self.next_chunk_id += 1;
        self.chunks.entry(origin).or_insert(ChunkEntry {
            chunk_id,
            chunk: CowChunk::new(),
        })
    }

    /// Inserts a fresh chunk at `origin` if one isn't already present.
    pub fn get_or_insert(&mut self, origin: IVec3) -> &mut ChunkEntry {
        debug_assert!(is_aligned(origin));
        if !self.chunks.contains_key(&origin) {
            self.insert_new(origin);
        }
        self.chunks.get_mut(&origin).expect("just inserted")
    }

    pub fn remove(&mut self, origin: IVec3) -> Option<ChunkEntry> {
        self.chunks.remove(&origin)
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IVec3, &ChunkEntry)> {
        self.chunks.iter()
    }

    pub fn origins(&self) -> Vec<IVec3> {
        self.chunks.keys().copied().collect()
    }

    /// Forks this table for copy-on-write: every entry is carried over as a
    /// shallow alias (same `data_id`, same underlying payload until a chunk
    /// is actually mutated), and the chunk id counter is preserved so newly
    /// inserted chunks in the fork never collide with ids already handed out.
    pub fn fork(&self) -> ChunkTable {
        let chunks = self
            .chunks
            .iter()
            .map(|(&origin, entry)| {
                (
                    origin,
                    ChunkEntry {
                        chunk_id: entry.chunk_id,
                        chunk: entry.chunk.clone_shared(),
                    },
                )
            })
            .collect();
        ChunkTable {
            chunks,
            next_chunk_id: self.next_chunk_id,
        }
    }
}

fn is_aligned(origin: IVec3) -> bool {
    let n = CHUNK_SIZE as i32;
    origin.x.rem_euclid(n) == 0 && origin.y.rem_euclid(n) == 0 && origin.z.rem_euclid(n) == 0
}
