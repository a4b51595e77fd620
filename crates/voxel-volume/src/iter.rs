//! Lazy producers over a [`Volume`]'s voxels and chunks. Both borrow the
//! volume's chunk table for their entire lifetime, so any attempt to mutate
//! the volume while one is alive panics via `RefCell`'s borrow check rather
//! than silently observing a torn state.

use std::cell::Ref;
use std::rc::Rc;

use glam::IVec3;

use crate::chunk_data::{ChunkData, CHUNK_SIZE, CHUNK_VOLUME};
use crate::chunk_table::ChunkTable;
use crate::color::Rgba;
use crate::volume::Volume;

/// Yields every sample of every chunk (not just occupied ones) as
/// `(world_pos, rgba)`, chunk-major then x, then y, then z within a chunk.
pub struct VoxelIter<'a> {
    table: Ref<'a, ChunkTable>,
    order: Vec<IVec3>,
    chunk_idx: usize,
    local_idx: usize,
}

impl<'a> VoxelIter<'a> {
    pub(crate) fn new(volume: &'a Volume) -> Self {
        let table = volume.table_ref();
        let order = table.origins();
        Self {
            table,
            order,
            chunk_idx: 0,
            local_idx: 0,
        }
    }
}

impl<'a> Iterator for VoxelIter<'a> {
    type Item = (IVec3, Rgba);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let origin = *self.order.get(self.chunk_idx)?;
            let Some(entry) = self.table.get(origin) else {
                self.chunk_idx += 1;
                self.local_idx = 0;
                continue;
            };
            if self.local_idx >= CHUNK_VOLUME {
                self.chunk_idx += 1;
                self.local_idx = 0;
                continue;
            }
            let idx = self.local_idx;
            self.local_idx += 1;
            let x = idx % CHUNK_SIZE;
            let y = (idx / CHUNK_SIZE) % CHUNK_SIZE;
            let z = idx / (CHUNK_SIZE * CHUNK_SIZE);
            let v = entry.chunk.get().get(x, y, z);
            let world = origin + IVec3::new(x as i32, y as i32, z as i32);
            return Some((world, v));
        }
    }
}

/// Yields each chunk's `(origin, data_id, chunk_id, data)` in the table's order.
pub struct ChunkIter<'a> {
    table: Ref<'a, ChunkTable>,
    order: Vec<IVec3>,
    idx: usize,
}

impl<'a> ChunkIter<'a> {
    pub(crate) fn new(volume: &'a Volume) -> Self {
        let table = volume.table_ref();
        let order = table.origins();
        Self { table, order, idx: 0 }
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = (IVec3, u64, u32, Rc<ChunkData>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < self.order.len() {
            let origin = self.order[self.idx];
            self.idx += 1;
            if let Some(entry) = self.table.get(origin) {
                return Some((origin, entry.chunk.data_id(), entry.chunk_id, entry.chunk.share_rc()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Accessor;

    #[test]
    fn voxel_iter_covers_every_occupied_sample_exactly_once() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        let points = [IVec3::new(1, 2, 3), IVec3::new(16, 0, 0), IVec3::new(-1, -1, -1)];
        for &p in &points {
            v.set_at(p, Rgba::new(9, 9, 9, 255), &mut acc);
        }
        let occupied: Vec<IVec3> = v
            .iter_voxels()
            .filter(|(_, c)| c.a > 0)
            .map(|(p, _)| p)
            .collect();
        assert_eq!(occupied.len(), points.len());
        for p in points {
            assert!(occupied.contains(&p));
        }
    }

    #[test]
    fn voxel_iter_yields_transparent_samples_too() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::ZERO, Rgba::new(1, 1, 1, 1), &mut acc);
        assert_eq!(v.iter_voxels().count(), CHUNK_VOLUME);
    }

    #[test]
    fn chunk_iter_yields_all_chunks_with_stable_ids() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::ZERO, Rgba::new(1, 1, 1, 255), &mut acc);
        v.set_at(IVec3::new(16, 0, 0), Rgba::new(2, 2, 2, 255), &mut acc);
        let chunks: Vec<_> = v.iter_chunks().collect();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    #[should_panic]
    fn mutating_while_iterating_panics() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::ZERO, Rgba::new(1, 1, 1, 255), &mut acc);
        let iter = v.iter_voxels();
        v.set_at(IVec3::new(1, 0, 0), Rgba::new(2, 2, 2, 255), &mut acc);
        drop(iter);
    }
}
