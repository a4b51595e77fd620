//! The public voxel store: a copy-on-write chunk table plus the monotone
//! bookkeeping (`version`) external callers use to invalidate their caches.

use std::cell::RefCell;
use std::rc::Rc;

use glam::IVec3;

use crate::bbox::{Aabb, BrushBox};
use crate::chunk_data::{ChunkData, CHUNK_SIZE, CHUNK_VOLUME};
use crate::chunk_table::{tile_origin, ChunkTable};
use crate::color::{Rgba, TRANSPARENT};
use crate::painter::Painter;

/// A sparse, copy-on-write volumetric RGBA grid. Cloning is O(1) — it shares
/// the chunk table via `Rc` until the first write forks it.
///
/// `Volume` is `!Send` and `!Sync` (it holds an `Rc`): sharing one across
/// threads is a compile error, not a runtime race, which is the intended
/// enforcement of the single-threaded-cooperative contract this store keeps.
#[derive(Clone, Debug)]
pub struct Volume {
    table: Rc<RefCell<ChunkTable>>,
    vid: u64,
}

impl Volume {
    /// An empty volume.
    pub fn new() -> Self {
        Self {
            table: Rc::new(RefCell::new(ChunkTable::new())),
            vid: 0,
        }
    }

    /// Monotone version counter. Any completed mutation strictly increases
    /// it; `clone` never does.
    pub fn version(&self) -> u64 {
        self.vid
    }

    /// `true` if the volume has no chunks (and so no occupied voxel).
    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }

    /// Bumps `vid` and, if this table is shared with another volume, forks a
    /// private copy whose chunk entries alias the originals until mutated.
    /// Every mutating method (here and in `painter`/`transform`) calls this
    /// first.
    pub(crate) fn prepare_write(&mut self) {
        self.vid += 1;
        if Rc::strong_count(&self.table) == 1 {
            return;
        }
        let forked = self.table.borrow().fork();
        self.table = Rc::new(RefCell::new(forked));
    }

    /// Makes `dst` point at `src`'s chunk table, dropping whatever `dst`
    /// previously held. A no-op if the two already share a table.
    pub fn assign(dst: &mut Volume, src: &Volume) {
        if Rc::ptr_eq(&dst.table, &src.table) {
            return;
        }
        dst.table = Rc::clone(&src.table);
        dst.vid += 1;
    }

    /// Consumes the volume. Its chunk table's refcount drops accordingly;
    /// present for interface symmetry with the other entry points (`Drop`
    /// already does the real work).
    pub fn delete(self) {}

    pub fn clear(&mut self) {
        self.prepare_write();
        self.table.borrow_mut().clear();
    }

    /// The volume's bounding box, or `None` if empty. `exact=false` returns
    /// the union of whole chunk tiles; `exact=true` scans each chunk for its
    /// tight occupied region.
    pub fn bbox(&self, exact: bool) -> Option<Aabb> {
        let table = self.table.borrow();
        let mut result = None;
        for (&origin, entry) in table.iter() {
            let b = if exact {
                entry
                    .chunk
                    .get()
                    .exact_local_bbox()
                    .map(|local| Aabb::new(local.min + origin, local.max + origin))
            } else {
                Some(Aabb::new(origin, origin + IVec3::splat(CHUNK_SIZE as i32)))
            };
            result = Aabb::union(result, b);
        }
        result
    }

    pub fn get_at(&self, pos: IVec3, accessor: &mut Accessor) -> Rgba {
        let origin = tile_origin(pos);
        if let Some((cached_origin, data)) = &accessor.cached {
            if *cached_origin == origin {
                let l = pos - origin;
                return data.get(l.x as usize, l.y as usize, l.z as usize);
            }
        }
        let table = self.table.borrow();
        match table.get(origin) {
            Some(entry) => {
                let rc = entry.chunk.share_rc();
                let l = pos - origin;
                let v = rc.get(l.x as usize, l.y as usize, l.z as usize);
                accessor.cached = Some((origin, rc));
                v
            }
            None => {
                tracing::trace!(?pos, "get_at on unpopulated tile; returning transparent");
                accessor.cached = None;
                TRANSPARENT
            }
        }
    }

    pub fn get_alpha_at(&self, pos: IVec3, accessor: &mut Accessor) -> u8 {
        self.get_at(pos, accessor).a
    }

    pub fn set_at(&mut self, pos: IVec3, value: Rgba, accessor: &mut Accessor) {
        self.prepare_write();
        self.write_cell(pos, value, accessor);
        self.sweep_empty_chunks();
    }

    /// Overwrites a `w×h×d` box starting at `origin` from a packed buffer in
    /// x-major, then y, then z order, then sweeps any chunk left empty.
    pub fn blit(&mut self, buf: &[Rgba], origin: IVec3, w: usize, h: usize, d: usize, accessor: &mut Accessor) {
        assert_eq!(buf.len(), w * h * d, "blit buffer size must match w*h*d");
        self.prepare_write();
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let idx = x + y * w + z * w * h;
                    let p = origin + IVec3::new(x as i32, y as i32, z as i32);
                    self.write_cell(p, buf[idx], accessor);
                }
            }
        }
        self.sweep_empty_chunks();
    }

    pub fn shift_alpha(&mut self, delta: i32) {
        self.prepare_write();
        {
            let mut table = self.table.borrow_mut();
            for origin in table.origins() {
                table.get_mut(origin).expect("origin from this table").chunk.get_mut().shift_alpha(delta);
            }
        }
        self.sweep_empty_chunks();
    }

    /// A read-only copy of one chunk's raw samples, for external consumers
    /// such as GPU texture uploads. Returns an owned copy rather than a
    /// borrowed slice: the chunk table lives behind a `RefCell`, so a
    /// reference tied to its borrow can't outlive this call.
    pub fn chunk_raw_data(&self, origin: IVec3) -> Option<Box<[Rgba; CHUNK_VOLUME]>> {
        self.table.borrow().get(origin).map(|e| Box::new(*e.chunk.get().raw()))
    }

    fn write_cell(&mut self, pos: IVec3, value: Rgba, accessor: &mut Accessor) {
        let origin = tile_origin(pos);
        let l = pos - origin;
        let mut table = self.table.borrow_mut();
        let entry = table.get_or_insert(origin);
        entry.chunk.get_mut().set(l.x as usize, l.y as usize, l.z as usize, value);
        accessor.cached = Some((origin, entry.chunk.share_rc()));
    }

    pub(crate) fn sweep_empty_chunks(&mut self) {
        let mut table = self.table.borrow_mut();
        let empties: Vec<IVec3> = table
            .iter()
            .filter(|(_, e)| e.chunk.get().is_empty(true))
            .map(|(&o, _)| o)
            .collect();
        for o in empties {
            table.remove(o);
        }
    }

    // --- crate-internal surface used by the painter dispatcher ---

    pub(crate) fn prepare_write_pub(&mut self) {
        self.prepare_write();
    }

    pub(crate) fn chunk_origins(&self) -> Vec<IVec3> {
        self.table.borrow().origins()
    }

    pub(crate) fn insert_chunks_covering(&mut self, bbox: Aabb) {
        let n = CHUNK_SIZE as i32;
        let aligned = bbox.align_to(n);
        let mut table = self.table.borrow_mut();
        let mut z = aligned.min.z;
        while z < aligned.max.z {
            let mut y = aligned.min.y;
            while y < aligned.max.y {
                let mut x = aligned.min.x;
                while x < aligned.max.x {
                    let origin = IVec3::new(x, y, z);
                    table.get_or_insert(origin);
                    x += n;
                }
                y += n;
            }
            z += n;
        }
    }

    pub(crate) fn remove_chunk(&mut self, origin: IVec3) {
        self.table.borrow_mut().remove(origin);
    }

    /// Runs `painter.shape`'s rasterizer over the chunk at `origin` (which
    /// must already exist). Returns whether the chunk became empty.
    pub(crate) fn op_chunk(&mut self, origin: IVec3, painter: &Painter, brush_box: &BrushBox) -> bool {
        let mut table = self.table.borrow_mut();
        let entry = table.get_mut(origin).expect("op_chunk requires an existing chunk");
        entry.chunk.get_mut().op(origin, painter, brush_box);
        entry.chunk.get().is_empty(true)
    }

    pub(crate) fn chunk_data_at(&self, origin: IVec3) -> Option<Rc<ChunkData>> {
        self.table.borrow().get(origin).map(|e| e.chunk.share_rc())
    }

    pub(crate) fn table_ptr_eq(&self, other: &Volume) -> bool {
        Rc::ptr_eq(&self.table, &other.table)
    }

    /// Calls `ChunkData::fill` on an already-present chunk. Used by
    /// `move`/`extrude`, which insert the destination chunks up front and
    /// then fill every local cell from a per-voxel callback.
    pub(crate) fn fill_chunk(&mut self, origin: IVec3, mut get_color: impl FnMut(IVec3) -> Rgba) {
        let mut table = self.table.borrow_mut();
        let entry = table.get_mut(origin).expect("fill_chunk requires an existing chunk");
        entry.chunk.get_mut().fill(origin, &mut get_color);
    }

    /// Inserts an empty chunk at `origin` if one isn't already present.
    /// Unlike `insert_chunks_covering`, this targets one origin directly
    /// (used by `merge`, which only needs chunks at the peer's origins).
    pub(crate) fn ensure_chunk(&mut self, origin: IVec3) {
        self.table.borrow_mut().get_or_insert(origin);
    }

    pub(crate) fn chunk_is_empty_fast(&self, origin: IVec3) -> bool {
        self.table
            .borrow()
            .get(origin)
            .map(|e| e.chunk.get().is_empty(true))
            .unwrap_or(true)
    }

    /// Sample-wise combines the chunk at `origin` (which must exist) with
    /// `other` (`None` behaves as fully transparent), per `mode`.
    pub(crate) fn merge_chunk(&mut self, origin: IVec3, other: Option<&ChunkData>, mode: crate::painter::Mode) {
        let mut table = self.table.borrow_mut();
        let entry = table.get_mut(origin).expect("merge_chunk requires an existing chunk");
        entry.chunk.get_mut().merge(other, mode);
    }

    /// Every voxel of every chunk, in chunk-table order then x, y, z within
    /// each chunk. Holds a borrow of the chunk table for its lifetime, so
    /// any attempt to mutate the volume while iterating panics rather than
    /// silently observing a half-written state.
    pub fn iter_voxels(&self) -> crate::iter::VoxelIter<'_> {
        crate::iter::VoxelIter::new(self)
    }

    /// Every chunk's `(origin, data_id, chunk_id, data)`, in the table's order.
    pub fn iter_chunks(&self) -> crate::iter::ChunkIter<'_> {
        crate::iter::ChunkIter::new(self)
    }

    pub(crate) fn table_ref(&self) -> std::cell::Ref<'_, crate::chunk_table::ChunkTable> {
        self.table.borrow()
    }

    /// Applies one brush stroke (see [`crate::painter`]).
    pub fn apply(&mut self, painter: &Painter, brush_box: &BrushBox) {
        crate::painter::apply(self, painter, brush_box);
    }

    /// Sample-wise combines `src` into `self` under `mode` (see
    /// [`crate::merge_volumes`]).
    pub fn merge_from(&mut self, src: &Volume, mode: crate::painter::Mode) {
        crate::merge::merge(self, src, mode);
    }

    /// Affine-resamples this volume in place (see [`crate::transform::mv`]).
    pub fn move_by(&mut self, mat: glam::Mat4) {
        crate::transform::mv(self, mat);
    }

    /// Projects this volume onto a plane within `dest_box` (see
    /// [`crate::transform::extrude`]).
    pub fn extrude(&mut self, plane_point: glam::Vec3, plane_normal: glam::Vec3, dest_box: Aabb) {
        crate::transform::extrude(self, plane_point, plane_normal, dest_box);
    }

    /// Flood-fills `out_mask` from `seed` over 6-neighbors, driven by
    /// `predicate` (see [`crate::selector::select`]). Returns a status code,
    /// currently always `0`, reserved for future use.
    pub fn select<F>(&self, seed: IVec3, predicate: F, out_mask: &mut Volume) -> i32
    where
        F: FnMut(Rgba, [Rgba; 6], [u8; 6]) -> u8,
    {
        crate::selector::select(self, seed, predicate, out_mask)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-slot lookup cache pinned to one [`Volume`]: the last tile origin
/// touched and a shared handle to its payload. A hit skips the chunk table's
/// hash lookup entirely. Must be re-seated (or simply recreated) after any
/// mutation on a path that didn't go through this accessor.
#[derive(Default)]
pub struct Accessor {
    cached: Option<(IVec3, Rc<ChunkData>)>,
}

impl Accessor {
    pub fn new() -> Self {
        Self { cached: None }
    }
}
