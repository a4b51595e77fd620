//! Dense RGBA storage for one `N×N×N` chunk.
//!
//! Unlike a palette-compressed block store, every voxel is a full 4-byte
//! RGBA sample — painting is compositing, not type substitution, so there is
//! no small alphabet of values to palette-index into.

use glam::{IVec3, Vec3};

use crate::bbox::{Aabb, BrushBox};
use crate::color::{Rgba, TRANSPARENT};
use crate::painter::{Mode, Painter};

/// Side length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 16;

/// Total number of voxels in a chunk (`CHUNK_SIZE`³).
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Dense `CHUNK_SIZE`³ array of RGBA samples, plus a running count of
/// non-transparent samples so [`ChunkData::is_empty`] never has to scan on
/// the hot path (every paint op checks emptiness once per touched chunk).
#[derive(Clone, Debug)]
pub struct ChunkData {
    voxels: Box<[Rgba; CHUNK_VOLUME]>,
    occupied: u32,
}

impl ChunkData {
    /// A chunk with every sample fully transparent.
    pub fn new() -> Self {
        Self {
            voxels: Box::new([TRANSPARENT; CHUNK_VOLUME]),
            occupied: 0,
        }
    }

    /// Returns the sample at local coordinates (each in `0..CHUNK_SIZE`).
    pub fn get(&self, x: usize, y: usize, z: usize) -> Rgba {
        self.voxels[Self::linear_index(x, y, z)]
    }

    /// Overwrites the sample at local coordinates and keeps the occupied
    /// count exact.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: Rgba) {
        let idx = Self::linear_index(x, y, z);
        let was_occupied = !self.voxels[idx].is_transparent();
        let is_occupied = !value.is_transparent();
        self.voxels[idx] = value;
        match (was_occupied, is_occupied) {
            (false, true) => self.occupied += 1,
            (true, false) => self.occupied -= 1,
            _ => {}
        }
    }

    /// `fast=true` trusts the incrementally maintained occupied count.
    /// `fast=false` always scans every sample — a defensive check for
    /// callers that mutated the array through a path other than `set`.
    pub fn is_empty(&self, fast: bool) -> bool {
        if fast {
            self.occupied == 0
        } else {
            self.voxels.iter().all(Rgba::is_transparent)
        }
    }

    /// Recomputes the occupied count from a full scan. Used after bulk
    /// operations (merge, painter ops) that write the array directly rather
    /// than through `set`.
    pub fn refresh_empty_flag(&mut self) {
        self.occupied = self.voxels.iter().filter(|v| !v.is_transparent()).count() as u32;
    }

    /// The tight local-space AABB of samples with `alpha > 0`, or `None` if
    /// the chunk is empty.
    pub fn exact_local_bbox(&self) -> Option<Aabb> {
        let mut min = IVec3::splat(CHUNK_SIZE as i32);
        let mut max = IVec3::ZERO;
        let mut any = false;
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    if !self.get(x, y, z).is_transparent() {
                        any = true;
                        let p = IVec3::new(x as i32, y as i32, z as i32);
                        min = min.min(p);
                        max = max.max(p + IVec3::ONE);
                    }
                }
            }
        }
        any.then_some(Aabb::new(min, max))
    }

    /// Calls `get_color(world_pos)` for every local cell and overwrites the
    /// sample with the result. `origin` is this chunk's world-space origin.
    pub fn fill(&mut self, origin: IVec3, mut get_color: impl FnMut(IVec3) -> Rgba) {
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let world = origin + IVec3::new(x as i32, y as i32, z as i32);
                    self.set(x, y, z, get_color(world));
                }
            }
        }
        self.refresh_empty_flag();
    }

    /// Rasterizes `painter.shape`, transformed by `brush_box`, into every
    /// local cell of this chunk whose world position is `origin + local`.
    /// Samples at cell centers (`local + 0.5`), matching a one-sample-per-voxel
    /// rasterizer rather than supersampling.
    pub fn op(&mut self, origin: IVec3, painter: &Painter, brush_box: &BrushBox) {
        let Some(inv) = brush_box.mat.inverse_checked() else {
            tracing::warn!("painter box has a non-invertible matrix; skipping chunk op");
            return;
        };
        let local_smoothness = brush_box.local_smoothness(painter.smoothness);
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let world = origin + IVec3::new(x as i32, y as i32, z as i32);
                    let center = world.as_vec3() + Vec3::splat(0.5);
                    let local = inv.transform_point3(center);
                    let b = painter.shape.sample(local, local_smoothness);
                    let idx = Self::linear_index(x, y, z);
                    self.voxels[idx] = apply_mode(painter.mode, painter.color, self.voxels[idx], b);
                }
            }
        }
        self.refresh_empty_flag();
    }

    /// Combines each sample with the peer chunk's corresponding sample
    /// (`other = None` behaves as fully transparent).
    pub fn merge(&mut self, other: Option<&ChunkData>, mode: crate::painter::Mode) {
        use crate::painter::Mode;
        for i in 0..CHUNK_VOLUME {
            let s = self.voxels[i];
            let o = other.map(|c| c.voxels[i]).unwrap_or(TRANSPARENT);
            self.voxels[i] = match mode {
                Mode::Over => o.over(s, 1.0),
                Mode::Max => o.max(s, 1.0),
                Mode::Sub => {
                    let a = (s.a as f32 * (1.0 - o.a as f32 / 255.0)).round() as u8;
                    Rgba { a, ..s }
                }
                Mode::Intersect => {
                    let a = s.a.min(o.a);
                    Rgba { a, ..s }
                }
                Mode::MultAlpha => {
                    let a = (s.a as f32 * (o.a as f32 / 255.0)).round() as u8;
                    Rgba { a, ..s }
                }
                Mode::Replace => {
                    if o.a > 0 { o } else { s }
                }
            };
        }
        self.refresh_empty_flag();
    }

    /// Saturating add to every sample's alpha.
    pub fn shift_alpha(&mut self, delta: i32) {
        for v in self.voxels.iter_mut() {
            *v = v.shift_alpha(delta);
        }
        self.refresh_empty_flag();
    }

    pub(crate) fn linear_index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE);
        x + y * CHUNK_SIZE + z * CHUNK_SIZE * CHUNK_SIZE
    }

    /// Raw read access to the underlying sample array, exposed to external
    /// consumers (e.g. GPU texture uploads) via `Volume::chunk_raw_data`.
    pub fn raw(&self) -> &[Rgba; CHUNK_VOLUME] {
        &self.voxels
    }
}

/// Combines an existing sample `s` with the painter's `color`, scaled by the
/// shape's brush occupancy `b` in `[0,1]`, per the painter mode's table.
fn apply_mode(mode: Mode, color: Rgba, s: Rgba, b: f32) -> Rgba {
    match mode {
        Mode::Over => color.over(s, b),
        Mode::Max => color.max(s, b),
        Mode::Sub => {
            let a = (s.a as f32 * (1.0 - b.clamp(0.0, 1.0))).round() as u8;
            Rgba { a, ..s }
        }
        Mode::Intersect => {
            let a = s.a.min((b.clamp(0.0, 1.0) * 255.0).round() as u8);
            Rgba { a, ..s }
        }
        Mode::MultAlpha => {
            let a = (s.a as f32 * b.clamp(0.0, 1.0)).round() as u8;
            Rgba { a, ..s }
        }
        Mode::Replace => {
            if b > 0.0 {
                Rgba {
                    a: (color.a as f32 * b.clamp(0.0, 1.0)).round().clamp(0.0, 255.0) as u8,
                    ..color
                }
            } else {
                s
            }
        }
    }
}

impl Default for ChunkData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty_both_fast_and_exact() {
        let c = ChunkData::new();
        assert!(c.is_empty(true));
        assert!(c.is_empty(false));
        assert!(c.exact_local_bbox().is_none());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut c = ChunkData::new();
        let v = Rgba::new(10, 20, 30, 255);
        c.set(1, 2, 3, v);
        assert_eq!(c.get(1, 2, 3), v);
        assert_eq!(c.get(0, 0, 0), TRANSPARENT);
    }

    #[test]
    fn set_opaque_clears_known_empty_flag() {
        let mut c = ChunkData::new();
        c.set(0, 0, 0, Rgba::new(1, 1, 1, 1));
        assert!(!c.is_empty(true));
    }

    #[test]
    fn exact_local_bbox_is_tight() {
        let mut c = ChunkData::new();
        c.set(2, 3, 4, Rgba::new(1, 1, 1, 1));
        let bbox = c.exact_local_bbox().expect("non-empty");
        assert_eq!(bbox.min, IVec3::new(2, 3, 4));
        assert_eq!(bbox.max, IVec3::new(3, 4, 5));
    }

    #[test]
    fn exact_local_bbox_spans_multiple_samples() {
        let mut c = ChunkData::new();
        c.set(0, 0, 0, Rgba::new(1, 1, 1, 1));
        c.set(5, 6, 7, Rgba::new(1, 1, 1, 1));
        let bbox = c.exact_local_bbox().expect("non-empty");
        assert_eq!(bbox.min, IVec3::new(0, 0, 0));
        assert_eq!(bbox.max, IVec3::new(6, 7, 8));
    }

    #[test]
    fn fill_calls_callback_with_world_coordinates() {
        let mut c = ChunkData::new();
        let origin = IVec3::new(16, 0, 0);
        c.fill(origin, |p| {
            if p.x == 16 {
                Rgba::new(255, 0, 0, 255)
            } else {
                TRANSPARENT
            }
        });
        assert_eq!(c.get(0, 0, 0), Rgba::new(255, 0, 0, 255));
        assert_eq!(c.get(1, 0, 0), TRANSPARENT);
        assert!(!c.is_empty(true));
    }

    #[test]
    fn shift_alpha_saturates_all_samples() {
        let mut c = ChunkData::new();
        c.set(0, 0, 0, Rgba::new(1, 2, 3, 200));
        c.shift_alpha(100);
        assert_eq!(c.get(0, 0, 0).a, 255);
    }

    #[test]
    fn set_back_to_transparent_restores_emptiness() {
        let mut c = ChunkData::new();
        c.set(0, 0, 0, Rgba::new(1, 1, 1, 1));
        c.set(0, 0, 0, TRANSPARENT);
        assert!(c.is_empty(true));
        assert!(c.is_empty(false));
    }

    #[test]
    fn refresh_empty_flag_recomputes_after_direct_array_write() {
        let mut c = ChunkData::new();
        c.set(0, 0, 0, Rgba::new(1, 1, 1, 1));
        c.merge(None, crate::painter::Mode::Sub);
        assert!(c.is_empty(true));
    }

    fn unit_cube_box() -> crate::bbox::BrushBox {
        crate::bbox::BrushBox::from_center_half_extents(
            glam::Vec3::splat(8.0),
            glam::Vec3::splat(8.0),
        )
    }

    #[test]
    fn op_over_paints_inside_the_box_and_leaves_outside_transparent() {
        let mut c = ChunkData::new();
        let painter = Painter {
            shape: crate::shapes::Shape::Cube,
            mode: crate::painter::Mode::Over,
            smoothness: 0.0,
            color: Rgba::new(255, 0, 0, 255),
            symmetry_mask: 0,
            clip_box: None,
        };
        c.op(IVec3::ZERO, &painter, &unit_cube_box());
        assert_eq!(c.get(8, 8, 8), Rgba::new(255, 0, 0, 255));
        assert_eq!(c.get(0, 0, 0), TRANSPARENT);
        assert!(!c.is_empty(true));
    }

    #[test]
    fn op_sub_clears_previously_painted_region() {
        let mut c = ChunkData::new();
        let over = Painter {
            shape: crate::shapes::Shape::Cube,
            mode: crate::painter::Mode::Over,
            smoothness: 0.0,
            color: Rgba::new(1, 2, 3, 255),
            symmetry_mask: 0,
            clip_box: None,
        };
        c.op(IVec3::ZERO, &over, &unit_cube_box());
        let sub = Painter {
            mode: crate::painter::Mode::Sub,
            ..over
        };
        c.op(IVec3::ZERO, &sub, &unit_cube_box());
        assert!(c.is_empty(true));
    }
}
