//! The painter dispatcher: symmetry expansion, bounds computation, and
//! per-chunk delegation for one brush stroke.

use glam::IVec3;

use crate::bbox::{Aabb, BrushBox};
use crate::chunk_data::CHUNK_SIZE;
use crate::color::Rgba;
use crate::shapes::Shape;
use crate::volume::Volume;

/// How a brush's occupancy combines with a chunk's existing samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Over,
    Sub,
    Max,
    Intersect,
    MultAlpha,
    Replace,
}

impl Mode {
    /// `OVER` and `MAX` may create chunks that didn't previously exist;
    /// everything else only ever removes material from what's already there.
    pub fn is_constructive(self) -> bool {
        matches!(self, Mode::Over | Mode::Max)
    }
}

/// One brush stroke: a shape transformed by a box, combined with the volume
/// under `mode`, optionally mirrored across up to three axes.
#[derive(Clone, Debug)]
pub struct Painter {
    pub shape: Shape,
    pub mode: Mode,
    pub smoothness: f32,
    pub color: Rgba,
    /// Bit `i` set means "also apply mirrored across world axis `i`".
    pub symmetry_mask: u8,
    pub clip_box: Option<Aabb>,
}

/// Applies `painter`, shaped by `brush_box`, to `volume`. Expands symmetry,
/// computes the affected chunk range, forks the volume for writing, and
/// delegates to [`crate::chunk_data::ChunkData::op`] per touched chunk.
pub fn apply(volume: &mut Volume, painter: &Painter, brush_box: &BrushBox) {
    expand_symmetry(volume, painter, brush_box, painter.symmetry_mask);
}

/// Bit `i` low-to-high: recursing on the lowest set bit first and clearing it
/// makes the tie-break between overlapping reflections deterministic — the
/// last-composed reflection (highest bit) wins on any voxel more than one
/// mirror touches.
fn expand_symmetry(volume: &mut Volume, painter: &Painter, brush_box: &BrushBox, mask: u8) {
    for axis in 0..3u8 {
        let bit = 1 << axis;
        if mask & bit != 0 {
            let reflected = brush_box.reflected(axis as usize);
            expand_symmetry(volume, painter, &reflected, mask & !bit);
        }
    }
    apply_single(volume, painter, brush_box);
}

fn apply_single(volume: &mut Volume, painter: &Painter, brush_box: &BrushBox) {
    let full_box = brush_box.grow(painter.smoothness);
    let mut bbox = full_box.world_aabb().round_out().grow(1);
    if let Some(clip) = painter.clip_box {
        bbox = match bbox.intersection(&clip) {
            Some(b) => b,
            None => return,
        };
    }
    if bbox.is_degenerate() {
        return;
    }

    volume.prepare_write();

    if painter.mode.is_constructive() {
        volume.insert_chunks_covering(bbox);
    }

    let chunk_origins: Vec<IVec3> = volume.chunk_origins();
    let mut to_delete = Vec::new();

    for origin in chunk_origins {
        let cbox = Aabb::new(origin, origin + IVec3::splat(CHUNK_SIZE as i32));
        if !cbox.intersects(&bbox) {
            if painter.mode == Mode::Intersect {
                to_delete.push(origin);
            }
            continue;
        }

        if painter.shape.is_cube() && painter.mode == Mode::Sub && full_box.contains_aabb(&cbox) {
            to_delete.push(origin);
            continue;
        }

        let became_empty = volume.op_chunk(origin, painter, brush_box);
        if became_empty {
            to_delete.push(origin);
        }
    }

    for origin in to_delete {
        volume.remove_chunk(origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BrushBox;
    use glam::Vec3;

    fn cube_painter(mode: Mode, color: Rgba) -> Painter {
        Painter {
            shape: Shape::Cube,
            mode,
            smoothness: 0.0,
            color,
            symmetry_mask: 0,
            clip_box: None,
        }
    }

    #[test]
    fn over_then_sub_leaves_volume_empty() {
        let mut v = Volume::new();
        let b = BrushBox::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        apply(&mut v, &cube_painter(Mode::Over, Rgba::new(255, 0, 0, 255)), &b);
        assert!(!v.is_empty());
        apply(&mut v, &cube_painter(Mode::Sub, Rgba::new(0, 0, 0, 0)), &b);
        assert!(v.is_empty());
        assert_eq!(v.chunk_origins().len(), 0);
    }

    #[test]
    fn destructive_mode_never_creates_chunks() {
        let mut v = Volume::new();
        let b = BrushBox::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        apply(&mut v, &cube_painter(Mode::Sub, Rgba::new(0, 0, 0, 0)), &b);
        assert!(v.is_empty());
        assert_eq!(v.chunk_origins().len(), 0);
    }

    #[test]
    fn symmetry_mask_mirrors_across_every_axis() {
        let mut v = Volume::new();
        let b = BrushBox::from_center_half_extents(Vec3::new(4.0, 4.0, 4.0), Vec3::splat(1.0));
        let painter = Painter {
            symmetry_mask: 0b111,
            ..cube_painter(Mode::Over, Rgba::new(10, 20, 30, 255))
        };
        apply(&mut v, &painter, &b);
        let mut accessor = crate::volume::Accessor::new();
        assert!(v.get_at(IVec3::new(4, 4, 4), &mut accessor).a > 0);
        assert!(v.get_at(IVec3::new(-4, 4, 4), &mut accessor).a > 0);
        assert!(v.get_at(IVec3::new(4, -4, 4), &mut accessor).a > 0);
        assert!(v.get_at(IVec3::new(4, 4, -4), &mut accessor).a > 0);
        assert!(v.get_at(IVec3::new(-4, -4, -4), &mut accessor).a > 0);
    }
}
