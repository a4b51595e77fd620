//! Affine resampling (`move`) and plane projection (`extrude`).
//!
//! Both work the same way: clone the volume so there's an untouched source
//! to sample from, repopulate the destination region with fresh chunks, and
//! fill each cell by sampling the source through the (inverse) transform.

use glam::{IVec3, Mat4, Vec3};

use crate::bbox::{Aabb, AabbF};
use crate::color::TRANSPARENT;
use crate::volume::{Accessor, Volume};

/// Resamples `volume` through `mat`: the voxel at `mat^-1 * p` (nearest
/// neighbor) becomes the new value at `p`, for every `p` in the transformed
/// bounding box of the volume's current content. A non-invertible `mat` is a
/// no-op (there is no well-defined source sample to pull from).
pub fn mv(volume: &mut Volume, mat: Mat4) {
    let Some(imat) = mat.inverse_checked() else {
        tracing::warn!("move: matrix has no inverse; leaving volume unchanged");
        return;
    };
    let src = volume.clone();

    volume.prepare_write_pub();
    let Some(bbox) = volume.bbox(true) else {
        return;
    };

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for corner in bbox.corners() {
        let p = mat.transform_point3(corner);
        min = min.min(p);
        max = max.max(p);
    }

    volume.clear();
    let dest = AabbF { min, max }.round_out();
    volume.insert_chunks_covering(dest);

    let mut src_acc = Accessor::new();
    for origin in volume.chunk_origins() {
        volume.fill_chunk(origin, |world| {
            let p = imat.transform_point3(world.as_vec3());
            let pi = IVec3::new(p.x.round() as i32, p.y.round() as i32, p.z.round() as i32);
            src.get_at(pi, &mut src_acc)
        });
    }
    volume.sweep_empty_chunks();
}

/// Projects `volume` onto the plane through `plane_point` with normal
/// `plane_normal`, within `dest_box`; cells outside `dest_box` are cleared.
/// Matches the source's simplification: only axes whose normal component
/// has `|n_i| > 0.1` are flattened, so the normal must be close to
/// axis-aligned — a general oblique-plane extrude is not supported (see the
/// crate's design notes).
pub fn extrude(volume: &mut Volume, plane_point: Vec3, plane_normal: Vec3, dest_box: Aabb) {
    // Clone before mutating so `src` keeps the pre-extrude table; forking
    // happens on the `prepare_write_pub` call below, so `volume`'s table is
    // private by the time `insert_chunks_covering`/`fill_chunk` touch it.
    // Sampling through a frozen snapshot (rather than the source's own
    // self-referential read, as the source this is ported from does) avoids
    // both an iteration-order-dependent result and a double-borrow of the
    // same table.
    let src = volume.clone();
    volume.prepare_write_pub();

    let n = plane_normal.normalize_or_zero();
    let mut cols = Mat4::IDENTITY.to_cols_array_2d();
    if n.x.abs() > 0.1 {
        cols[0][0] = 0.0;
        cols[3][0] = plane_point.x;
    }
    if n.y.abs() > 0.1 {
        cols[1][1] = 0.0;
        cols[3][1] = plane_point.y;
    }
    if n.z.abs() > 0.1 {
        cols[2][2] = 0.0;
        cols[3][2] = plane_point.z;
    }
    let proj = Mat4::from_cols_array_2d(&cols);

    volume.insert_chunks_covering(dest_box.grow(1));
    let mut acc = Accessor::new();

    for origin in volume.chunk_origins() {
        volume.fill_chunk(origin, |world| {
            if !dest_box.contains_point(world) {
                return TRANSPARENT;
            }
            let p = proj.transform_point3(world.as_vec3());
            let pi = IVec3::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32);
            src.get_at(pi, &mut acc)
        });
    }
    volume.sweep_empty_chunks();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::chunk_data::CHUNK_SIZE;

    #[test]
    fn move_identity_preserves_every_occupied_voxel() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::new(1, 2, 3), Rgba::new(10, 20, 30, 255), &mut acc);
        mv(&mut v, Mat4::IDENTITY);
        assert_eq!(v.get_at(IVec3::new(1, 2, 3), &mut acc), Rgba::new(10, 20, 30, 255));
    }

    #[test]
    fn move_translate_shifts_content_and_clears_source_cell() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::ZERO, Rgba::new(10, 20, 30, 255), &mut acc);
        let n = CHUNK_SIZE as f32;
        mv(&mut v, Mat4::from_translation(Vec3::new(n, 0.0, 0.0)));
        assert_eq!(
            v.get_at(IVec3::new(CHUNK_SIZE as i32, 0, 0), &mut acc),
            Rgba::new(10, 20, 30, 255)
        );
        assert_eq!(v.get_at(IVec3::ZERO, &mut acc), crate::color::TRANSPARENT);
    }

    #[test]
    fn move_on_empty_volume_is_a_noop() {
        let mut v = Volume::new();
        mv(&mut v, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert!(v.is_empty());
    }

    #[test]
    fn extrude_clears_outside_the_destination_box() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::new(0, 0, 5), Rgba::new(1, 2, 3, 255), &mut acc);
        let box_ = Aabb::new(IVec3::new(-2, -2, -2), IVec3::new(2, 2, 2));
        extrude(&mut v, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), box_);
        assert_eq!(v.get_at(IVec3::new(0, 0, 5), &mut acc), crate::color::TRANSPARENT);
    }

    #[test]
    fn extrude_projects_along_the_plane_normal() {
        let mut v = Volume::new();
        let mut acc = Accessor::new();
        v.set_at(IVec3::new(0, 0, 0), Rgba::new(5, 6, 7, 255), &mut acc);
        let box_ = Aabb::new(IVec3::new(-1, -1, 0), IVec3::new(1, 1, 3));
        extrude(&mut v, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), box_);
        assert_eq!(v.get_at(IVec3::new(0, 0, 2), &mut acc), Rgba::new(5, 6, 7, 255));
    }
}
