//! Sample-wise combination of two volumes (as opposed to [`crate::painter`],
//! which combines an analytic shape with one volume).

use crate::painter::Mode;
use crate::volume::Volume;

/// Combines `src` into `dst` under `mode`, chunk by chunk. For constructive
/// modes (`OVER`, `MAX`), `dst` gains a chunk at every origin `src` has one;
/// destructive modes only ever touch chunks `dst` already has.
pub fn merge(dst: &mut Volume, src: &Volume, mode: Mode) {
    dst.prepare_write_pub();

    if mode.is_constructive() {
        for origin in src.chunk_origins() {
            dst.ensure_chunk(origin);
        }
    }

    let mut to_delete = Vec::new();
    for origin in dst.chunk_origins() {
        let src_data = src.chunk_data_at(origin);
        let src_empty = src_data.as_deref().map(|d| d.is_empty(true)).unwrap_or(true);
        let dst_empty = dst.chunk_is_empty_fast(origin);

        let drop_chunk = (dst_empty && src_empty) || (mode == Mode::MultAlpha && src_empty);
        if drop_chunk {
            to_delete.push(origin);
            continue;
        }
        dst.merge_chunk(origin, src_data.as_deref(), mode);
    }

    for origin in to_delete {
        dst.remove_chunk(origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::volume::Accessor;
    use glam::IVec3;

    #[test]
    fn over_merge_is_constructive_across_both_volumes() {
        let mut dst = Volume::new();
        let mut src = Volume::new();
        let mut acc = Accessor::new();
        src.set_at(IVec3::new(100, 0, 0), Rgba::new(1, 2, 3, 255), &mut acc);
        merge(&mut dst, &src, Mode::Over);
        assert_eq!(dst.get_at(IVec3::new(100, 0, 0), &mut acc), Rgba::new(1, 2, 3, 255));
    }

    #[test]
    fn destructive_merge_never_adds_chunks_dst_lacks() {
        let mut dst = Volume::new();
        let mut src = Volume::new();
        let mut acc = Accessor::new();
        src.set_at(IVec3::new(100, 0, 0), Rgba::new(1, 2, 3, 255), &mut acc);
        merge(&mut dst, &src, Mode::Sub);
        assert!(dst.is_empty());
    }

    #[test]
    fn mult_alpha_drops_dst_chunk_when_src_side_is_empty() {
        let mut dst = Volume::new();
        let src = Volume::new();
        let mut acc = Accessor::new();
        dst.set_at(IVec3::ZERO, Rgba::new(1, 2, 3, 255), &mut acc);
        merge(&mut dst, &src, Mode::MultAlpha);
        assert!(dst.is_empty());
    }

    #[test]
    fn over_merge_composites_onto_existing_content() {
        let mut dst = Volume::new();
        let mut src = Volume::new();
        let mut acc = Accessor::new();
        dst.set_at(IVec3::ZERO, Rgba::new(10, 10, 10, 255), &mut acc);
        src.set_at(IVec3::ZERO, Rgba::new(200, 0, 0, 255), &mut acc);
        merge(&mut dst, &src, Mode::Over);
        assert_eq!(dst.get_at(IVec3::ZERO, &mut acc), Rgba::new(200, 0, 0, 255));
    }
}
