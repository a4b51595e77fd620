//! Connected-component selection: a 6-neighbor flood fill driven by a
//! caller-supplied predicate, writing a mask volume rather than mutating the
//! source.

use glam::IVec3;

use crate::color::Rgba;
use crate::faces::FACES_NORMALS;
use crate::volume::{Accessor, Volume};

/// Flood-fills `out_mask` starting from `seed`, growing into each
/// face-neighbor `q` of the current mask for which `predicate` returns a
/// non-zero alpha. `predicate` receives `volume`'s sample at `q`, the six
/// face-neighbor samples of `volume` around `q`, and the six face-neighbor
/// mask alphas around `q` — enough context for "same color", "any opaque
/// neighbor", or similar connectivity rules.
///
/// Deliberately simple (re-scans the whole current mask every pass) rather
/// than maintaining an explicit frontier queue; the source this is ported
/// from makes the same trade and documents it as such. Always returns `0`;
/// the `i32` return is reserved for a future status code.
pub fn select<F>(volume: &Volume, seed: IVec3, mut predicate: F, out_mask: &mut Volume) -> i32
where
    F: FnMut(Rgba, [Rgba; 6], [u8; 6]) -> u8,
{
    out_mask.clear();
    let mut mask_acc = Accessor::new();
    let mut vol_acc = Accessor::new();
    out_mask.set_at(seed, Rgba::new(255, 255, 255, 255), &mut mask_acc);

    loop {
        let frontier: Vec<IVec3> = out_mask
            .iter_voxels()
            .filter(|(_, c)| c.a != 0)
            .map(|(p, _)| p)
            .collect();

        let mut progressed = false;
        for pos in frontier {
            for face in FACES_NORMALS {
                let q = pos + face;
                if out_mask.get_alpha_at(q, &mut mask_acc) != 0 {
                    continue;
                }
                let v = volume.get_at(q, &mut vol_acc);
                let mut neighbors = [Rgba::default(); 6];
                let mut mask_vals = [0u8; 6];
                for (j, &fj) in FACES_NORMALS.iter().enumerate() {
                    let q2 = q + fj;
                    neighbors[j] = volume.get_at(q2, &mut vol_acc);
                    mask_vals[j] = out_mask.get_alpha_at(q2, &mut mask_acc);
                }
                let a = predicate(v, neighbors, mask_vals);
                if a != 0 {
                    out_mask.set_at(q, Rgba::new(255, 255, 255, a), &mut mask_acc);
                    progressed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }

    0
}
