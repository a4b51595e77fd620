//! The six face-neighbor directions used by [`crate::selector`].

use glam::IVec3;

/// Unit integer offsets to each of a voxel's six face-adjacent neighbors.
/// Order is not a correctness contract (the selector treats all six
/// symmetrically) but is kept stable for deterministic test output.
pub const FACES_NORMALS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_are_unit_vectors_on_distinct_axes() {
        for f in FACES_NORMALS {
            assert_eq!(f.abs().element_sum(), 1);
        }
    }

    #[test]
    fn faces_come_in_opposite_pairs() {
        let sum: IVec3 = FACES_NORMALS.iter().copied().sum();
        assert_eq!(sum, IVec3::ZERO);
    }
}
