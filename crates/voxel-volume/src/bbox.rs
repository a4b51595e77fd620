//! Box types used by the painter: an oriented `BrushBox` (an affine map from
//! the canonical `[-1,1]^3` cube into world space) and an axis-aligned integer
//! `Aabb` used for chunk bounds and clip regions.

use glam::{IVec3, Mat4, Vec3};

/// An oriented box, represented the way the source stores it: the matrix's
/// first three columns are the box's half-extent axes (direction *and*
/// length), the fourth is the center. Sampling a `Shape` against a `BrushBox`
/// means mapping a world point through `mat.inverse()` into the canonical
/// `[-1,1]^3` cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushBox {
    pub mat: Mat4,
}

impl BrushBox {
    /// A box centered at `center` with the given half-extents along the
    /// world axes (no rotation).
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let mat = Mat4::from_cols(
            (half_extents.x, 0.0, 0.0, 0.0).into(),
            (0.0, half_extents.y, 0.0, 0.0).into(),
            (0.0, 0.0, half_extents.z, 0.0).into(),
            (center.x, center.y, center.z, 1.0).into(),
        );
        Self { mat }
    }

    pub fn center(&self) -> Vec3 {
        self.mat.col(3).truncate()
    }

    fn axis(&self, i: usize) -> Vec3 {
        self.mat.col(i).truncate()
    }

    /// Grows the box by `amount` world units along each of its own (possibly
    /// rotated) local axes, keeping the center fixed. Degenerate (zero-length)
    /// axes are left untouched — there is no direction to grow them in.
    pub fn grow(&self, amount: f32) -> Self {
        if amount == 0.0 {
            return *self;
        }
        let grow_axis = |axis: Vec3| -> Vec3 {
            let len = axis.length();
            if len <= f32::EPSILON {
                axis
            } else {
                axis * ((len + amount) / len)
            }
        };
        let mat = Mat4::from_cols(
            grow_axis(self.axis(0)).extend(0.0),
            grow_axis(self.axis(1)).extend(0.0),
            grow_axis(self.axis(2)).extend(0.0),
            self.mat.col(3),
        );
        Self { mat }
    }

    /// The world-space axis-aligned box tightly enclosing this (possibly
    /// rotated) oriented box.
    pub fn world_aabb(&self) -> AabbF {
        let half = Vec3::new(
            self.axis(0).abs().x + self.axis(1).abs().x + self.axis(2).abs().x,
            self.axis(0).abs().y + self.axis(1).abs().y + self.axis(2).abs().y,
            self.axis(0).abs().z + self.axis(1).abs().z + self.axis(2).abs().z,
        );
        let c = self.center();
        AabbF {
            min: c - half,
            max: c + half,
        }
    }

    /// `true` if every corner of `other` lies within this box's canonical
    /// `[-1,1]^3` local space. Used by the painter's cube/SUB fast path.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        let Some(inv) = self.mat.inverse_checked() else {
            return false;
        };
        for corner in other.corners() {
            let local = inv.transform_point3(corner);
            if local.x.abs() > 1.0 || local.y.abs() > 1.0 || local.z.abs() > 1.0 {
                return false;
            }
        }
        true
    }

    /// Converts a world-space smoothness radius into this box's local-space
    /// units, using the average length of its three (possibly unequal) axes.
    /// Shapes sample in local space, so a world-space falloff width has to be
    /// scaled down by however much this box's matrix stretches the unit cube.
    pub fn local_smoothness(&self, world_smoothness: f32) -> f32 {
        let scale = (self.axis(0).length() + self.axis(1).length() + self.axis(2).length()) / 3.0;
        if scale <= f32::EPSILON {
            world_smoothness
        } else {
            world_smoothness / scale
        }
    }

    /// Composes a reflection across world axis `axis` (0=x, 1=y, 2=z) with
    /// this box, applied in world space (i.e. to the left): the returned box
    /// is this box mirrored through the origin along that axis.
    pub fn reflected(&self, axis: usize) -> Self {
        let mut scale = Vec3::ONE;
        match axis {
            0 => scale.x = -1.0,
            1 => scale.y = -1.0,
            2 => scale.z = -1.0,
            _ => unreachable!("axis index must be 0, 1, or 2"),
        }
        let reflect = Mat4::from_scale(scale);
        Self {
            mat: reflect * self.mat,
        }
    }
}

/// A float-valued axis-aligned box, the intermediate form produced while
/// growing/bounding a [`BrushBox`] before it's snapped to whole voxels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AabbF {
    pub min: Vec3,
    pub max: Vec3,
}

impl AabbF {
    /// Snaps outward to the chunk grid: floor/ceil to the nearest voxel, then
    /// the caller further aligns to chunk origins as needed.
    pub fn round_out(&self) -> Aabb {
        Aabb {
            min: IVec3::new(
                self.min.x.floor() as i32,
                self.min.y.floor() as i32,
                self.min.z.floor() as i32,
            ),
            max: IVec3::new(
                self.max.x.ceil() as i32,
                self.max.y.ceil() as i32,
                self.max.z.ceil() as i32,
            ),
        }
    }
}

/// Axis-aligned integer box, half-open on the max corner: it covers voxels
/// `[min, max)` in every axis. `None` (the null box) is represented as
/// `Option<Aabb>` throughout this crate rather than as a sentinel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aabb {
    pub min: IVec3,
    pub max: IVec3,
}

impl Aabb {
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    pub fn from_point(p: IVec3) -> Self {
        Self {
            min: p,
            max: p + IVec3::ONE,
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min.as_vec3(), self.max.as_vec3());
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }

    pub fn is_degenerate(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    pub fn contains_point(&self, p: IVec3) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && p.z >= self.min.z
            && p.z < self.max.z
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        let b = Aabb { min, max };
        if b.is_degenerate() { None } else { Some(b) }
    }

    pub fn union(a: Option<Aabb>, b: Option<Aabb>) -> Option<Aabb> {
        match (a, b) {
            (None, b) => b,
            (a, None) => a,
            (Some(a), Some(b)) => Some(Aabb {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            }),
        }
    }

    pub fn grow(&self, amount: i32) -> Aabb {
        Aabb {
            min: self.min - IVec3::splat(amount),
            max: self.max + IVec3::splat(amount),
        }
    }

    /// Expands outward so every bound is a multiple of `n` (the chunk size).
    pub fn align_to(&self, n: i32) -> Aabb {
        let align_down = |v: i32| v - v.rem_euclid(n);
        let align_up = |v: i32| {
            let r = v.rem_euclid(n);
            if r == 0 { v } else { v + (n - r) }
        };
        Aabb {
            min: IVec3::new(align_down(self.min.x), align_down(self.min.y), align_down(self.min.z)),
            max: IVec3::new(align_up(self.max.x), align_up(self.max.y), align_up(self.max.z)),
        }
    }
}
