//! Analytic shapes sampled by the painter. Shapes are a closed, tagged
//! variant rather than a trait-object hierarchy — the painter only ever
//! needs to pattern-match on `Shape::Cube` for its SUB fast path, and the
//! `Custom` variant covers everything an external collaborator might want
//! without the core needing to know its concrete type.

use std::fmt;
use std::rc::Rc;

use glam::Vec3;

/// An analytic shape, sampled in its own canonical local space (the space a
/// [`crate::bbox::BrushBox`]'s matrix maps `[-1,1]^3` into).
#[derive(Clone)]
pub enum Shape {
    /// The unit cube `[-1,1]^3`.
    Cube,
    /// The unit sphere (radius 1, centered at the origin).
    Sphere,
    /// The unit cylinder: radius 1 in XY, extent `[-1,1]` along Z.
    Cylinder,
    /// A caller-supplied shape. Opaque to the painter beyond `sample`.
    Custom(Rc<dyn Fn(Vec3, f32) -> f32>),
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Cube => write!(f, "Shape::Cube"),
            Shape::Sphere => write!(f, "Shape::Sphere"),
            Shape::Cylinder => write!(f, "Shape::Cylinder"),
            Shape::Custom(_) => write!(f, "Shape::Custom(..)"),
        }
    }
}

impl Shape {
    /// Returns the brush's occupancy at `local_point`, in `[0,1]`. `smoothness`
    /// softens the edge falloff, expressed in the same local-space units as
    /// `local_point` (a caller converts world-space smoothness down by the
    /// box's scale before calling this).
    pub fn sample(&self, local_point: Vec3, smoothness: f32) -> f32 {
        match self {
            Shape::Cube => sample_cube(local_point, smoothness),
            Shape::Sphere => sample_sphere(local_point, smoothness),
            Shape::Cylinder => sample_cylinder(local_point, smoothness),
            Shape::Custom(f) => f(local_point, smoothness).clamp(0.0, 1.0),
        }
    }

    pub fn is_cube(&self) -> bool {
        matches!(self, Shape::Cube)
    }
}

/// Maps a signed distance (negative = inside) to an occupancy in `[0,1]`,
/// with a `smoothness`-wide linear ramp straddling the surface.
fn falloff(signed_distance: f32, smoothness: f32) -> f32 {
    if smoothness <= 0.0 {
        return if signed_distance <= 0.0 { 1.0 } else { 0.0 };
    }
    (0.5 - signed_distance / smoothness).clamp(0.0, 1.0)
}

fn sample_cube(p: Vec3, smoothness: f32) -> f32 {
    let d = p.abs().max_element() - 1.0;
    falloff(d, smoothness)
}

fn sample_sphere(p: Vec3, smoothness: f32) -> f32 {
    let d = p.length() - 1.0;
    falloff(d, smoothness)
}

fn sample_cylinder(p: Vec3, smoothness: f32) -> f32 {
    let radial = Vec3::new(p.x, p.y, 0.0).length() - 1.0;
    let cap = p.z.abs() - 1.0;
    let d = radial.max(cap);
    falloff(d, smoothness)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_center_is_fully_occupied() {
        assert_eq!(Shape::Cube.sample(Vec3::ZERO, 0.0), 1.0);
    }

    #[test]
    fn cube_outside_is_empty() {
        assert_eq!(Shape::Cube.sample(Vec3::splat(2.0), 0.0), 0.0);
    }

    #[test]
    fn cube_surface_without_smoothness_is_occupied() {
        // Hard edge: exactly on the boundary counts as inside.
        assert_eq!(Shape::Cube.sample(Vec3::new(1.0, 0.0, 0.0), 0.0), 1.0);
    }

    #[test]
    fn sphere_center_is_fully_occupied() {
        assert_eq!(Shape::Sphere.sample(Vec3::ZERO, 0.0), 1.0);
    }

    #[test]
    fn sphere_outside_unit_radius_is_empty() {
        assert_eq!(Shape::Sphere.sample(Vec3::new(1.5, 0.0, 0.0), 0.0), 0.0);
    }

    #[test]
    fn smoothness_widens_the_transition_band() {
        // Just past the surface, a smooth brush still has partial occupancy
        // where a hard one would already read zero.
        let hard = Shape::Sphere.sample(Vec3::new(1.1, 0.0, 0.0), 0.0);
        let smooth = Shape::Sphere.sample(Vec3::new(1.1, 0.0, 0.0), 1.0);
        assert_eq!(hard, 0.0);
        assert!(smooth > 0.0);
    }

    #[test]
    fn cylinder_respects_radius_and_height() {
        assert_eq!(Shape::Cylinder.sample(Vec3::new(0.0, 0.0, 0.0), 0.0), 1.0);
        assert_eq!(Shape::Cylinder.sample(Vec3::new(1.5, 0.0, 0.0), 0.0), 0.0);
        assert_eq!(Shape::Cylinder.sample(Vec3::new(0.0, 0.0, 1.5), 0.0), 0.0);
    }

    #[test]
    fn custom_shape_is_invoked() {
        let shape = Shape::Custom(Rc::new(|p: Vec3, _s: f32| if p.x > 0.0 { 1.0 } else { 0.0 }));
        assert_eq!(shape.sample(Vec3::new(1.0, 0.0, 0.0), 0.0), 1.0);
        assert_eq!(shape.sample(Vec3::new(-1.0, 0.0, 0.0), 0.0), 0.0);
    }

    #[test]
    fn is_cube_only_true_for_cube_variant() {
        assert!(Shape::Cube.is_cube());
        assert!(!Shape::Sphere.is_cube());
    }
}
