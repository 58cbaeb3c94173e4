//! Ellipsoid collision proxies approximating the head mesh.

use glam::{Mat4, Vec3};

use crate::transform::Transform;

/// Number of ellipsoids in the head-fitting configuration.
pub const HEAD_PROXY_COUNT: usize = 7;

/// Base radius of the unit ellipsoid before per-proxy scaling.
pub const DEFAULT_ELLIPSOID_RADIUS: f32 = 0.5;

/// Hand-authored placement of one ellipsoid relative to its owning entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EllipsoidSpec {
    pub translation: Vec3,
    /// Rotations in degrees about X, then Y, then Z.
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
}

impl EllipsoidSpec {
    pub const fn new(translation: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation_degrees,
            scale,
        }
    }

    /// Local transform of the ellipsoid in entity space.
    pub fn local_transform(&self) -> Mat4 {
        let mut t = Transform::new();
        t.translate(self.translation)
            .rotate(self.rotation_degrees.x, Vec3::X)
            .rotate(self.rotation_degrees.y, Vec3::Y)
            .rotate(self.rotation_degrees.z, Vec3::Z)
            .scale(self.scale);
        t.matrix()
    }
}

/// Ellipsoids fitted to the reference head: cheeks, cranium, nose, face, jaw, skull.
pub const HEAD_ELLIPSOIDS: [EllipsoidSpec; HEAD_PROXY_COUNT] = [
    EllipsoidSpec::new(
        Vec3::new(-1.149691, -0.971486, 0.240179),
        Vec3::new(-20.0, 10.0, 10.0),
        Vec3::new(0.321661, 0.794607, 0.595070),
    ),
    EllipsoidSpec::new(
        Vec3::new(1.149691, -0.971486, 0.240179),
        Vec3::new(-20.0, -10.0, -10.0),
        Vec3::new(0.321661, 0.794607, 0.595070),
    ),
    EllipsoidSpec::new(
        Vec3::new(0.0, -0.388153, 0.191956),
        Vec3::ZERO,
        Vec3::new(2.368103, 2.519852, 2.818405),
    ),
    EllipsoidSpec::new(
        Vec3::new(0.0, -1.074509, 1.604706),
        Vec3::new(-20.0, 0.0, 0.0),
        Vec3::new(0.559738, 0.620941, 0.421112),
    ),
    EllipsoidSpec::new(
        Vec3::new(0.0, -0.717041, 0.566460),
        Vec3::new(-30.0, 0.0, 0.0),
        Vec3::new(2.058214, 3.539791, 1.799336),
    ),
    EllipsoidSpec::new(
        Vec3::new(0.0, -2.556824, -0.068329),
        Vec3::new(20.0, 0.0, 0.0),
        Vec3::new(1.798798, 1.282593, 1.661377),
    ),
    EllipsoidSpec::new(
        Vec3::new(-0.015701, -1.032532, 0.122619),
        Vec3::ZERO,
        Vec3::new(2.357361, 3.127426, 2.326767),
    ),
];

/// Fixed set of ellipsoids owned by the hair entity.
///
/// Local transforms are computed once at construction. World-space
/// transforms are recomposed from the entity transform every frame and
/// never cached.
#[derive(Clone, Debug)]
pub struct CollisionProxySet {
    local: Vec<Mat4>,
    local_inverse: Vec<Mat4>,
    radius: f32,
}

impl CollisionProxySet {
    pub fn new(specs: &[EllipsoidSpec], radius: f32) -> Self {
        let local: Vec<Mat4> = specs.iter().map(EllipsoidSpec::local_transform).collect();
        let local_inverse = local.iter().map(Mat4::inverse).collect();
        Self {
            local,
            local_inverse,
            radius,
        }
    }

    /// The reference head fit.
    pub fn head(radius: f32) -> Self {
        Self::new(&HEAD_ELLIPSOIDS, radius)
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn local_transforms(&self) -> &[Mat4] {
        &self.local
    }

    /// `world * local` for every ellipsoid.
    pub fn composed_transforms(&self, world: Mat4) -> Vec<Mat4> {
        self.local.iter().map(|local| world * *local).collect()
    }

    /// Writes `world * local` into `out` without allocating.
    /// Only `min(out.len(), self.len())` entries are written.
    pub fn compose_into(&self, world: Mat4, out: &mut [Mat4]) {
        for (dst, local) in out.iter_mut().zip(&self.local) {
            *dst = world * *local;
        }
    }

    /// Whether an entity-space point lies strictly inside any ellipsoid.
    pub fn contains(&self, point: Vec3) -> bool {
        self.local_inverse
            .iter()
            .any(|inv| inv.transform_point3(point).length() < self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_has_seven_proxies() {
        let set = CollisionProxySet::head(DEFAULT_ELLIPSOID_RADIUS);
        assert_eq!(set.len(), HEAD_PROXY_COUNT);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_spec_translation_lands_in_matrix() {
        let spec = HEAD_ELLIPSOIDS[3];
        let m = spec.local_transform();
        assert!((m.w_axis.truncate() - spec.translation).length() < 1e-6);
    }

    #[test]
    fn test_skull_center_is_inside() {
        let set = CollisionProxySet::head(DEFAULT_ELLIPSOID_RADIUS);
        assert!(set.contains(HEAD_ELLIPSOIDS[6].translation));
        assert!(!set.contains(Vec3::new(0.0, 10.0, 0.0)));
    }
}
