use glam::{Mat4, Vec3};

/// Result of pushing a particle out of an ellipsoid.
#[derive(Clone, Copy, Debug)]
pub struct EllipsoidContact {
    /// Corrected entity-space position, just outside the surface.
    pub position: Vec3,
    /// Outward surface normal in entity space (normalized).
    pub normal: Vec3,
}

/// Distance of `point` from the ellipsoid center measured in the
/// ellipsoid's local space and divided by its radius. Values below 1.0 are
/// inside.
#[inline]
pub fn normalized_distance(to_local: &Mat4, radius: f32, point: Vec3) -> f32 {
    to_local.transform_point3(point).length() / radius
}

/// Project `point` onto the ellipsoid surface plus `epsilon` (relative)
/// when it is strictly inside.
///
/// `to_local` maps entity space into the ellipsoid's unit space and
/// `to_entity` is its inverse. In local space the ellipsoid is a sphere of
/// `radius`, so the closest-in-local-space surface point is along the
/// center-to-point ray.
pub fn project_out_of_ellipsoid(
    point: Vec3,
    to_local: &Mat4,
    to_entity: &Mat4,
    radius: f32,
    epsilon: f32,
) -> Option<EllipsoidContact> {
    let local = to_local.transform_point3(point);
    let dist = local.length();
    if !(dist < radius) {
        return None;
    }

    let dir = if dist > 1e-6 { local / dist } else { Vec3::Y };
    let position = to_entity.transform_point3(dir * radius * (1.0 + epsilon));
    // Implicit surface gradient: inverse-transpose of the local-to-entity map.
    let normal = to_local.transpose().transform_vector3(dir).normalize_or_zero();

    Some(EllipsoidContact { position, normal })
}

/// Contact velocity response: remove the inward normal component and scale
/// the tangential component by `1 - friction`.
pub fn contact_velocity(velocity: Vec3, normal: Vec3, friction: f32) -> Vec3 {
    let vn = velocity.dot(normal);
    let normal_part = normal * vn.max(0.0);
    let tangential = velocity - normal * vn;
    normal_part + tangential * (1.0 - friction)
}
