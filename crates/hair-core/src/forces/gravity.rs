use glam::{Mat4, Vec3};

/// World-space gravity (`gravity` along Y) expressed in the entity space
/// described by `model`.
///
/// Particles live in entity space, so a scaled or rotated entity sees a
/// correspondingly transformed gravity vector. A singular `model` yields
/// the untransformed vector.
pub fn model_space_gravity(gravity: f32, model: &Mat4) -> Vec3 {
    let world = Vec3::new(0.0, gravity, 0.0);
    let det = model.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return world;
    }
    model.inverse().transform_vector3(world)
}
