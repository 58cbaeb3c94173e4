use glam::{Mat4, Quat, Vec3};

/// Translation, accumulated rotation and non-uniform scale of an entity.
///
/// The matrix is `T * R * S` and is rebuilt on every mutation, so
/// [`Transform::matrix`] is always current.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the translation.
    pub fn translate(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self.rebuild()
    }

    /// Post-multiply the current rotation by `degrees` about `axis`.
    /// A zero axis leaves the rotation unchanged.
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) -> &mut Self {
        let axis = axis.normalize_or_zero();
        if axis != Vec3::ZERO {
            self.rotation = (self.rotation * Quat::from_axis_angle(axis, degrees.to_radians())).normalize();
        }
        self.rebuild()
    }

    /// Replace the accumulated rotation.
    pub fn set_rotation(&mut self, rotation: Quat) -> &mut Self {
        self.rotation = rotation.normalize();
        self.rebuild()
    }

    /// Replace the scale.
    pub fn scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self.rebuild()
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale_vector(&self) -> Vec3 {
        self.scale
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    fn rebuild(&mut self) -> &mut Self {
        self.matrix = Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self
    }
}
