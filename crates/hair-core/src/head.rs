use glam::{Mat4, Quat, Vec3};

use crate::error::{HairError, Result};

/// Floats per interleaved vertex: position then normal.
pub const INTERLEAVED_STRIDE: usize = 6;

/// Imported head geometry in entity space.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl HeadMesh {
    /// Validates that the mesh is non-empty, finite, has one normal per
    /// position, and only whole in-range triangles.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Result<Self> {
        if positions.is_empty() {
            return Err(HairError::AssetLoad("mesh has no vertices".into()));
        }
        if normals.len() != positions.len() {
            return Err(HairError::AssetLoad(format!(
                "{} normals for {} vertices",
                normals.len(),
                positions.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(HairError::AssetLoad(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(HairError::AssetLoad(format!(
                "index {} out of range for {} vertices",
                bad,
                positions.len()
            )));
        }
        if positions.iter().chain(&normals).any(|v| !v.is_finite()) {
            return Err(HairError::AssetLoad("mesh contains non-finite values".into()));
        }
        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    /// From `[px, py, pz, nx, ny, nz]` per vertex.
    pub fn from_interleaved(data: &[f32], indices: Vec<u32>) -> Result<Self> {
        if data.len() % INTERLEAVED_STRIDE != 0 {
            return Err(HairError::AssetLoad(format!(
                "{} floats is not a whole number of vertices",
                data.len()
            )));
        }
        let (positions, normals): (Vec<Vec3>, Vec<Vec3>) = data
            .chunks_exact(INTERLEAVED_STRIDE)
            .map(|v| (Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5])))
            .unzip();
        Self::new(positions, normals, indices)
    }

    /// Placement of the imported head relative to the hair entity: down 3
    /// units, turned to face +Z and upright, scaled to a fifth.
    pub fn placement() -> Mat4 {
        let rotation = Quat::from_rotation_y(180f32.to_radians()) * Quat::from_rotation_x(-90f32.to_radians());
        Mat4::from_scale_rotation_translation(Vec3::splat(0.2), rotation, Vec3::new(0.0, -3.0, 0.0))
    }

    /// Copy with positions transformed by `m` and normals by its
    /// inverse-transpose.
    pub fn transformed(&self, m: Mat4) -> Self {
        let normal_matrix = m.inverse().transpose();
        Self {
            positions: self.positions.iter().map(|p| m.transform_point3(*p)).collect(),
            normals: self
                .normals
                .iter()
                .map(|n| normal_matrix.transform_vector3(*n).normalize_or_zero())
                .collect(),
            indices: self.indices.clone(),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}
