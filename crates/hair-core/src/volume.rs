use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};

use glam::Vec3;

/// Lattice nodes per axis (10 voxels, 11 nodes).
pub const VOLUME_RESOLUTION: usize = 11;

/// Total lattice nodes.
pub const VOLUME_NODES: usize = VOLUME_RESOLUTION * VOLUME_RESOLUTION * VOLUME_RESOLUTION;

/// Entity-space corner of the region covered by the lattice.
pub const VOLUME_ORIGIN: Vec3 = Vec3::new(-4.0, -7.0, -4.0);

/// Edge length of the cubic region covered by the lattice.
pub const VOLUME_EXTENT: f32 = 8.0;

/// Velocity sums are accumulated as integers scaled by this factor.
pub const VELOCITY_FIXED_POINT_SCALE: f32 = 100.0;

/// Per-particle velocity contributions are clamped to this magnitude. With
/// 64-bit sums a node holding every particle of a full store stays far from
/// overflow (`i32::MAX` particles at `1e6` each is below `i64::MAX`).
const MAX_CONTRIBUTION: f32 = 1.0e4;

/// Coarse density/velocity lattice for the self-collision approximation.
///
/// Accumulation goes through atomic integer adds so any number of
/// invocations can write concurrently in any order. The voxel-to-entity
/// mapping is fixed: `VOLUME_ORIGIN + node * cell_size`.
pub struct VolumeGrid {
    cell_size: f32,
    inv_cell_size: f32,
    density: Vec<AtomicI32>,
    /// Three components per node, fixed point.
    velocity: Vec<AtomicI64>,
}

/// Volume buffers exposed to the compute stages.
pub struct VolumeBindings<'a> {
    pub grid: &'a VolumeGrid,
}

impl VolumeBindings<'_> {
    pub const DENSITY_SLOT: u32 = 2;
    pub const VELOCITY_SLOT: u32 = 3;
}

impl Default for VolumeGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeGrid {
    pub fn new() -> Self {
        let cell_size = VOLUME_EXTENT / (VOLUME_RESOLUTION - 1) as f32;
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            density: (0..VOLUME_NODES).map(|_| AtomicI32::new(0)).collect(),
            velocity: (0..VOLUME_NODES * 3).map(|_| AtomicI64::new(0)).collect(),
        }
    }

    /// Zero every density and velocity-sum node.
    pub fn reset(&mut self) {
        for v in self.density.iter_mut() {
            *v.get_mut() = 0;
        }
        for v in self.velocity.iter_mut() {
            *v.get_mut() = 0;
        }
    }

    pub fn bind_for_compute(&self) -> VolumeBindings<'_> {
        VolumeBindings { grid: self }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Nearest lattice node of an entity-space position, or `None` outside the lattice.
    #[inline]
    pub fn node_coords(&self, pos: Vec3) -> Option<[usize; 3]> {
        let g = (pos - VOLUME_ORIGIN) * self.inv_cell_size;
        let max = (VOLUME_RESOLUTION - 1) as f32 + 0.5;
        if !(g.is_finite() && g.cmpge(Vec3::splat(-0.5)).all() && g.cmplt(Vec3::splat(max)).all()) {
            return None;
        }
        let r = g.round();
        Some([
            (r.x as usize).min(VOLUME_RESOLUTION - 1),
            (r.y as usize).min(VOLUME_RESOLUTION - 1),
            (r.z as usize).min(VOLUME_RESOLUTION - 1),
        ])
    }

    #[inline]
    pub fn node_index(node: [usize; 3]) -> usize {
        (node[2] * VOLUME_RESOLUTION + node[1]) * VOLUME_RESOLUTION + node[0]
    }

    /// Entity-space position of a lattice node.
    pub fn node_position(&self, node: [usize; 3]) -> Vec3 {
        VOLUME_ORIGIN + Vec3::new(node[0] as f32, node[1] as f32, node[2] as f32) * self.cell_size
    }

    /// Add one particle to its nearest node. Returns false when the
    /// particle lies outside the lattice.
    pub fn accumulate(&self, pos: Vec3, vel: Vec3) -> bool {
        let Some(node) = self.node_coords(pos) else {
            return false;
        };
        let idx = Self::node_index(node);
        self.density[idx].fetch_add(1, Ordering::Relaxed);

        let vel = if vel.is_finite() {
            vel.clamp_length_max(MAX_CONTRIBUTION)
        } else {
            Vec3::ZERO
        };
        let fixed = vel * VELOCITY_FIXED_POINT_SCALE;
        self.velocity[idx * 3].fetch_add(fixed.x.round() as i64, Ordering::Relaxed);
        self.velocity[idx * 3 + 1].fetch_add(fixed.y.round() as i64, Ordering::Relaxed);
        self.velocity[idx * 3 + 2].fetch_add(fixed.z.round() as i64, Ordering::Relaxed);
        true
    }

    pub fn density_at(&self, idx: usize) -> i32 {
        self.density[idx].load(Ordering::Relaxed)
    }

    /// Accumulated velocity sum of a node, in entity-space units.
    pub fn velocity_sum_at(&self, idx: usize) -> Vec3 {
        let scale = VELOCITY_FIXED_POINT_SCALE as f64;
        let component = |c: usize| (self.velocity[idx * 3 + c].load(Ordering::Relaxed) as f64 / scale) as f32;
        Vec3::new(component(0), component(1), component(2))
    }

    /// Mean velocity of the particles in a node, zero for an empty node.
    pub fn average_velocity(&self, idx: usize) -> Vec3 {
        let density = self.density_at(idx);
        if density <= 0 {
            return Vec3::ZERO;
        }
        self.velocity_sum_at(idx) / density as f32
    }

    /// Density gradient at a node by central differences, one-sided at the
    /// lattice boundary.
    pub fn density_gradient(&self, node: [usize; 3]) -> Vec3 {
        let mut grad = [0.0_f32; 3];
        for (axis, g) in grad.iter_mut().enumerate() {
            let lo = node[axis].saturating_sub(1);
            let hi = (node[axis] + 1).min(VOLUME_RESOLUTION - 1);
            if hi == lo {
                continue;
            }
            let mut a = node;
            let mut b = node;
            a[axis] = lo;
            b[axis] = hi;
            let d_lo = self.density_at(Self::node_index(a)) as f32;
            let d_hi = self.density_at(Self::node_index(b)) as f32;
            *g = (d_hi - d_lo) / ((hi - lo) as f32 * self.cell_size);
        }
        Vec3::from_array(grad)
    }

    /// Sum of all node densities.
    pub fn total_density(&self) -> i64 {
        self.density.iter().map(|d| d.load(Ordering::Relaxed) as i64).sum()
    }

    /// Whether every density and velocity-sum node is zero.
    pub fn is_clear(&self) -> bool {
        self.density.iter().all(|d| d.load(Ordering::Relaxed) == 0)
            && self.velocity.iter().all(|v| v.load(Ordering::Relaxed) == 0)
    }
}
