use glam::Vec3;

use crate::math::smoothstep;
use crate::volume::VolumeGrid;

/// Volume response for one particle.
///
/// Blends the velocity toward the node's mean velocity by `friction` (hair
/// moving as a coherent mass), then, where the node density exceeds
/// `density_threshold`, adds a push down the density gradient that ramps
/// up to `repulsion` at four times the threshold. Particles outside the
/// lattice or in empty nodes keep their velocity.
///
/// Reference: "Volumetric Methods for Simulation and Rendering of Hair",
/// Petrovic, Henne & Anderson, 2005
pub fn volume_response(
    grid: &VolumeGrid,
    position: Vec3,
    velocity: Vec3,
    friction: f32,
    density_threshold: f32,
    repulsion: f32,
) -> Vec3 {
    let Some(node) = grid.node_coords(position) else {
        return velocity;
    };
    let idx = VolumeGrid::node_index(node);
    let density = grid.density_at(idx);
    if density <= 0 {
        return velocity;
    }

    let mut v = velocity.lerp(grid.average_velocity(idx), friction);

    let density = density as f32;
    if density > density_threshold {
        let excess = smoothstep(density_threshold, density_threshold * 4.0, density);
        let push = -grid.density_gradient(node).normalize_or_zero();
        v += push * repulsion * excess;
    }
    v
}
