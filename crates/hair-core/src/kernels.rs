//! Per-invocation bodies of the three compute stages.

use glam::Vec3;

use crate::constraints::ellipsoid::{contact_velocity, project_out_of_ellipsoid};
use crate::constraints::follow::solve_follow_the_leader;
use crate::constraints::volume::volume_response;
use crate::program::ProgramParams;
use crate::volume::VolumeBindings;

/// Stage 0, one invocation per strand.
///
/// Semi-implicit Euler on every distal particle (`v += a*dt; p += v*dt`),
/// then the follow-the-leader pass from the scalp-attached root, then a
/// position-based velocity update so the constraint's correction is not
/// fed back as energy next frame. The root never moves.
pub fn integrate_strand(positions: &mut [Vec3], velocities: &mut [Vec3], params: &ProgramParams, acceleration: Vec3) {
    let dt = params.delta_time;
    if !(dt > 0.0) || positions.is_empty() {
        return;
    }

    velocities[0] = Vec3::ZERO;
    for j in 1..positions.len() {
        let start = positions[j];
        let vel = velocities[j] + acceleration * dt;
        positions[j] = start + vel * dt;
        // Park the start position until the constraint has run.
        velocities[j] = start;
    }

    solve_follow_the_leader(positions, params.segment_length, params.curl_radius);

    let inv_dt = 1.0 / dt;
    for j in 1..positions.len() {
        velocities[j] = (positions[j] - velocities[j]) * inv_dt;
    }
}

/// Stage 1, one invocation per particle.
#[inline]
pub fn accumulate_particle(volume: &VolumeBindings, position: Vec3, velocity: Vec3) {
    volume.grid.accumulate(position, velocity);
}

/// Stage 2, one invocation per particle.
///
/// Volume friction and repulsion, then projection out of every collision
/// proxy, then damping and the speed cap. Roots only have their velocity
/// cleared. Non-finite results are discarded rather than written back.
pub fn resolve_particle(
    is_root: bool,
    position: &mut Vec3,
    velocity: &mut Vec3,
    volume: &VolumeBindings,
    params: &ProgramParams,
) {
    if is_root {
        *velocity = Vec3::ZERO;
        return;
    }

    let physics = &params.physics;
    let mut vel = volume_response(
        volume.grid,
        *position,
        *velocity,
        physics.friction,
        physics.density_threshold,
        physics.repulsion,
    );

    let mut pos = *position;
    for (to_local, to_entity) in params.proxy_spaces() {
        if let Some(contact) = project_out_of_ellipsoid(
            pos,
            to_local,
            to_entity,
            params.proxy_radius(),
            physics.collision_epsilon,
        ) {
            pos = contact.position;
            vel = contact_velocity(vel, contact.normal, physics.friction);
        }
    }

    vel = (vel * physics.velocity_damping).clamp_length_max(physics.max_speed);

    if pos.is_finite() {
        *position = pos;
    }
    *velocity = if vel.is_finite() { vel } else { Vec3::ZERO };
}
