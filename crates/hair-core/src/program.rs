//! The linked hair compute program and its typed parameter table.

use glam::{Mat4, Vec3};
use tracing::debug;

use crate::config::PhysicsParams;
use crate::device::ComputeDevice;
use crate::error::{HairError, Result};
use crate::forces::gravity::model_space_gravity;
use crate::forces::wind::wind_acceleration;
use crate::kernels;
use crate::math::group_count;
use crate::particle::{ParticleBindings, ParticleStore};
use crate::proxy::CollisionProxySet;
use crate::volume::VolumeGrid;

/// Upper bound on collision proxies a program accepts.
pub const MAX_PROXIES: usize = 16;

/// Which stage a dispatch runs. Written before every dispatch.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// One invocation per strand.
    LeaderIntegration = 0,
    /// One invocation per particle.
    VolumeAccumulation = 1,
    /// One invocation per particle.
    Resolution = 2,
}

impl Phase {
    pub const ALL: [Phase; 3] = [
        Phase::LeaderIntegration,
        Phase::VolumeAccumulation,
        Phase::Resolution,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Phase::LeaderIntegration),
            1 => Some(Phase::VolumeAccumulation),
            2 => Some(Phase::Resolution),
            _ => None,
        }
    }

    /// Work items for this phase given the live strand count.
    pub fn work_count(self, strand_count: u32, particles_per_strand: u32) -> u32 {
        match self {
            Phase::LeaderIntegration => strand_count,
            Phase::VolumeAccumulation | Phase::Resolution => strand_count * particles_per_strand,
        }
    }
}

/// Typed parameter table of the program, resolved at link time.
///
/// Derived values (inverses, model-space forces) are refreshed by the
/// setters so invocations never recompute them.
#[derive(Clone, Debug)]
pub struct ProgramParams {
    pub phase: Phase,
    pub strand_count: u32,
    pub particles_per_strand: u32,
    pub segment_length: f32,
    pub curl_radius: f32,
    pub delta_time: f32,
    pub running_time: f32,
    pub physics: PhysicsParams,
    model: Mat4,
    /// World-space proxy transforms (`world * local`).
    proxies: Vec<Mat4>,
    /// Entity space to proxy-local space, per proxy.
    to_proxy_local: Vec<Mat4>,
    /// Proxy-local space back to entity space, per proxy.
    to_entity: Vec<Mat4>,
    proxy_radius: f32,
    gravity: Vec3,
}

impl ProgramParams {
    pub fn new(particles_per_strand: u32, segment_length: f32, physics: PhysicsParams) -> Self {
        Self {
            phase: Phase::LeaderIntegration,
            strand_count: 0,
            particles_per_strand,
            segment_length,
            curl_radius: 0.0,
            delta_time: 0.0,
            running_time: 0.0,
            physics,
            model: Mat4::IDENTITY,
            proxies: Vec::new(),
            to_proxy_local: Vec::new(),
            to_entity: Vec::new(),
            proxy_radius: physics.ellipsoid_radius,
            gravity: Vec3::new(0.0, physics.gravity, 0.0),
        }
    }

    /// Set the entity's world transform. Fails on a singular matrix.
    pub fn set_model(&mut self, model: Mat4) -> Result<()> {
        let det = model.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return Err(HairError::InvalidConfig(
                "entity transform is singular".into(),
            ));
        }
        self.model = model;
        self.gravity = model_space_gravity(self.physics.gravity, &model);
        Ok(())
    }

    /// Recompose every proxy against the current model matrix.
    /// Buffers are resized only when the proxy count changes.
    pub fn set_proxies(&mut self, set: &CollisionProxySet) -> Result<()> {
        if set.len() > MAX_PROXIES {
            return Err(HairError::InvalidConfig(format!(
                "{} collision proxies exceed the limit of {}",
                set.len(),
                MAX_PROXIES
            )));
        }
        let n = set.len();
        self.proxies.resize(n, Mat4::IDENTITY);
        self.to_proxy_local.resize(n, Mat4::IDENTITY);
        self.to_entity.resize(n, Mat4::IDENTITY);

        set.compose_into(self.model, &mut self.proxies);
        let model_inverse = self.model.inverse();
        for k in 0..n {
            let proxy = self.proxies[k];
            self.to_proxy_local[k] = proxy.inverse() * self.model;
            self.to_entity[k] = model_inverse * proxy;
        }
        self.proxy_radius = set.radius();
        Ok(())
    }

    pub fn set_physics(&mut self, physics: PhysicsParams) {
        self.physics = physics;
        self.gravity = model_space_gravity(physics.gravity, &self.model);
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn proxies(&self) -> &[Mat4] {
        &self.proxies
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    pub(crate) fn proxy_spaces(&self) -> impl Iterator<Item = (&Mat4, &Mat4)> {
        self.to_proxy_local.iter().zip(&self.to_entity)
    }

    pub fn proxy_radius(&self) -> f32 {
        self.proxy_radius
    }

    /// Gravity in entity space.
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Total external acceleration at the current running time.
    pub fn external_acceleration(&self) -> Vec3 {
        let wind = wind_acceleration(self.physics.wind, self.running_time);
        self.gravity + self.model.inverse().transform_vector3(wind)
    }
}

/// Compute program linked against a device.
pub struct HairProgram {
    local_group_width: u32,
    global_group_count: u32,
    params: ProgramParams,
}

impl HairProgram {
    /// Link the program. Fails when the group width is unusable on `device`
    /// or the largest possible dispatch (`max_work_count` items) would need
    /// more groups than the device allows.
    pub fn link(
        device: &ComputeDevice,
        local_group_width: u32,
        max_work_count: u32,
        params: ProgramParams,
    ) -> Result<Self> {
        let limits = device.limits();
        if local_group_width == 0 {
            return Err(HairError::ProgramLink(
                "local group width must be positive".into(),
            ));
        }
        if local_group_width > limits.max_group_width {
            return Err(HairError::ProgramLink(format!(
                "local group width {} exceeds device limit {}",
                local_group_width, limits.max_group_width
            )));
        }
        let worst = group_count(max_work_count, local_group_width);
        if worst > limits.max_group_count {
            return Err(HairError::ProgramLink(format!(
                "{} work items need {} groups, device allows {}",
                max_work_count, worst, limits.max_group_count
            )));
        }
        if params.particles_per_strand < 2 {
            return Err(HairError::ProgramLink(format!(
                "particles per strand must be at least 2, got {}",
                params.particles_per_strand
            )));
        }

        debug!(local_group_width, max_work_count, "hair program linked");

        Ok(Self {
            local_group_width,
            global_group_count: 0,
            params,
        })
    }

    /// Invocations per group. Constant for the program's lifetime.
    pub fn local_group_width(&self) -> u32 {
        self.local_group_width
    }

    pub fn set_global_group_count(&mut self, groups: u32) {
        self.global_group_count = groups;
    }

    pub fn global_group_count(&self) -> u32 {
        self.global_group_count
    }

    pub fn params(&self) -> &ProgramParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ProgramParams {
        &mut self.params
    }

    /// Run the current phase over the bound buffers. The caller inserts the
    /// barrier afterwards.
    pub fn dispatch(&self, device: &mut ComputeDevice, particles: &mut ParticleStore, volume: &VolumeGrid) {
        let params = &self.params;
        let groups = self.global_group_count;
        let width = self.local_group_width;
        let pps = params.particles_per_strand as usize;
        let work = params.phase.work_count(params.strand_count, params.particles_per_strand);
        let ParticleBindings { positions, velocities } = particles.bind_for_compute();

        match params.phase {
            Phase::LeaderIntegration => {
                let acceleration = params.external_acceleration();
                device.dispatch_chunked(groups, width, work, pps, positions, velocities, |_, p, v| {
                    kernels::integrate_strand(p, v, params, acceleration);
                });
            }
            Phase::VolumeAccumulation => {
                let bindings = volume.bind_for_compute();
                let positions: &[Vec3] = positions;
                let velocities: &[Vec3] = velocities;
                device.dispatch(groups, width, work, |gid| {
                    let i = gid as usize;
                    kernels::accumulate_particle(&bindings, positions[i], velocities[i]);
                });
            }
            Phase::Resolution => {
                let bindings = volume.bind_for_compute();
                device.dispatch_chunked(groups, width, work, 1, positions, velocities, |gid, p, v| {
                    let is_root = gid as usize % pps == 0;
                    kernels::resolve_particle(is_root, &mut p[0], &mut v[0], &bindings, params);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceLimits;

    fn params() -> ProgramParams {
        ProgramParams::new(15, 0.2, PhysicsParams::default())
    }

    #[test]
    fn test_link_rejects_zero_width() {
        let device = ComputeDevice::default();
        let err = HairProgram::link(&device, 0, 100, params()).err();
        assert!(matches!(err, Some(HairError::ProgramLink(_))));
    }

    #[test]
    fn test_link_rejects_oversized_width() {
        let device = ComputeDevice::new(DeviceLimits {
            max_group_width: 128,
            max_group_count: 65_535,
        });
        assert!(HairProgram::link(&device, 256, 100, params()).is_err());
        assert!(HairProgram::link(&device, 128, 100, params()).is_ok());
    }

    #[test]
    fn test_link_rejects_too_many_groups() {
        let device = ComputeDevice::new(DeviceLimits {
            max_group_width: 1024,
            max_group_count: 10,
        });
        assert!(HairProgram::link(&device, 100, 1001, params()).is_err());
        assert!(HairProgram::link(&device, 100, 1000, params()).is_ok());
    }

    #[test]
    fn test_phase_indices() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(Phase::from_index(i as u32), Some(*phase));
            assert_eq!(*phase as u32, i as u32);
        }
        assert_eq!(Phase::from_index(3), None);
    }

    #[test]
    fn test_singular_model_rejected() {
        let mut p = params();
        assert!(p.set_model(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0))).is_err());
        assert!(p.set_model(Mat4::from_scale(Vec3::new(1.0, 5.0, 1.0))).is_ok());
    }
}
