use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::{HairError, Result};

/// Forces and response coefficients consumed by the compute stages every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Signed gravity along world Y.
    pub gravity: f32,
    /// Wind direction in `xyz`, strength in `w`.
    pub wind: Vec4,
    /// Volume friction and tangential contact friction, in [0, 1].
    pub friction: f32,
    /// Per-frame velocity multiplier, in [0, 1].
    pub velocity_damping: f32,
    /// Base radius of every collision ellipsoid before scaling.
    pub ellipsoid_radius: f32,
    /// Homogeneous particle mass (not stored per particle).
    pub particle_mass: f32,
    /// Node density above which the volume pushes particles apart.
    pub density_threshold: f32,
    /// Maximum velocity change from volume repulsion per frame.
    pub repulsion: f32,
    /// Relative offset past the ellipsoid surface after a projection.
    pub collision_epsilon: f32,
    /// Speed cap applied after resolution.
    pub max_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            wind: Vec4::new(1.0, 0.0, 0.0, 0.2),
            friction: 0.02,
            velocity_damping: 0.9,
            ellipsoid_radius: 0.5,
            particle_mass: 0.1,
            density_threshold: 64.0,
            repulsion: 0.5,
            collision_epsilon: 0.01,
            max_speed: 50.0,
        }
    }
}

impl PhysicsParams {
    /// Range checks shared by construction and runtime updates.
    pub fn validate(&self) -> Result<()> {
        if !(self.gravity.is_finite() && self.wind.is_finite()) {
            return Err(HairError::InvalidConfig(
                "gravity and wind must be finite".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(HairError::InvalidConfig(format!(
                "friction must be in [0, 1], got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.velocity_damping) {
            return Err(HairError::InvalidConfig(format!(
                "velocity damping must be in [0, 1], got {}",
                self.velocity_damping
            )));
        }
        if !(self.ellipsoid_radius.is_finite() && self.ellipsoid_radius > 0.0) {
            return Err(HairError::InvalidConfig(format!(
                "ellipsoid radius must be positive, got {}",
                self.ellipsoid_radius
            )));
        }
        if !(self.max_speed > 0.0) {
            return Err(HairError::InvalidConfig(format!(
                "max speed must be positive, got {}",
                self.max_speed
            )));
        }
        if !(self.density_threshold > 0.0 && self.repulsion >= 0.0 && self.collision_epsilon >= 0.0) {
            return Err(HairError::InvalidConfig(
                "density threshold must be positive, repulsion and collision epsilon non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// How the initial strand layout is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Sample roots from the head mesh's scalp region.
    Scalp,
    /// Reject-sample roots on the head sphere cap.
    Procedural,
}

/// What to do when the scalp layout cannot be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutFallback {
    Procedural,
    Fail,
}

/// Delta-time limits protecting the explicit integrator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestepConfig {
    /// Largest delta time ever handed to the stages.
    pub max_delta_time: f32,
    /// Largest allowed growth factor against the previous frame's delta.
    pub spike_ratio: f32,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            max_delta_time: 1.0 / 15.0,
            spike_ratio: 4.0,
        }
    }
}

/// Construction-time configuration of one hair instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairConfig {
    pub maximum_strand_count: u32,
    pub strand_count: u32,
    pub particles_per_strand: u32,
    /// Rest length of a whole strand, root to tip.
    pub hair_length: f32,
    pub curl_radius: f32,
    /// Invocations per thread group requested when linking the program.
    pub local_group_width: u32,
    /// Seed for the layout's random sampling.
    pub seed: u64,
    pub layout: LayoutMode,
    pub layout_fallback: LayoutFallback,
    pub physics: PhysicsParams,
    pub timestep: TimestepConfig,
}

impl Default for HairConfig {
    fn default() -> Self {
        Self {
            maximum_strand_count: 30_000,
            strand_count: 5_000,
            particles_per_strand: 15,
            hair_length: 3.0,
            curl_radius: 0.0,
            local_group_width: 256,
            seed: 0x5eed,
            layout: LayoutMode::Scalp,
            layout_fallback: LayoutFallback::Procedural,
            physics: PhysicsParams::default(),
            timestep: TimestepConfig::default(),
        }
    }
}

impl HairConfig {
    /// Target distance between consecutive particles of a strand.
    pub fn segment_length(&self) -> f32 {
        self.hair_length / (self.particles_per_strand.max(2) - 1) as f32
    }

    /// Total number of particles allocated in the store.
    pub fn particle_capacity(&self) -> Result<u32> {
        self.maximum_strand_count
            .checked_mul(self.particles_per_strand)
            .ok_or_else(|| {
                HairError::InvalidConfig(format!(
                    "{} strands of {} particles overflow the particle index range",
                    self.maximum_strand_count, self.particles_per_strand
                ))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.particles_per_strand < 2 {
            return Err(HairError::InvalidParticlesPerStrand(self.particles_per_strand));
        }
        if self.maximum_strand_count == 0 {
            return Err(HairError::InvalidConfig(
                "maximum strand count must be positive".into(),
            ));
        }
        if self.strand_count > self.maximum_strand_count {
            return Err(HairError::CapacityExceeded {
                requested: self.strand_count,
                maximum: self.maximum_strand_count,
            });
        }
        self.particle_capacity()?;
        if !(self.hair_length.is_finite() && self.hair_length > 0.0) {
            return Err(HairError::InvalidConfig(format!(
                "hair length must be positive, got {}",
                self.hair_length
            )));
        }
        if !(self.curl_radius.is_finite() && self.curl_radius >= 0.0) {
            return Err(HairError::InvalidConfig(format!(
                "curl radius must be non-negative, got {}",
                self.curl_radius
            )));
        }
        self.physics.validate()?;
        if !(self.timestep.max_delta_time > 0.0 && self.timestep.spike_ratio >= 1.0) {
            return Err(HairError::InvalidConfig(
                "timestep limits must be positive and the spike ratio at least 1".into(),
            ));
        }
        Ok(())
    }
}
