use glam::Mat4;
use tracing::{debug, trace};

use crate::config::{HairConfig, PhysicsParams};
use crate::device::ComputeDevice;
use crate::error::{HairError, Result};
use crate::math::group_count;
use crate::particle::ParticleStore;
use crate::program::{HairProgram, Phase, ProgramParams};
use crate::proxy::CollisionProxySet;
use crate::strands::StrandLayout;
use crate::timestep::{TimestepDecision, TimestepGuard};
use crate::volume::VolumeGrid;

/// Statistics from a single `apply_physics` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepStats {
    /// Whether the stages ran at all.
    pub ran: bool,
    pub timestep: TimestepDecision,
    /// Delta time handed to the stages.
    pub delta_time: f32,
    pub strand_count: u32,
    pub particle_count: u32,
    /// Groups launched per stage, indexed by [`Phase`].
    pub group_counts: [u32; 3],
    /// Barriers issued during this call.
    pub barriers: u32,
}

/// Runs the three compute stages against the particle store and the
/// volume grid, with a full barrier after each.
///
/// Exclusively owns both buffers; between calls the positions are readable
/// through [`PhysicsDispatcher::particles`].
pub struct PhysicsDispatcher {
    device: ComputeDevice,
    program: HairProgram,
    particles: ParticleStore,
    volume: VolumeGrid,
    guard: TimestepGuard,
    strand_count: u32,
}

impl PhysicsDispatcher {
    pub fn new(device: ComputeDevice, config: &HairConfig, layout: &StrandLayout) -> Result<Self> {
        config.validate()?;
        if layout.particles_per_strand() != config.particles_per_strand
            || layout.strand_count() != config.maximum_strand_count
        {
            return Err(HairError::InvalidConfig(format!(
                "layout has {} strands of {} particles, configuration expects {} of {}",
                layout.strand_count(),
                layout.particles_per_strand(),
                config.maximum_strand_count,
                config.particles_per_strand
            )));
        }

        let particles = ParticleStore::initialize(
            config.maximum_strand_count,
            config.particles_per_strand,
            layout.positions(),
        )?;

        let mut params = ProgramParams::new(config.particles_per_strand, config.segment_length(), config.physics);
        params.curl_radius = config.curl_radius;
        params.strand_count = config.strand_count;
        let program = HairProgram::link(&device, config.local_group_width, config.particle_capacity()?, params)?;

        debug!(
            capacity = particles.capacity(),
            strands = config.strand_count,
            group_width = program.local_group_width(),
            "physics dispatcher ready"
        );

        Ok(Self {
            device,
            program,
            particles,
            volume: VolumeGrid::new(),
            guard: TimestepGuard::new(config.timestep),
            strand_count: config.strand_count,
        })
    }

    /// Group counts for the current strand count, indexed by [`Phase`].
    pub fn stage_group_counts(&self) -> [u32; 3] {
        let width = self.program.local_group_width();
        let pps = self.particles.particles_per_strand();
        Phase::ALL.map(|phase| group_count(phase.work_count(self.strand_count, pps), width))
    }

    /// Advance the simulation by one frame.
    ///
    /// `world` is the entity transform and `proxies` its collision set;
    /// both are read fresh every call.
    pub fn apply_physics(
        &mut self,
        delta_time: f32,
        running_time: f32,
        world: Mat4,
        proxies: &CollisionProxySet,
    ) -> Result<StepStats> {
        // Rejected frames must not advance the timestep history.
        let params = self.program.params_mut();
        params.set_model(world)?;
        params.set_proxies(proxies)?;

        let (timestep, dt) = self.guard.admit(delta_time);
        let mut stats = StepStats {
            ran: false,
            timestep,
            delta_time: dt,
            strand_count: self.strand_count,
            particle_count: self.strand_count * self.particles.particles_per_strand(),
            group_counts: [0; 3],
            barriers: 0,
        };
        if timestep == TimestepDecision::Skipped {
            return Ok(stats);
        }

        self.volume.reset();

        let params = self.program.params_mut();
        params.strand_count = self.strand_count;
        params.delta_time = dt;
        params.running_time = running_time;

        let groups = self.stage_group_counts();
        let barriers_before = self.device.barrier_count();
        for phase in Phase::ALL {
            let n = groups[phase as usize];
            self.program.set_global_group_count(n);
            self.program.params_mut().phase = phase;
            self.program.dispatch(&mut self.device, &mut self.particles, &self.volume);
            self.device.barrier();
            trace!(?phase, groups = n, "stage dispatched");
        }

        stats.ran = true;
        stats.group_counts = groups;
        stats.barriers = (self.device.barrier_count() - barriers_before) as u32;
        Ok(stats)
    }

    pub fn strand_count(&self) -> u32 {
        self.strand_count
    }

    /// Set the live strand count. Counts above capacity are rejected.
    pub fn set_strand_count(&mut self, strand_count: u32) -> Result<()> {
        let maximum = self.particles.maximum_strand_count();
        if strand_count > maximum {
            return Err(HairError::CapacityExceeded {
                requested: strand_count,
                maximum,
            });
        }
        self.strand_count = strand_count;
        Ok(())
    }

    pub fn curl_radius(&self) -> f32 {
        self.program.params().curl_radius
    }

    pub fn set_curl_radius(&mut self, curl_radius: f32) {
        self.program.params_mut().curl_radius = curl_radius.max(0.0);
    }

    pub fn physics(&self) -> &PhysicsParams {
        &self.program.params().physics
    }

    /// Replace the physics coefficients. Out-of-range values are rejected
    /// and the current ones kept.
    pub fn set_physics(&mut self, physics: PhysicsParams) -> Result<()> {
        physics.validate()?;
        self.program.params_mut().set_physics(physics);
        Ok(())
    }

    pub fn local_group_width(&self) -> u32 {
        self.program.local_group_width()
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn volume(&self) -> &VolumeGrid {
        &self.volume
    }

    /// Mutable access to the store, for seeding state between frames.
    pub fn particles_mut(&mut self) -> &mut ParticleStore {
        &mut self.particles
    }

    pub fn program_params(&self) -> &ProgramParams {
        self.program.params()
    }
}
