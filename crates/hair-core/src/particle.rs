use glam::Vec3;

use crate::error::{HairError, Result};

/// Strand particle storage, SoA.
///
/// Both buffers are sized for `maximum_strand_count * particles_per_strand`
/// particles. Strand `s` occupies the contiguous range
/// `s * particles_per_strand .. (s + 1) * particles_per_strand`, root first.
/// Only the leading `strand_count` strands are simulated; the tail is
/// headroom so the active count can grow without reallocation.
pub struct ParticleStore {
    maximum_strand_count: u32,
    particles_per_strand: u32,
    position: Vec<Vec3>,
    velocity: Vec<Vec3>,
}

/// Particle buffers exposed to the compute stages.
pub struct ParticleBindings<'a> {
    pub positions: &'a mut [Vec3],
    pub velocities: &'a mut [Vec3],
}

impl ParticleBindings<'_> {
    pub const POSITION_SLOT: u32 = 0;
    pub const VELOCITY_SLOT: u32 = 1;
}

impl ParticleStore {
    /// Allocate both buffers at full capacity and upload `initial_positions`.
    /// Velocities start at zero.
    pub fn initialize(
        maximum_strand_count: u32,
        particles_per_strand: u32,
        initial_positions: &[Vec3],
    ) -> Result<Self> {
        if particles_per_strand < 2 {
            return Err(HairError::InvalidParticlesPerStrand(particles_per_strand));
        }
        let capacity = (maximum_strand_count as usize) * (particles_per_strand as usize);
        if initial_positions.len() != capacity {
            return Err(HairError::InvalidConfig(format!(
                "expected {} initial positions for {} strands of {} particles, got {}",
                capacity,
                maximum_strand_count,
                particles_per_strand,
                initial_positions.len()
            )));
        }

        Ok(Self {
            maximum_strand_count,
            particles_per_strand,
            position: initial_positions.to_vec(),
            velocity: vec![Vec3::ZERO; capacity],
        })
    }

    /// Both buffers, mutably, at their fixed binding slots.
    pub fn bind_for_compute(&mut self) -> ParticleBindings<'_> {
        ParticleBindings {
            positions: &mut self.position,
            velocities: &mut self.velocity,
        }
    }

    pub fn maximum_strand_count(&self) -> u32 {
        self.maximum_strand_count
    }

    pub fn particles_per_strand(&self) -> u32 {
        self.particles_per_strand
    }

    /// Allocated particle count (active and headroom).
    pub fn capacity(&self) -> usize {
        self.position.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.position
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocity
    }

    /// Raw bytes of the position buffer, as read by the draw calls.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.position)
    }

    /// Positions of strand `strand`, or `None` past capacity.
    pub fn strand(&self, strand: u32) -> Option<&[Vec3]> {
        let n = self.particles_per_strand as usize;
        let start = strand as usize * n;
        self.position.get(start..start + n)
    }

    /// Velocities of strand `strand`, or `None` past capacity.
    pub fn strand_velocities(&self, strand: u32) -> Option<&[Vec3]> {
        let n = self.particles_per_strand as usize;
        let start = strand as usize * n;
        self.velocity.get(start..start + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_zeroes_velocities() {
        let positions = vec![Vec3::ONE; 3 * 4];
        let store = ParticleStore::initialize(3, 4, &positions).unwrap();
        assert_eq!(store.capacity(), 12);
        assert!(store.velocities().iter().all(|v| *v == Vec3::ZERO));
        assert_eq!(store.strand(2).unwrap().len(), 4);
        assert!(store.strand(3).is_none());
    }

    #[test]
    fn test_initialize_rejects_wrong_length() {
        let positions = vec![Vec3::ZERO; 5];
        assert!(matches!(
            ParticleStore::initialize(3, 4, &positions),
            Err(HairError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_position_bytes_len() {
        let positions = vec![Vec3::ZERO; 2 * 2];
        let store = ParticleStore::initialize(2, 2, &positions).unwrap();
        assert_eq!(store.position_bytes().len(), 4 * 12);
    }
}
