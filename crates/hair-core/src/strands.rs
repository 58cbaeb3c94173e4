//! Construction-time strand layout: scalp sampling or procedural cap sampling.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::HairConfig;
use crate::error::{HairError, Result};
use crate::head::HeadMesh;
use crate::proxy::CollisionProxySet;
use crate::render::{strand_ranges, DrawRange};

/// Only every Nth mesh vertex is considered as a strand root.
pub const SCALP_VERTEX_STRIDE: usize = 10;

/// Center of the procedural head sphere, in entity space.
pub const PROCEDURAL_CENTER: Vec3 = Vec3::new(0.0, -1.03, 0.12);

const ROOT_MARCH_STEP: f32 = 0.02;
const ROOT_MARCH_LIMIT: f32 = 4.0;

/// Hair-bearing region of the placed head mesh: back of the head, the
/// sides above the ears and the crown.
pub fn is_scalp_vertex(p: Vec3) -> bool {
    (p.y > -1.0 && p.z < 0.0) || (p.y > -0.5 && p.z < 0.7) || (p.y >= 0.5 && p.z < 1.7)
}

/// Allowed directions from the procedural center: the upper cap, minus
/// the face (+Z below the forehead).
pub fn in_hair_cap(dir: Vec3) -> bool {
    dir.y > -0.2 && !(dir.z > 0.35 && dir.y < 0.6)
}

/// Initial particle positions plus per-strand draw bookkeeping.
#[derive(Clone, Debug)]
pub struct StrandLayout {
    positions: Vec<Vec3>,
    draw_ranges: Vec<DrawRange>,
    particles_per_strand: u32,
    scalp_strands: u32,
}

impl StrandLayout {
    fn new(positions: Vec<Vec3>, particles_per_strand: u32, scalp_strands: u32) -> Self {
        let strands = (positions.len() / particles_per_strand as usize) as u32;
        Self {
            draw_ranges: strand_ranges(strands, particles_per_strand),
            positions,
            particles_per_strand,
            scalp_strands,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// First particle and particle count of every strand, in buffer order.
    pub fn draw_ranges(&self) -> &[DrawRange] {
        &self.draw_ranges
    }

    pub fn strand_count(&self) -> u32 {
        self.draw_ranges.len() as u32
    }

    pub fn particles_per_strand(&self) -> u32 {
        self.particles_per_strand
    }

    /// Strands grown directly from scalp samples; the rest were synthesized.
    pub fn scalp_strands(&self) -> u32 {
        self.scalp_strands
    }

    pub fn strand(&self, strand: u32) -> Option<&[Vec3]> {
        let range = self.draw_ranges.get(strand as usize)?;
        let start = range.first as usize;
        self.positions.get(start..start + range.count as usize)
    }
}

/// Produces exactly `maximum_strand_count` straight strands of
/// `particles_per_strand` particles, spaced `segment_length` apart.
pub struct StrandGeometryBuilder {
    maximum_strand_count: u32,
    particles_per_strand: u32,
    segment_length: f32,
    rng: StdRng,
}

impl StrandGeometryBuilder {
    pub fn new(config: &HairConfig) -> Self {
        Self::with_dimensions(
            config.maximum_strand_count,
            config.particles_per_strand,
            config.segment_length(),
            config.seed,
        )
    }

    pub fn with_dimensions(
        maximum_strand_count: u32,
        particles_per_strand: u32,
        segment_length: f32,
        seed: u64,
    ) -> Self {
        Self {
            maximum_strand_count,
            particles_per_strand,
            segment_length,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Grow strands from the scalp region of `mesh`, along each sampled
    /// vertex's normal. Once samples run out, the remaining strands are
    /// rooted halfway between two distinct random scalp roots.
    pub fn scalp(&mut self, mesh: &HeadMesh) -> Result<StrandLayout> {
        let max = self.maximum_strand_count as usize;
        let mut roots: Vec<(Vec3, Vec3)> = mesh
            .positions()
            .iter()
            .zip(mesh.normals())
            .step_by(SCALP_VERTEX_STRIDE)
            .filter(|(p, _)| is_scalp_vertex(**p))
            .take(max)
            .map(|(p, n)| (*p, growth_direction(*p, *n)))
            .collect();

        let scalp = roots.len();
        if scalp == 0 {
            return Err(HairError::EmptyScalp);
        }

        roots.reserve(max - scalp);
        while roots.len() < max {
            let a = self.rng.gen_range(0..scalp);
            let b = if scalp > 1 {
                (a + 1 + self.rng.gen_range(0..scalp - 1)) % scalp
            } else {
                a
            };
            let (root_a, dir_a) = roots[a];
            let (root_b, dir_b) = roots[b];
            let root = root_b + (root_a - root_b) * 0.5;
            let mut dir = (dir_a + dir_b).normalize_or_zero();
            if dir == Vec3::ZERO {
                dir = growth_direction(root, Vec3::ZERO);
            }
            roots.push((root, dir));
        }

        let mut positions = Vec::with_capacity(max * self.particles_per_strand as usize);
        for (root, dir) in &roots {
            self.grow(&mut positions, *root, *dir);
        }

        debug!(scalp, synthesized = max - scalp, "scalp strand layout built");
        Ok(StrandLayout::new(positions, self.particles_per_strand, scalp as u32))
    }

    /// Roots on the outside of `proxies` along random directions inside the
    /// hair cap; strands hang straight down from them.
    pub fn procedural(&mut self, proxies: &CollisionProxySet) -> StrandLayout {
        let max = self.maximum_strand_count as usize;
        let mut positions = Vec::with_capacity(max * self.particles_per_strand as usize);
        for _ in 0..max {
            let dir = self.sample_cap_direction();
            let root = surface_root(proxies, dir);
            self.grow(&mut positions, root, Vec3::NEG_Y);
        }

        debug!(strands = max, "procedural strand layout built");
        StrandLayout::new(positions, self.particles_per_strand, 0)
    }

    /// Uniform direction on the unit sphere, rejected until inside the cap.
    fn sample_cap_direction(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            let len_sq = v.length_squared();
            if !(1e-6..=1.0).contains(&len_sq) {
                continue;
            }
            let dir = v / len_sq.sqrt();
            if in_hair_cap(dir) {
                return dir;
            }
        }
    }

    fn grow(&self, out: &mut Vec<Vec3>, root: Vec3, dir: Vec3) {
        for j in 0..self.particles_per_strand {
            out.push(root + dir * (j as f32 * self.segment_length));
        }
    }
}

/// Normal if usable, else the radial direction, else up.
fn growth_direction(position: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    if n != Vec3::ZERO {
        return n;
    }
    let radial = position.normalize_or_zero();
    if radial != Vec3::ZERO {
        radial
    } else {
        Vec3::Y
    }
}

/// March from the procedural center along `dir` until clear of every proxy.
fn surface_root(proxies: &CollisionProxySet, dir: Vec3) -> Vec3 {
    let mut t = 0.0;
    while t < ROOT_MARCH_LIMIT && proxies.contains(PROCEDURAL_CENTER + dir * t) {
        t += ROOT_MARCH_STEP;
    }
    PROCEDURAL_CENTER + dir * (t + ROOT_MARCH_STEP)
}
