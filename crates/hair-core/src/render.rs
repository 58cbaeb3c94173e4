//! Draw-side interface consumed by the host render loop.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::head::HeadMesh;

/// Contiguous vertex range drawn as one primitive strip.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawRange {
    /// Index of the first vertex.
    pub first: u32,
    pub count: u32,
}

/// How strands are submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// One line-strip call per active strand.
    PerStrand,
    /// A single multi-range line-strip call.
    #[default]
    MultiRange,
}

/// Receiver of draw calls, implemented by the host's graphics layer.
pub trait DrawTarget {
    /// Draw each range of `vertices` as a line strip.
    fn draw_line_strips(&mut self, transform: Mat4, vertices: &[Vec3], ranges: &[DrawRange]);

    /// Draw indexed triangles.
    fn draw_triangles(&mut self, transform: Mat4, vertices: &[Vec3], normals: &[Vec3], indices: &[u32]);
}

/// Something the render loop can draw.
pub trait Renderable {
    fn draw(&self, target: &mut dyn DrawTarget);
    fn transform(&self) -> Mat4;
}

/// Line-strip view over a strand position buffer.
pub struct StrandRenderable<'a> {
    pub positions: &'a [Vec3],
    /// Ranges of the active strands only.
    pub ranges: &'a [DrawRange],
    pub transform: Mat4,
    pub mode: DrawMode,
}

impl Renderable for StrandRenderable<'_> {
    fn draw(&self, target: &mut dyn DrawTarget) {
        match self.mode {
            DrawMode::MultiRange => {
                if !self.ranges.is_empty() {
                    target.draw_line_strips(self.transform, self.positions, self.ranges);
                }
            }
            DrawMode::PerStrand => {
                for range in self.ranges {
                    target.draw_line_strips(self.transform, self.positions, std::slice::from_ref(range));
                }
            }
        }
    }

    fn transform(&self) -> Mat4 {
        self.transform
    }
}

/// Indexed triangle mesh with its own transform (the head).
pub struct MeshRenderable<'a> {
    pub mesh: &'a HeadMesh,
    pub transform: Mat4,
}

impl Renderable for MeshRenderable<'_> {
    fn draw(&self, target: &mut dyn DrawTarget) {
        if self.mesh.index_count() == 0 {
            return;
        }
        target.draw_triangles(
            self.transform,
            self.mesh.positions(),
            self.mesh.normals(),
            self.mesh.indices(),
        );
    }

    fn transform(&self) -> Mat4 {
        self.transform
    }
}

/// Contiguous ranges for `strand_count` strands of `particles_per_strand`.
pub fn strand_ranges(strand_count: u32, particles_per_strand: u32) -> Vec<DrawRange> {
    (0..strand_count)
        .map(|s| DrawRange {
            first: s * particles_per_strand,
            count: particles_per_strand,
        })
        .collect()
}
