//! The hair entity: layout, transform, collision proxies and the physics
//! dispatcher behind one handle.

use glam::{Mat4, Vec3};
use tracing::{info, warn};

use crate::config::{HairConfig, LayoutFallback, LayoutMode, PhysicsParams};
use crate::device::{ComputeDevice, DeviceLimits};
use crate::dispatcher::{PhysicsDispatcher, StepStats};
use crate::error::{HairError, Result};
use crate::head::HeadMesh;
use crate::proxy::CollisionProxySet;
use crate::render::{DrawMode, DrawRange, DrawTarget, MeshRenderable, Renderable, StrandRenderable};
use crate::strands::{StrandGeometryBuilder, StrandLayout};
use crate::transform::Transform;

/// Amount the strand count changes per increment or decrement.
pub const STRAND_COUNT_STEP: u32 = 500;

/// Builder for [`Hair`].
pub struct HairBuilder {
    config: HairConfig,
    head: Option<Result<HeadMesh>>,
    limits: DeviceLimits,
    draw_mode: DrawMode,
}

impl HairBuilder {
    /// Head asset as loaded by the host, failure included. The mesh is
    /// expected in asset space; the head placement is applied here.
    pub fn head_asset(mut self, asset: Result<HeadMesh>) -> Self {
        self.head = Some(asset);
        self
    }

    pub fn device_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn draw_mode(mut self, mode: DrawMode) -> Self {
        self.draw_mode = mode;
        self
    }

    pub fn build(self) -> Result<Hair> {
        let config = self.config;
        config.validate()?;

        let proxies = CollisionProxySet::head(config.physics.ellipsoid_radius);
        let mut geometry = StrandGeometryBuilder::new(&config);

        let head = match self.head {
            Some(Ok(mesh)) => Some(mesh.transformed(HeadMesh::placement())),
            Some(Err(err)) => {
                if config.layout == LayoutMode::Scalp && config.layout_fallback == LayoutFallback::Fail {
                    return Err(err);
                }
                warn!(%err, "head asset unavailable, drawing hair without a head");
                None
            }
            None => None,
        };

        let layout = match (config.layout, &head) {
            (LayoutMode::Procedural, _) => geometry.procedural(&proxies),
            (LayoutMode::Scalp, Some(mesh)) => match geometry.scalp(mesh) {
                Ok(layout) => layout,
                Err(err) => fallback_layout(&config, &mut geometry, &proxies, err)?,
            },
            (LayoutMode::Scalp, None) => fallback_layout(
                &config,
                &mut geometry,
                &proxies,
                HairError::AssetLoad("no head mesh supplied".into()),
            )?,
        };

        let dispatcher = PhysicsDispatcher::new(ComputeDevice::new(self.limits), &config, &layout)?;

        info!(
            maximum = config.maximum_strand_count,
            active = config.strand_count,
            particles_per_strand = config.particles_per_strand,
            scalp_strands = layout.scalp_strands(),
            "hair created"
        );

        Ok(Hair {
            draw_ranges: layout.draw_ranges().to_vec(),
            head,
            config,
            transform: Transform::default(),
            proxies,
            dispatcher,
            draw_mode: self.draw_mode,
        })
    }
}

fn fallback_layout(
    config: &HairConfig,
    geometry: &mut StrandGeometryBuilder,
    proxies: &CollisionProxySet,
    err: HairError,
) -> Result<StrandLayout> {
    match config.layout_fallback {
        LayoutFallback::Fail => Err(err),
        LayoutFallback::Procedural => {
            warn!(%err, "scalp layout unavailable, falling back to procedural roots");
            Ok(geometry.procedural(proxies))
        }
    }
}

/// A simulated head of hair.
pub struct Hair {
    config: HairConfig,
    transform: Transform,
    proxies: CollisionProxySet,
    dispatcher: PhysicsDispatcher,
    draw_ranges: Vec<DrawRange>,
    head: Option<HeadMesh>,
    draw_mode: DrawMode,
}

impl Hair {
    pub fn builder(config: HairConfig) -> HairBuilder {
        HairBuilder {
            config,
            head: None,
            limits: DeviceLimits::default(),
            draw_mode: DrawMode::default(),
        }
    }

    /// Run the three compute stages for one frame.
    pub fn apply_physics(&mut self, delta_time: f32, running_time: f32) -> Result<StepStats> {
        self.dispatcher
            .apply_physics(delta_time, running_time, self.transform.matrix(), &self.proxies)
    }

    pub fn config(&self) -> &HairConfig {
        &self.config
    }

    pub fn strand_count(&self) -> u32 {
        self.dispatcher.strand_count()
    }

    pub fn maximum_strand_count(&self) -> u32 {
        self.config.maximum_strand_count
    }

    pub fn particles_per_strand(&self) -> u32 {
        self.config.particles_per_strand
    }

    /// Fails with [`HairError::CapacityExceeded`] above the maximum.
    pub fn set_strand_count(&mut self, strand_count: u32) -> Result<()> {
        self.dispatcher.set_strand_count(strand_count)
    }

    /// Add [`STRAND_COUNT_STEP`] strands, saturating at the maximum.
    pub fn increment_strand_count(&mut self) -> u32 {
        let maximum = self.maximum_strand_count();
        let current = self.strand_count();
        let wanted = current.saturating_add(STRAND_COUNT_STEP);
        let next = wanted.min(maximum);
        if wanted > maximum {
            info!(maximum, "strand count clamped to capacity");
        }
        self.apply_strand_count(next)
    }

    /// Remove [`STRAND_COUNT_STEP`] strands, saturating at zero.
    pub fn decrement_strand_count(&mut self) -> u32 {
        let next = self.strand_count().saturating_sub(STRAND_COUNT_STEP);
        self.apply_strand_count(next)
    }

    fn apply_strand_count(&mut self, strand_count: u32) -> u32 {
        if let Err(err) = self.dispatcher.set_strand_count(strand_count) {
            warn!(%err, "strand count left unchanged");
        }
        self.strand_count()
    }

    pub fn curl_radius(&self) -> f32 {
        self.dispatcher.curl_radius()
    }

    pub fn set_curl_radius(&mut self, curl_radius: f32) {
        self.dispatcher.set_curl_radius(curl_radius);
    }

    pub fn physics(&self) -> &PhysicsParams {
        self.dispatcher.physics()
    }

    /// Replace the physics coefficients. A new ellipsoid radius rebuilds
    /// the collision proxies. Invalid coefficients leave everything as it was.
    pub fn set_physics(&mut self, physics: PhysicsParams) -> Result<()> {
        self.dispatcher.set_physics(physics)?;
        if physics.ellipsoid_radius != self.proxies.radius() {
            self.proxies = CollisionProxySet::head(physics.ellipsoid_radius);
        }
        self.config.physics = physics;
        Ok(())
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Entity transform, picked up by the next physics step.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn proxies(&self) -> &CollisionProxySet {
        &self.proxies
    }

    /// Full position buffer, inactive strands included.
    pub fn positions(&self) -> &[Vec3] {
        self.dispatcher.particles().positions()
    }

    /// Draw ranges of the active strands.
    pub fn draw_ranges(&self) -> &[DrawRange] {
        let active = (self.strand_count() as usize).min(self.draw_ranges.len());
        &self.draw_ranges[..active]
    }

    pub fn dispatcher(&self) -> &PhysicsDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut PhysicsDispatcher {
        &mut self.dispatcher
    }

    pub fn head(&self) -> Option<&HeadMesh> {
        self.head.as_ref()
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.draw_mode = mode;
    }

    /// Draw the head mesh, if one was loaded, under the entity transform.
    pub fn draw_head(&self, target: &mut dyn DrawTarget) {
        if let Some(mesh) = &self.head {
            MeshRenderable {
                mesh,
                transform: self.transform.matrix(),
            }
            .draw(target);
        }
    }

    fn strands(&self) -> StrandRenderable<'_> {
        StrandRenderable {
            positions: self.positions(),
            ranges: self.draw_ranges(),
            transform: self.transform.matrix(),
            mode: self.draw_mode,
        }
    }
}

impl Renderable for Hair {
    fn draw(&self, target: &mut dyn DrawTarget) {
        self.strands().draw(target);
    }

    fn transform(&self) -> Mat4 {
        self.transform.matrix()
    }
}
