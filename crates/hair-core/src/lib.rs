//! Strand-based hair simulation on a thread-group compute model.
//!
//! A [`Hair`] owns a fixed-capacity particle buffer laid out strand by
//! strand. Each frame [`Hair::apply_physics`] runs three stages over it:
//! leader integration with follow-the-leader constraints, accumulation of
//! density and velocity into a coarse volume grid, and resolution against
//! that grid and a set of ellipsoid collision proxies.

pub mod config;
pub mod constraints;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod forces;
pub mod hair;
pub mod head;
pub mod kernels;
pub mod math;
pub mod particle;
pub mod program;
pub mod proxy;
pub mod render;
pub mod strands;
pub mod timestep;
pub mod transform;
pub mod volume;

pub use config::{HairConfig, LayoutFallback, LayoutMode, PhysicsParams, TimestepConfig};
pub use device::{ComputeDevice, DeviceLimits};
pub use dispatcher::{PhysicsDispatcher, StepStats};
pub use error::{HairError, Result};
pub use hair::{Hair, HairBuilder, STRAND_COUNT_STEP};
pub use head::HeadMesh;
pub use program::Phase;
pub use proxy::CollisionProxySet;
pub use render::{DrawMode, DrawRange, DrawTarget, Renderable};
pub use strands::{StrandGeometryBuilder, StrandLayout};
pub use timestep::TimestepDecision;
pub use transform::Transform;
