use glam::{Mat4, Vec3, Vec4};
use hair_core::config::{HairConfig, LayoutMode, PhysicsParams};
use hair_core::error::HairError;
use hair_core::hair::Hair;
use hair_core::head::HeadMesh;
use hair_core::render::DrawRange;
use wasm_bindgen::prelude::*;

/// Vertex uploaded for line-strip drawing: 16 bytes, matches the strand
/// shader's `vec4` attribute. `w` runs 0 at the root to 1 at the tip.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuStrandVertex {
    position: [f32; 3],
    along: f32,
}

fn to_js(err: HairError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct HairWorld {
    hair: Hair,
    gpu_buffer: Vec<GpuStrandVertex>,
}

#[wasm_bindgen]
impl HairWorld {
    /// Procedural hair with default physics.
    #[wasm_bindgen(constructor)]
    pub fn new(strand_count: u32, hair_length: f32, curliness: f32) -> Result<HairWorld, JsValue> {
        let config = HairConfig {
            strand_count,
            hair_length,
            curl_radius: curliness,
            layout: LayoutMode::Procedural,
            ..HairConfig::default()
        };
        Self::create(config, None)
    }

    /// Full configuration as JSON, plus an optional interleaved
    /// `[px, py, pz, nx, ny, nz]` head mesh.
    pub fn from_config_json(
        json: &str,
        head_vertices: Option<Vec<f32>>,
        head_indices: Option<Vec<u32>>,
    ) -> Result<HairWorld, JsValue> {
        let config: HairConfig =
            serde_json::from_str(json).map_err(|e| to_js(HairError::InvalidConfig(e.to_string())))?;
        let head = head_vertices.map(|v| HeadMesh::from_interleaved(&v, head_indices.unwrap_or_default()));
        Self::create(config, head)
    }

    /// Advance one frame. Returns the wall time spent, in milliseconds.
    pub fn step(&mut self, dt: f32, time: f32) -> Result<f32, JsValue> {
        let start = js_sys::Date::now();
        self.hair.apply_physics(dt, time).map_err(to_js)?;
        self.write_gpu_output();
        let elapsed = js_sys::Date::now() - start;
        Ok(elapsed as f32)
    }

    pub fn get_gpu_buffer_ptr(&self) -> *const f32 {
        self.gpu_buffer.as_ptr() as *const f32
    }

    pub fn get_gpu_buffer_byte_length(&self) -> usize {
        self.gpu_buffer.len() * std::mem::size_of::<GpuStrandVertex>()
    }

    /// Pointer to `[first, count]` pairs, one per active strand.
    pub fn get_draw_ranges_ptr(&self) -> *const u32 {
        self.hair.draw_ranges().as_ptr() as *const u32
    }

    pub fn draw_range_count(&self) -> usize {
        self.hair.draw_ranges().len()
    }

    pub fn get_draw_ranges_byte_length(&self) -> usize {
        self.hair.draw_ranges().len() * std::mem::size_of::<DrawRange>()
    }

    pub fn strand_count(&self) -> u32 {
        self.hair.strand_count()
    }

    pub fn set_strand_count(&mut self, strand_count: u32) -> Result<(), JsValue> {
        self.hair.set_strand_count(strand_count).map_err(to_js)
    }

    pub fn increment_strands(&mut self) -> u32 {
        self.hair.increment_strand_count()
    }

    pub fn decrement_strands(&mut self) -> u32 {
        self.hair.decrement_strand_count()
    }

    pub fn set_curl(&mut self, curl_radius: f32) {
        self.hair.set_curl_radius(curl_radius);
    }

    pub fn set_wind(&mut self, x: f32, y: f32, z: f32, strength: f32) -> Result<(), JsValue> {
        self.update_physics(|p| p.wind = Vec4::new(x, y, z, strength))
    }

    pub fn set_gravity(&mut self, gravity: f32) -> Result<(), JsValue> {
        self.update_physics(|p| p.gravity = gravity)
    }

    pub fn set_response(&mut self, friction: f32, damping: f32) -> Result<(), JsValue> {
        self.update_physics(|p| {
            p.friction = friction;
            p.velocity_damping = damping;
        })
    }

    /// Column-major 4x4 entity transform. Ignored unless exactly 16 floats.
    pub fn set_transform(&mut self, matrix: &[f32]) {
        if let Ok(cols) = matrix.try_into() {
            let m = Mat4::from_cols_array(cols);
            let (scale, rotation, translation) = m.to_scale_rotation_translation();
            self.hair
                .transform_mut()
                .translate(translation)
                .set_rotation(rotation)
                .scale(scale);
        }
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.hair.transform_mut().translate(Vec3::new(x, y, z));
    }

    pub fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) {
        self.hair.transform_mut().rotate(degrees, Vec3::new(x, y, z));
    }

    pub fn get_transform(&self) -> Vec<f32> {
        self.hair.transform().matrix().to_cols_array().to_vec()
    }
}

impl HairWorld {
    fn create(config: HairConfig, head: Option<hair_core::error::Result<HeadMesh>>) -> Result<HairWorld, JsValue> {
        let mut builder = Hair::builder(config);
        if let Some(asset) = head {
            builder = builder.head_asset(asset);
        }
        let hair = builder.build().map_err(to_js)?;

        web_sys::console::log_1(
            &format!(
                "WASM HairWorld created: {} of {} strands, {} particles each",
                hair.strand_count(),
                hair.maximum_strand_count(),
                hair.particles_per_strand()
            )
            .into(),
        );

        let gpu_buffer = vec![
            GpuStrandVertex {
                position: [0.0; 3],
                along: 0.0,
            };
            hair.positions().len()
        ];
        let mut world = HairWorld { hair, gpu_buffer };
        world.write_gpu_output();
        Ok(world)
    }

    fn update_physics(&mut self, edit: impl FnOnce(&mut PhysicsParams)) -> Result<(), JsValue> {
        let mut physics = *self.hair.physics();
        edit(&mut physics);
        self.hair.set_physics(physics).map_err(to_js)
    }

    fn write_gpu_output(&mut self) {
        let pps = self.hair.particles_per_strand() as usize;
        let tip = (pps.max(2) - 1) as f32;
        let active = self.hair.strand_count() as usize * pps;
        let positions = self.hair.positions();
        for (i, (out, p)) in self.gpu_buffer.iter_mut().zip(positions).take(active).enumerate() {
            out.position = p.to_array();
            out.along = (i % pps) as f32 / tip;
        }
    }
}
