use glam::{Vec3, Vec4};

/// Relative amplitude of the slow gust on top of the base wind strength.
const GUST_AMPLITUDE: f32 = 0.5;

/// World-space wind acceleration at `time`.
///
/// `wind.xyz` is the direction (any length) and `wind.w` the strength.
/// Strength oscillates slowly with the running time. A zero direction
/// means no wind.
pub fn wind_acceleration(wind: Vec4, time: f32) -> Vec3 {
    let direction = wind.truncate().normalize_or_zero();
    if direction == Vec3::ZERO || !time.is_finite() {
        return Vec3::ZERO;
    }
    direction * wind.w * (1.0 + GUST_AMPLITUDE * time.sin())
}
