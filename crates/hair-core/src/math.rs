/// Number of thread groups of `group_width` invocations needed to cover
/// `work_count` items. Any remainder adds one more group.
pub fn group_count(work_count: u32, group_width: u32) -> u32 {
    if group_width == 0 {
        return 0;
    }
    work_count.div_ceil(group_width)
}

/// Hermite ramp from 0 at `edge0` to 1 at `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
