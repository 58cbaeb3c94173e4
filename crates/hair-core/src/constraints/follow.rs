use glam::Vec3;

/// Twist between consecutive segments when the strand is curled, in radians.
const CURL_TWIST: f32 = 1.2;

/// Follow-the-leader distance constraint for one strand.
///
/// Walks from the root outward and places every particle exactly
/// `segment_length` from its predecessor, along the direction it currently
/// has from that predecessor. `positions[0]` is the leader and is not
/// moved. A degenerate direction (coincident particles) falls back to
/// the previous segment's direction, then to straight down.
///
/// With `curl_radius > 0` the direction is bent around the predecessor
/// segment by a twist that advances per particle, so the strand settles
/// into a helix. Segment lengths are preserved either way.
///
/// Reference: "Fast Simulation of Inextensible Hair and Fur",
/// Müller, Kim & Chentanez, 2012
pub fn solve_follow_the_leader(positions: &mut [Vec3], segment_length: f32, curl_radius: f32) {
    let mut previous_dir = Vec3::NEG_Y;

    for j in 1..positions.len() {
        let leader = positions[j - 1];
        let mut dir = (positions[j] - leader).normalize_or_zero();
        if dir == Vec3::ZERO {
            dir = previous_dir;
        }

        if curl_radius > 0.0 {
            let (u, w) = previous_dir.any_orthonormal_pair();
            let angle = j as f32 * CURL_TWIST;
            let bent = (dir + (u * angle.cos() + w * angle.sin()) * curl_radius).normalize_or_zero();
            if bent != Vec3::ZERO {
                dir = bent;
            }
        }

        positions[j] = leader + dir * segment_length;
        previous_dir = dir;
    }
}
