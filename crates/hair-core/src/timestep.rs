use tracing::warn;

use crate::config::TimestepConfig;

/// What the guard did with a requested delta time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimestepDecision {
    Accepted,
    /// Reduced from `requested` to the effective delta time.
    Clamped { requested: f32 },
    /// Non-finite or non-positive; the frame is not simulated.
    Skipped,
}

/// Shields the explicit integrator from delta-time spikes.
///
/// A delta is clamped to `max_delta_time` and to `spike_ratio` times the
/// previous effective delta. Non-finite and non-positive deltas skip the
/// frame and leave the history untouched.
#[derive(Clone, Debug)]
pub struct TimestepGuard {
    config: TimestepConfig,
    previous: Option<f32>,
}

impl TimestepGuard {
    pub fn new(config: TimestepConfig) -> Self {
        Self {
            config,
            previous: None,
        }
    }

    /// Returns the decision and the delta time to simulate with.
    pub fn admit(&mut self, delta_time: f32) -> (TimestepDecision, f32) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            warn!(delta_time, "skipping physics step: invalid delta time");
            return (TimestepDecision::Skipped, 0.0);
        }

        let mut limit = self.config.max_delta_time;
        if let Some(prev) = self.previous {
            limit = limit.min(prev * self.config.spike_ratio);
        }

        let (decision, effective) = if delta_time > limit {
            warn!(delta_time, clamped = limit, "clamping physics delta time");
            (TimestepDecision::Clamped { requested: delta_time }, limit)
        } else {
            (TimestepDecision::Accepted, delta_time)
        };

        self.previous = Some(effective);
        (decision, effective)
    }

    pub fn previous(&self) -> Option<f32> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> TimestepGuard {
        TimestepGuard::new(TimestepConfig {
            max_delta_time: 0.1,
            spike_ratio: 4.0,
        })
    }

    #[test]
    fn test_normal_frame_accepted() {
        let mut g = guard();
        assert_eq!(g.admit(0.016), (TimestepDecision::Accepted, 0.016));
    }

    #[test]
    fn test_invalid_frames_skipped() {
        let mut g = guard();
        for dt in [f32::NAN, f32::INFINITY, 0.0, -0.01] {
            assert_eq!(g.admit(dt).0, TimestepDecision::Skipped, "dt={dt}");
        }
        assert_eq!(g.previous(), None);
    }

    #[test]
    fn test_spike_clamped_against_previous() {
        let mut g = guard();
        g.admit(0.01);
        let (decision, dt) = g.admit(0.09);
        assert_eq!(decision, TimestepDecision::Clamped { requested: 0.09 });
        assert!((dt - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_absolute_cap() {
        let mut g = guard();
        let (_, dt) = g.admit(2.0);
        assert!((dt - 0.1).abs() < 1e-6);
    }
}
