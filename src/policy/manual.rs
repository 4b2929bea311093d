//! Driver-controlled policy: a pure function of the latest input snapshot.
//!
//! The world is Y-up with counter-clockwise-positive angles, so steering left
//! is `+lock_angle` and right is `-lock_angle`.

use rapier2d::prelude::Real;
use serde::Deserialize;

use super::SpeedLimits;

/// Discrete key state for one vehicle, replaced wholesale by the input source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct InputSnapshot {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub back: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ManualPolicy {
    limits: SpeedLimits,
}

impl ManualPolicy {
    pub fn new(limits: SpeedLimits) -> Self {
        Self { limits }
    }

    /// Full lock left (CCW, positive) or right, left taking priority.
    pub fn desired_wheel_angle(&self, input: &InputSnapshot) -> Real {
        if input.left {
            self.limits.lock_angle
        } else if input.right {
            -self.limits.lock_angle
        } else {
            0.0
        }
    }

    /// 0 means no throttle command.
    pub fn desired_speed(&self, input: &InputSnapshot) -> Real {
        if input.forward {
            self.limits.max_forward_speed
        } else if input.back {
            self.limits.max_backward_speed
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: SpeedLimits = SpeedLimits {
        lock_angle: 0.7,
        max_forward_speed: 25.0,
        max_backward_speed: -8.0,
    };

    #[test]
    fn steering_is_three_way() {
        let p = ManualPolicy::new(LIMITS);
        let idle = InputSnapshot::default();

        assert_eq!(p.desired_wheel_angle(&idle), 0.0);
        assert_eq!(p.desired_wheel_angle(&InputSnapshot { left: true, ..idle }), 0.7);
        assert_eq!(p.desired_wheel_angle(&InputSnapshot { right: true, ..idle }), -0.7);
        assert_eq!(
            p.desired_wheel_angle(&InputSnapshot { left: true, right: true, ..idle }),
            0.7
        );
    }

    #[test]
    fn throttle_is_three_way() {
        let p = ManualPolicy::new(LIMITS);
        let idle = InputSnapshot::default();

        assert_eq!(p.desired_speed(&idle), 0.0);
        assert_eq!(p.desired_speed(&InputSnapshot { forward: true, ..idle }), 25.0);
        assert_eq!(p.desired_speed(&InputSnapshot { back: true, ..idle }), -8.0);
    }

    #[test]
    fn snapshot_parses_with_missing_keys() {
        let s: InputSnapshot = serde_json::from_str(r#"{"forward":true}"#).unwrap();
        assert_eq!(s, InputSnapshot { forward: true, ..InputSnapshot::default() });
    }
}
