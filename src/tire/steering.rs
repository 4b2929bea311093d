// ==============================================================================
// steering.rs — RATE-LIMITED FRONT AXLE STEERING
// ==============================================================================
// Responsibilities:
// - Move the front wheels' steered angle toward a desired angle
// - Never step more than turn_per_time_step in one tick
// - Never leave [-lock_angle, +lock_angle]
// ------------------------------------------------------------------------------
//   delta     = clamp(desired - current, -step, +step)
//   new_angle = current + delta
//
// The result is written as BOTH limits of each front revolute joint, so the
// wheels are pinned at exactly new_angle until the next tick. Both front wheels
// share one limiter and therefore one angle (parallel steer, no Ackermann).
//
// `current` is the last commanded angle, not the joint angle read back from
// the engine. A collision that shoves a front wheel off its pinned angle goes
// unnoticed here; the next write re-pins it at the commanded value.
//
// turn_per_time_step = turn_speed_per_sec / tick_rate_hz. That constant assumes
// the physics step runs at tick_rate_hz; a different fixed rate needs a new
// limiter.
// ==============================================================================

use rapier2d::prelude::Real;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringLimiter {
    lock_angle: Real,          // radians
    turn_per_time_step: Real,  // radians / tick
    angle: Real,               // last commanded joint angle
}

impl SteeringLimiter {
    pub fn new(lock_angle: Real, turn_speed_per_sec: Real, tick_rate_hz: Real) -> Self {
        Self {
            lock_angle: lock_angle.abs(),
            turn_per_time_step: (turn_speed_per_sec / tick_rate_hz.max(1.0)).abs(),
            angle: 0.0,
        }
    }

    pub fn lock_angle(&self) -> Real {
        self.lock_angle
    }

    #[cfg(test)]
    pub fn turn_per_time_step(&self) -> Real {
        self.turn_per_time_step
    }

    /// Current commanded angle of both front joints.
    pub fn angle(&self) -> Real {
        self.angle
    }

    /// Advance one tick toward `desired` and return the new joint angle.
    pub fn step(&mut self, desired: Real) -> Real {
        self.angle = limit_step(self.angle, desired, self.turn_per_time_step, self.lock_angle);
        self.angle
    }
}

/// One rate-limited step from `current` toward `desired`.
pub fn limit_step(current: Real, desired: Real, max_step: Real, lock_angle: Real) -> Real {
    let desired = desired.clamp(-lock_angle, lock_angle);
    let error = desired - current;

    // Within one step: land exactly on the target.
    if error.abs() <= max_step {
        return desired;
    }

    (current + error.clamp(-max_step, max_step)).clamp(-lock_angle, lock_angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn limiter() -> SteeringLimiter {
        SteeringLimiter::new(40f32.to_radians(), 320f32.to_radians(), 60.0)
    }

    #[test]
    fn turn_step_comes_from_rate_and_tick() {
        let l = limiter();
        assert_relative_eq!(l.turn_per_time_step(), 320f32.to_radians() / 60.0);
    }

    #[test]
    fn first_tick_moves_by_one_step() {
        let mut l = limiter();
        let x = l.turn_per_time_step();
        let a = l.step(l.lock_angle());
        assert_relative_eq!(a, x.min(l.lock_angle()));
    }

    #[test]
    fn reaches_lock_after_ceil_ticks_and_stays() {
        let mut l = limiter();
        let lock = l.lock_angle();
        let ticks = (lock / l.turn_per_time_step()).ceil() as usize;

        for _ in 0..ticks - 1 {
            let a = l.step(lock);
            assert!(a < lock);
        }
        assert_eq!(l.step(lock), lock);

        for _ in 0..10 {
            assert_eq!(l.step(lock), lock);
        }
    }

    #[test]
    fn step_is_bounded_and_never_overshoots() {
        let mut l = limiter();
        let max = l.turn_per_time_step();
        let targets = [0.7, -0.7, 0.05, 3.0, -3.0, 0.0, 0.2, 0.21];

        for &desired in targets.iter().cycle().take(200) {
            let before = l.angle();
            let after = l.step(desired);
            assert!((after - before).abs() <= max + 1e-6);
            assert!(after.abs() <= l.lock_angle());

            let target = desired.clamp(-l.lock_angle(), l.lock_angle());
            // Moving toward the target never passes it.
            if before <= target {
                assert!(after <= target + 1e-6);
            } else {
                assert!(after >= target - 1e-6);
            }
        }
    }

    #[test]
    fn small_error_is_closed_in_one_tick() {
        let mut l = limiter();
        let a = l.step(0.01);
        assert_eq!(a, 0.01);
    }

    #[test]
    fn out_of_range_request_is_held_at_lock() {
        let mut l = limiter();
        for _ in 0..100 {
            l.step(-10.0);
        }
        assert_eq!(l.angle(), -l.lock_angle());
    }
}
