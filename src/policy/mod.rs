//! Steering/throttle policies: who decides where a vehicle wants to go.
//!
//! A policy is injected per vehicle at construction and answers two
//! questions every tick: the desired front wheel angle and the desired
//! forward speed. Tunables are copied in by value, so a policy holds no
//! reference back to its vehicle.

pub mod manual;
pub mod path;
pub mod path_follower;

use rapier2d::prelude::{Point, Real, Vector};
use serde::Serialize;

pub use manual::{InputSnapshot, ManualPolicy};
pub use path::Path;
pub use path_follower::{PathFollowerPolicy, SlowZone};

/// Vehicle limits a policy needs to pick its targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub lock_angle: Real,         // radians
    pub max_forward_speed: Real,  // m/s
    pub max_backward_speed: Real, // m/s, negative
}

/// Per-tick view of the vehicle handed to its policy.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext {
    pub position: Point<Real>,
    pub forward: Vector<Real>,
    pub input: InputSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    Manual,
    PathFollower,
}

#[derive(Debug, Clone)]
pub enum SteeringPolicy {
    Manual(ManualPolicy),
    PathFollower(PathFollowerPolicy),
}

impl SteeringPolicy {
    pub fn kind(&self) -> DriverKind {
        match self {
            SteeringPolicy::Manual(_) => DriverKind::Manual,
            SteeringPolicy::PathFollower(_) => DriverKind::PathFollower,
        }
    }

    /// Current waypoint index, for path followers.
    pub fn waypoint(&self) -> Option<usize> {
        match self {
            SteeringPolicy::Manual(_) => None,
            SteeringPolicy::PathFollower(p) => Some(p.waypoint()),
        }
    }

    /// Desired front wheel angle, not yet clamped to the lock angle.
    pub fn desired_wheel_angle(&mut self, ctx: &PolicyContext) -> Real {
        match self {
            SteeringPolicy::Manual(p) => p.desired_wheel_angle(&ctx.input),
            SteeringPolicy::PathFollower(p) => p.desired_wheel_angle(&ctx.position, &ctx.forward),
        }
    }

    pub fn desired_speed(&self, ctx: &PolicyContext) -> Real {
        match self {
            SteeringPolicy::Manual(p) => p.desired_speed(&ctx.input),
            SteeringPolicy::PathFollower(p) => p.desired_speed(&ctx.position),
        }
    }
}
