// ==============================================================================
// path_follower.rs — WAYPOINT SEEK POLICY
// ==============================================================================
// State: current waypoint index + current target point on a closed path.
//
// Every desired_wheel_angle() call:
// 1) if |target - position| < arrival_radius -> advance ONE waypoint (mod n)
// 2) seek: desired = target - position
//          angle   = atan2(cross(forward, desired), dot(forward, desired))
//
// The angle is returned unclamped; Vehicle clamps every policy to the lock
// angle before the steering limiter sees it.
//
// desired_speed(): max forward speed, or 75% of it inside the level's slow zone.
// ==============================================================================

use std::sync::Arc;

use rapier2d::prelude::{Point, Real, Vector};
use serde::{Deserialize, Serialize};

use super::path::Path;
use super::SpeedLimits;
use crate::tire::kinematics::signed_angle;
use crate::tire::types::MIN_NORMALIZE_LEN;

pub const DEFAULT_ARRIVAL_RADIUS: Real = 2.0;

/// Speed factor inside the slow zone.
pub const SLOW_ZONE_FACTOR: Real = 0.75;

/// Fixed map area where AI drivers ease off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlowZone {
    pub center: [Real; 2],
    pub radius: Real,
}

impl SlowZone {
    pub fn contains(&self, p: &Point<Real>) -> bool {
        let c = Point::new(self.center[0], self.center[1]);
        (*p - c).norm() < self.radius
    }
}

#[derive(Debug, Clone)]
pub struct PathFollowerPolicy {
    path: Arc<Path>,
    limits: SpeedLimits,
    slow_zone: Option<SlowZone>,
    arrival_radius: Real,

    waypoint: usize,
    target: Point<Real>,
}

impl PathFollowerPolicy {
    pub fn new(path: Arc<Path>, limits: SpeedLimits, slow_zone: Option<SlowZone>) -> Self {
        let target = path.node(0);
        Self {
            path,
            limits,
            slow_zone,
            arrival_radius: DEFAULT_ARRIVAL_RADIUS,
            waypoint: 0,
            target,
        }
    }

    #[cfg(test)]
    pub fn with_arrival_radius(mut self, radius: Real) -> Self {
        self.arrival_radius = radius;
        self
    }

    pub fn waypoint(&self) -> usize {
        self.waypoint
    }

    #[cfg(test)]
    pub fn target(&self) -> Point<Real> {
        self.target
    }

    /// Advance the cursor if `position` has reached the current target.
    /// Returns true on an arrival.
    pub fn update_target(&mut self, position: &Point<Real>) -> bool {
        if (self.target - *position).norm() >= self.arrival_radius {
            return false;
        }
        self.waypoint = self.path.next_index(self.waypoint);
        self.target = self.path.node(self.waypoint);
        true
    }

    pub fn desired_wheel_angle(&mut self, position: &Point<Real>, forward: &Vector<Real>) -> Real {
        self.update_target(position);

        let desired = self.target - *position;
        if desired.norm() < MIN_NORMALIZE_LEN || forward.norm() < MIN_NORMALIZE_LEN {
            return 0.0;
        }
        signed_angle(*forward, desired)
    }

    pub fn desired_speed(&self, position: &Point<Real>) -> Real {
        match self.slow_zone {
            Some(zone) if zone.contains(position) => SLOW_ZONE_FACTOR * self.limits.max_forward_speed,
            _ => self.limits.max_forward_speed,
        }
    }
}
