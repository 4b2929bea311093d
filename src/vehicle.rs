// ==============================================================================
// vehicle.rs — CHASSIS + FOUR WHEELS + POLICY
// ------------------------------------------------------------------------------
// Per tick, in this order:
// 1) policy -> desired wheel angle (clamped to lock here) + desired speed
// 2) SteeringLimiter -> new angle, pinned as both limits of the front joints
// 3) per wheel: tire solve (grip, spin damping, drag, drive) -> body
//
// Contacts never touch a vehicle mid-tick: physics.rs feeds the traction
// trackers from its queue before calling update().
// ==============================================================================

use std::f32::consts::PI;

use rapier2d::prelude::*;
use serde::Serialize;

use crate::level::SpawnPoint;
use crate::policy::{DriverKind, InputSnapshot, PolicyContext, SpeedLimits, SteeringPolicy};
use crate::tire::kinematics::{wheel_basis_world, wrap_angle};
use crate::tire::steering::SteeringLimiter;
use crate::tire::traction::TractionTracker;
use crate::tire::{solve_wheel, TireConfig, WheelId, WheelKinematics};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleConfig {
    pub lock_angle: Real,         // radians
    pub turn_speed_per_sec: Real, // radians / s
    pub tick_rate_hz: Real,       // steering limiter cadence

    pub max_forward_speed: Real,  // m/s
    pub max_backward_speed: Real, // m/s (negative)

    pub front_tire: TireConfig,
    pub rear_tire: TireConfig,

    // --- Chassis geometry ---
    pub chassis_vertices: &'static [[Real; 2]], // convex, local space
    pub chassis_density: Real,

    // --- Wheel geometry ---
    pub front_anchors: [[Real; 2]; 2], // [FR, FL] in chassis space
    pub rear_anchors: [[Real; 2]; 2],  // [RL, RR] in chassis space
    pub wheel_half_extents: [Real; 2],
    pub wheel_border_radius: Real,
    pub wheel_density: Real,
}

impl VehicleConfig {
    pub fn limits(&self) -> SpeedLimits {
        SpeedLimits {
            lock_angle: self.lock_angle,
            max_forward_speed: self.max_forward_speed,
            max_backward_speed: self.max_backward_speed,
        }
    }

    /// Max steering change per tick at the fixed cadence.
    #[cfg(test)]
    pub fn turn_per_time_step(&self) -> Real {
        self.turn_speed_per_sec / self.tick_rate_hz
    }

    pub fn steering_limiter(&self) -> SteeringLimiter {
        SteeringLimiter::new(self.lock_angle, self.turn_speed_per_sec, self.tick_rate_hz)
    }
}

const RALLY_CAR_HULL: [[Real; 2]; 8] = [
    [0.5, 0.0],
    [0.5, 1.0],
    [0.5, 2.0],
    [0.25, 3.0],
    [-0.25, 3.0],
    [-0.5, 2.0],
    [-0.5, 1.0],
    [-0.5, 0.0],
];

pub const RALLY_CAR: VehicleConfig = VehicleConfig {
    lock_angle: 40.0 * PI / 180.0,
    turn_speed_per_sec: 320.0 * PI / 180.0,
    tick_rate_hz: 60.0,

    max_forward_speed: 25.0,
    max_backward_speed: -8.0,

    front_tire: TireConfig {
        drag_force_multiplier: 4.0,
        max_drive_force: 20.0,
        max_lateral_impulse: 2.0,
    },
    rear_tire: TireConfig {
        drag_force_multiplier: 4.0,
        max_drive_force: 20.0,
        max_lateral_impulse: 2.5,
    },

    chassis_vertices: &RALLY_CAR_HULL,
    chassis_density: 1.0,

    front_anchors: [[-0.5, 2.5], [0.5, 2.5]],
    rear_anchors: [[0.5, 0.5], [-0.5, 0.5]],
    wheel_half_extents: [0.15, 0.3],
    wheel_border_radius: 0.05,
    wheel_density: 5.0,
};

pub struct Wheel {
    pub id: WheelId,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub joint: ImpulseJointHandle,
    pub anchor: Point<Real>, // chassis space
    pub config: TireConfig,
    pub traction: TractionTracker,
}

impl Wheel {
    /// Read the engine state the tire model needs.
    fn kinematics(body: &RigidBody) -> WheelKinematics {
        let (forward, right) = wheel_basis_world(body.rotation());
        WheelKinematics {
            mass: body.mass(),
            inertia: body.mass_properties().local_mprops.principal_inertia(),
            linvel: *body.linvel(),
            angvel: body.angvel(),
            forward,
            right,
        }
    }

    fn update(&self, bodies: &mut RigidBodySet, desired_speed: Real) {
        let Some(body) = bodies.get_mut(self.body) else {
            return;
        };

        let kin = Self::kinematics(body);
        let out = solve_wheel(&self.config, &kin, self.traction.traction(), desired_speed);

        body.apply_impulse(out.lateral_impulse, true);
        body.apply_torque_impulse(out.angular_impulse, true);
        body.reset_forces(true);
        body.add_force(out.force, true);
    }
}

pub struct Vehicle {
    pub id: String,
    pub body: RigidBodyHandle,     // the chassis body
    pub collider: ColliderHandle,  // the chassis hull
    pub front: [Wheel; 2],         // [FR, FL], both steered
    pub rear: [Wheel; 2],          // [RL, RR], pinned straight
    pub config: VehicleConfig,
    pub limiter: SteeringLimiter,  // shared by both front joints
    pub policy: SteeringPolicy,
    pub input: InputSnapshot,      // latest driver keys (manual only)
    pub spawn: SpawnPoint,
}

impl Vehicle {
    pub fn wheels(&self) -> impl Iterator<Item = &Wheel> {
        self.front.iter().chain(self.rear.iter())
    }

    pub fn wheel_mut(&mut self, id: WheelId) -> Option<&mut Wheel> {
        self.front.iter_mut().chain(self.rear.iter_mut()).find(|w| w.id == id)
    }

    pub fn is_out_of_course(&self) -> bool {
        self.wheels().any(|w| w.traction.is_out_of_course())
    }

    fn policy_context(&self, chassis: &RigidBody) -> PolicyContext {
        let (forward, _) = wheel_basis_world(chassis.rotation());
        PolicyContext {
            position: Point::from(*chassis.translation()),
            forward,
            input: self.input,
        }
    }

    /// One control tick. Returns the commanded steering angle.
    pub fn update(&mut self, bodies: &mut RigidBodySet, joints: &mut ImpulseJointSet) -> Real {
        let Some(chassis) = bodies.get(self.body) else {
            return self.limiter.angle();
        };
        let ctx = self.policy_context(chassis);

        let lock = self.limiter.lock_angle();
        let desired_angle = self.policy.desired_wheel_angle(&ctx).clamp(-lock, lock);
        let desired_speed = self.policy.desired_speed(&ctx);

        let angle = self.limiter.step(desired_angle);
        for wheel in &self.front {
            if let Some(joint) = joints.get_mut(wheel.joint) {
                joint.data.set_limits(JointAxis::AngX, [angle, angle]);
            }
        }

        for wheel in self.wheels() {
            wheel.update(bodies, desired_speed);
        }

        angle
    }

    /// Steering angle actually reached by the front-right wheel body.
    pub fn measured_steer_angle(&self, bodies: &RigidBodySet) -> Option<Real> {
        let chassis = bodies.get(self.body)?;
        let wheel = bodies.get(self.front[0].body)?;
        Some(wrap_angle(wheel.rotation().angle() - chassis.rotation().angle()))
    }

    /// Put chassis and wheels back on the spawn point, at rest.
    pub fn reset_to_spawn(&mut self, bodies: &mut RigidBodySet) {
        let [x, y] = self.spawn.position;
        let iso = Isometry::new(vector![x, y], self.spawn.angle);

        if let Some(chassis) = bodies.get_mut(self.body) {
            chassis.set_position(iso, true);
            chassis.set_linvel(vector![0.0, 0.0], true);
            chassis.set_angvel(0.0, true);
        }

        for wheel in self.front.iter().chain(self.rear.iter()) {
            if let Some(body) = bodies.get_mut(wheel.body) {
                let at = iso * wheel.anchor;
                body.set_position(Isometry::new(at.coords, self.spawn.angle), true);
                body.set_linvel(vector![0.0, 0.0], true);
                body.set_angvel(0.0, true);
                body.reset_forces(true);
            }
        }

        self.limiter = self.config.steering_limiter();
    }

    pub fn snapshot(&self, bodies: &RigidBodySet) -> Option<VehicleSnapshot> {
        let chassis = bodies.get(self.body)?;
        let pos = chassis.translation();

        let wheels = self
            .wheels()
            .filter_map(|w| {
                let body = bodies.get(w.body)?;
                let p = body.translation();
                Some(WheelSnapshot {
                    id: w.id.as_str(),
                    x: p.x,
                    y: p.y,
                    angle: body.rotation().angle(),
                    traction: w.traction.traction(),
                    zones: w.traction.zone_count(),
                })
            })
            .collect();

        Some(VehicleSnapshot {
            id: self.id.clone(),
            driver: self.policy.kind(),
            x: pos.x,
            y: pos.y,
            angle: chassis.rotation().angle(),
            steer_angle: self.limiter.angle(),
            measured_steer_angle: self.measured_steer_angle(bodies).unwrap_or(0.0),
            out_of_course: self.is_out_of_course(),
            waypoint: self.policy.waypoint(),
            wheels,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WheelSnapshot {
    pub id: &'static str,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub traction: f32,
    pub zones: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub driver: DriverKind,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub steer_angle: f32,
    pub measured_steer_angle: f32,
    pub out_of_course: bool,
    pub waypoint: Option<usize>,
    pub wheels: Vec<WheelSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rally_car_turn_step_matches_sixty_hertz() {
        let limiter = RALLY_CAR.steering_limiter();
        assert_relative_eq!(limiter.lock_angle(), 40f32.to_radians(), epsilon = 1e-6);
        assert_relative_eq!(
            limiter.turn_per_time_step(),
            320f32.to_radians() / 60.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn limits_are_copied_from_config() {
        let limits = RALLY_CAR.limits();
        assert_eq!(limits.max_forward_speed, 25.0);
        assert_eq!(limits.max_backward_speed, -8.0);
        assert_eq!(limits.lock_angle, RALLY_CAR.lock_angle);
    }

    #[test]
    fn anchors_are_mirrored() {
        let [fr, fl] = RALLY_CAR.front_anchors;
        let [rl, rr] = RALLY_CAR.rear_anchors;
        assert_eq!(fr[0], -fl[0]);
        assert_eq!(rl[0], -rr[0]);
        assert!(fr[1] > rl[1], "front axle sits ahead of the rear axle");
    }
}
