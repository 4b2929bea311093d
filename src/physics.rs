// src/physics.rs
// ==============================================================================
// PHYSICS WORLD — rapier2d host for vehicles, ground zones and contact routing
// ------------------------------------------------------------------------------
// One tick (step):
// 1) drain the contact queue -> route Tire x GroundZone pairs to traction
// 2) per vehicle: policy -> limiter -> joints -> tire solve -> bodies
// 3) rapier pipeline step (collision events land in the queue, not in wheels)
// 4) runaway guard: non-finite or far-out bodies go back to their spawn
//
// Because step 1 happens before any force is computed, every wheel sees one
// consistent set of zones for the whole tick.
// ==============================================================================

use std::collections::HashMap;

use rapier2d::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};
use crate::level::{Level, SpawnPoint, ZoneShape};
use crate::policy::{InputSnapshot, SteeringPolicy};
use crate::tire::traction::{GroundZone, TractionTracker, ZoneId};
use crate::tire::{TireConfig, WheelId};
use crate::vehicle::{Vehicle, VehicleConfig, VehicleSnapshot, Wheel};

const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0001);
const GROUP_TIRE: Group    = Group::from_bits_truncate(0b0010);
const GROUP_ZONE: Group    = Group::from_bits_truncate(0b0100);

/// Longest step the pipeline is ever asked to integrate.
pub const MAX_STEP: Real = 1.0 / 30.0;

fn chassis_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_CHASSIS, GROUP_CHASSIS | GROUP_TIRE)
}

fn tire_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_TIRE, GROUP_CHASSIS | GROUP_TIRE | GROUP_ZONE)
}

fn zone_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_ZONE, GROUP_TIRE)
}

// --------------------------------------------------
// Contact queue (engine callback -> next tick)
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub collider1: ColliderHandle,
    pub collider2: ColliderHandle,
    pub began: bool,
}

/// Event handler handed to the pipeline. It only records; routing happens
/// when the world drains the receiving end.
pub struct ContactQueue {
    tx: UnboundedSender<ContactEvent>,
}

impl ContactQueue {
    pub fn channel() -> (Self, UnboundedReceiver<ContactEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventHandler for ContactQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let record = ContactEvent {
            collider1: event.collider1(),
            collider2: event.collider2(),
            began: event.started(),
        };
        // receiver is owned by the same world
        let _ = self.tx.send(record);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

// --------------------------------------------------
// Surface tags (what a collider is, for routing)
// --------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WheelRef {
    pub vehicle: String,
    pub wheel: WheelId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    Tire(WheelRef),
    GroundZone(ZoneId),
}

/// Only a tire touching a ground zone (either order) is routed.
pub fn classify<'a>(a: Option<&'a Surface>, b: Option<&'a Surface>) -> Option<(&'a WheelRef, ZoneId)> {
    match (a?, b?) {
        (Surface::Tire(wheel), Surface::GroundZone(zone))
        | (Surface::GroundZone(zone), Surface::Tire(wheel)) => Some((wheel, *zone)),
        _ => None,
    }
}

pub struct PhysicsWorld {
    pub gravity: Vector<Real>,                 // zero, top-down
    pub pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub joints: ImpulseJointSet,               // chassis <-> wheel revolutes
    pub multibody_joints: MultibodyJointSet,
    pub ccd: CCDSolver,

    pub zones: Vec<GroundZone>,                // ZoneId -> zone data
    pub surfaces: HashMap<ColliderHandle, Surface>,
    pub vehicles: HashMap<String, Vehicle>,    // vehicle id -> vehicle
    pub bounds: Real,

    contact_queue: ContactQueue,
    contacts: UnboundedReceiver<ContactEvent>,
}

fn zone_collider(shape: &ZoneShape) -> ColliderBuilder {
    match *shape {
        ZoneShape::Circle { center, radius } => {
            ColliderBuilder::ball(radius).translation(vector![center[0], center[1]])
        }
        ZoneShape::Rect { center, half_extents, angle } => {
            ColliderBuilder::cuboid(half_extents[0], half_extents[1])
                .position(Isometry::new(vector![center[0], center[1]], angle))
        }
    }
}

impl PhysicsWorld {
    pub fn new(level: &Level) -> Result<Self> {
        level.validate()?;

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut surfaces = HashMap::new();

        let ground = bodies.insert(RigidBodyBuilder::fixed().build());

        let mut zones = Vec::with_capacity(level.zones.len());
        for (index, spec) in level.zones.iter().enumerate() {
            let collider = zone_collider(&spec.shape)
                .sensor(true)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .collision_groups(zone_groups())
                .build();

            let handle = colliders.insert_with_parent(collider, ground, &mut bodies);
            surfaces.insert(handle, Surface::GroundZone(ZoneId(index)));
            zones.push(spec.zone);
        }

        info!(zones = zones.len(), bounds = level.bounds, "physics world ready");

        let (contact_queue, contacts) = ContactQueue::channel();

        Ok(Self {
            gravity: vector![0.0, 0.0],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            zones,
            surfaces,
            vehicles: HashMap::new(),
            bounds: level.bounds,
            contact_queue,
            contacts,
        })
    }

    #[cfg(test)]
    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Chassis and four wheels are created together; nothing is inserted if
    /// the chassis hull is rejected.
    pub fn spawn_vehicle(
        &mut self,
        id: &str,
        config: VehicleConfig,
        spawn: SpawnPoint,
        policy: SteeringPolicy,
    ) -> Result<()> {
        let hull = chassis_hull(&config)?;
        self.remove_vehicle(id);

        let [x, y] = spawn.position;
        let pose = Isometry::new(vector![x, y], spawn.angle);

        let body = self.bodies.insert(RigidBodyBuilder::dynamic().position(pose).build());
        let collider = self.colliders.insert_with_parent(
            hull.density(config.chassis_density)
                .collision_groups(chassis_groups())
                .build(),
            body,
            &mut self.bodies,
        );

        let [fr, fl] = config.front_anchors;
        let [rl, rr] = config.rear_anchors;
        let front = [
            self.attach_wheel(id, body, &pose, &config, WheelId::FR, fr, config.front_tire),
            self.attach_wheel(id, body, &pose, &config, WheelId::FL, fl, config.front_tire),
        ];
        let rear = [
            self.attach_wheel(id, body, &pose, &config, WheelId::RL, rl, config.rear_tire),
            self.attach_wheel(id, body, &pose, &config, WheelId::RR, rr, config.rear_tire),
        ];

        info!(vehicle = %id, driver = ?policy.kind(), x, y, "vehicle spawned");

        self.vehicles.insert(
            id.to_owned(),
            Vehicle {
                id: id.to_owned(),
                body,
                collider,
                front,
                rear,
                config,
                limiter: config.steering_limiter(),
                policy,
                input: InputSnapshot::default(),
                spawn,
            },
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn attach_wheel(
        &mut self,
        vehicle: &str,
        chassis: RigidBodyHandle,
        chassis_pose: &Isometry<Real>,
        config: &VehicleConfig,
        wheel: WheelId,
        anchor: [Real; 2],
        tire: TireConfig,
    ) -> Wheel {
        let anchor = point![anchor[0], anchor[1]];
        let at = chassis_pose.transform_point(&anchor);

        let body = self.bodies.insert(
            RigidBodyBuilder::dynamic()
                .position(Isometry::new(at.coords, chassis_pose.rotation.angle()))
                .build(),
        );

        let [hx, hy] = config.wheel_half_extents;
        let border = config.wheel_border_radius.min(hx).min(hy).max(0.0);
        let collider = self.colliders.insert_with_parent(
            ColliderBuilder::round_cuboid(hx - border, hy - border, border)
                .density(config.wheel_density)
                .collision_groups(tire_groups())
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            body,
            &mut self.bodies,
        );

        let joint = RevoluteJointBuilder::new()
            .local_anchor1(anchor)
            .local_anchor2(Point::origin())
            .limits([0.0, 0.0])
            .contacts_enabled(false)
            .build();
        let joint = self.joints.insert(chassis, body, joint, true);

        self.surfaces.insert(
            collider,
            Surface::Tire(WheelRef { vehicle: vehicle.to_owned(), wheel }),
        );

        Wheel {
            id: wheel,
            body,
            collider,
            joint,
            anchor,
            config: tire,
            traction: TractionTracker::default(),
        }
    }

    /// Remove chassis, wheels, colliders and joints. Returns false if unknown.
    pub fn remove_vehicle(&mut self, id: &str) -> bool {
        let Some(vehicle) = self.vehicles.remove(id) else {
            return false;
        };

        let handles = std::iter::once((vehicle.body, vehicle.collider))
            .chain(vehicle.wheels().map(|w| (w.body, w.collider)));

        for (body, collider) in handles {
            self.surfaces.remove(&collider);
            self.bodies.remove(
                body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.joints,
                &mut self.multibody_joints,
                true,
            );
        }

        info!(vehicle = %id, "vehicle removed");
        true
    }

    pub fn set_input(&mut self, id: &str, input: InputSnapshot) -> bool {
        match self.vehicles.get_mut(id) {
            Some(v) => {
                v.input = input;
                true
            }
            None => false,
        }
    }

    /// Apply one begin/end record. Anything but Tire x GroundZone is ignored.
    pub fn route_contact(&mut self, event: ContactEvent) {
        let Some((wheel_ref, zone_id)) = classify(
            self.surfaces.get(&event.collider1),
            self.surfaces.get(&event.collider2),
        ) else {
            return;
        };

        let Some(zone) = self.zones.get(zone_id.0).copied() else {
            return;
        };
        let Some(wheel) = self
            .vehicles
            .get_mut(&wheel_ref.vehicle)
            .and_then(|v| v.wheel_mut(wheel_ref.wheel))
        else {
            return;
        };

        if event.began {
            wheel.traction.add_zone(zone_id, zone);
        } else {
            wheel.traction.remove_zone(zone_id);
        }

        debug!(
            vehicle = %wheel_ref.vehicle,
            wheel = %wheel_ref.wheel,
            zone = zone_id.0,
            began = event.began,
            traction = wheel.traction.traction(),
            "zone contact"
        );
    }

    /// Route every queued contact record. Returns how many were read.
    pub fn drain_contacts(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.contacts.try_recv() {
            self.route_contact(event);
            count += 1;
        }
        count
    }

    pub fn step(&mut self, dt: Real) {
        let dt = dt.min(MAX_STEP);
        if !(dt > 0.0) {
            return;
        }

        // 1) Contacts from the previous integration
        self.drain_contacts();

        // 2) Controls + tire forces
        for vehicle in self.vehicles.values_mut() {
            vehicle.update(&mut self.bodies, &mut self.joints);
        }

        // 3) Step physics.
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.contact_queue,
        );

        // 4) Safety: bring exploding vehicles back to their spawn
        self.guard_runaways();
    }

    fn guard_runaways(&mut self) {
        let bounds = self.bounds;
        let bad = |body: Option<&RigidBody>| {
            body.map(|b| {
                let p = b.translation();
                !p.x.is_finite() || !p.y.is_finite() || p.x.abs() > bounds || p.y.abs() > bounds
            })
            .unwrap_or(false)
        };

        for vehicle in self.vehicles.values_mut() {
            let runaway = std::iter::once(vehicle.body)
                .chain(vehicle.wheels().map(|w| w.body))
                .any(|h| bad(self.bodies.get(h)));

            if runaway {
                warn!(
                    vehicle = %vehicle.id,
                    spawn = ?vehicle.spawn.position,
                    "reset runaway vehicle to its spawn"
                );
                vehicle.reset_to_spawn(&mut self.bodies);
            }
        }
    }

    /// Vehicle snapshots ordered by id.
    pub fn snapshot(&self) -> Vec<VehicleSnapshot> {
        let mut out: Vec<VehicleSnapshot> = self
            .vehicles
            .values()
            .filter_map(|v| v.snapshot(&self.bodies))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

fn chassis_hull(config: &VehicleConfig) -> Result<ColliderBuilder> {
    let points: Vec<Point<Real>> = config
        .chassis_vertices
        .iter()
        .map(|[x, y]| point![*x, *y])
        .collect();

    if points.len() < 3 || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ConfigError::DegenerateChassis);
    }
    ColliderBuilder::convex_hull(&points).ok_or(ConfigError::DegenerateChassis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::ZoneSpec;
    use crate::policy::{ManualPolicy, PathFollowerPolicy};
    use crate::vehicle::RALLY_CAR;
    use approx::assert_relative_eq;

    const DT: Real = 1.0 / 60.0;

    fn open_level(zones: Vec<ZoneSpec>) -> Level {
        Level {
            zones,
            path: Some(vec![[0.0, 0.0], [0.0, 40.0], [20.0, 40.0]]),
            spawn_points: vec![SpawnPoint { position: [0.0, 0.0], angle: 0.0 }],
            slow_zone: None,
            bounds: 500.0,
        }
    }

    fn ice_under_origin() -> ZoneSpec {
        ZoneSpec {
            shape: ZoneShape::Circle { center: [0.0, 1.5], radius: 6.0 },
            zone: GroundZone { friction_modifier: 0.3, out_of_course: true },
        }
    }

    fn manual() -> SteeringPolicy {
        SteeringPolicy::Manual(ManualPolicy::new(RALLY_CAR.limits()))
    }

    fn world_with_car(zones: Vec<ZoneSpec>) -> PhysicsWorld {
        let level = open_level(zones);
        let mut world = PhysicsWorld::new(&level).unwrap();
        world
            .spawn_vehicle("car", RALLY_CAR, level.spawn_points[0], manual())
            .unwrap();
        world
    }

    #[test]
    fn classify_routes_only_tire_against_zone() {
        let tire = Surface::Tire(WheelRef { vehicle: "a".into(), wheel: WheelId::FL });
        let zone = Surface::GroundZone(ZoneId(2));

        assert_eq!(classify(Some(&tire), Some(&zone)).map(|(_, z)| z), Some(ZoneId(2)));
        assert_eq!(classify(Some(&zone), Some(&tire)).map(|(w, _)| w.wheel), Some(WheelId::FL));
        assert!(classify(Some(&tire), Some(&tire)).is_none());
        assert!(classify(Some(&zone), Some(&zone)).is_none());
        assert!(classify(Some(&tire), None).is_none());
        assert!(classify(None, None).is_none());
    }

    #[test]
    fn spawn_builds_chassis_four_wheels_and_joints() {
        let world = world_with_car(Vec::new());

        // ground + chassis + 4 wheels
        assert_eq!(world.bodies.len(), 6);
        assert_eq!(world.joints.len(), 4);

        let car = world.vehicle("car").unwrap();
        let ids: Vec<WheelId> = car.wheels().map(|w| w.id).collect();
        assert_eq!(ids, WheelId::ALL.to_vec());

        let tires = world.surfaces.values().filter(|s| matches!(s, Surface::Tire(_))).count();
        assert_eq!(tires, 4);

        let fr = world.bodies.get(car.front[0].body).unwrap().translation();
        assert_relative_eq!(fr.x, -0.5, epsilon = 1e-5);
        assert_relative_eq!(fr.y, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_chassis_is_rejected_before_anything_is_built() {
        let mut config = RALLY_CAR;
        config.chassis_vertices = &[[0.0, 0.0], [1.0, 0.0]];

        let level = open_level(Vec::new());
        let mut world = PhysicsWorld::new(&level).unwrap();
        let err = world.spawn_vehicle("bad", config, level.spawn_points[0], manual());

        assert!(matches!(err, Err(ConfigError::DegenerateChassis)));
        assert_eq!(world.bodies.len(), 1);
        assert!(world.vehicles.is_empty());
    }

    fn zone_collider_handle(world: &PhysicsWorld, id: ZoneId) -> ColliderHandle {
        world
            .surfaces
            .iter()
            .find_map(|(h, s)| (*s == Surface::GroundZone(id)).then_some(*h))
            .unwrap()
    }

    fn front_joint_limits(world: &PhysicsWorld) -> Vec<[Real; 2]> {
        world
            .vehicle("car")
            .unwrap()
            .front
            .iter()
            .map(|w| {
                let limits = world.joints.get(w.joint).unwrap().data.limits(JointAxis::AngX).unwrap();
                [limits.min, limits.max]
            })
            .collect()
    }

    #[test]
    fn held_left_key_reaches_lock_in_whole_ticks() {
        let mut world = world_with_car(Vec::new());
        world.set_input("car", InputSnapshot { left: true, ..InputSnapshot::default() });

        let lock = RALLY_CAR.lock_angle;
        let ticks = (lock / RALLY_CAR.turn_per_time_step()).ceil() as usize;

        for _ in 0..ticks - 1 {
            world.step(DT);
        }
        let before = world.vehicle("car").unwrap().limiter.angle();
        assert!(before < lock);
        // both front joints pinned at the same commanded angle
        assert_eq!(front_joint_limits(&world), vec![[before, before]; 2]);

        world.step(DT);
        let car = world.vehicle("car").unwrap();
        assert_relative_eq!(car.limiter.angle(), lock, epsilon = 1e-6);
        assert_eq!(front_joint_limits(&world), vec![[car.limiter.angle(); 2]; 2]);

        // stays pinned there
        for _ in 0..20 {
            world.step(DT);
        }
        let car = world.vehicle("car").unwrap();
        assert_relative_eq!(car.limiter.angle(), lock, epsilon = 1e-6);

        let measured = car.measured_steer_angle(&world.bodies).unwrap();
        assert_relative_eq!(measured, lock, epsilon = 0.02);
    }

    #[test]
    fn shoved_front_wheel_is_repinned_at_commanded_angle() {
        let mut world = world_with_car(Vec::new());
        for _ in 0..5 {
            world.step(DT);
        }

        let wheel = world.vehicle("car").unwrap().front[0].body;
        world.bodies.get_mut(wheel).unwrap().set_angvel(20.0, true);
        world.step(DT);

        // the limiter keeps its own commanded angle and rewrites it
        let car = world.vehicle("car").unwrap();
        assert_eq!(car.limiter.angle(), 0.0);
        assert_eq!(front_joint_limits(&world), vec![[0.0, 0.0]; 2]);

        for _ in 0..30 {
            world.step(DT);
        }
        let car = world.vehicle("car").unwrap();
        let measured = car.measured_steer_angle(&world.bodies).unwrap();
        assert!(measured.abs() < 0.05, "measured = {measured}");
    }

    #[test]
    fn left_key_turns_counter_clockwise() {
        let mut world = world_with_car(Vec::new());
        world.set_input(
            "car",
            InputSnapshot { left: true, forward: true, ..InputSnapshot::default() },
        );
        for _ in 0..30 {
            world.step(DT);
        }

        let car = world.vehicle("car").unwrap();
        let heading = world.bodies.get(car.body).unwrap().rotation().angle();
        assert!(heading > 0.1, "heading = {heading}");
    }

    #[test]
    fn rear_joints_stay_pinned_straight() {
        let mut world = world_with_car(Vec::new());
        world.set_input("car", InputSnapshot { right: true, ..InputSnapshot::default() });
        for _ in 0..20 {
            world.step(DT);
        }

        let car = world.vehicle("car").unwrap();
        for wheel in &car.rear {
            let limits = world.joints.get(wheel.joint).unwrap().data.limits(JointAxis::AngX).unwrap();
            assert_eq!([limits.min, limits.max], [0.0, 0.0]);
        }
        assert_relative_eq!(car.limiter.angle(), -RALLY_CAR.lock_angle, epsilon = 1e-6);
    }

    #[test]
    fn throttle_moves_car_forward() {
        let mut world = world_with_car(Vec::new());
        world.set_input("car", InputSnapshot { forward: true, ..InputSnapshot::default() });

        for _ in 0..60 {
            world.step(DT);
        }

        let car = world.vehicle("car").unwrap();
        let chassis = world.bodies.get(car.body).unwrap();
        assert!(chassis.linvel().y > 1.0, "linvel = {:?}", chassis.linvel());
        assert!(chassis.translation().y > 0.5);
    }

    #[test]
    fn sensor_contact_sets_wheel_traction() {
        let mut world = world_with_car(vec![ice_under_origin()]);

        for _ in 0..3 {
            world.step(DT);
        }
        world.drain_contacts();

        let car = world.vehicle("car").unwrap();
        for wheel in car.wheels() {
            assert_relative_eq!(wheel.traction.traction(), 0.3);
        }
        assert!(car.is_out_of_course());

        let snapshot = world.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].out_of_course);
        assert_eq!(snapshot[0].waypoint, None);
        assert!(snapshot[0].wheels.iter().all(|w| w.zones == 1));
    }

    #[test]
    fn begin_and_end_records_are_routed_and_others_ignored() {
        let mut world = world_with_car(vec![ice_under_origin()]);
        let zone = zone_collider_handle(&world, ZoneId(0));
        let (tire, chassis) = {
            let car = world.vehicle("car").unwrap();
            (car.rear[1].collider, car.collider)
        };

        world.route_contact(ContactEvent { collider1: zone, collider2: tire, began: true });
        let traction = |w: &PhysicsWorld| w.vehicle("car").unwrap().rear[1].traction.traction();
        assert_relative_eq!(traction(&world), 0.3);

        // chassis x zone is not a tire contact
        world.route_contact(ContactEvent { collider1: chassis, collider2: zone, began: false });
        assert_relative_eq!(traction(&world), 0.3);

        world.route_contact(ContactEvent { collider1: tire, collider2: zone, began: false });
        assert_relative_eq!(traction(&world), 1.0);
    }

    #[test]
    fn removed_vehicle_leaves_nothing_behind() {
        let mut world = world_with_car(vec![ice_under_origin()]);
        let tire = world.vehicle("car").unwrap().front[0].collider;

        assert!(world.remove_vehicle("car"));
        assert!(!world.remove_vehicle("car"));
        assert_eq!(world.bodies.len(), 1);
        assert_eq!(world.joints.len(), 0);
        assert_eq!(world.surfaces.len(), 1);

        // stale records for the removed tire are a no-op
        let zone = zone_collider_handle(&world, ZoneId(0));
        world.route_contact(ContactEvent { collider1: tire, collider2: zone, began: true });
        world.step(DT);
    }

    #[test]
    fn path_follower_advances_past_its_spawn_waypoint() {
        let level = open_level(Vec::new());
        let mut world = PhysicsWorld::new(&level).unwrap();
        let policy = SteeringPolicy::PathFollower(PathFollowerPolicy::new(
            level.path().unwrap(),
            RALLY_CAR.limits(),
            None,
        ));
        world.spawn_vehicle("ai", RALLY_CAR, level.spawn_points[0], policy).unwrap();

        world.step(DT);

        match &world.vehicle("ai").unwrap().policy {
            SteeringPolicy::PathFollower(p) => assert_eq!(p.waypoint(), 1),
            SteeringPolicy::Manual(_) => unreachable!(),
        }
        assert_eq!(world.snapshot()[0].waypoint, Some(1));
    }

    #[test]
    fn runaway_vehicle_is_reset_to_spawn() {
        let mut world = world_with_car(Vec::new());
        let body = world.vehicle("car").unwrap().body;
        world.bodies.get_mut(body).unwrap().set_translation(vector![5_000.0, 0.0], true);

        world.step(DT);

        let p = world.bodies.get(body).unwrap().translation();
        assert!(p.x.abs() < 1.0 && p.y.abs() < 1.0, "chassis at {:?}", p);
    }

    #[test]
    fn oversized_dt_is_clamped() {
        let mut world = world_with_car(Vec::new());
        world.set_input("car", InputSnapshot { forward: true, ..InputSnapshot::default() });
        world.step(10.0);

        let car = world.vehicle("car").unwrap();
        let y = world.bodies.get(car.body).unwrap().translation().y;
        assert!(y.is_finite() && y.abs() < 1.0);
    }
}
