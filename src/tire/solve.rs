// ==============================================================================
// solve.rs — PER-WHEEL TICK (FRICTION + DRIVE)
// ==============================================================================
// Combines, for one wheel:
// - grip, spin damping and rolling drag from friction.rs (traction-scaled)
// - the bang-bang drive force from drive.rs
//
// Outputs one TireImpulses record consumed by vehicle.rs, which applies:
// - apply_impulse()        lateral grip at the wheel center of mass
// - apply_torque_impulse() spin damping
// - add_force()            drag + drive, held for the tick
// ==============================================================================

use rapier2d::prelude::Real;

use crate::tire::drive::solve_drive;
use crate::tire::friction::solve_friction;
use crate::tire::kinematics::forward_speed;
use crate::tire::types::{TireConfig, TireImpulses, WheelKinematics};

pub fn solve_wheel(
    cfg: &TireConfig,
    kin: &WheelKinematics,
    traction: Real,
    desired_speed: Real,
) -> TireImpulses {
    let friction = solve_friction(cfg, kin, traction);

    let current_speed = forward_speed(kin.linvel, kin.forward);
    let drive = solve_drive(desired_speed, current_speed, cfg.max_drive_force, kin.forward);

    TireImpulses {
        lateral_impulse: friction.lateral_impulse,
        angular_impulse: friction.angular_impulse,
        force: friction.drag_force + drive,
    }
}
