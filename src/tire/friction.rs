// ==============================================================================
// friction.rs — ARCADE TIRE GRIP (IMPULSE DOMAIN)
// ==============================================================================
// Per wheel, per tick:
// 1) Lateral impulse cancels sideways slip:  J = m * -v_lat
//    |J| is capped at max_lateral_impulse (finite grip, lets the car drift).
// 2) Angular impulse damps spin:             L = 0.1 * I * -ω
// 3) Rolling drag along the heading:         F = -drag * heading
//    heading = v_fwd, normalized only when |v_fwd| > 1 (no blow-up near rest).
//
// Everything is scaled by traction. traction == 0 is a pure ballistic slide.
// ------------------------------------------------------------------------------
// This file does NOT apply anything; solve.rs adds the drive force and
// vehicle.rs hands the result to the engine.
// ==============================================================================

use rapier2d::prelude::{Real, Vector};

use crate::tire::kinematics::{forward_velocity, lateral_velocity};
use crate::tire::types::{TireConfig, WheelKinematics, MIN_NORMALIZE_LEN};

/// Fraction of the spin cancelled per tick.
pub const ANGULAR_DAMPING: Real = 0.1;

/// Above this forward speed the drag heading is normalized to unit length.
pub const DRAG_NORMALIZE_SPEED: Real = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionOutput {
    pub lateral_impulse: Vector<Real>,
    pub angular_impulse: Real,
    pub drag_force: Vector<Real>,
}

/// Uniformly rescale `v` so that |v| <= max.
#[inline]
pub fn clamp_magnitude(v: Vector<Real>, max: Real) -> Vector<Real> {
    let len = v.norm();
    if len > max && len > MIN_NORMALIZE_LEN {
        v * (max / len)
    } else {
        v
    }
}

/// Lateral grip impulse before traction scaling.
#[inline]
pub fn lateral_impulse(kin: &WheelKinematics, max_lateral_impulse: Real) -> Vector<Real> {
    let impulse = -lateral_velocity(kin.linvel, kin.right) * kin.mass;
    clamp_magnitude(impulse, max_lateral_impulse.max(0.0))
}

/// Direction the drag acts against.
#[inline]
pub fn drag_heading(kin: &WheelKinematics) -> Vector<Real> {
    let v_fwd = forward_velocity(kin.linvel, kin.forward);
    let speed = v_fwd.norm();
    if speed > DRAG_NORMALIZE_SPEED {
        v_fwd / speed
    } else {
        v_fwd
    }
}

pub fn solve_friction(cfg: &TireConfig, kin: &WheelKinematics, traction: Real) -> FrictionOutput {
    let traction = traction.clamp(0.0, 1.0);

    let lateral = lateral_impulse(kin, cfg.max_lateral_impulse) * traction;
    let angular = traction * ANGULAR_DAMPING * kin.inertia * -kin.angvel;
    let drag = drag_heading(kin) * (traction * -cfg.drag_force_multiplier);

    FrictionOutput {
        lateral_impulse: lateral,
        angular_impulse: angular,
        drag_force: drag,
    }
}
