// ==============================================================================
// kinematics.rs — WHEEL BASIS + VELOCITY DECOMPOSITION (WORLD SPACE)
// ------------------------------------------------------------------------------
// This module converts a body orientation into the wheel's world basis:
// - forward: wheel rolling direction (local +Y)
// - right:   lateral direction (local +X)
//
// lateral_velocity / forward_velocity:
// - Project the body velocity onto right/forward and return the projected
//   VECTOR (not the scalar), which is what the friction model cancels.
//
// These values feed friction.rs (grip + drag) and drive.rs (speed governor).
// ==============================================================================

use rapier2d::prelude::{Real, Rotation, Vector};

/// Returns (forward, right) in world space for a body with the given rotation.
#[inline]
pub fn wheel_basis_world(rot: &Rotation<Real>) -> (Vector<Real>, Vector<Real>) {
    let forward = rot * Vector::new(0.0, 1.0);
    let right = rot * Vector::new(1.0, 0.0);
    (forward, right)
}

/// Velocity component along `right`, as a world vector.
#[inline]
pub fn lateral_velocity(linvel: Vector<Real>, right: Vector<Real>) -> Vector<Real> {
    right * right.dot(&linvel)
}

/// Velocity component along `forward`, as a world vector.
#[inline]
pub fn forward_velocity(linvel: Vector<Real>, forward: Vector<Real>) -> Vector<Real> {
    forward * forward.dot(&linvel)
}

/// Signed forward speed (m/s along `forward`).
#[inline]
pub fn forward_speed(linvel: Vector<Real>, forward: Vector<Real>) -> Real {
    forward.dot(&linvel)
}

/// 2D scalar cross product (z component of the 3D cross).
#[inline]
pub fn cross2(a: Vector<Real>, b: Vector<Real>) -> Real {
    a.x * b.y - a.y * b.x
}

/// Signed angle that rotates `from` onto `to`, CCW positive, in (-π, π].
#[inline]
pub fn signed_angle(from: Vector<Real>, to: Vector<Real>) -> Real {
    cross2(from, to).atan2(from.dot(&to))
}

/// Wrap an angle into (-π, π].
#[inline]
pub fn wrap_angle(a: Real) -> Real {
    let s = a.sin();
    let c = a.cos();
    s.atan2(c)
}
