//! Core shared types for `tire` (engine-agnostic).
// tire/types.rs
use std::fmt;
use rapier2d::prelude::{Real, Vector};

/// Below this length a vector is treated as zero and never normalized.
pub const MIN_NORMALIZE_LEN: Real = 1e-6;

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WheelId { FL, FR, RL, RR }

impl WheelId {
    /// Wheels in construction order: front pair (index 0/1), then rear pair.
    #[cfg(test)]
    pub const ALL: [WheelId; 4] = [WheelId::FR, WheelId::FL, WheelId::RL, WheelId::RR];

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// ----- per-wheel tunables -------------------
// ============================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireConfig {
    pub drag_force_multiplier: Real, // N, constant-magnitude rolling drag
    pub max_drive_force: Real,       // N, bang-bang drive magnitude
    pub max_lateral_impulse: Real,   // N*s, grip budget per tick
}

// ============================================
// ----- kinematic snapshot (read from engine) -
// ============================================

/// Everything the tire model needs from the wheel body for one tick.
#[derive(Debug, Clone, Copy)]
pub struct WheelKinematics {
    pub mass: Real,
    pub inertia: Real,

    pub linvel: Vector<Real>, // world
    pub angvel: Real,         // rad/s, CCW positive

    pub forward: Vector<Real>, // unit, world (local +Y)
    pub right: Vector<Real>,   // unit, world (local +X)
}

// ============================================
// ----- outputs ------------------------------
// ============================================

/// Impulses and forces for one wheel, all applied at the wheel's center of mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TireImpulses {
    /// Linear impulse (N*s), lateral grip.
    pub lateral_impulse: Vector<Real>,
    /// Angular impulse (N*m*s), spin damping.
    pub angular_impulse: Real,
    /// Force (N) held for the tick: rolling drag plus drive.
    pub force: Vector<Real>,
}

impl Default for TireImpulses {
    fn default() -> Self {
        Self {
            lateral_impulse: Vector::zeros(),
            angular_impulse: 0.0,
            force: Vector::zeros(),
        }
    }
}
