// ==============================================================================
// drive.rs — BANG-BANG LONGITUDINAL DRIVE (SPEED GOVERNOR)
// ==============================================================================
// Compares the policy's desired speed to the wheel's current forward speed and
// pushes with a FIXED magnitude:
//
//   desired > current  -> +max_drive_force along forward
//   desired < current  -> -max_drive_force along forward
//   desired == current -> nothing
//
// It oscillates around the target; that is the arcade feel we want.
// A desired speed of exactly 0 is "no throttle command": the wheel coasts and
// only rolling drag slows it down.
// ==============================================================================

use rapier2d::prelude::{Real, Vector};

/// What the governor decided this tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DriveCommand {
    Accelerate,
    Brake,
    Hold,
    Coast,
}

pub fn drive_command(desired_speed: Real, current_speed: Real) -> DriveCommand {
    if desired_speed == 0.0 {
        DriveCommand::Coast
    } else if desired_speed > current_speed {
        DriveCommand::Accelerate
    } else if desired_speed < current_speed {
        DriveCommand::Brake
    } else {
        DriveCommand::Hold
    }
}

/// Drive force for one wheel (world space).
pub fn solve_drive(
    desired_speed: Real,
    current_speed: Real,
    max_drive_force: Real,
    forward: Vector<Real>,
) -> Vector<Real> {
    match drive_command(desired_speed, current_speed) {
        DriveCommand::Accelerate => forward * max_drive_force,
        DriveCommand::Brake => forward * -max_drive_force,
        DriveCommand::Hold | DriveCommand::Coast => Vector::zeros(),
    }
}
