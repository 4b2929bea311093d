//! tire - engine-agnostic arcade tire helpers (pure types + solver)

pub mod types;
pub mod kinematics;
pub mod traction;
pub mod friction;
pub mod drive;
pub mod steering;
pub mod solve;

pub use types::*;
pub use solve::solve_wheel;
