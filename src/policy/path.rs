//! Closed polyline of waypoints, read-only once built.

use rapier2d::prelude::{Point, Real};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<Point<Real>>,
}

impl Path {
    /// Fails on an empty or non-finite point list.
    pub fn new(nodes: Vec<Point<Real>>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if let Some(index) = nodes.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(ConfigError::NonFiniteWaypoint { index });
        }
        Ok(Self { nodes })
    }

    pub fn from_xy(points: &[[Real; 2]]) -> Result<Self> {
        Self::new(points.iter().map(|&[x, y]| Point::new(x, y)).collect())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Waypoint `index`, wrapping past the last one.
    pub fn node(&self, index: usize) -> Point<Real> {
        self.nodes[index % self.nodes.len()]
    }

    /// Index that follows `index` on the closed loop.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.nodes.len()
    }
}
