// ==============================================================================
// level.rs — LEVEL DESCRIPTION (ZONES, PATH, SPAWNS)
// ------------------------------------------------------------------------------
// A level is plain data, loaded once and never mutated:
// - ground zones: sensor areas with a friction modifier (+ out-of-course flag)
// - path: closed polyline followed by AI drivers (optional)
// - spawn points: where vehicles are placed
// - slow zone: fixed area where AI drivers ease off (optional)
//
// validate() rejects data the tire model cannot honor (friction outside
// (0, 1], degenerate shapes, no spawn point). Path problems surface only when
// a path follower asks for it.
// ==============================================================================

use std::path::Path as FsPath;
use std::sync::Arc;

use rapier2d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::policy::{Path, SlowZone};
use crate::tire::traction::GroundZone;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneShape {
    Circle {
        center: [Real; 2],
        radius: Real,
    },
    Rect {
        center: [Real; 2],
        half_extents: [Real; 2],
        #[serde(default)]
        angle: Real,
    },
}

impl ZoneShape {
    fn is_valid(&self) -> bool {
        match *self {
            ZoneShape::Circle { center, radius } => {
                center.iter().all(|c| c.is_finite()) && radius.is_finite() && radius > 0.0
            }
            ZoneShape::Rect { center, half_extents, angle } => {
                center.iter().all(|c| c.is_finite())
                    && half_extents.iter().all(|h| h.is_finite() && *h > 0.0)
                    && angle.is_finite()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub shape: ZoneShape,
    #[serde(flatten)]
    pub zone: GroundZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: [Real; 2],
    /// Heading in radians; 0 faces +Y.
    #[serde(default)]
    pub angle: Real,
}

impl SpawnPoint {
    fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.angle.is_finite()
    }
}

fn default_bounds() -> Real {
    500.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub path: Option<Vec<[Real; 2]>>,
    pub spawn_points: Vec<SpawnPoint>,
    #[serde(default)]
    pub slow_zone: Option<SlowZone>,
    /// Bodies further than this from the origin are reset to their spawn.
    #[serde(default = "default_bounds")]
    pub bounds: Real,
}

impl Level {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn load(path: &FsPath) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::LevelIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        for (index, spec) in self.zones.iter().enumerate() {
            let value = spec.zone.friction_modifier;
            if !(value.is_finite() && value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidFrictionModifier { index, value });
            }
            if !spec.shape.is_valid() {
                return Err(ConfigError::InvalidZoneShape { index });
            }
        }
        if self.spawn_points.is_empty() {
            return Err(ConfigError::NoSpawnPoints);
        }
        if let Some(index) = self.spawn_points.iter().position(|s| !s.is_finite()) {
            return Err(ConfigError::InvalidSpawnPoint { index });
        }
        if !(self.bounds.is_finite() && self.bounds > 0.0) {
            return Err(ConfigError::InvalidBounds { value: self.bounds });
        }
        Ok(())
    }

    /// The AI path. Fails if the level has none or it is empty.
    pub fn path(&self) -> Result<Arc<Path>> {
        let points = self.path.as_deref().ok_or(ConfigError::MissingPath)?;
        Ok(Arc::new(Path::from_xy(points)?))
    }

    /// Built-in oval: ice patch on the left straight, snow at the top hairpin,
    /// out-of-course grass in the infield and a slow zone on the right straight.
    pub fn default_track() -> Self {
        Self {
            zones: vec![
                ZoneSpec {
                    shape: ZoneShape::Circle { center: [0.0, 20.0], radius: 3.0 },
                    zone: GroundZone { friction_modifier: 0.2, out_of_course: false },
                },
                ZoneSpec {
                    shape: ZoneShape::Rect { center: [20.0, 50.0], half_extents: [4.0, 3.0], angle: 0.0 },
                    zone: GroundZone { friction_modifier: 0.6, out_of_course: false },
                },
                ZoneSpec {
                    shape: ZoneShape::Rect { center: [20.0, 20.0], half_extents: [12.0, 22.0], angle: 0.0 },
                    zone: GroundZone { friction_modifier: 0.5, out_of_course: true },
                },
            ],
            path: Some(vec![
                [0.0, 0.0],
                [0.0, 40.0],
                [10.0, 50.0],
                [30.0, 50.0],
                [40.0, 40.0],
                [40.0, 0.0],
                [30.0, -10.0],
                [10.0, -10.0],
            ]),
            spawn_points: vec![
                SpawnPoint { position: [0.0, -6.0], angle: 0.0 },
                SpawnPoint { position: [-3.0, -9.0], angle: 0.0 },
                SpawnPoint { position: [3.0, -9.0], angle: 0.0 },
                SpawnPoint { position: [0.0, -12.0], angle: 0.0 },
            ],
            slow_zone: Some(SlowZone { center: [40.0, 20.0], radius: 6.0 }),
            bounds: default_bounds(),
        }
    }
}
