// ==============================================================================
// traction.rs — GROUND ZONES + PER-WHEEL TRACTION TRACKING
// ------------------------------------------------------------------------------
// A wheel keeps the set of ground zones it currently overlaps. Every add/remove
// recomputes one traction scalar in [0, 1]:
//
//   no zones      -> 1.0 (open road)
//   one or more   -> combine friction modifiers with TRACTION_RULE
//
// Zones are owned by the level. A wheel only copies the zone record while the
// contact is alive, keyed by ZoneId so begin/end pairs match exactly.
// ==============================================================================

use std::collections::HashMap;

use rapier2d::prelude::Real;
use serde::{Deserialize, Serialize};

/// Index of a ground zone inside its level.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub usize);

/// Friction data of an area of the world.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundZone {
    /// Grip multiplier, (0, 1]; below 1 is ice, snow, gravel.
    pub friction_modifier: Real,
    #[serde(default)]
    pub out_of_course: bool,
}

/// How overlapping zones combine into one traction value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TractionRule {
    /// Highest modifier wins (least restrictive surface).
    MostGrip,
    /// Lowest modifier wins (worst surface dominates).
    LeastGrip,
}

/// Active combine rule. Flip here to change game feel; the tracker shape stays.
pub const TRACTION_RULE: TractionRule = TractionRule::MostGrip;

/// Traction on open road.
pub const FULL_TRACTION: Real = 1.0;

/// Combine a set of overlapping zones into one traction scalar.
pub fn combine_traction<'a, I>(zones: I, rule: TractionRule) -> Real
where
    I: IntoIterator<Item = &'a GroundZone>,
{
    let mut modifiers = zones.into_iter().map(|z| z.friction_modifier);

    let Some(first) = modifiers.next() else {
        return FULL_TRACTION;
    };

    let combined = match rule {
        TractionRule::MostGrip => modifiers.fold(first, Real::max),
        TractionRule::LeastGrip => modifiers.fold(first, Real::min),
    };

    combined.clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct TractionTracker {
    zones: HashMap<ZoneId, GroundZone>,
    traction: Real,
    rule: TractionRule,
}

impl Default for TractionTracker {
    fn default() -> Self {
        Self::new(TRACTION_RULE)
    }
}

impl TractionTracker {
    pub fn new(rule: TractionRule) -> Self {
        Self {
            zones: HashMap::new(),
            traction: FULL_TRACTION,
            rule,
        }
    }

    pub fn add_zone(&mut self, id: ZoneId, zone: GroundZone) {
        self.zones.insert(id, zone);
        self.recompute();
    }

    pub fn remove_zone(&mut self, id: ZoneId) {
        self.zones.remove(&id);
        self.recompute();
    }

    pub fn traction(&self) -> Real {
        self.traction
    }

    /// Free = no zone overlapping (full grip).
    #[cfg(test)]
    pub fn is_free(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn is_out_of_course(&self) -> bool {
        self.zones.values().any(|z| z.out_of_course)
    }

    fn recompute(&mut self) {
        self.traction = combine_traction(self.zones.values(), self.rule);
    }
}
