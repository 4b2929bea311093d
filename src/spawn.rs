use std::collections::HashMap;

use crate::level::SpawnPoint;

// ---------------------------------------------
// SPAWN RESULT RETURNED TO STATE + NET
// ---------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSlot {
    pub index: usize,
    pub point: SpawnPoint,
}

// ---------------------------------------------
// SPAWN MANAGER FOR THE LEVEL
// ---------------------------------------------
#[derive(Debug)]
pub struct SpawnManager {
    points: Vec<SpawnPoint>,

    /// How many live vehicles were placed on each spawn point
    occupancy: HashMap<usize, usize>,
}

impl SpawnManager {
    pub fn new(points: Vec<SpawnPoint>) -> Self {
        Self {
            points,
            occupancy: HashMap::new(),
        }
    }

    // ---------------------------------------------------------
    // Least-used spawn point, lowest index on ties
    // ---------------------------------------------------------
    fn choose_slot(&self) -> Option<usize> {
        (0..self.points.len()).min_by_key(|i| self.occupancy.get(i).copied().unwrap_or(0))
    }

    // ---------------------------------------------------------
    // Full allocation pipeline called from main.rs + net.rs
    // ---------------------------------------------------------
    pub fn allocate(&mut self) -> Option<SpawnSlot> {
        let index = self.choose_slot()?;
        *self.occupancy.entry(index).or_insert(0) += 1;

        Some(SpawnSlot {
            index,
            point: self.points[index],
        })
    }

    pub fn release(&mut self, index: usize) {
        if let Some(count) = self.occupancy.get_mut(&index) {
            *count = count.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<SpawnPoint> {
        (0..n)
            .map(|i| SpawnPoint { position: [i as f32 * 3.0, 0.0], angle: 0.0 })
            .collect()
    }

    #[test]
    fn fills_every_point_before_doubling_up() {
        let mut spawns = SpawnManager::new(points(3));
        let order: Vec<usize> = (0..6).map(|_| spawns.allocate().unwrap().index).collect();
        assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn released_slot_is_reused_first() {
        let mut spawns = SpawnManager::new(points(3));
        for _ in 0..3 {
            spawns.allocate();
        }
        spawns.release(1);
        assert_eq!(spawns.allocate().unwrap().index, 1);
    }

    #[test]
    fn no_points_means_no_spawn() {
        let mut spawns = SpawnManager::new(Vec::new());
        assert!(spawns.allocate().is_none());
    }
}
