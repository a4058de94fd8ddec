//! Uniform grid spatial hash over floor-plane bounding boxes
//!
//! Used as the broad phase of collision validation. A box is registered in
//! every cell it covers; queries deduplicate and then test the exact boxes.

use std::collections::{HashMap, HashSet};

use atrium_core::{Aabb2, EntityId, Vec2};

/// Grid cell coordinates
type Cell = (i64, i64);

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<EntityId>>,
    /// Box cache per entity
    bounds: HashMap<EntityId, Aabb2>,
}

impl SpatialGrid {
    pub const DEFAULT_CELL_SIZE: f32 = 2.0;

    /// Create an empty grid. Non-positive sizes fall back to the default.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("Invalid grid cell size {}, using {}", cell_size, Self::DEFAULT_CELL_SIZE);
            Self::DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            bounds: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, p: Vec2) -> Cell {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    fn cells_for(&self, aabb: &Aabb2) -> impl Iterator<Item = Cell> {
        let (min_x, min_y) = self.cell_of(aabb.min);
        let (max_x, max_y) = self.cell_of(aabb.max);
        (min_x..=max_x).flat_map(move |x| (min_y..=max_y).map(move |y| (x, y)))
    }

    /// Register `id`, replacing any previous box for it
    pub fn insert(&mut self, id: EntityId, aabb: Aabb2) {
        self.remove(&id);
        let cells: Vec<Cell> = self.cells_for(&aabb).collect();
        for cell in cells {
            self.cells.entry(cell).or_default().push(id.clone());
        }
        self.bounds.insert(id, aabb);
    }

    pub fn remove(&mut self, id: &EntityId) -> bool {
        let Some(aabb) = self.bounds.remove(id) else {
            return false;
        };
        let cells: Vec<Cell> = self.cells_for(&aabb).collect();
        for cell in cells {
            if let Some(ids) = self.cells.get_mut(&cell) {
                ids.retain(|e| e != id);
                if ids.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        true
    }

    /// Move `id` to a new box
    pub fn update(&mut self, id: EntityId, aabb: Aabb2) {
        self.insert(id, aabb);
    }

    /// Entities whose box strictly overlaps `rect`, each reported once
    pub fn query_rect(&self, rect: &Aabb2) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for cell in self.cells_for(rect) {
            let Some(ids) = self.cells.get(&cell) else {
                continue;
            };
            for id in ids {
                if !seen.insert(id) {
                    continue;
                }
                if self.bounds.get(id).is_some_and(|b| b.intersects(rect)) {
                    result.push(id.clone());
                }
            }
        }
        result
    }

    /// Entities whose box contains `point`
    pub fn query_point(&self, point: Vec2) -> Vec<EntityId> {
        self.cells
            .get(&self.cell_of(point))
            .into_iter()
            .flatten()
            .filter(|id| self.bounds.get(*id).is_some_and(|b| b.contains_point(point)))
            .cloned()
            .collect()
    }

    pub fn bounds(&self, id: &EntityId) -> Option<&Aabb2> {
        self.bounds.get(id)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.bounds.clear();
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELL_SIZE)
    }
}
