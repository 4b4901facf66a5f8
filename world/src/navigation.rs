//! Grid A* search used to route units toward their targets.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, VecDeque},
};

use arena_clash_core::{
    arena::{COLUMNS, ROWS},
    CellCoord, CellPoint,
};

use crate::grid::Grid;

/// Upper bound on node expansions before the search gives up.
pub const MAX_EXPANSIONS: usize = 1_000;

/// Paths remembered by a [`PathCache`] before the oldest is evicted.
pub const PATH_CACHE_CAPACITY: usize = 500;

const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Computes a waypoint path between two points.
///
/// Both endpoints are clamped into the arena and rounded to the nearest tile
/// before searching. The search moves in eight directions, never enters an
/// unwalkable tile and never cuts the corner of one. The returned waypoints
/// are tile centres from the start tile to the goal tile inclusive. When the
/// goal cannot be reached within [`MAX_EXPANSIONS`] the direct two-point path
/// `[start, goal]` is returned instead.
#[must_use]
pub fn find_path(grid: &Grid, start: CellPoint, goal: CellPoint) -> Vec<CellPoint> {
    let start = clamp_to_arena(start);
    let goal = clamp_to_arena(goal);
    search(grid, start, goal).unwrap_or_else(|| direct_path(start, goal))
}

/// First-in first-out memo of found paths keyed by start and goal tile.
///
/// Only paths the search actually found are remembered; fallbacks are
/// recomputed on every request. The cache knows nothing about the grid, so
/// its owner must [`PathCache::clear`] it whenever walkability changes.
#[derive(Clone, Debug, Default)]
pub struct PathCache {
    pub(crate) paths: HashMap<(CellCoord, CellCoord), Vec<CellPoint>>,
    insertion_order: VecDeque<(CellCoord, CellCoord)>,
}

impl PathCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same contract as [`find_path`], answering repeated requests from memory.
    pub fn find_path(&mut self, grid: &Grid, start: CellPoint, goal: CellPoint) -> Vec<CellPoint> {
        let key = (clamp_to_arena(start), clamp_to_arena(goal));
        if let Some(path) = self.paths.get(&key) {
            return path.clone();
        }

        let Some(path) = search(grid, key.0, key.1) else {
            return direct_path(key.0, key.1);
        };
        if self.insertion_order.len() >= PATH_CACHE_CAPACITY {
            if let Some(oldest) = self.insertion_order.pop_front() {
                let _ = self.paths.remove(&oldest);
            }
        }
        self.insertion_order.push_back(key);
        let _ = self.paths.insert(key, path.clone());
        path
    }

    /// Forgets every remembered path.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.insertion_order.clear();
    }
}

fn direct_path(start: CellCoord, goal: CellCoord) -> Vec<CellPoint> {
    vec![start.center(), goal.center()]
}

fn search(grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<Vec<CellPoint>> {
    if start == goal {
        return Some(vec![start.center()]);
    }

    let cell_count = (COLUMNS * ROWS) as usize;
    let mut best_cost = vec![f32::INFINITY; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open = BinaryHeap::new();
    let mut order = 0_u32;

    best_cost[index(start)] = 0.0;
    open.push(OpenNode {
        estimate: heuristic(start, goal),
        order,
        cell: start,
    });

    let mut expansions = 0;
    while let Some(node) = open.pop() {
        let current = node.cell;
        let current_index = index(current);
        if closed[current_index] {
            continue;
        }
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        if expansions >= MAX_EXPANSIONS {
            break;
        }
        expansions += 1;
        closed[current_index] = true;

        for (neighbor, step_cost) in neighbors(grid, current) {
            let neighbor_index = index(neighbor);
            if closed[neighbor_index] {
                continue;
            }
            let tentative = best_cost[current_index] + step_cost;
            if tentative >= best_cost[neighbor_index] {
                continue;
            }
            best_cost[neighbor_index] = tentative;
            came_from[neighbor_index] = Some(current);
            order = order.wrapping_add(1);
            open.push(OpenNode {
                estimate: tentative + heuristic(neighbor, goal),
                order,
                cell: neighbor,
            });
        }
    }

    None
}

/// Rounds a point to its tile, clamping it into the arena first.
#[must_use]
pub fn clamp_to_arena(point: CellPoint) -> CellCoord {
    let clamp = |value: f32, upper: u32| -> u32 {
        if value.is_nan() {
            return 0;
        }
        value.round().clamp(0.0, (upper - 1) as f32) as u32
    };
    CellCoord::new(clamp(point.x(), COLUMNS), clamp(point.y(), ROWS))
}

fn heuristic(from: CellCoord, to: CellCoord) -> f32 {
    from.center().distance(to.center())
}

fn neighbors(grid: &Grid, cell: CellCoord) -> impl Iterator<Item = (CellCoord, f32)> + '_ {
    const OFFSETS: [(i32, i32); 8] = [
        (0, -1),
        (1, 0),
        (0, 1),
        (-1, 0),
        (1, -1),
        (1, 1),
        (-1, 1),
        (-1, -1),
    ];

    OFFSETS.into_iter().filter_map(move |(dx, dy)| {
        let neighbor = offset(cell, dx, dy)?;
        if !grid.is_walkable(neighbor) {
            return None;
        }
        if dx != 0 && dy != 0 {
            let horizontal = offset(cell, dx, 0)?;
            let vertical = offset(cell, 0, dy)?;
            if !grid.is_walkable(horizontal) || !grid.is_walkable(vertical) {
                return None;
            }
            return Some((neighbor, DIAGONAL_COST));
        }
        Some((neighbor, 1.0))
    })
}

fn offset(cell: CellCoord, dx: i32, dy: i32) -> Option<CellCoord> {
    let column = cell.column().checked_add_signed(dx)?;
    let row = cell.row().checked_add_signed(dy)?;
    if column >= COLUMNS || row >= ROWS {
        return None;
    }
    Some(CellCoord::new(column, row))
}

fn reconstruct(
    came_from: &[Option<CellCoord>],
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellPoint> {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from[index(current)] {
            Some(previous) => {
                cells.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    cells.reverse();
    cells.into_iter().map(CellCoord::center).collect()
}

fn index(cell: CellCoord) -> usize {
    cell.row() as usize * COLUMNS as usize + cell.column() as usize
}

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    estimate: f32,
    order: u32,
    cell: CellCoord,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // Reversed so the max-heap pops the lowest estimate, then the earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.order.cmp(&self.order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{footprint_around, TileKind};

    fn assert_contiguous(path: &[CellPoint]) {
        for pair in path.windows(2) {
            let dx = (pair[0].x() - pair[1].x()).abs();
            let dy = (pair[0].y() - pair[1].y()).abs();
            assert!(dx <= 1.0 && dy <= 1.0, "gap between {:?}", pair);
        }
    }

    #[test]
    fn straight_line_on_open_ground() {
        let grid = Grid::new();
        let path = find_path(&grid, CellPoint::new(2.0, 20.0), CellPoint::new(7.0, 20.0));
        assert_eq!(path.len(), 6);
        assert_eq!(path[0], CellPoint::new(2.0, 20.0));
        assert_eq!(path[5], CellPoint::new(7.0, 20.0));
    }

    #[test]
    fn river_crossing_uses_a_bridge() {
        let grid = Grid::new();
        let path = find_path(&grid, CellPoint::new(0.0, 20.0), CellPoint::new(0.0, 10.0));
        assert_contiguous(&path);
        assert_eq!(path.first(), Some(&CellPoint::new(0.0, 20.0)));
        assert_eq!(path.last(), Some(&CellPoint::new(0.0, 10.0)));
        for point in &path {
            let cell = point.nearest_cell().expect("in arena");
            assert_ne!(grid.classify(cell), Some(TileKind::Water));
        }
        assert!(path
            .iter()
            .any(|point| point.y() == 15.0 && (3.0..=5.0).contains(&point.x())));
    }

    #[test]
    fn structures_are_routed_around() {
        let mut grid = Grid::new();
        grid.mark_footprint(footprint_around(CellPoint::new(4.0, 24.0), 1.5));
        let path = find_path(&grid, CellPoint::new(4.0, 28.0), CellPoint::new(4.0, 20.0));
        assert_contiguous(&path);
        for point in &path {
            let cell = point.nearest_cell().expect("in arena");
            assert!(grid.is_walkable(cell));
        }
    }

    #[test]
    fn endpoints_are_clamped_into_the_arena() {
        let grid = Grid::new();
        let path = find_path(&grid, CellPoint::new(-4.0, 40.0), CellPoint::new(2.2, 30.6));
        assert_eq!(path.first(), Some(&CellPoint::new(0.0, 31.0)));
        assert_eq!(path.last(), Some(&CellPoint::new(2.0, 31.0)));
    }

    #[test]
    fn unreachable_goal_falls_back_to_a_direct_path() {
        let grid = Grid::new();
        let path = find_path(&grid, CellPoint::new(9.0, 20.0), CellPoint::new(9.0, 15.0));
        assert_eq!(
            path,
            vec![CellPoint::new(9.0, 20.0), CellPoint::new(9.0, 15.0)]
        );
    }

    #[test]
    fn cache_answers_repeated_requests_without_growing() {
        let grid = Grid::new();
        let mut cache = PathCache::new();
        let start = CellPoint::new(0.0, 20.0);
        let goal = CellPoint::new(0.0, 10.0);

        let first = cache.find_path(&grid, start, goal);
        assert_eq!(first, find_path(&grid, start, goal));
        assert_eq!(cache.paths.len(), 1);

        let again = cache.find_path(&grid, CellPoint::new(0.2, 19.8), goal);
        assert_eq!(again, first);
        assert_eq!(cache.paths.len(), 1);
    }

    #[test]
    fn cache_skips_fallbacks_and_evicts_the_oldest_entry() {
        let grid = Grid::new();
        let mut cache = PathCache::new();
        let blocked = cache.find_path(&grid, CellPoint::new(9.0, 20.0), CellPoint::new(9.0, 15.0));
        assert_eq!(blocked.len(), 2);
        assert!(cache.paths.is_empty());

        let goals = [CellPoint::new(9.0, 18.0), CellPoint::new(0.0, 18.0)];
        let mut requests = Vec::new();
        for goal in goals {
            for row in 17..32 {
                for column in 0..18 {
                    requests.push((CellPoint::new(column as f32, row as f32), goal));
                }
            }
        }
        assert!(requests.len() > PATH_CACHE_CAPACITY);
        for (start, goal) in &requests {
            let _ = cache.find_path(&grid, *start, *goal);
        }

        assert_eq!(cache.paths.len(), PATH_CACHE_CAPACITY);
        assert_eq!(cache.insertion_order.len(), PATH_CACHE_CAPACITY);
        let (oldest_start, oldest_goal) = requests[0];
        let oldest = (clamp_to_arena(oldest_start), clamp_to_arena(oldest_goal));
        assert!(!cache.paths.contains_key(&oldest));
        let (newest_start, newest_goal) = requests[requests.len() - 1];
        let newest = (clamp_to_arena(newest_start), clamp_to_arena(newest_goal));
        assert!(cache.paths.contains_key(&newest));

        cache.clear();
        assert!(cache.paths.is_empty());
        assert!(cache.insertion_order.is_empty());
    }

    #[test]
    fn identical_endpoints_produce_a_single_waypoint() {
        let grid = Grid::new();
        let path = find_path(&grid, CellPoint::new(9.1, 20.2), CellPoint::new(8.8, 19.9));
        assert_eq!(path, vec![CellPoint::new(9.0, 20.0)]);
    }
}
