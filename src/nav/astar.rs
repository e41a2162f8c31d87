//! A* search over a [`NavGrid`]

use thiserror::Error;

use super::grid::{Cell, NavGrid};
use super::queue::PriorityQueue;
use crate::Vector;
use crate::consts::{DIAGONAL_COST, STRAIGHT_COST};

/// Cells from start to goal, both inclusive
pub type Path = Vec<Cell>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("no path from {start:?} to {goal:?}")]
    PathNotFound { start: Cell, goal: Cell },
    #[error("cell {0:?} is outside the navigation grid")]
    OutOfBounds(Cell),
}

/// Octile distance between two world positions
///
/// Diagonal steps for the shorter axis, straight steps for the rest. Exact
/// path length on an obstacle-free 8-connected grid.
pub fn diagonal_distance(a: Vector, b: Vector) -> f64 {
    let d = (a - b).abs();
    let lo = d.x.min(d.y);
    let hi = d.x.max(d.y);
    lo * std::f64::consts::SQRT_2 + (hi - lo)
}

/// Shortest path from `start` to `goal`
///
/// Scratch state lives only for this call. An unreachable goal is an error,
/// never a partial path.
pub fn a_star(grid: &NavGrid, start: Cell, goal: Cell) -> Result<Path, NavError> {
    for cell in [start, goal] {
        if !grid.in_bounds(cell) {
            return Err(NavError::OutOfBounds(cell));
        }
    }
    if start == goal {
        return Ok(vec![start]);
    }

    let goal_pos = grid.cell_center(goal);
    let heuristic = |cell: Cell| diagonal_distance(grid.cell_center(cell), goal_pos);

    let n = grid.cell_count();
    let mut g_score = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<Cell>> = vec![None; n];
    let mut open = PriorityQueue::with_capacity(64);

    g_score[grid.index_of(start)] = 0.0;
    open.push(start, heuristic(start));

    while let Some((current, _)) = open.pop() {
        if grid.cell_center(current) == goal_pos {
            return Ok(reconstruct(grid, &parent, current));
        }

        let base = g_score[grid.index_of(current)];
        for &(next, weight) in grid.neighbors(current) {
            let tentative = base + weight;
            let idx = grid.index_of(next);
            if tentative < g_score[idx] {
                g_score[idx] = tentative;
                parent[idx] = Some(current);
                let priority = tentative + heuristic(next);
                if !open.change_priority(&next, priority) {
                    open.push(next, priority);
                }
            }
        }
    }

    log::warn!("A*: no path from {:?} to {:?}", start, goal);
    Err(NavError::PathNotFound { start, goal })
}

fn reconstruct(grid: &NavGrid, parent: &[Option<Cell>], goal: Cell) -> Path {
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(prev) = parent[grid.index_of(cursor)] {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

/// Summed edge weight along a path of adjacent cells
pub fn path_cost(path: &[Cell]) -> f64 {
    path.windows(2)
        .map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if a.row != b.row && a.col != b.col {
                DIAGONAL_COST
            } else {
                STRAIGHT_COST
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::grid::CellContent;
    use proptest::prelude::*;

    fn assert_connected(grid: &NavGrid, path: &[Cell]) {
        for pair in path.windows(2) {
            assert!(
                grid.neighbors(pair[0]).iter().any(|(c, _)| *c == pair[1]),
                "{:?} -> {:?} is not an edge",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_optimal_cost_on_open_grid() {
        let grid = NavGrid::open();
        let start = Cell::new(5, 5);
        let goal = Cell::new(20, 12);
        let path = a_star(&grid, start, goal).unwrap();

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert_connected(&grid, &path);
        let expected = 7.0 * DIAGONAL_COST + 8.0 * STRAIGHT_COST;
        assert!((path_cost(&path) - expected).abs() < 1e-9);
        assert_eq!(path.len(), 16);
    }

    #[test]
    fn test_sealed_ring_reports_no_path() {
        let center = Cell::new(50, 50);
        let ring = (47..=53).flat_map(|row| (47..=53).map(move |col| Cell::new(row, col))).filter(
            |c| c.row == 47 || c.row == 53 || c.col == 47 || c.col == 53,
        );
        let grid = NavGrid::from_walls(ring);
        let outside = Cell::new(10, 10);

        assert_eq!(
            a_star(&grid, center, outside),
            Err(NavError::PathNotFound {
                start: center,
                goal: outside
            })
        );
        assert!(a_star(&grid, outside, center).is_err());
        assert!(a_star(&grid, center, Cell::new(51, 52)).is_ok());
    }

    #[test]
    fn test_detours_around_wall() {
        // Vertical wall at col 10 with a gap at row 30
        let walls = (0..100).filter(|row| *row != 30).map(|row| Cell::new(row, 10));
        let grid = NavGrid::from_walls(walls);
        let start = Cell::new(10, 5);
        let goal = Cell::new(10, 15);
        let path = a_star(&grid, start, goal).unwrap();

        assert_connected(&grid, &path);
        assert!(path.contains(&Cell::new(30, 10)));
        assert!(path.iter().all(|c| grid.content(*c) != CellContent::Wall));
        let direct = diagonal_distance(grid.cell_center(start), grid.cell_center(goal));
        assert!(path_cost(&path) > direct);
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = NavGrid::open();
        let cell = Cell::new(4, 4);
        assert_eq!(a_star(&grid, cell, cell), Ok(vec![cell]));
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = NavGrid::open();
        let bad = Cell::new(100, 3);
        assert_eq!(
            a_star(&grid, Cell::new(0, 0), bad),
            Err(NavError::OutOfBounds(bad))
        );
    }

    #[test]
    fn test_repeated_queries_agree() {
        let grid = NavGrid::from_walls((20..80).map(|col| Cell::new(40, col)));
        let first = a_star(&grid, Cell::new(30, 50), Cell::new(50, 50)).unwrap();
        let _ = a_star(&grid, Cell::new(0, 0), Cell::new(99, 99)).unwrap();
        let again = a_star(&grid, Cell::new(30, 50), Cell::new(50, 50)).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_diagonal_distance() {
        let d = diagonal_distance(Vector::new(0.0, 0.0), Vector::new(30.0, 10.0));
        assert!((d - (10.0 * std::f64::consts::SQRT_2 + 20.0)).abs() < 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_open_grid_cost_matches_heuristic(
            r0 in 0usize..40, c0 in 0usize..40,
            r1 in 0usize..40, c1 in 0usize..40,
        ) {
            let grid = NavGrid::open();
            let start = Cell::new(r0, c0);
            let goal = Cell::new(r1, c1);
            let path = a_star(&grid, start, goal).unwrap();
            let optimum = diagonal_distance(grid.cell_center(start), grid.cell_center(goal));
            prop_assert!((path_cost(&path) - optimum).abs() < 1e-6);
        }
    }
}
