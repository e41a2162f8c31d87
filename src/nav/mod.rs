//! Grid navigation: tile map, sorted priority queue and A*

pub mod astar;
pub mod grid;
pub mod queue;

pub use astar::{NavError, Path, a_star, diagonal_distance, path_cost};
pub use grid::{Cell, CellContent, NavGrid};
pub use queue::PriorityQueue;
