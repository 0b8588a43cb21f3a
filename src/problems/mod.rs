//! Concrete Environments to search on.

pub mod maze_2d;
