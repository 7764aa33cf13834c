//! Standalone traffic simulation and pathfinding engine
//!
//! This module contains all the core simulation logic: deterministic road
//! grid generation, multi-agent car motion with collision avoidance, and
//! four interchangeable search algorithms that treat cars as dynamic
//! obstacles. It has no rendering dependencies and can be driven headlessly
//! from the console or from tests.

mod car;
mod grid;
mod pathfinding;
mod types;
mod world;

pub use car::{spawn_cars, tick_agents};
pub use grid::{generate_grid, Grid, GridCell};
pub use pathfinding::{find_path, GridSnapshot, SearchRun, SearchStep};
pub use types::{
    AlgorithmKind, CarId, Direction, PathResult, Point, SearchStats, SimCar, COLLISION_DISTANCE,
    COLS, DRIFT_PROBABILITY, MAX_CARS, MAX_SPEED, MIN_CARS, MIN_SPEED, ROWS, STUCK_LIMIT,
};
pub use world::{RunState, SimWorld, RECOMPUTE_INTERVAL};
