//! Core types for the traffic simulation
//!
//! These are standalone value types shared by the grid, the agent model and
//! the pathfinding engine.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use rand::Rng;

/// Default grid height in cells
pub const ROWS: usize = 60;

/// Default grid width in cells
pub const COLS: usize = 120;

/// Inclusive bounds for the number of cars placed at simulation start
pub const MIN_CARS: usize = 50;
pub const MAX_CARS: usize = 75;

/// Car speed range in cells per tick (upper bound exclusive)
pub const MIN_SPEED: f32 = 0.2;
pub const MAX_SPEED: f32 = 0.7;

/// Two cars closer than this on both axes count as colliding
pub const COLLISION_DISTANCE: f32 = 0.8;

/// Consecutive blocked ticks before a car is forced onto a new heading
pub const STUCK_LIMIT: u32 = 20;

/// Chance per unblocked tick that a car spontaneously changes heading
pub const DRIFT_PROBABILITY: f64 = 0.001;

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(&self, other: &Point) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned heading of a car
///
/// The variant order matters: neighbor generation and heading rotation both
/// walk it clockwise starting east.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Unit vector in grid coordinates; x grows east, y grows south
    pub fn unit(self) -> (f32, f32) {
        match self {
            Direction::East => (1.0, 0.0),
            Direction::South => (0.0, 1.0),
            Direction::West => (-1.0, 0.0),
            Direction::North => (0.0, -1.0),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Rotate clockwise by the given number of quarter turns
    pub fn rotated(self, quarter_turns: usize) -> Self {
        let index = match self {
            Direction::East => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::North => 3,
        };
        Self::ALL[(index + quarter_turns) % 4]
    }
}

/// A unique identifier for cars, stable for the whole simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarId(pub usize);

/// A car in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimCar {
    pub id: CarId,
    /// Continuous position in cell units; the occupied cell is the floor of
    /// each axis
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    /// Cells advanced per tick
    pub speed: f32,
    /// Consecutive ticks this car has been blocked
    pub stuck_time: u32,
    /// Presentation-only paint color, opaque to the engine
    pub color: [u8; 3],
}

impl SimCar {
    /// The grid cell this car currently occupies
    pub fn cell(&self) -> Point {
        Point::new(self.x as usize, self.y as usize)
    }
}

/// The four interchangeable search strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    Bfs,
    Dfs,
    AStar,
    Dijkstra,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 4] = [
        AlgorithmKind::Bfs,
        AlgorithmKind::Dfs,
        AlgorithmKind::AStar,
        AlgorithmKind::Dijkstra,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Bfs => "bfs",
            AlgorithmKind::Dfs => "dfs",
            AlgorithmKind::AStar => "astar",
            AlgorithmKind::Dijkstra => "dijkstra",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(AlgorithmKind::Bfs),
            "dfs" => Ok(AlgorithmKind::Dfs),
            "astar" | "a*" => Ok(AlgorithmKind::AStar),
            "dijkstra" => Ok(AlgorithmKind::Dijkstra),
            other => bail!(
                "unknown algorithm {:?} (expected bfs, dfs, astar or dijkstra)",
                other
            ),
        }
    }
}

/// Outcome of one pathfinding invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Cell sequence from start to end inclusive; empty when no route exists
    pub path: Vec<Point>,
    /// Nodes dequeued or finalized before the search terminated
    pub explored: usize,
}

/// Rolling summary of completed searches
///
/// `recalculations` accumulates across searches; the other fields always
/// describe the most recent one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    pub nodes_explored: usize,
    pub path_length: usize,
    pub execution_time_ms: f64,
    pub recalculations: u32,
}
