//! Main simulation world that ties everything together
//!
//! `SimWorld` is the owned-state controller: it holds the grid, the car set,
//! the point selection, the accumulated search statistics and the at-most-one
//! in-flight search. Presentation layers hold the only long-lived reference
//! to it and drive everything through this API.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use super::car::{spawn_cars, tick_agents};
use super::grid::{generate_grid, Grid};
use super::pathfinding::{GridSnapshot, SearchRun, SearchStep};
use super::types::{
    AlgorithmKind, PathResult, Point, SearchStats, SimCar, COLS, MAX_CARS, MIN_CARS, ROWS,
};

/// Time units between periodic path recomputations
pub const RECOMPUTE_INTERVAL: f64 = 1000.0;

/// Whether the simulation is advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// A dispatched search that has not yet delivered its result
///
/// The generation tag decides, at completion time, whether the result is
/// still wanted: resets and algorithm switches bump the world's generation,
/// so a search dispatched before either event completes into the void.
struct ActiveSearch {
    run: SearchRun,
    generation: u64,
    algorithm: AlgorithmKind,
    started: Instant,
}

/// The main simulation world
pub struct SimWorld {
    /// Static road grid, regenerated only on reset
    pub grid: Grid,

    /// All cars; mutated in place every tick, replaced on reset
    pub cars: Vec<SimCar>,

    state: RunState,
    algorithm: AlgorithmKind,
    start_point: Option<Point>,
    end_point: Option<Point>,
    current_path: Vec<Point>,
    stats: SearchStats,

    /// Single-flight guard: at most one search in flight at any time
    active_search: Option<ActiveSearch>,

    /// Bumped whenever any in-flight search's result would be stale
    generation: u64,

    /// Expansions granted to an in-flight search per tick; `None` runs each
    /// search to completion at dispatch
    search_steps_per_tick: Option<usize>,

    /// Simulation clock in time units
    time: f64,

    /// Clock reading at the last periodic recompute trigger
    last_trigger: f64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(mut rng: Option<StdRng>) -> Self {
        let grid = generate_grid(ROWS, COLS);
        let cars = match &mut rng {
            Some(rng) => spawn_cars(&grid, MIN_CARS..=MAX_CARS, rng),
            None => spawn_cars(&grid, MIN_CARS..=MAX_CARS, &mut rand::rng()),
        };
        info!(
            "world created: {}x{} grid, {} cars",
            grid.cols(),
            grid.rows(),
            cars.len()
        );
        Self {
            grid,
            cars,
            state: RunState::Idle,
            algorithm: AlgorithmKind::Bfs,
            start_point: None,
            end_point: None,
            current_path: Vec::new(),
            stats: SearchStats::default(),
            active_search: None,
            generation: 0,
            search_steps_per_tick: None,
            time: 0.0,
            last_trigger: 0.0,
            rng,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Create a new world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)))
    }

    pub fn start(&mut self) {
        self.state = RunState::Running;
    }

    pub fn pause(&mut self) {
        self.state = RunState::Idle;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }

    /// Switch the search algorithm
    ///
    /// Any in-flight search keeps running but its result is discarded on
    /// completion: it answers a question nobody is asking anymore.
    pub fn set_algorithm(&mut self, algorithm: AlgorithmKind) {
        if algorithm != self.algorithm {
            self.algorithm = algorithm;
            self.generation += 1;
        }
    }

    /// Configure search pacing; `None` (the default) runs each search to
    /// completion synchronously at dispatch
    pub fn set_search_steps_per_tick(&mut self, steps: Option<usize>) {
        self.search_steps_per_tick = steps;
    }

    pub fn start_point(&self) -> Option<Point> {
        self.start_point
    }

    pub fn end_point(&self) -> Option<Point> {
        self.end_point
    }

    pub fn current_path(&self) -> &[Point] {
        &self.current_path
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn occupied(&self, p: Point) -> bool {
        self.cars.iter().any(|car| car.cell() == p)
    }

    /// A point can be selected iff it is a road cell with no car on it right
    /// now
    fn selectable(&self, p: Point) -> bool {
        self.grid.is_road(p) && !self.occupied(p)
    }

    /// Set the route start; silently ignored for wall or occupied cells
    pub fn set_start_point(&mut self, p: Point) {
        if !self.selectable(p) {
            debug!("ignoring start selection on non-selectable cell {p}");
            return;
        }
        self.start_point = Some(p);
    }

    /// Set the route end; silently ignored for wall or occupied cells
    pub fn set_end_point(&mut self, p: Point) {
        if !self.selectable(p) {
            debug!("ignoring end selection on non-selectable cell {p}");
            return;
        }
        self.end_point = Some(p);
    }

    /// Three-click selection cycle: first click sets the start, second sets
    /// the end, third starts over with a fresh start point
    pub fn select_point(&mut self, p: Point) {
        if !self.selectable(p) {
            debug!("ignoring selection on non-selectable cell {p}");
            return;
        }
        match (self.start_point, self.end_point) {
            (Some(_), None) => self.end_point = Some(p),
            _ => {
                self.start_point = Some(p);
                self.end_point = None;
                self.current_path.clear();
            }
        }
    }

    /// Advance the world by `delta` time units
    ///
    /// One call is one frame: the in-flight search (if any) gets its
    /// expansion budget, then, while running, agents move and the periodic
    /// recompute timer fires.
    pub fn tick(&mut self, delta: f64) {
        // Advance any in-flight search first. In synchronous mode the only
        // way one is still pending is a mid-run pacing change, so drain it.
        let budget = self.search_steps_per_tick.unwrap_or(usize::MAX);
        self.step_active_search(budget);

        if self.state != RunState::Running {
            return;
        }

        self.time += delta;
        self.cars = match &mut self.rng {
            Some(rng) => tick_agents(&self.grid, &self.cars, rng),
            None => tick_agents(&self.grid, &self.cars, &mut rand::rng()),
        };

        if self.time - self.last_trigger >= RECOMPUTE_INTERVAL {
            self.last_trigger = self.time;
            // A trigger that cannot dispatch is dropped, never queued
            self.try_dispatch_search();
        }
    }

    /// Honor a direct "find path now" request
    ///
    /// Returns whether a search was actually dispatched; it is not when
    /// either point is missing or a search is already in flight.
    pub fn request_path(&mut self) -> bool {
        self.try_dispatch_search()
    }

    fn try_dispatch_search(&mut self) -> bool {
        if self.active_search.is_some() {
            return false;
        }
        let (Some(start), Some(end)) = (self.start_point, self.end_point) else {
            return false;
        };

        // The snapshot freezes car occupancy for the whole search
        let snapshot = GridSnapshot::capture(&self.grid, &self.cars);
        let run = SearchRun::new(snapshot, start, end, self.algorithm);
        debug!("dispatching {} search {start} -> {end}", self.algorithm);
        self.active_search = Some(ActiveSearch {
            run,
            generation: self.generation,
            algorithm: self.algorithm,
            started: Instant::now(),
        });

        if self.search_steps_per_tick.is_none() {
            self.step_active_search(usize::MAX);
        }
        true
    }

    /// Advance the in-flight search by at most `budget` expansions
    fn step_active_search(&mut self, budget: usize) {
        for _ in 0..budget {
            let Some(active) = self.active_search.as_mut() else {
                return;
            };
            match active.run.step() {
                SearchStep::InProgress => {}
                SearchStep::Complete(result) => {
                    let elapsed_ms = active.started.elapsed().as_secs_f64() * 1000.0;
                    let generation = active.generation;
                    let algorithm = active.algorithm;
                    self.active_search = None;
                    if generation == self.generation {
                        self.commit_result(algorithm, result, elapsed_ms);
                    } else {
                        debug!(
                            "discarding stale {algorithm} search result \
                             (generation {generation} != {})",
                            self.generation
                        );
                    }
                    return;
                }
            }
        }
    }

    fn commit_result(&mut self, algorithm: AlgorithmKind, result: PathResult, elapsed_ms: f64) {
        info!(
            "{algorithm} search finished: {} nodes explored, path length {} ({elapsed_ms:.3} ms)",
            result.explored,
            result.path.len()
        );
        self.stats.nodes_explored = result.explored;
        self.stats.path_length = result.path.len();
        self.stats.execution_time_ms = elapsed_ms;
        self.stats.recalculations += 1;
        self.current_path = result.path;
    }

    /// Back to Idle with a fresh grid and car set
    ///
    /// Selection, path and statistics are cleared; any in-flight search is
    /// abandoned outright.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.generation += 1;
        self.active_search = None;
        self.grid = generate_grid(self.grid.rows(), self.grid.cols());
        self.cars = match &mut self.rng {
            Some(rng) => spawn_cars(&self.grid, MIN_CARS..=MAX_CARS, rng),
            None => spawn_cars(&self.grid, MIN_CARS..=MAX_CARS, &mut rand::rng()),
        };
        self.start_point = None;
        self.end_point = None;
        self.current_path.clear();
        self.stats = SearchStats::default();
        self.time = 0.0;
        self.last_trigger = 0.0;
        info!("world reset: {} cars respawned", self.cars.len());
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Traffic Grid Summary ===");
        println!("Time: {:.0}", self.time);
        println!("State: {:?}", self.state);
        println!("Cars: {}", self.cars.len());
        println!("Algorithm: {}", self.algorithm);
        match (self.start_point, self.end_point) {
            (Some(start), Some(end)) => println!("Route: {start} -> {end}"),
            (Some(start), None) => println!("Route: {start} -> (unset)"),
            _ => println!("Route: (unset)"),
        }
        println!("Current path: {} cells", self.current_path.len());
        println!(
            "Searches: {} (last explored {} nodes in {:.3} ms)",
            self.stats.recalculations, self.stats.nodes_explored, self.stats.execution_time_ms
        );
    }

    /// Render the grid, cars and current path as terminal text
    ///
    /// Legend: `.`=road, `*`=path, `c`=car, `S`/`E`=selected endpoints,
    /// space=wall.
    pub fn render_map(&self) -> String {
        let rows = self.grid.rows();
        let cols = self.grid.cols();
        let mut canvas = vec![vec![' '; cols]; rows];

        for y in 0..rows {
            for x in 0..cols {
                if self.grid.is_road(Point::new(x, y)) {
                    canvas[y][x] = '.';
                }
            }
        }
        for p in &self.current_path {
            canvas[p.y][p.x] = '*';
        }
        for car in &self.cars {
            let cell = car.cell();
            canvas[cell.y][cell.x] = 'c';
        }
        if let Some(p) = self.start_point {
            canvas[p.y][p.x] = 'S';
        }
        if let Some(p) = self.end_point {
            canvas[p.y][p.x] = 'E';
        }

        let mut out = String::with_capacity(rows * (cols + 1));
        for row in canvas {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}
