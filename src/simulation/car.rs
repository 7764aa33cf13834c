//! Car spawning and per-tick motion
//!
//! Both entry points are pure given their RNG: `spawn_cars` places the
//! initial car set on the road network, `tick_agents` advances every car by
//! one tick against the static grid. Cars never mutate the grid.

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;
use std::ops::RangeInclusive;

use super::grid::Grid;
use super::types::{
    CarId, Direction, Point, SimCar, COLLISION_DISTANCE, DRIFT_PROBABILITY, MAX_SPEED, MIN_SPEED,
    STUCK_LIMIT,
};

/// Attempts per car slot before the slot is skipped
const SPAWN_RETRIES: usize = 10;

/// Place the initial car set on distinct road cells
///
/// The target count is drawn uniformly from `count_range`. Placement uses
/// rejection sampling with [`SPAWN_RETRIES`] attempts per slot; a slot whose
/// attempts all land on occupied cells is skipped, so the returned set may be
/// slightly smaller than the target.
pub fn spawn_cars(
    grid: &Grid,
    count_range: RangeInclusive<usize>,
    rng: &mut impl Rng,
) -> Vec<SimCar> {
    let road_cells = grid.road_cells();
    if road_cells.is_empty() {
        return Vec::new();
    }

    let target = rng.random_range(count_range);
    let mut occupied: HashSet<Point> = HashSet::with_capacity(target);
    let mut cars = Vec::with_capacity(target);

    for slot in 0..target {
        let mut placed = None;
        for _ in 0..SPAWN_RETRIES {
            if let Some(&cell) = road_cells.choose(rng) {
                if !occupied.contains(&cell) {
                    placed = Some(cell);
                    break;
                }
            }
        }

        let Some(cell) = placed else {
            debug!("spawn slot {slot} skipped after {SPAWN_RETRIES} collisions");
            continue;
        };

        occupied.insert(cell);
        cars.push(SimCar {
            id: CarId(cars.len()),
            x: cell.x as f32,
            y: cell.y as f32,
            direction: Direction::random(rng),
            speed: rng.random_range(MIN_SPEED..MAX_SPEED),
            stuck_time: 0,
            color: [rng.random(), rng.random(), rng.random()],
        });
    }

    debug!("spawned {} cars (target {})", cars.len(), target);
    cars
}

/// Advance every car by one tick
///
/// Collision checks read the input car set, never the partially built output,
/// so every car observes the same previous-tick world regardless of iteration
/// order (simultaneous update).
pub fn tick_agents(grid: &Grid, cars: &[SimCar], rng: &mut impl Rng) -> Vec<SimCar> {
    cars.iter()
        .map(|car| step_car(grid, cars, car, &mut *rng))
        .collect()
}

fn step_car(grid: &Grid, cars: &[SimCar], car: &SimCar, rng: &mut impl Rng) -> SimCar {
    let mut next = car.clone();
    let (dx, dy) = car.direction.unit();
    let cand_x = car.x + dx * car.speed;
    let cand_y = car.y + dy * car.speed;

    // Wall or edge ahead: turn in place
    if !candidate_on_road(grid, cand_x, cand_y) {
        next.direction = Direction::random(rng);
        next.stuck_time = 0;
        return next;
    }

    let blocked = cars.iter().any(|other| {
        other.id != car.id
            && (other.x - cand_x).abs() < COLLISION_DISTANCE
            && (other.y - cand_y).abs() < COLLISION_DISTANCE
    });

    if blocked {
        if car.stuck_time > STUCK_LIMIT {
            // Deadlock escalation: force a quarter or half turn
            next.direction = car.direction.rotated(rng.random_range(1..=2));
            next.stuck_time = 0;
        } else {
            next.stuck_time = car.stuck_time + 1;
        }
        return next;
    }

    if rng.random_bool(DRIFT_PROBABILITY) {
        next.direction = Direction::random(rng);
    }
    next.x = cand_x;
    next.y = cand_y;
    next.stuck_time = 0;
    next
}

/// Whether the cell containing the floored candidate position is road
fn candidate_on_road(grid: &Grid, x: f32, y: f32) -> bool {
    if x < 0.0 || y < 0.0 {
        return false;
    }
    grid.is_road(Point::new(x as usize, y as usize))
}
