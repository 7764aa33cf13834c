//! Simulation controller tests
//!
//! These drive `SimWorld` through the same sequences a front-end would:
//! selecting points, requesting searches, ticking the frame loop.

use std::collections::HashSet;

use grid_traffic_sim::simulation::{
    AlgorithmKind, Point, SimWorld, MAX_CARS, RECOMPUTE_INTERVAL,
};

/// A world with no cars: every road pair is routable and every road cell is
/// selectable
fn quiet_world() -> SimWorld {
    let mut world = SimWorld::new_with_seed(42);
    world.cars.clear();
    world
}

#[test]
fn three_click_cycle() {
    let mut world = quiet_world();
    let p1 = Point::new(10, 8);
    let p2 = Point::new(100, 8);
    let p3 = Point::new(40, 21);

    world.select_point(p1);
    assert_eq!(world.start_point(), Some(p1));
    assert_eq!(world.end_point(), None);

    world.select_point(p2);
    assert_eq!(world.start_point(), Some(p1));
    assert_eq!(world.end_point(), Some(p2));

    // Third click starts the cycle over and clears the old path
    world.request_path();
    assert!(!world.current_path().is_empty());
    world.select_point(p3);
    assert_eq!(world.start_point(), Some(p3));
    assert_eq!(world.end_point(), None);
    assert!(world.current_path().is_empty());
}

#[test]
fn invalid_selections_are_ignored() {
    let mut world = SimWorld::new_with_seed(42);

    // Wall cell
    world.select_point(Point::new(0, 0));
    assert_eq!(world.start_point(), None);

    // Cell currently occupied by a car
    let occupied = world.cars[0].cell();
    world.select_point(occupied);
    assert_eq!(world.start_point(), None);
    world.set_start_point(occupied);
    assert_eq!(world.start_point(), None);
    world.set_end_point(Point::new(0, 0));
    assert_eq!(world.end_point(), None);
}

#[test]
fn request_path_commits_stats_and_path() {
    let mut world = quiet_world();
    world.set_start_point(Point::new(10, 8));
    world.set_end_point(Point::new(100, 8));

    assert!(world.request_path());

    let stats = world.stats();
    assert_eq!(stats.recalculations, 1);
    assert_eq!(stats.path_length, 91);
    assert!(stats.nodes_explored > 0);
    assert_eq!(world.current_path().len(), 91);
}

#[test]
fn request_path_without_points_is_refused() {
    let mut world = quiet_world();
    assert!(!world.request_path());

    world.set_start_point(Point::new(10, 8));
    assert!(!world.request_path());
    assert_eq!(world.stats().recalculations, 0);
}

#[test]
fn periodic_recompute_fires_on_cadence() {
    let mut world = quiet_world();
    world.set_start_point(Point::new(10, 8));
    world.set_end_point(Point::new(100, 8));
    world.start();

    let ticks_per_interval = RECOMPUTE_INTERVAL as u32;
    for _ in 0..ticks_per_interval - 1 {
        world.tick(1.0);
    }
    assert_eq!(world.stats().recalculations, 0);

    world.tick(1.0);
    assert_eq!(world.stats().recalculations, 1);

    for _ in 0..ticks_per_interval {
        world.tick(1.0);
    }
    assert_eq!(world.stats().recalculations, 2);
}

#[test]
fn recompute_timer_is_paused_while_idle() {
    let mut world = quiet_world();
    world.set_start_point(Point::new(10, 8));
    world.set_end_point(Point::new(100, 8));

    for _ in 0..2 * RECOMPUTE_INTERVAL as u32 {
        world.tick(1.0);
    }
    assert_eq!(world.stats().recalculations, 0);
    assert_eq!(world.time(), 0.0);
}

#[test]
fn single_flight_guard_refuses_second_dispatch() {
    let mut world = quiet_world();
    world.set_search_steps_per_tick(Some(16));
    world.set_start_point(Point::new(10, 8));
    world.set_end_point(Point::new(100, 8));
    world.set_algorithm(AlgorithmKind::AStar);

    assert!(world.request_path());
    // In flight now: further requests are silently skipped, not queued
    assert!(!world.request_path());
    assert_eq!(world.stats().recalculations, 0);

    for _ in 0..10_000 {
        world.tick(1.0);
        if world.stats().recalculations > 0 {
            break;
        }
    }
    assert_eq!(world.stats().recalculations, 1);
    assert_eq!(world.current_path().len(), 91);

    // Completed: the guard is released
    assert!(world.request_path());
}

#[test]
fn algorithm_switch_discards_in_flight_result() {
    let mut world = quiet_world();
    world.set_search_steps_per_tick(Some(1));
    world.set_start_point(Point::new(10, 8));
    world.set_end_point(Point::new(100, 8));
    world.set_algorithm(AlgorithmKind::AStar);

    assert!(world.request_path());
    world.tick(1.0);

    // Mid-search switch: the running search is now answering a stale question
    world.set_algorithm(AlgorithmKind::Dijkstra);

    for _ in 0..100_000 {
        world.tick(1.0);
        if world.request_path() {
            // Guard released means the stale search completed; its result
            // must not have been committed
            break;
        }
    }
    assert_eq!(world.stats().recalculations, 0);
    assert!(world.current_path().is_empty());

    // The replacement search commits normally once drained
    world.set_search_steps_per_tick(None);
    world.tick(1.0);
    assert_eq!(world.stats().recalculations, 1);
    assert_eq!(world.current_path().len(), 91);
}

#[test]
fn reset_clears_state_and_regenerates() {
    let mut world = SimWorld::new_with_seed(9);
    let grid_before = world.grid.clone();
    world.start();
    for _ in 0..50 {
        world.tick(1.0);
    }

    world.reset();

    assert!(!world.is_running());
    assert_eq!(world.start_point(), None);
    assert_eq!(world.end_point(), None);
    assert!(world.current_path().is_empty());
    assert_eq!(world.stats().recalculations, 0);
    assert_eq!(world.time(), 0.0);
    assert_eq!(world.grid, grid_before, "grid topology is deterministic");

    // Two resets in a row must each yield an independently valid state
    for _ in 0..2 {
        world.reset();
        assert!(!world.cars.is_empty());
        assert!(world.cars.len() <= MAX_CARS);
        let cells: HashSet<Point> = world.cars.iter().map(|c| c.cell()).collect();
        assert_eq!(cells.len(), world.cars.len());
        for car in &world.cars {
            assert!(world.grid.is_road(car.cell()));
        }
    }
}

#[test]
fn pause_freezes_motion() {
    let mut world = SimWorld::new_with_seed(31);
    let before: Vec<(f32, f32)> = world.cars.iter().map(|c| (c.x, c.y)).collect();

    world.start();
    for _ in 0..20 {
        world.tick(1.0);
    }
    let after: Vec<(f32, f32)> = world.cars.iter().map(|c| (c.x, c.y)).collect();
    assert_ne!(before, after, "running world should move cars");

    world.pause();
    let paused: Vec<(f32, f32)> = world.cars.iter().map(|c| (c.x, c.y)).collect();
    for _ in 0..20 {
        world.tick(1.0);
    }
    let still: Vec<(f32, f32)> = world.cars.iter().map(|c| (c.x, c.y)).collect();
    assert_eq!(paused, still, "idle world must not move cars");
}

#[test]
fn stats_track_latest_search() {
    let mut world = quiet_world();
    world.set_start_point(Point::new(10, 8));
    world.set_end_point(Point::new(100, 8));

    world.set_algorithm(AlgorithmKind::Bfs);
    assert!(world.request_path());
    let bfs_explored = world.stats().nodes_explored;

    world.set_algorithm(AlgorithmKind::AStar);
    assert!(world.request_path());
    let stats = world.stats();

    // Replaced by the latest search, while recalculations accumulate
    assert_eq!(stats.recalculations, 2);
    assert!(stats.nodes_explored < bfs_explored);
    assert_eq!(stats.path_length, 91);
}
