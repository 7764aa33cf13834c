//! Road grid generation tests

use grid_traffic_sim::simulation::{
    find_path, generate_grid, AlgorithmKind, GridSnapshot, Point, COLS, ROWS,
};

#[test]
fn generation_is_deterministic() {
    let a = generate_grid(ROWS, COLS);
    let b = generate_grid(ROWS, COLS);
    assert_eq!(a, b);
}

#[test]
fn cells_are_wall_or_road_never_both() {
    let grid = generate_grid(ROWS, COLS);
    for y in 0..ROWS {
        for x in 0..COLS {
            let cell = grid.cell(Point::new(x, y));
            assert_ne!(
                cell.is_wall, cell.is_road,
                "cell ({x}, {y}) must be exactly one of wall or road"
            );
        }
    }
}

#[test]
fn carving_rules_produce_expected_bands() {
    let grid = generate_grid(ROWS, COLS);

    // Main horizontal bands are two rows wide starting at row 8
    assert!(grid.is_road(Point::new(0, 8)));
    assert!(grid.is_road(Point::new(0, 9)));
    assert!(grid.is_road(Point::new(COLS - 1, 20)));
    assert!(grid.is_road(Point::new(COLS - 1, 21)));

    // Main vertical bands are two columns wide starting at column 8
    assert!(grid.is_road(Point::new(8, 0)));
    assert!(grid.is_road(Point::new(9, 0)));
    assert!(grid.is_road(Point::new(24, ROWS - 1)));
    assert!(grid.is_road(Point::new(25, ROWS - 1)));

    // Single-cell connectors at row 4 and column 4
    assert!(grid.is_road(Point::new(0, 4)));
    assert!(grid.is_road(Point::new(4, 0)));
    assert!(grid.is_wall(Point::new(0, 5)));
    assert!(grid.is_wall(Point::new(5, 0)));

    // Cells no rule touches stay wall
    assert!(grid.is_wall(Point::new(0, 0)));
    assert!(grid.is_wall(Point::new(1, 1)));
}

#[test]
fn every_road_cell_is_reachable_from_every_other() {
    let grid = generate_grid(ROWS, COLS);
    let roads = grid.road_cells();
    assert!(!roads.is_empty());

    // A BFS toward an unreachable wall cell floods the whole component; it
    // covers the full road network exactly when the network is connected.
    let snapshot = GridSnapshot::capture(&grid, &[]);
    let wall = Point::new(0, 0);
    assert!(!snapshot.is_traversable(wall));

    let result = find_path(&snapshot, roads[0], wall, AlgorithmKind::Bfs);
    assert!(result.path.is_empty());
    assert_eq!(
        result.explored,
        roads.len(),
        "BFS from a road cell must visit every road cell"
    );
}

#[test]
fn out_of_bounds_points_are_wall() {
    let grid = generate_grid(ROWS, COLS);
    assert!(grid.is_wall(Point::new(COLS, 8)));
    assert!(grid.is_wall(Point::new(0, ROWS)));
    assert!(!grid.is_road(Point::new(COLS + 5, ROWS + 5)));
}
