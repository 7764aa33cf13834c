use anyhow::{Context, Result};
use clap::Parser;

use grid_traffic_sim::simulation::{AlgorithmKind, Point, SimWorld};

#[derive(Parser)]
#[command(name = "grid_traffic_sim")]
#[command(about = "Grid traffic simulation with interchangeable pathfinding")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "3000")]
    ticks: u32,

    /// Time units advanced per tick
    #[arg(long, default_value = "1.0")]
    delta: f64,

    /// Search algorithm: bfs, dfs, astar or dijkstra
    #[arg(long, default_value = "astar")]
    algorithm: String,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Route start as "x,y" (defaults to the first free road cell)
    #[arg(long)]
    start: Option<String>,

    /// Route end as "x,y" (defaults to the last free road cell)
    #[arg(long)]
    end: Option<String>,

    /// Node expansions granted per tick to an in-flight search
    /// (0 = run each search to completion synchronously)
    #[arg(long, default_value = "0")]
    search_steps: usize,

    /// Ticks between progress summaries
    #[arg(long, default_value = "500")]
    report_every: u32,
}

fn parse_point(s: &str) -> Result<Point> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("expected \"x,y\", got {s:?}"))?;
    Ok(Point::new(
        x.trim().parse().context("bad x coordinate")?,
        y.trim().parse().context("bad y coordinate")?,
    ))
}

/// First road cell without a car on it, scanning from one end
fn free_road_cell(world: &SimWorld, from_back: bool) -> Option<Point> {
    let cells = world.grid.road_cells();
    let occupied: Vec<Point> = world.cars.iter().map(|car| car.cell()).collect();
    let mut iter = cells.into_iter();
    let pick = |p: &Point| !occupied.contains(p);
    if from_back {
        iter.rev().find(pick)
    } else {
        iter.find(pick)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let algorithm: AlgorithmKind = cli.algorithm.parse()?;
    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(seed),
        None => SimWorld::new(),
    };
    world.set_algorithm(algorithm);
    if cli.search_steps > 0 {
        world.set_search_steps_per_tick(Some(cli.search_steps));
    }

    let start = match &cli.start {
        Some(s) => parse_point(s)?,
        None => free_road_cell(&world, false).context("no free road cell for start")?,
    };
    let end = match &cli.end {
        Some(s) => parse_point(s)?,
        None => free_road_cell(&world, true).context("no free road cell for end")?,
    };

    world.set_start_point(start);
    world.set_end_point(end);
    if world.start_point().is_none() || world.end_point().is_none() {
        anyhow::bail!("start or end rejected: both must be free road cells");
    }

    world.start();
    world.request_path();

    for tick in 1..=cli.ticks {
        world.tick(cli.delta);
        if cli.report_every > 0 && tick % cli.report_every == 0 {
            println!("--- After tick {tick} ---");
            world.print_summary();
            println!();
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    println!();
    println!("{}", world.render_map());
    Ok(())
}
