//! The pathfinding engine
//!
//! All four search strategies operate on a [`GridSnapshot`]: the static grid
//! with car occupancy overlaid once, at capture time. A search never sees
//! cars move — the snapshot is its whole world.
//!
//! Searches are incremental state machines. [`SearchRun::step`] expands
//! exactly one node, which makes each call a natural suspension point: a
//! frame scheduler can interleave agent ticks between calls, or drop the run
//! on the floor to cancel it. [`find_path`] is the synchronous convenience
//! wrapper used by headless callers and tests.
//!
//! The shared bookkeeping (neighbor order, traversability, parent-chain
//! reconstruction, explored counting) lives here once; each algorithm only
//! supplies its frontier discipline.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use super::grid::Grid;
use super::types::{AlgorithmKind, PathResult, Point, SimCar};

/// Neighbor offsets in fixed east, south, west, north order
const NEIGHBOR_DELTAS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Sentinel for "no parent recorded" in the packed parent array
const NO_PARENT: u32 = u32::MAX;

/// Immutable overlay of the static grid with car occupancy frozen at capture
/// time
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    rows: usize,
    cols: usize,
    traversable: Vec<bool>,
}

impl GridSnapshot {
    /// Overlay `cars` onto `grid`
    ///
    /// Each car blocks the single cell containing its floored coordinates. A
    /// cell is traversable iff it is road and car-free.
    pub fn capture(grid: &Grid, cars: &[SimCar]) -> Self {
        let rows = grid.rows();
        let cols = grid.cols();
        let mut traversable = vec![false; rows * cols];
        for y in 0..rows {
            for x in 0..cols {
                traversable[y * cols + x] = grid.is_road(Point::new(x, y));
            }
        }
        for car in cars {
            let cell = car.cell();
            if cell.x < cols && cell.y < rows {
                traversable[cell.y * cols + cell.x] = false;
            }
        }
        Self {
            rows,
            cols,
            traversable,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_traversable(&self, p: Point) -> bool {
        p.x < self.cols && p.y < self.rows && self.traversable[p.y * self.cols + p.x]
    }

    fn index(&self, p: Point) -> u32 {
        (p.y * self.cols + p.x) as u32
    }

    fn point(&self, index: u32) -> Point {
        Point::new(index as usize % self.cols, index as usize / self.cols)
    }

    /// Traversable neighbors of `index` in [`NEIGHBOR_DELTAS`] order
    fn neighbors(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        let x = index as i64 % self.cols as i64;
        let y = index as i64 / self.cols as i64;
        NEIGHBOR_DELTAS.into_iter().filter_map(move |(dx, dy)| {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || ny < 0 || nx >= self.cols as i64 || ny >= self.rows as i64 {
                return None;
            }
            let neighbor = (ny * self.cols as i64 + nx) as usize;
            self.traversable[neighbor].then_some(neighbor as u32)
        })
    }
}

/// Result of advancing a search by one expansion
#[derive(Debug)]
pub enum SearchStep {
    InProgress,
    Complete(PathResult),
}

/// Per-algorithm frontier discipline
///
/// Everything else about a search is shared; adding a fifth algorithm means
/// adding a variant here and an arm in [`SearchRun::step`].
enum Frontier {
    /// BFS: FIFO queue, visited-on-enqueue
    Fifo {
        queue: VecDeque<u32>,
        visited: Vec<bool>,
    },
    /// DFS: LIFO stack, visited-on-push; last-pushed neighbor explored first
    Lifo {
        stack: Vec<u32>,
        visited: Vec<bool>,
    },
    /// Dijkstra: min-heap on (distance, insertion seq), finalize on pop
    Dijkstra {
        heap: BinaryHeap<Reverse<(u32, u64, u32)>>,
        dist: Vec<u32>,
        finalized: Vec<bool>,
        seq: u64,
    },
    /// A*: min-heap on (f = g + manhattan, insertion seq), closed on pop
    AStar {
        heap: BinaryHeap<Reverse<(u32, u64, u32)>>,
        g: Vec<u32>,
        closed: Vec<bool>,
        seq: u64,
    },
}

/// One in-flight search over a frozen snapshot
///
/// The insertion sequence number in the heap keys keeps ties in stable
/// insertion order, so exploration order is reproducible.
pub struct SearchRun {
    snapshot: GridSnapshot,
    end: Point,
    start_index: u32,
    end_index: u32,
    explored: usize,
    parent: Vec<u32>,
    frontier: Frontier,
}

impl SearchRun {
    /// Begin a search; `start` and `end` must lie within the snapshot bounds
    ///
    /// The start cell is always expandable even if a car has rolled onto it
    /// since it was selected; occupancy gates selection, not the search.
    pub fn new(snapshot: GridSnapshot, start: Point, end: Point, algorithm: AlgorithmKind) -> Self {
        debug_assert!(start.x < snapshot.cols() && start.y < snapshot.rows());
        debug_assert!(end.x < snapshot.cols() && end.y < snapshot.rows());

        let size = snapshot.rows() * snapshot.cols();
        let start_index = snapshot.index(start);
        let end_index = snapshot.index(end);

        let frontier = match algorithm {
            AlgorithmKind::Bfs => {
                let mut visited = vec![false; size];
                visited[start_index as usize] = true;
                Frontier::Fifo {
                    queue: VecDeque::from([start_index]),
                    visited,
                }
            }
            AlgorithmKind::Dfs => {
                let mut visited = vec![false; size];
                visited[start_index as usize] = true;
                Frontier::Lifo {
                    stack: vec![start_index],
                    visited,
                }
            }
            AlgorithmKind::Dijkstra => {
                let mut dist = vec![u32::MAX; size];
                dist[start_index as usize] = 0;
                let mut heap = BinaryHeap::new();
                heap.push(Reverse((0, 0, start_index)));
                Frontier::Dijkstra {
                    heap,
                    dist,
                    finalized: vec![false; size],
                    seq: 1,
                }
            }
            AlgorithmKind::AStar => {
                let mut g = vec![u32::MAX; size];
                g[start_index as usize] = 0;
                let mut heap = BinaryHeap::new();
                let f = start.manhattan_distance(&end) as u32;
                heap.push(Reverse((f, 0, start_index)));
                Frontier::AStar {
                    heap,
                    g,
                    closed: vec![false; size],
                    seq: 1,
                }
            }
        };

        Self {
            snapshot,
            end,
            start_index,
            end_index,
            explored: 0,
            parent: vec![NO_PARENT; size],
            frontier,
        }
    }

    /// Expand one node
    ///
    /// Each call is one suspension point: callers may interleave other work
    /// between calls or abandon the run entirely to cancel the search.
    pub fn step(&mut self) -> SearchStep {
        let Self {
            snapshot,
            end,
            start_index,
            end_index,
            explored,
            parent,
            frontier,
        } = self;
        let start_index = *start_index;
        let end_index = *end_index;

        match frontier {
            Frontier::Fifo { queue, visited } => {
                let Some(index) = queue.pop_front() else {
                    return SearchStep::Complete(PathResult {
                        path: Vec::new(),
                        explored: *explored,
                    });
                };
                *explored += 1;
                if index == end_index {
                    return SearchStep::Complete(PathResult {
                        path: reconstruct(snapshot, parent, start_index, end_index),
                        explored: *explored,
                    });
                }
                for neighbor in snapshot.neighbors(index) {
                    if !visited[neighbor as usize] {
                        visited[neighbor as usize] = true;
                        parent[neighbor as usize] = index;
                        queue.push_back(neighbor);
                    }
                }
            }
            Frontier::Lifo { stack, visited } => {
                let Some(index) = stack.pop() else {
                    return SearchStep::Complete(PathResult {
                        path: Vec::new(),
                        explored: *explored,
                    });
                };
                *explored += 1;
                if index == end_index {
                    return SearchStep::Complete(PathResult {
                        path: reconstruct(snapshot, parent, start_index, end_index),
                        explored: *explored,
                    });
                }
                for neighbor in snapshot.neighbors(index) {
                    if !visited[neighbor as usize] {
                        visited[neighbor as usize] = true;
                        parent[neighbor as usize] = index;
                        stack.push(neighbor);
                    }
                }
            }
            Frontier::Dijkstra {
                heap,
                dist,
                finalized,
                seq,
            } => {
                // Skip entries made stale by a later relaxation
                let (node_dist, index) = loop {
                    let Some(Reverse((node_dist, _, index))) = heap.pop() else {
                        return SearchStep::Complete(PathResult {
                            path: Vec::new(),
                            explored: *explored,
                        });
                    };
                    if !finalized[index as usize] {
                        break (node_dist, index);
                    }
                };
                finalized[index as usize] = true;
                *explored += 1;
                if index == end_index {
                    return SearchStep::Complete(PathResult {
                        path: reconstruct(snapshot, parent, start_index, end_index),
                        explored: *explored,
                    });
                }
                for neighbor in snapshot.neighbors(index) {
                    let next_dist = node_dist + 1;
                    if next_dist < dist[neighbor as usize] {
                        dist[neighbor as usize] = next_dist;
                        parent[neighbor as usize] = index;
                        heap.push(Reverse((next_dist, *seq, neighbor)));
                        *seq += 1;
                    }
                }
            }
            Frontier::AStar {
                heap,
                g,
                closed,
                seq,
            } => {
                let index = loop {
                    let Some(Reverse((_, _, index))) = heap.pop() else {
                        return SearchStep::Complete(PathResult {
                            path: Vec::new(),
                            explored: *explored,
                        });
                    };
                    if !closed[index as usize] {
                        break index;
                    }
                };
                closed[index as usize] = true;
                *explored += 1;
                if index == end_index {
                    return SearchStep::Complete(PathResult {
                        path: reconstruct(snapshot, parent, start_index, end_index),
                        explored: *explored,
                    });
                }
                let node_g = g[index as usize];
                for neighbor in snapshot.neighbors(index) {
                    let next_g = node_g + 1;
                    if next_g < g[neighbor as usize] {
                        g[neighbor as usize] = next_g;
                        parent[neighbor as usize] = index;
                        let h = snapshot.point(neighbor).manhattan_distance(end) as u32;
                        heap.push(Reverse((next_g + h, *seq, neighbor)));
                        *seq += 1;
                    }
                }
            }
        }

        SearchStep::InProgress
    }

    /// Drain the search synchronously, with no suspension between expansions
    pub fn run_to_completion(mut self) -> PathResult {
        loop {
            if let SearchStep::Complete(result) = self.step() {
                return result;
            }
        }
    }
}

/// Walk parent links from end back to start, then reverse
fn reconstruct(snapshot: &GridSnapshot, parent: &[u32], start: u32, end: u32) -> Vec<Point> {
    let mut path = vec![snapshot.point(end)];
    let mut current = end;
    while current != start {
        current = parent[current as usize];
        path.push(snapshot.point(current));
    }
    path.reverse();
    path
}

/// Run a complete search synchronously
///
/// An empty path means no route exists; the explored count is valid either
/// way.
pub fn find_path(
    snapshot: &GridSnapshot,
    start: Point,
    end: Point,
    algorithm: AlgorithmKind,
) -> PathResult {
    SearchRun::new(snapshot.clone(), start, end, algorithm).run_to_completion()
}
