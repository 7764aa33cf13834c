//! Grid Traffic Simulation Library
//!
//! A traffic simulation on a fixed road grid with interchangeable
//! pathfinding algorithms. The engine runs headlessly; rendering and input
//! front-ends drive it through the `simulation` module's public API.

pub mod simulation;
