//! Searchlight Step Traces
//!
//! Pure generators that turn an input and a target into an ordered list of
//! replayable steps, for stepping through an algorithm one decision at a time.
//!
//! # Generators
//!
//! - **Array searches**: linear, binary, jump and exponential search over a
//!   slice, each returning a [`SearchTrace`] with the matching index.
//! - **Shortest path**: Dijkstra over a small weighted [`Graph`], returning a
//!   [`RouteTrace`] that ends with the reconstructed path.
//!
//! # Trace invariants
//!
//! - Generators are deterministic: equal input gives an equal trace.
//! - A trace holds at most one terminal step (`found` / `not-found`), and
//!   when present it is the last step.
//! - Every generator terminates within a bound set by its input size.
//!
//! # Usage
//!
//! ```
//! use searchlight_steps::{search, StepKind};
//!
//! let data = [3, 9, 12, 17, 23, 31, 44, 52, 67, 88];
//! let trace = search::binary(&data, &44);
//!
//! assert_eq!(trace.found, Some(6));
//! assert_eq!(trace.steps.last().unwrap().kind, StepKind::Found { index: 6 });
//! ```

mod catalog;
mod dijkstra;
mod error;
mod graph;
mod step;

pub mod dataset;
pub mod search;

pub use catalog::{
    AlgorithmId, AlgorithmInfo, Catalog, Complexity, Fixture, Input, InputKind, Trace, ALL_TAG,
};
pub use dijkstra::{shortest_path, Route, RouteTrace};
pub use error::{GraphError, MismatchError, Result};
pub use graph::{Graph, GraphEdge, GraphNode, GraphSpec};
pub use search::SearchTrace;
pub use step::{NodeId, Step, StepKind, Variant};
