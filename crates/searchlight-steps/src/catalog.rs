//! Built-in algorithms, their descriptions and their example inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dijkstra::{shortest_path, RouteTrace};
use crate::error::MismatchError;
use crate::graph::Graph;
use crate::search::{self, SearchTrace};

/// Pseudo-tag that matches every card.
pub const ALL_TAG: &str = "all";

/// The algorithms this crate can trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmId {
    Linear,
    Binary,
    Jump,
    Exponential,
    Dijkstra,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 5] = [
        AlgorithmId::Linear,
        AlgorithmId::Binary,
        AlgorithmId::Jump,
        AlgorithmId::Exponential,
        AlgorithmId::Dijkstra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::Linear => "linear",
            AlgorithmId::Binary => "binary",
            AlgorithmId::Jump => "jump",
            AlgorithmId::Exponential => "exponential",
            AlgorithmId::Dijkstra => "dijkstra",
        }
    }

    /// Which input shape the algorithm consumes.
    pub fn input_kind(&self) -> InputKind {
        match self {
            AlgorithmId::Dijkstra => InputKind::Graph,
            _ => InputKind::Sequence,
        }
    }

    /// Run the matching generator once.
    pub fn simulate(&self, input: &Input) -> Result<Trace, MismatchError> {
        let trace = match (self, input) {
            (AlgorithmId::Linear, Input::Sequence { data, target }) => {
                Trace::Search(search::linear(data, target))
            }
            (AlgorithmId::Binary, Input::Sequence { data, target }) => {
                Trace::Search(search::binary(data, target))
            }
            (AlgorithmId::Jump, Input::Sequence { data, target }) => {
                Trace::Search(search::jump(data, target))
            }
            (AlgorithmId::Exponential, Input::Sequence { data, target }) => {
                Trace::Search(search::exponential(data, target))
            }
            (AlgorithmId::Dijkstra, Input::Graph(graph)) => Trace::Route(shortest_path(graph)),
            _ => {
                return Err(MismatchError {
                    algorithm: *self,
                    expected: self.input_kind(),
                })
            }
        };
        Ok(trace)
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown algorithm {s:?}"))
    }
}

/// Input shape of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Sequence,
    Graph,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Sequence => f.write_str("a number sequence"),
            InputKind::Graph => f.write_str("a graph"),
        }
    }
}

/// Validated input for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Input {
    Sequence { data: Vec<i64>, target: i64 },
    Graph(Graph),
}

impl Input {
    /// Get the kind of input this is.
    pub fn kind(&self) -> InputKind {
        match self {
            Input::Sequence { .. } => InputKind::Sequence,
            Input::Graph(_) => InputKind::Graph,
        }
    }
}

/// Output of one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Trace {
    Search(SearchTrace),
    Route(RouteTrace),
}

impl Trace {
    /// Get the recorded steps in emission order.
    pub fn steps(&self) -> &[crate::Step] {
        match self {
            Trace::Search(trace) => &trace.steps,
            Trace::Route(trace) => &trace.steps,
        }
    }
}

/// Best, average and worst case running time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
}

impl Complexity {
    const fn uniform(bound: &'static str) -> Self {
        Self { best: bound, average: bound, worst: bound }
    }

    const fn constant_best(bound: &'static str) -> Self {
        Self { best: "O(1)", average: bound, worst: bound }
    }
}

/// Example input a card starts with.
#[derive(Debug, Clone, PartialEq)]
pub enum Fixture {
    Sequence { data: Vec<i64>, target: i64 },
    Graph(Graph),
}

impl Fixture {
    /// The fixture as a ready-to-run input.
    pub fn input(&self) -> Input {
        match self {
            Fixture::Sequence { data, target } => Input::Sequence {
                data: data.clone(),
                target: *target,
            },
            Fixture::Graph(graph) => Input::Graph(graph.clone()),
        }
    }
}

/// Descriptive card for one algorithm.
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmInfo {
    pub id: AlgorithmId,
    pub name: &'static str,
    pub description: &'static str,
    pub highlight: &'static str,
    pub complexity: Complexity,
    pub tags: &'static [&'static str],
    #[serde(skip)]
    pub fixture: Fixture,
}

impl AlgorithmInfo {
    pub fn has_tag(&self, tag: &str) -> bool {
        tag == ALL_TAG || self.tags.contains(&tag)
    }
}

/// The full set of built-in algorithm cards.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<AlgorithmInfo>,
}

impl Catalog {
    /// The five built-in cards, in display order.
    pub fn builtin() -> Self {
        let entries = vec![
            AlgorithmInfo {
                id: AlgorithmId::Linear,
                name: "Linear search",
                description: "Walks every position until the value turns up. Fits unsorted lists.",
                highlight: "Checks each element in turn until the value is found or the end is reached.",
                complexity: Complexity::constant_best("O(n)"),
                tags: &["unsorted", "simple", "array"],
                fixture: Fixture::Sequence {
                    data: vec![12, 7, 19, 3, 23, 31, 4, 15, 9, 27],
                    target: 23,
                },
            },
            AlgorithmInfo {
                id: AlgorithmId::Binary,
                name: "Binary search",
                description: "Halves the search range on every comparison. Needs a sorted list.",
                highlight: "Very fast lookups in sorted data by repeatedly halving the search space.",
                complexity: Complexity::constant_best("O(log n)"),
                tags: &["sorted", "array", "divide-and-conquer"],
                fixture: Fixture::Sequence {
                    data: vec![3, 9, 12, 17, 23, 31, 44, 52, 67, 88],
                    target: 44,
                },
            },
            AlgorithmInfo {
                id: AlgorithmId::Jump,
                name: "Jump search",
                description: "Jumps through a sorted list block by block, then scans the matching block.",
                highlight: "Combines large jumps with a short linear scan, good for bigger sorted lists.",
                complexity: Complexity::constant_best("O(√n)"),
                tags: &["sorted", "array", "optimized"],
                fixture: Fixture::Sequence {
                    data: vec![4, 7, 9, 12, 16, 21, 25, 29, 34, 38, 41, 47, 53],
                    target: 29,
                },
            },
            AlgorithmInfo {
                id: AlgorithmId::Exponential,
                name: "Exponential search",
                description: "Doubles the searched range until it passes the target, then binary-searches inside it.",
                highlight: "Works well for streams and lists of unknown length.",
                complexity: Complexity::constant_best("O(log n)"),
                tags: &["sorted", "array", "doubling"],
                fixture: Fixture::Sequence {
                    data: vec![2, 5, 8, 13, 19, 24, 30, 37, 41, 48, 55, 63, 70, 79],
                    target: 48,
                },
            },
            AlgorithmInfo {
                id: AlgorithmId::Dijkstra,
                name: "Dijkstra",
                description: "Finds the shortest path in a weighted graph, the basis of navigation and routing.",
                highlight: "Settles nodes in order of distance and relaxes their edges.",
                complexity: Complexity::uniform("O(E log V)"),
                tags: &["graph", "path", "weighted-networks"],
                fixture: Fixture::Graph(Graph::example()),
            },
        ];
        Self { entries }
    }

    /// Get all cards in display order.
    pub fn entries(&self) -> &[AlgorithmInfo] {
        &self.entries
    }

    /// Get the card for `id`.
    pub fn get(&self, id: AlgorithmId) -> Option<&AlgorithmInfo> {
        self.entries.iter().find(|info| info.id == id)
    }

    /// Every tag in first-seen order, led by [`ALL_TAG`].
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = vec![ALL_TAG];
        for &tag in self.entries.iter().flat_map(|info| info.tags.iter()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Cards carrying `tag`.
    pub fn matching<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a AlgorithmInfo> + 'a {
        self.entries.iter().filter(move |info| info.has_tag(tag))
    }
}
