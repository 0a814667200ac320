//! Simulation runs: user parameters in, a recorded step list out.

use rand::Rng;
use serde::{Deserialize, Serialize};

use searchlight_steps::dataset::{pick_target, random_sorted, DEFAULT_LEN};
use searchlight_steps::{
    AlgorithmId, AlgorithmInfo, Fixture, Graph, Input, InputKind, NodeId, Route, Step, Trace,
};

use crate::error::{Error, Result};
use crate::render::StatusLine;

/// Parameters as the user supplied them. The target is still raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Params {
    Sequence {
        data: Vec<i64>,
        #[serde(default)]
        target: Option<String>,
    },
    Graph(Graph),
}

/// An algorithm together with the parameters to run it on.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub algorithm: AlgorithmId,
    pub params: Params,
}

impl Selection {
    pub fn new(algorithm: AlgorithmId, params: Params) -> Self {
        Self { algorithm, params }
    }

    /// The card's built-in example.
    pub fn from_fixture(info: &AlgorithmInfo) -> Self {
        let params = match &info.fixture {
            Fixture::Sequence { data, target } => Params::Sequence {
                data: data.clone(),
                target: Some(target.to_string()),
            },
            Fixture::Graph(graph) => Params::Graph(graph.clone()),
        };
        Self::new(info.id, params)
    }

    /// Fresh random sorted data with a target drawn from it.
    pub fn shuffled<R: Rng + ?Sized>(algorithm: AlgorithmId, rng: &mut R) -> Self {
        let data = random_sorted(rng, DEFAULT_LEN);
        let target = pick_target(rng, &data).map(|t| t.to_string());
        Self::new(algorithm, Params::Sequence { data, target })
    }

    /// Validate the parameters into a generator input.
    pub fn input(&self) -> Result<Input> {
        match &self.params {
            Params::Sequence { data, target } => Ok(Input::Sequence {
                data: data.clone(),
                target: parse_target(target.as_deref())?,
            }),
            Params::Graph(graph) => Ok(Input::Graph(graph.clone())),
        }
    }
}

/// Parse a user-entered target. Blank text counts as missing.
pub fn parse_target(raw: Option<&str>) -> Result<i64> {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(Error::MissingTarget);
    }
    text.parse().map_err(|_| Error::InvalidTarget(text.to_owned()))
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// The target value sits at `index`
    Found { index: usize },
    /// A shortest path exists
    Routed { route: Route },
    /// Exhausted without a match
    NotFound,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::NotFound)
    }
}

/// The steps and outcome of one generator invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    algorithm: AlgorithmId,
    steps: Vec<Step>,
    outcome: Outcome,
    /// What was sought, for messages ("44", or "A → C").
    sought: String,
}

impl Run {
    /// Invoke the selected generator once.
    pub fn prepare(selection: &Selection) -> Result<Self> {
        let input = selection.input()?;
        let trace = selection.algorithm.simulate(&input)?;
        Ok(Self::from_trace(selection.algorithm, &input, trace))
    }

    fn from_trace(algorithm: AlgorithmId, input: &Input, trace: Trace) -> Self {
        let sought = match input {
            Input::Sequence { target, .. } => target.to_string(),
            Input::Graph(graph) => route_label(graph.start(), graph.target()),
        };
        let (steps, outcome) = match trace {
            Trace::Search(search) => {
                let outcome = match search.found {
                    Some(index) => Outcome::Found { index },
                    None => Outcome::NotFound,
                };
                (search.steps, outcome)
            }
            Trace::Route(route) => {
                let outcome = match route.route {
                    Some(route) => Outcome::Routed { route },
                    None => Outcome::NotFound,
                };
                (route.steps, outcome)
            }
        };
        Self { algorithm, steps, outcome, sought }
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Final status shown once the run is exhausted.
    pub fn summary(&self) -> StatusLine {
        match &self.outcome {
            Outcome::Found { index } => StatusLine::success(
                "Found",
                format!("The value {} was found at index {index}.", self.sought),
            ),
            Outcome::Routed { route } => {
                let path: Vec<&str> = route.nodes.iter().map(NodeId::as_str).collect();
                StatusLine::success(
                    "Found",
                    format!("Shortest path {} with cost {}.", path.join(" → "), route.cost),
                )
            }
            Outcome::NotFound if self.algorithm.input_kind() == InputKind::Graph => {
                StatusLine::warning("Not found", format!("No path {}.", self.sought))
            }
            Outcome::NotFound => StatusLine::warning(
                "Not found",
                format!("The value {} is not in the current data.", self.sought),
            ),
        }
    }
}

fn route_label(start: &NodeId, target: &NodeId) -> String {
    format!("{start} → {target}")
}
