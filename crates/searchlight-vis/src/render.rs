//! Presentation state driven by steps.
//!
//! A renderer receives steps one at a time and keeps whatever highlighting
//! they imply. The browser frontend only paints the serialized state, so the
//! presenters here are the single source of truth for what is lit.

use serde::{Deserialize, Serialize};

use searchlight_steps::{Graph, NodeId, Step, StepKind, Variant};

use crate::simulation::Params;

/// Capability to show steps.
pub trait Renderer: Send {
    /// Update presentation for one step.
    fn apply(&mut self, step: &Step);

    /// Clear all highlighting back to neutral.
    fn reset(&mut self);
}

/// One array cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: i64,
    /// Outside the active window
    pub inactive: bool,
    pub visited: bool,
    pub active: bool,
    pub found: bool,
}

/// Highlighting for an array of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayPresenter {
    cells: Vec<Cell>,
    active: Option<usize>,
}

impl ArrayPresenter {
    pub fn new(data: &[i64]) -> Self {
        Self {
            cells: data
                .iter()
                .map(|&value| Cell { value, ..Cell::default() })
                .collect(),
            active: None,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The single cell currently marked active.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    fn window(&mut self, low: usize, high: usize, focus: Option<usize>) {
        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.inactive = index < low || index > high;
        }
        if let Some(focus) = focus {
            self.visit(focus);
        }
    }

    fn visit(&mut self, index: usize) {
        if let Some(previous) = self.active.take() {
            if let Some(cell) = self.cells.get_mut(previous) {
                cell.active = false;
            }
        }
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        cell.inactive = false;
        cell.visited = true;
        cell.active = true;
        self.active = Some(index);
    }

    fn found(&mut self, index: usize) {
        self.visit(index);
        if let Some(cell) = self.cells.get_mut(index) {
            cell.found = true;
        }
    }
}

impl Renderer for ArrayPresenter {
    fn apply(&mut self, step: &Step) {
        match step.kind {
            StepKind::Window { low, high, mid } => self.window(low, high, mid),
            StepKind::Block { start, end } => self.window(start, end, None),
            StepKind::Visit { index } => self.visit(index),
            StepKind::Found { index } => self.found(index),
            _ => {}
        }
    }

    fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell { value: cell.value, ..Cell::default() };
        }
        self.active = None;
    }
}

/// A node with its highlight flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMark {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub visited: bool,
    pub active: bool,
}

/// An edge with its highlight flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMark {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: u64,
    pub active: bool,
}

impl EdgeMark {
    fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (self.from == *a && self.to == *b) || (self.from == *b && self.to == *a)
    }
}

/// Highlighting for a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPresenter {
    nodes: Vec<NodeMark>,
    edges: Vec<EdgeMark>,
}

impl GraphPresenter {
    pub fn new(graph: &Graph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .iter()
                .map(|node| NodeMark {
                    id: node.id.clone(),
                    x: node.x,
                    y: node.y,
                    visited: false,
                    active: false,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|edge| EdgeMark {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    weight: edge.weight,
                    active: false,
                })
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[NodeMark] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeMark] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&NodeMark> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    fn visit(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.iter_mut().find(|node| node.id == *id) {
            node.visited = true;
        }
    }

    fn activate(&mut self, id: &NodeId) {
        for node in &mut self.nodes {
            node.active = node.id == *id;
        }
    }

    fn highlight(&mut self, from: &NodeId, to: &NodeId) {
        if let Some(edge) = self.edges.iter_mut().find(|edge| edge.joins(from, to)) {
            edge.active = true;
        }
    }
}

impl Renderer for GraphPresenter {
    fn apply(&mut self, step: &Step) {
        match &step.kind {
            StepKind::VisitNode { id } => self.visit(id),
            StepKind::ActivateNode { id } => self.activate(id),
            StepKind::Edge { from, to } => self.highlight(from, to),
            StepKind::Path { from, to } => {
                self.highlight(from, to);
                self.activate(to);
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        for node in &mut self.nodes {
            node.visited = false;
            node.active = false;
        }
        for edge in &mut self.edges {
            edge.active = false;
        }
    }
}

/// Presenter matching a card's input shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Presenter {
    Array(ArrayPresenter),
    Graph(GraphPresenter),
}

impl Presenter {
    pub fn for_params(params: &Params) -> Self {
        match params {
            Params::Sequence { data, .. } => Presenter::Array(ArrayPresenter::new(data)),
            Params::Graph(graph) => Presenter::Graph(GraphPresenter::new(graph)),
        }
    }
}

impl Renderer for Presenter {
    fn apply(&mut self, step: &Step) {
        match self {
            Presenter::Array(array) => array.apply(step),
            Presenter::Graph(graph) => graph.apply(step),
        }
    }

    fn reset(&mut self) {
        match self {
            Presenter::Array(array) => array.reset(),
            Presenter::Graph(graph) => graph.reset(),
        }
    }
}

/// The status badge of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub label: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl StatusLine {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
            variant: None,
        }
    }

    pub fn success(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self { variant: Some(Variant::Success), ..Self::new(label, message) }
    }

    pub fn warning(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self { variant: Some(Variant::Warning), ..Self::new(label, message) }
    }

    pub fn ready() -> Self {
        Self::new("Ready", "Press play or take a single step to begin.")
    }

    /// Status while a step is on screen.
    pub fn for_step(step: &Step) -> Self {
        let label = match step.kind {
            StepKind::Found { .. } => "Found",
            StepKind::NotFound => "Not found",
            _ => "Active",
        };
        Self {
            label: label.to_owned(),
            message: step.message.clone(),
            variant: step.variant,
        }
    }
}
