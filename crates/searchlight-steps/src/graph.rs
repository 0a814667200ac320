//! Small weighted undirected graphs with a designated route.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::step::NodeId;

/// A node and its display position (percent of the canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self { id: NodeId::new(id), x, y }
    }
}

/// An undirected weighted edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: u64,
}

impl GraphEdge {
    pub fn new(from: &str, to: &str, weight: u64) -> Self {
        Self { from: from.into(), to: to.into(), weight }
    }

    /// The endpoint opposite `node`, if `node` is an endpoint.
    pub fn other(&self, node: &NodeId) -> Option<&NodeId> {
        if self.from == *node {
            Some(&self.to)
        } else if self.to == *node {
            Some(&self.from)
        } else {
            None
        }
    }

    /// Whether the edge joins `a` and `b` in either direction.
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (self.from == *a && self.to == *b) || (self.from == *b && self.to == *a)
    }
}

/// Unvalidated graph description, as it arrives over the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSpec {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub start: NodeId,
    pub target: NodeId,
}

/// A validated graph: unique node ids, every referenced node exists, and
/// start differs from target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphSpec")]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    start: NodeId,
    target: NodeId,
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
}

impl Graph {
    /// Validate and build a graph.
    ///
    /// Rejects duplicate ids, references to missing nodes, a start equal to
    /// the target, and edge weights whose sum does not fit in a `u64`.
    pub fn new(
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        start: NodeId,
        target: NodeId,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let known = |role: &'static str, id: &NodeId| {
            if index.contains_key(id) {
                Ok(())
            } else {
                Err(GraphError::UnknownNode { role, id: id.clone() })
            }
        };
        for edge in &edges {
            known("edge", &edge.from)?;
            known("edge", &edge.to)?;
        }
        known("start", &start)?;
        known("target", &target)?;

        if start == target {
            return Err(GraphError::DegenerateRoute(start));
        }

        // Any path cost is bounded by the total weight.
        edges
            .iter()
            .try_fold(0u64, |total, edge| total.checked_add(edge.weight))
            .ok_or(GraphError::WeightOverflow)?;

        Ok(Self { nodes, edges, start, target, index })
    }

    /// Get the nodes in list order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Get the edges in list order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Get the node the route starts from.
    pub fn start(&self) -> &NodeId {
        &self.start
    }

    /// Get the node the route should reach.
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    /// Position of a node in the node list.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Edges touching `node`, in edge-list order, paired with the far endpoint.
    pub fn incident<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = (&'a GraphEdge, &'a NodeId)> + 'a {
        self.edges
            .iter()
            .filter_map(move |edge| edge.other(node).map(|other| (edge, other)))
    }

    /// The six-node example network: A to C over weighted roads.
    pub fn example() -> Self {
        let nodes = vec![
            GraphNode::new("A", 18.0, 78.0),
            GraphNode::new("B", 50.0, 14.0),
            GraphNode::new("C", 82.0, 74.0),
            GraphNode::new("D", 25.0, 32.0),
            GraphNode::new("E", 50.0, 60.0),
            GraphNode::new("F", 75.0, 36.0),
        ];
        let edges = vec![
            GraphEdge::new("A", "D", 4),
            GraphEdge::new("A", "B", 6),
            GraphEdge::new("D", "B", 3),
            GraphEdge::new("D", "E", 5),
            GraphEdge::new("B", "F", 2),
            GraphEdge::new("E", "F", 4),
            GraphEdge::new("E", "C", 6),
            GraphEdge::new("F", "C", 3),
        ];
        Self::new(nodes, edges, "A".into(), "C".into())
            .unwrap_or_else(|e| unreachable!("example graph is well-formed: {e}"))
    }
}

impl TryFrom<GraphSpec> for Graph {
    type Error = GraphError;

    fn try_from(spec: GraphSpec) -> Result<Self> {
        Graph::new(spec.nodes, spec.edges, spec.start, spec.target)
    }
}
