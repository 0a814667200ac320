//! Step records: the replayable unit of an algorithm trace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Presentation hint attached to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Success,
    Warning,
}

/// What a step does to the visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StepKind {
    /// An index is being compared with the target
    Visit { index: usize },

    /// The active search range narrowed to `[low, high]`, optionally focused on `mid`
    Window {
        low: usize,
        high: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mid: Option<usize>,
    },

    /// A jump-search block `[start, end]`
    Block { start: usize, end: usize },

    /// The target sits at `index` (terminal)
    Found { index: usize },

    /// The search is exhausted (terminal)
    NotFound,

    /// Narrative only
    Note,

    /// A node becomes the highlighted candidate
    ActivateNode { id: NodeId },

    /// A node is settled
    VisitNode { id: NodeId },

    /// An edge is relaxed
    Edge { from: NodeId, to: NodeId },

    /// An edge belongs to the reconstructed shortest path
    Path { from: NodeId, to: NodeId },
}

/// One recorded step with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub kind: StepKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl Step {
    /// Create a step without a variant.
    pub fn new(kind: StepKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            variant: None,
        }
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(StepKind::Note, message)
    }

    /// A `found` step tagged as success.
    pub fn found(index: usize) -> Self {
        Self::new(StepKind::Found { index }, format!("Match at index {index}"))
            .with_variant(Variant::Success)
    }

    /// A `not-found` step tagged as warning.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StepKind::NotFound, message).with_variant(Variant::Warning)
    }

    /// Attach a presentation variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Whether this step ends a run (`found` or `not-found`).
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, StepKind::Found { .. } | StepKind::NotFound)
    }
}
