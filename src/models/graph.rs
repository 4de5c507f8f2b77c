use serde::{Deserialize, Serialize};

use super::DiscourseKind;

/// Display category of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Topic,
    Decision,
    Action,
    Question,
}

impl From<DiscourseKind> for NodeKind {
    fn from(kind: DiscourseKind) -> Self {
        match kind {
            DiscourseKind::Question => NodeKind::Question,
            DiscourseKind::Decision => NodeKind::Decision,
            DiscourseKind::Action => NodeKind::Action,
            DiscourseKind::Statement => NodeKind::Topic,
        }
    }
}

/// Pixel position on the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// One node of the derived meeting graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizNode {
    pub id: String,
    pub kind: NodeKind,
    /// Utterance text truncated to the display budget
    pub label: String,
    pub speaker: String,
    pub timestamp_ms: i64,
    /// Untruncated source text
    pub full_text: String,
    pub position: Position,
}

/// One directed edge of the derived meeting graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub animated: bool,
}

/// A positioned node/edge view of the utterance sequence.
///
/// Purely derived: fully recomputed from its input on each update, with no
/// lifecycle of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingGraph {
    pub nodes: Vec<VizNode>,
    pub edges: Vec<VizEdge>,
}
