use crate::heuristics::DiscourseClassifier;
use crate::models::{MeetingGraph, NodeKind, Position, Utterance, VizEdge, VizNode};

/// Nodes per grid row.
pub const GRID_COLUMNS: usize = 3;
/// Horizontal spacing between grid columns, pixels.
pub const COLUMN_SPACING_PX: i64 = 300;
/// Vertical spacing between grid rows, pixels.
pub const ROW_SPACING_PX: i64 = 180;
/// Left offset of the first column, pixels.
pub const GRID_X_OFFSET_PX: i64 = 100;
/// Top offset of the first row, pixels.
pub const GRID_Y_OFFSET_PX: i64 = 50;
/// Character budget for node labels.
pub const LABEL_CHAR_BUDGET: usize = 50;

/// Project the utterance sequence into a positioned node/edge graph.
///
/// Pure function of its input: identical sequences yield identical graphs,
/// and extending the sequence only appends nodes/edges without touching
/// the existing prefix. One node per utterance, one edge per back-reference.
pub fn project(utterances: &[Utterance], classifier: &dyn DiscourseClassifier) -> MeetingGraph {
    let nodes = utterances
        .iter()
        .enumerate()
        .map(|(index, u)| VizNode {
            id: u.id.clone(),
            kind: NodeKind::from(classifier.classify(&u.text)),
            label: truncate_label(&u.text),
            speaker: u.speaker.clone(),
            timestamp_ms: u.timestamp_ms,
            full_text: u.text.clone(),
            position: grid_position(index),
        })
        .collect();

    let edges = utterances
        .iter()
        .filter_map(|u| {
            u.related_to.as_ref().map(|source| VizEdge {
                id: format!("edge-{}-{}", source, u.id),
                source: source.clone(),
                target: u.id.clone(),
                animated: true,
            })
        })
        .collect();

    MeetingGraph { nodes, edges }
}

/// Batch projection of key topics into a simple chain graph.
///
/// Shape-compatible with [`project`]'s output; used when there is no
/// utterance sequence, only a list of topics to lay out.
pub fn project_topics(key_topics: &[String]) -> MeetingGraph {
    let nodes: Vec<VizNode> = key_topics
        .iter()
        .enumerate()
        .map(|(index, topic)| VizNode {
            id: (index + 1).to_string(),
            kind: NodeKind::Topic,
            label: truncate_label(topic),
            speaker: String::new(),
            timestamp_ms: 0,
            full_text: topic.clone(),
            position: grid_position(index),
        })
        .collect();

    let edges = nodes
        .windows(2)
        .map(|pair| VizEdge {
            id: format!("e{}-{}", pair[0].id, pair[1].id),
            source: pair[0].id.clone(),
            target: pair[1].id.clone(),
            animated: true,
        })
        .collect();

    MeetingGraph { nodes, edges }
}

/// Fixed grid position for the node at the given sequence index.
fn grid_position(index: usize) -> Position {
    let column = (index % GRID_COLUMNS) as i64;
    let row = (index / GRID_COLUMNS) as i64;
    Position {
        x: column * COLUMN_SPACING_PX + GRID_X_OFFSET_PX,
        y: row * ROW_SPACING_PX + GRID_Y_OFFSET_PX,
    }
}

/// Truncate text to the label budget, marking the cut with an ellipsis.
fn truncate_label(text: &str) -> String {
    if text.chars().count() > LABEL_CHAR_BUDGET {
        let truncated: String = text.chars().take(LABEL_CHAR_BUDGET).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
