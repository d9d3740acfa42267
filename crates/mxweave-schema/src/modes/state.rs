//! State machines: `states`, `transitions`, and optional `start` / `end` states.
//!
//! `start` adds an initial pseudo-state `[start]` with a transition into the
//! named state; `end` adds a final pseudo-state `[end]` reached from it.

use mxweave_core::spec::{Edge, Node, NodeKind, RelationKind};

use super::{Draft, Reader};
use crate::error::Location;

pub(crate) const START_ID: &str = "[start]";
pub(crate) const END_ID: &str = "[end]";

fn parse_state(kind: &str) -> Option<NodeKind> {
    match kind {
        "state" | "simple" => Some(NodeKind::State),
        "initial" | "start" => Some(NodeKind::Initial),
        "final" | "end" => Some(NodeKind::Final),
        "choice" | "decision" => Some(NodeKind::Decision),
        _ => None,
    }
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();

    if let Some(section) = reader.required_section(&["states", "nodes"]) {
        for (location, named) in reader.named(&section, "state") {
            let kind = reader.kind_or(
                named.kind.as_deref(),
                &location.field("kind"),
                "state kind",
                NodeKind::State,
                parse_state,
            );
            let node = Node::new(named.id, named.label, kind).with_style(named.style);
            draft.push_node(node, location);
        }
    }

    let start = reader.string_field("start");
    let end = reader.string_field("end");

    if let Some(start) = start {
        let location = Location::root().field("start");
        draft.push_node(Node::new(START_ID, "", NodeKind::Initial), location.clone());
        draft.push_edge(
            Edge::new(START_ID, start.trim(), RelationKind::Transition),
            location,
        );
    }

    if let Some(section) = reader.section(&["transitions", "edges"]) {
        for link in reader.links(&section, "transition") {
            let edge = Edge::new(link.from, link.to, RelationKind::Transition)
                .with_label(link.label)
                .with_style(link.style);
            draft.push_edge(edge, link.location);
        }
    }

    if let Some(end) = end {
        let location = Location::root().field("end");
        draft.push_node(Node::new(END_ID, "", NodeKind::Final), location.clone());
        draft.push_edge(
            Edge::new(end.trim(), END_ID, RelationKind::Transition),
            location,
        );
    }

    draft
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use mxweave_core::spec::{Mode, NodeKind};

    use super::{END_ID, START_ID};
    use crate::error::DiagnosticCollector;
    use crate::modes;

    #[test]
    fn test_state_pseudo_nodes() {
        let input = json!({
            "states": ["Idle", {"id": "Running", "label": "Running job"}],
            "transitions": [
                {"from": "Idle", "to": "Running", "label": "start"},
                {"from": "Running", "to": "Idle", "label": "done"}
            ],
            "start": "Idle",
            "end": "Running"
        });
        let mut collector = DiagnosticCollector::new();
        let draft = modes::read(Mode::State, input.as_object().unwrap(), &mut collector);

        let ids: Vec<&str> = draft.nodes.iter().map(|n| n.value.id()).collect();
        assert_eq!(ids, vec!["Idle", "Running", START_ID, END_ID]);
        assert_eq!(draft.nodes[2].value.kind(), NodeKind::Initial);
        assert_eq!(draft.nodes[3].value.kind(), NodeKind::Final);

        assert_eq!(draft.edges.len(), 4);
        assert_eq!(draft.edges[0].value.source(), START_ID);
        assert_eq!(draft.edges[0].value.target(), "Idle");
        assert_eq!(draft.edges[3].value.target(), END_ID);
        assert!(collector.finish().unwrap().is_empty());
    }
}
