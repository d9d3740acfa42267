//! Activity diagrams: `activities` of a given `kind`, and flow `edges`.

use mxweave_core::spec::{Edge, Node, NodeKind, RelationKind};

use super::{Draft, Reader};

fn parse_activity(kind: &str) -> Option<NodeKind> {
    match kind {
        "start" | "initial" => Some(NodeKind::Initial),
        "end" | "final" | "stop" => Some(NodeKind::Final),
        "action" | "activity" | "task" => Some(NodeKind::Action),
        "decision" | "branch" => Some(NodeKind::Decision),
        "merge" | "join" => Some(NodeKind::Merge),
        _ => None,
    }
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();

    if let Some(section) = reader.required_section(&["activities", "nodes"]) {
        for (location, named) in reader.named(&section, "activity") {
            let kind = reader.kind_or(
                named.kind.as_deref(),
                &location.field("kind"),
                "activity kind",
                NodeKind::Action,
                parse_activity,
            );
            let node = Node::new(named.id, named.label, kind).with_style(named.style);
            draft.push_node(node, location);
        }
    }

    if let Some(section) = reader.section(&["edges", "flows", "transitions"]) {
        for link in reader.links(&section, "edge") {
            let edge = Edge::new(link.from, link.to, RelationKind::Flow)
                .with_label(link.label)
                .with_style(link.style);
            draft.push_edge(edge, link.location);
        }
    }

    draft
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use mxweave_core::spec::{Mode, NodeKind};

    use crate::error::DiagnosticCollector;
    use crate::modes;

    #[test]
    fn test_activity_kinds() {
        let input = json!({
            "activities": [
                {"id": "s", "kind": "start"},
                {"id": "check", "label": "Valid?", "kind": "decision"},
                {"id": "save", "label": "Save order"},
                {"id": "e", "kind": "end"}
            ],
            "edges": [
                {"from": "s", "to": "check"},
                {"from": "check", "to": "save", "label": "yes"},
                {"from": "check", "to": "e", "label": "no"},
                {"from": "save", "to": "e"}
            ]
        });
        let mut collector = DiagnosticCollector::new();
        let draft = modes::read(Mode::Activity, input.as_object().unwrap(), &mut collector);

        let kinds: Vec<NodeKind> = draft.nodes.iter().map(|n| n.value.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Initial,
                NodeKind::Decision,
                NodeKind::Action,
                NodeKind::Final
            ]
        );
        assert_eq!(draft.nodes[1].value.label(), "Valid?");
        assert_eq!(draft.edges.len(), 4);
        assert!(collector.finish().unwrap().is_empty());
    }
}
