//! Sequence diagrams: `participants` and ordered `messages`.
//!
//! Without a `participants` list, lifelines are derived from the messages in
//! order of first appearance.

use mxweave_core::spec::{Edge, Node, NodeKind, RelationKind};

use super::{Draft, Reader};

const PARTICIPANT_KEYS: [&str; 3] = ["participants", "lifelines", "nodes"];

fn parse_message(kind: &str) -> Option<RelationKind> {
    match kind {
        "sync" | "call" | "message" => Some(RelationKind::Message),
        "async" => Some(RelationKind::AsyncMessage),
        "reply" | "return" | "response" => Some(RelationKind::Reply),
        _ => None,
    }
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();
    let declared = reader.has_any(&PARTICIPANT_KEYS);

    if let Some(section) = reader.section(&PARTICIPANT_KEYS) {
        for (location, named) in reader.named(&section, "participant") {
            let node = Node::new(named.id, named.label, NodeKind::Lifeline).with_style(named.style);
            draft.push_node(node, location);
        }
    }

    let section = if declared {
        reader.section(&["messages", "edges"])
    } else {
        reader.required_section(&["messages", "edges"])
    };
    let Some(section) = section else {
        return draft;
    };

    for link in reader.links(&section, "message") {
        if !declared {
            for id in [&link.from, &link.to] {
                if !draft.has_node(id) {
                    let node = Node::new(id.as_str(), id.as_str(), NodeKind::Lifeline);
                    draft.push_node(node, link.location.clone());
                }
            }
        }

        let relation = reader.kind_or(
            link.kind.as_deref(),
            &link.location.field("kind"),
            "message kind",
            RelationKind::Message,
            parse_message,
        );
        let edge = Edge::new(link.from, link.to, relation)
            .with_label(link.label)
            .with_style(link.style);
        draft.push_edge(edge, link.location);
    }

    draft
}
