//! Plain graphs: `nodes` with a `shape`, and `edges`.

use serde::Deserialize;

use mxweave_core::spec::{Edge, Node, NodeKind, RelationKind};

use super::{Draft, Reader, label_or_id};

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(alias = "name")]
    id: Option<String>,
    label: Option<String>,
    shape: Option<String>,
    style: Option<String>,
}

fn parse_shape(shape: &str) -> Option<NodeKind> {
    match shape {
        "rect" | "rectangle" | "box" => Some(NodeKind::Rect),
        "round" | "rounded" => Some(NodeKind::Round),
        "rhombus" | "diamond" => Some(NodeKind::Rhombus),
        _ => None,
    }
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();

    if let Some(section) = reader.required_section(&["nodes"]) {
        for (location, value) in section.iter() {
            let Some(raw) = reader.decode::<RawNode>(value, &location, "node") else {
                continue;
            };
            let Some(id) = reader.require(raw.id, &location, "id") else {
                continue;
            };
            let kind = reader.kind_or(
                raw.shape.as_deref(),
                &location.field("shape"),
                "shape",
                NodeKind::Rect,
                parse_shape,
            );
            let node = Node::new(&id, label_or_id(raw.label, &id), kind).with_style(raw.style);
            draft.push_node(node, location);
        }
    }

    if let Some(section) = reader.section(&["edges"]) {
        for link in reader.links(&section, "edge") {
            let edge = Edge::new(link.from, link.to, RelationKind::Flow)
                .with_label(link.label)
                .with_style(link.style);
            draft.push_edge(edge, link.location);
        }
    }

    draft
}
