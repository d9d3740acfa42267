//! Use case diagrams: `actors`, `usecases`, and `relations` between them.

use mxweave_core::spec::{Edge, Node, NodeKind, RelationKind};

use super::{Draft, Reader};
use crate::error::Location;

const ACTOR_KEYS: [&str; 1] = ["actors"];
const USECASE_KEYS: [&str; 3] = ["usecases", "use_cases", "nodes"];

fn parse_relation(kind: &str) -> Option<RelationKind> {
    match kind {
        "association" => Some(RelationKind::Association),
        "include" | "includes" => Some(RelationKind::Include),
        "extend" | "extends" => Some(RelationKind::Extend),
        "generalization" | "inheritance" => Some(RelationKind::Inheritance),
        _ => None,
    }
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();

    if !reader.has_any(&ACTOR_KEYS) && !reader.has_any(&USECASE_KEYS) {
        reader.missing(&Location::root(), USECASE_KEYS[0]);
    }

    if let Some(section) = reader.section(&ACTOR_KEYS) {
        for (location, named) in reader.named(&section, "actor") {
            let node = Node::new(named.id, named.label, NodeKind::Actor).with_style(named.style);
            draft.push_node(node, location);
        }
    }

    if let Some(section) = reader.section(&USECASE_KEYS) {
        for (location, named) in reader.named(&section, "use case") {
            let kind = match named.kind.as_deref().map(str::trim) {
                Some(kind) if kind.eq_ignore_ascii_case("actor") => NodeKind::Actor,
                _ => NodeKind::UseCase,
            };
            let node = Node::new(named.id, named.label, kind).with_style(named.style);
            draft.push_node(node, location);
        }
    }

    if let Some(section) = reader.section(&["relations", "edges"]) {
        for link in reader.links(&section, "relation") {
            let relation = reader.kind_or(
                link.kind.as_deref(),
                &link.location.field("type"),
                "relation type",
                RelationKind::Association,
                parse_relation,
            );
            let label = link.label.or_else(|| stereotype(relation));
            let edge = Edge::new(link.from, link.to, relation)
                .with_label(label)
                .with_style(link.style);
            draft.push_edge(edge, link.location);
        }
    }

    draft
}

/// Default label of stereotyped dependencies.
fn stereotype(relation: RelationKind) -> Option<String> {
    match relation {
        RelationKind::Include => Some("«include»".to_string()),
        RelationKind::Extend => Some("«extend»".to_string()),
        _ => None,
    }
}
