//! Cross-reference validation of a [`Draft`]: node id rules and edge endpoints.

use indexmap::{IndexMap, map::Entry};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, Location},
    modes::Draft,
};

/// Separator reserved for generated cell ids.
pub const RESERVED_ID_SEQUENCE: &str = "::";

/// Number of known ids listed in the help of an unknown-endpoint error.
const KNOWN_IDS_SHOWN: usize = 8;

pub(crate) fn validate(draft: &Draft, collector: &mut DiagnosticCollector) {
    let mut known: IndexMap<&str, &Location> = IndexMap::new();

    for node in &draft.nodes {
        let id = node.value.id();
        if id.is_empty() {
            collector.emit(
                Diagnostic::error("node id must not be empty")
                    .with_code(ErrorCode::E200)
                    .with_label(node.location.clone(), "empty id"),
            );
            continue;
        }

        if id.contains(RESERVED_ID_SEQUENCE) {
            collector.emit(
                Diagnostic::error(format!(
                    "node id `{id}` contains the reserved sequence `{RESERVED_ID_SEQUENCE}`"
                ))
                .with_code(ErrorCode::E202)
                .with_label(node.location.clone(), "invalid id")
                .with_help("rename the node without `::`"),
            );
        }

        match known.entry(id) {
            Entry::Occupied(first) => {
                collector.emit(
                    Diagnostic::error(format!("node id `{id}` is defined multiple times"))
                        .with_code(ErrorCode::E201)
                        .with_label(node.location.clone(), "duplicate definition")
                        .with_secondary_label((*first.get()).clone(), "first defined here")
                        .with_help("node ids must be unique within a diagram"),
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(&node.location);
            }
        }
    }

    for edge in &draft.edges {
        for (role, endpoint) in [("source", edge.value.source()), ("target", edge.value.target())] {
            if known.contains_key(endpoint) {
                continue;
            }
            collector.emit(
                Diagnostic::error(format!("edge {role} `{endpoint}` is not a known node"))
                    .with_code(ErrorCode::E203)
                    .with_label(edge.location.clone(), format!("unknown {role}"))
                    .with_help(known_ids_help(&known)),
            );
        }
    }
}

fn known_ids_help(known: &IndexMap<&str, &Location>) -> String {
    if known.is_empty() {
        return "no nodes are defined".to_string();
    }
    let mut shown: Vec<String> = known
        .keys()
        .take(KNOWN_IDS_SHOWN)
        .map(|id| format!("`{id}`"))
        .collect();
    if known.len() > KNOWN_IDS_SHOWN {
        shown.push(format!("and {} more", known.len() - KNOWN_IDS_SHOWN));
    }
    format!("known ids: {}", shown.join(", "))
}
