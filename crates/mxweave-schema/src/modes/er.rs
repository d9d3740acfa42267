//! Entity-relationship diagrams: `entities` with typed `attributes`, and
//! `relations` between `Entity` or `Entity.column` references.

use serde::Deserialize;
use serde_json::Value;

use mxweave_core::spec::{Attribute, Edge, Node, NodeContent, NodeKind, RelationKind};

use super::{Draft, Reader, label_or_id};
use crate::error::{Diagnostic, Location};

const DEFAULT_TYPE: &str = "text";

#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(alias = "id")]
    name: Option<String>,
    label: Option<String>,
    attributes: Option<Vec<Value>>,
    style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAttribute {
    name: Option<String>,
    #[serde(rename = "type", alias = "data_type")]
    data_type: Option<String>,
    #[serde(alias = "primary_key")]
    pk: Option<bool>,
    unique: Option<bool>,
    nullable: Option<bool>,
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();

    if let Some(section) = reader.required_section(&["entities", "nodes"]) {
        for (location, value) in section.iter() {
            let Some(raw) = reader.decode::<RawEntity>(value, &location, "entity") else {
                continue;
            };
            let Some(name) = reader.require(raw.name, &location, "name") else {
                continue;
            };
            let Some(raw_attributes) = raw.attributes else {
                reader.missing(&location, "attributes");
                continue;
            };

            let attributes_location = location.field("attributes");
            let attributes = raw_attributes
                .iter()
                .enumerate()
                .filter_map(|(index, value)| {
                    read_attribute(reader, value, attributes_location.index(index))
                })
                .collect();

            let node = Node::new(&name, label_or_id(raw.label, &name), NodeKind::Entity)
                .with_content(NodeContent::Entity { attributes })
                .with_style(raw.style);
            draft.push_node(node, location);
        }
    }

    if let Some(section) = reader.section(&["relations", "edges"]) {
        for link in reader.links(&section, "relation") {
            let (source, source_field) = split_reference(&link.from, &draft);
            let (target, target_field) = split_reference(&link.to, &draft);
            let edge = Edge::new(source, target, RelationKind::Relationship)
                .with_fields(source_field, target_field)
                .with_label(link.label)
                .with_cardinality(link.cardinality)
                .with_style(link.style);
            draft.push_edge(edge, link.location);
        }
    }

    draft
}

fn read_attribute(reader: &mut Reader<'_>, value: &Value, location: Location) -> Option<Attribute> {
    let raw = reader.decode::<RawAttribute>(value, &location, "attribute")?;
    let name = reader.require(raw.name, &location, "name")?;

    let data_type = match raw.data_type.filter(|t| !t.trim().is_empty()) {
        Some(data_type) => data_type.trim().to_string(),
        None => {
            reader.emit(
                Diagnostic::warning(format!(
                    "attribute `{name}` has no type, assuming `{DEFAULT_TYPE}`"
                ))
                .with_label(location, "untyped attribute"),
            );
            DEFAULT_TYPE.to_string()
        }
    };

    Some(Attribute::new(
        name,
        data_type,
        raw.pk.unwrap_or(false),
        raw.unique.unwrap_or(false),
        raw.nullable.unwrap_or(true),
    ))
}

/// Splits `Entity.column` into its entity id and column name.
///
/// A reference that names an entity verbatim is never split, so entity names
/// containing a dot still resolve.
fn split_reference(reference: &str, draft: &Draft) -> (String, Option<String>) {
    if draft.has_node(reference) {
        return (reference.to_string(), None);
    }
    match reference.split_once('.') {
        Some((entity, column)) => (entity.trim().to_string(), Some(column.trim().to_string())),
        None => (reference.to_string(), None),
    }
}
