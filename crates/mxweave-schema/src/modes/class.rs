//! UML class diagrams: `classes` with `attributes` and `methods`, and typed
//! `relations`.

use serde::Deserialize;
use serde_json::Value;

use mxweave_core::spec::{Edge, Member, Node, NodeContent, NodeKind, RelationKind, Visibility};

use super::{Draft, Reader, label_or_id};
use crate::error::{Diagnostic, Location};

#[derive(Debug, Deserialize)]
struct RawClass {
    #[serde(alias = "id")]
    name: Option<String>,
    label: Option<String>,
    #[serde(default)]
    attributes: Vec<Value>,
    #[serde(default)]
    methods: Vec<Value>,
    style: Option<String>,
}

/// A member given as `"+ name: type"` or as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMember {
    Text(String),
    Object {
        visibility: Option<String>,
        name: Option<String>,
        #[serde(rename = "type")]
        data_type: Option<String>,
        signature: Option<String>,
    },
}

#[derive(Debug, Clone, Copy)]
enum MemberSection {
    Attribute,
    Method,
}

fn parse_relation(kind: &str) -> Option<RelationKind> {
    match kind {
        "association" => Some(RelationKind::Association),
        "aggregation" => Some(RelationKind::Aggregation),
        "composition" => Some(RelationKind::Composition),
        "inheritance" | "generalization" | "extends" => Some(RelationKind::Inheritance),
        "dependency" => Some(RelationKind::Dependency),
        "realization" | "implements" => Some(RelationKind::Realization),
        _ => None,
    }
}

pub(super) fn read(reader: &mut Reader<'_>) -> Draft {
    let mut draft = Draft::default();

    if let Some(section) = reader.required_section(&["classes", "nodes"]) {
        for (location, value) in section.iter() {
            let Some(raw) = reader.decode::<RawClass>(value, &location, "class") else {
                continue;
            };
            let Some(name) = reader.require(raw.name, &location, "name") else {
                continue;
            };

            let attributes = read_members(
                reader,
                &raw.attributes,
                &location.field("attributes"),
                MemberSection::Attribute,
            );
            let methods = read_members(
                reader,
                &raw.methods,
                &location.field("methods"),
                MemberSection::Method,
            );

            let node = Node::new(&name, label_or_id(raw.label, &name), NodeKind::Class)
                .with_content(NodeContent::Class {
                    attributes,
                    methods,
                })
                .with_style(raw.style);
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
            let edge = Edge::new(link.from, link.to, relation)
                .with_label(link.label)
                .with_style(link.style);
            draft.push_edge(edge, link.location);
        }
    }

    draft
}

fn read_members(
    reader: &mut Reader<'_>,
    values: &[Value],
    base: &Location,
    section: MemberSection,
) -> Vec<Member> {
    let mut members = Vec::new();
    for (index, value) in values.iter().enumerate() {
        let location = base.index(index);
        let Some(raw) = reader.decode::<RawMember>(value, &location, "member") else {
            continue;
        };
        let member = match raw {
            RawMember::Text(text) => split_visibility(&text),
            RawMember::Object {
                visibility,
                name,
                data_type,
                signature,
            } => {
                let text = match section {
                    MemberSection::Attribute => {
                        let Some(name) = reader.require(name, &location, "name") else {
                            continue;
                        };
                        match data_type.filter(|t| !t.trim().is_empty()) {
                            Some(data_type) => format!("{name}: {}", data_type.trim()),
                            None => name,
                        }
                    }
                    MemberSection::Method => {
                        let Some(signature) =
                            reader.require(signature.or(name), &location, "signature")
                        else {
                            continue;
                        };
                        signature
                    }
                };
                let visibility = read_visibility(reader, visibility.as_deref(), &location);
                Member::new(visibility, text)
            }
        };
        members.push(member);
    }
    members
}

fn read_visibility(reader: &mut Reader<'_>, value: Option<&str>, location: &Location) -> Visibility {
    let Some(value) = value else {
        return Visibility::default();
    };
    value.parse().unwrap_or_else(|err| {
        reader.emit(
            Diagnostic::warning(format!("{err}, using `+`"))
                .with_label(location.field("visibility"), "ignored value"),
        );
        Visibility::default()
    })
}

/// Splits a leading visibility marker off a member line such as `- secret: str`.
fn split_visibility(text: &str) -> Member {
    let text = text.trim();
    let mut chars = text.chars();
    let visibility = chars
        .next()
        .filter(|first| matches!(first, '+' | '-' | '#' | '~'))
        .and_then(|first| first.to_string().parse::<Visibility>().ok());
    match visibility {
        Some(visibility) => Member::new(visibility, chars.as_str().trim_start()),
        None => Member::new(Visibility::default(), text),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use mxweave_core::spec::{Mode, NodeContent, RelationKind, Visibility};

    use super::split_visibility;
    use crate::error::DiagnosticCollector;
    use crate::modes;

    #[test]
    fn test_split_visibility() {
        let member = split_visibility("- secret: string");
        assert_eq!(member.visibility(), Visibility::Private);
        assert_eq!(member.text(), "secret: string");

        let plain = split_visibility("count: int");
        assert_eq!(plain.visibility(), Visibility::Public);
        assert_eq!(plain.text(), "count: int");
    }

    #[test]
    fn test_class_members_and_relations() {
        let input = json!({
            "classes": [
                {"name": "Account",
                 "attributes": [{"visibility": "-", "name": "balance", "type": "Decimal"}],
                 "methods": [{"visibility": "+", "signature": "deposit(amount)"}, "# audit()"]},
                {"name": "Savings"}
            ],
            "relations": [
                {"from": "Savings", "to": "Account", "type": "generalization"},
                {"from": "Account", "to": "Savings", "type": "friendship"}
            ]
        });
        let mut collector = DiagnosticCollector::new();
        let draft = modes::read(Mode::Class, input.as_object().unwrap(), &mut collector);

        let NodeContent::Class { attributes, methods } = draft.nodes[0].value.content() else {
            panic!("expected class content");
        };
        assert_eq!(attributes[0].row_text(), "- balance: Decimal");
        assert_eq!(methods[0].row_text(), "+ deposit(amount)");
        assert_eq!(methods[1].row_text(), "# audit()");

        assert_eq!(draft.edges[0].value.relation(), RelationKind::Inheritance);
        assert_eq!(draft.edges[1].value.relation(), RelationKind::Association);

        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message().contains("friendship"));
    }
}
