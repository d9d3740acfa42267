//! Per-mode input schemas.
//!
//! Every mode reads its own section keys and field rules into a [`Draft`]:
//! nodes and edges tagged with the location they were read from. Shape errors
//! and missing fields are reported here; cross-references are checked
//! afterwards by the validator.

mod activity;
mod class;
mod er;
mod generic;
mod sequence;
mod state;
mod usecase;

use log::trace;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use mxweave_core::spec::{Edge, Mode, Node};

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode, Location};

/// A value together with the location it was read from.
#[derive(Debug)]
pub(crate) struct Located<T> {
    pub value: T,
    pub location: Location,
}

/// Nodes and edges read from the input, not yet cross-validated.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub nodes: Vec<Located<Node>>,
    pub edges: Vec<Located<Edge>>,
}

impl Draft {
    pub fn push_node(&mut self, node: Node, location: Location) {
        self.nodes.push(Located {
            value: node,
            location,
        });
    }

    pub fn push_edge(&mut self, edge: Edge, location: Location) {
        self.edges.push(Located {
            value: edge,
            location,
        });
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.value.id() == id)
    }
}

/// Reads the nodes and edges of `object` using the schema of `mode`.
pub(crate) fn read(
    mode: Mode,
    object: &Map<String, Value>,
    collector: &mut DiagnosticCollector,
) -> Draft {
    let mut reader = Reader { object, collector };
    let draft = match mode {
        Mode::Er => er::read(&mut reader),
        Mode::Class => class::read(&mut reader),
        Mode::Sequence => sequence::read(&mut reader),
        Mode::State => state::read(&mut reader),
        Mode::Activity => activity::read(&mut reader),
        Mode::Usecase => usecase::read(&mut reader),
        Mode::Generic => generic::read(&mut reader),
    };
    trace!(
        mode = mode.as_str(),
        nodes = draft.nodes.len(),
        edges = draft.edges.len();
        "Read draft"
    );
    draft
}

/// A node given either as a bare name or as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawNamed {
    Name(String),
    Object {
        #[serde(alias = "name")]
        id: Option<String>,
        label: Option<String>,
        #[serde(alias = "type")]
        kind: Option<String>,
        style: Option<String>,
    },
}

/// A named node after its id requirement was checked.
pub(crate) struct Named {
    pub id: String,
    pub label: String,
    pub kind: Option<String>,
    pub style: Option<String>,
}

/// The edge shape shared by every mode. Fields a mode does not use are ignored.
#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(alias = "source")]
    from: Option<String>,
    #[serde(alias = "target")]
    to: Option<String>,
    #[serde(alias = "name")]
    label: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    kind: Option<String>,
    cardinality: Option<String>,
    style: Option<String>,
}

/// An edge after its endpoint requirements were checked.
pub(crate) struct Link {
    pub location: Location,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub kind: Option<String>,
    pub cardinality: Option<String>,
    pub style: Option<String>,
}

/// A list-valued top-level section.
pub(crate) struct Section<'a> {
    key: &'static str,
    items: &'a [Value],
}

impl<'a> Section<'a> {
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Items with their locations, in input order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &'a Value)> + use<'a> {
        let base = Location::root().field(self.key);
        self.items
            .iter()
            .enumerate()
            .map(move |(index, value)| (base.index(index), value))
    }
}

/// Schema-reading helpers over one input object.
pub(crate) struct Reader<'a> {
    object: &'a Map<String, Value>,
    collector: &'a mut DiagnosticCollector,
}

impl<'a> Reader<'a> {
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.collector.emit(diagnostic);
    }

    /// Returns `true` when any of `keys` is present at the top level.
    pub fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.object.contains_key(*key))
    }

    /// The first present section among `keys`.
    ///
    /// A section that is not an array is reported as a shape error and skipped.
    pub fn section(&mut self, keys: &[&'static str]) -> Option<Section<'a>> {
        let object = self.object;
        let (key, value) = keys
            .iter()
            .find_map(|key| object.get(*key).map(|value| (*key, value)))?;

        match value {
            Value::Array(items) => Some(Section { key, items }),
            Value::Null => None,
            other => {
                self.emit(
                    Diagnostic::error(format!(
                        "`{key}` must be a list, found {}",
                        value_kind(other)
                    ))
                    .with_code(ErrorCode::E100)
                    .with_label(Location::root().field(key), "expected a list"),
                );
                None
            }
        }
    }

    /// Like [`Reader::section`], but reports a missing section as E101.
    pub fn required_section(&mut self, keys: &[&'static str]) -> Option<Section<'a>> {
        if !self.has_any(keys) {
            self.missing(&Location::root(), keys[0]);
            return None;
        }
        self.section(keys)
    }

    /// An optional top-level string such as `start` or `end`.
    pub fn string_field(&mut self, key: &'static str) -> Option<String> {
        let value = self.object.get(key)?;
        self.decode::<Option<String>>(value, &Location::root().field(key), key)
            .flatten()
    }

    /// Deserializes `value`, reporting a shape error at `location` on failure.
    pub fn decode<T: DeserializeOwned>(
        &mut self,
        value: &Value,
        location: &Location,
        what: &str,
    ) -> Option<T> {
        match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                self.emit(
                    Diagnostic::error(format!("invalid {what}: {err}"))
                        .with_code(ErrorCode::E100)
                        .with_label(location.clone(), format!("this {what}")),
                );
                None
            }
        }
    }

    /// Returns the trimmed value of a required string field, or reports E101.
    pub fn require(
        &mut self,
        value: Option<String>,
        location: &Location,
        field: &str,
    ) -> Option<String> {
        match value {
            Some(value) => Some(value.trim().to_string()),
            None => {
                self.missing(location, field);
                None
            }
        }
    }

    /// Reports a missing required field of the object at `location`.
    pub fn missing(&mut self, location: &Location, field: &str) {
        self.emit(
            Diagnostic::error(format!("missing required field `{field}`"))
                .with_code(ErrorCode::E101)
                .with_label(location.field(field), "required here"),
        );
    }

    /// Reads a list of bare names or `{id, label}` objects.
    pub fn named(&mut self, section: &Section<'a>, what: &str) -> Vec<(Location, Named)> {
        let mut named = Vec::new();
        for (location, value) in section.iter() {
            let Some(raw) = self.decode::<RawNamed>(value, &location, what) else {
                continue;
            };
            let entry = match raw {
                RawNamed::Name(name) => {
                    let id = name.trim().to_string();
                    Named {
                        label: id.clone(),
                        id,
                        kind: None,
                        style: None,
                    }
                }
                RawNamed::Object {
                    id,
                    label,
                    kind,
                    style,
                } => {
                    let Some(id) = self.require(id, &location, "id") else {
                        continue;
                    };
                    Named {
                        label: label_or_id(label, &id),
                        id,
                        kind,
                        style,
                    }
                }
            };
            named.push((location, entry));
        }
        named
    }

    /// Reads an edge section; edges lacking an endpoint are reported and dropped.
    pub fn links(&mut self, section: &Section<'a>, what: &str) -> Vec<Link> {
        let mut links = Vec::new();
        for (location, value) in section.iter() {
            let Some(raw) = self.decode::<RawLink>(value, &location, what) else {
                continue;
            };
            let from = self.require(raw.from, &location, "from");
            let to = self.require(raw.to, &location, "to");
            let (Some(from), Some(to)) = (from, to) else {
                continue;
            };
            links.push(Link {
                location,
                from,
                to,
                label: raw.label,
                kind: raw.kind,
                cardinality: raw.cardinality,
                style: raw.style,
            });
        }
        links
    }

    /// Parses an optional kind string, warning and using `default` when unknown.
    pub fn kind_or<T: Copy>(
        &mut self,
        value: Option<&str>,
        location: &Location,
        what: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        let Some(value) = value else {
            return default;
        };
        match parse(value.trim().to_ascii_lowercase().as_str()) {
            Some(kind) => kind,
            None => {
                self.emit(
                    Diagnostic::warning(format!("unknown {what} `{value}`, using the default"))
                        .with_label(location.clone(), "ignored value"),
                );
                default
            }
        }
    }
}

/// The label, or the id when the label is missing or blank.
pub(crate) fn label_or_id(label: Option<String>, id: &str) -> String {
    label
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| id.to_string())
}

/// A short name for the JSON type of `value`, for messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
