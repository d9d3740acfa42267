//! Style resolution for diagram elements.

use std::fmt;

use indexmap::IndexSet;
use log::{debug, warn};
use serde::Deserialize;

use mxweave_core::spec::{Edge, Mode, Node, NodeKind, RelationKind};

use super::table::{StyleRef, StyleTable};

/// The element classes that caller overrides apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleClass {
    ErEntity,
    ErEdge,
    Class,
    ClassEdge,
    Actor,
    Usecase,
    /// Any other node.
    Vertex,
    /// Any other edge.
    Edge,
}

impl StyleClass {
    pub const ALL: [StyleClass; 8] = [
        StyleClass::ErEntity,
        StyleClass::ErEdge,
        StyleClass::Class,
        StyleClass::ClassEdge,
        StyleClass::Actor,
        StyleClass::Usecase,
        StyleClass::Vertex,
        StyleClass::Edge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleClass::ErEntity => "er_entity",
            StyleClass::ErEdge => "er_edge",
            StyleClass::Class => "class",
            StyleClass::ClassEdge => "class_edge",
            StyleClass::Actor => "actor",
            StyleClass::Usecase => "usecase",
            StyleClass::Vertex => "vertex",
            StyleClass::Edge => "edge",
        }
    }

    pub fn for_node(node: &Node) -> Self {
        match node.kind() {
            NodeKind::Entity => StyleClass::ErEntity,
            NodeKind::Class => StyleClass::Class,
            NodeKind::Actor => StyleClass::Actor,
            NodeKind::UseCase => StyleClass::Usecase,
            _ => StyleClass::Vertex,
        }
    }

    pub fn is_edge(self) -> bool {
        matches!(
            self,
            StyleClass::ErEdge | StyleClass::ClassEdge | StyleClass::Edge
        )
    }

    pub fn for_edge(mode: Mode) -> Self {
        match mode {
            Mode::Er => StyleClass::ErEdge,
            Mode::Class => StyleClass::ClassEdge,
            _ => StyleClass::Edge,
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied style per element class: a style key or a literal style.
///
/// Deserialized from the `[style.overrides]` configuration table and
/// extended by command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    er_entity: Option<String>,
    er_edge: Option<String>,
    class: Option<String>,
    class_edge: Option<String>,
    actor: Option<String>,
    usecase: Option<String>,
    vertex: Option<String>,
    edge: Option<String>,
}

impl StyleOverrides {
    pub fn get(&self, class: StyleClass) -> Option<&str> {
        self.slot(class).as_deref()
    }

    /// Sets the override of `class` when `value` is given.
    pub fn with(mut self, class: StyleClass, value: Option<String>) -> Self {
        if value.is_some() {
            *self.slot_mut(class) = value;
        }
        self
    }

    fn slot(&self, class: StyleClass) -> &Option<String> {
        match class {
            StyleClass::ErEntity => &self.er_entity,
            StyleClass::ErEdge => &self.er_edge,
            StyleClass::Class => &self.class,
            StyleClass::ClassEdge => &self.class_edge,
            StyleClass::Actor => &self.actor,
            StyleClass::Usecase => &self.usecase,
            StyleClass::Vertex => &self.vertex,
            StyleClass::Edge => &self.edge,
        }
    }

    fn slot_mut(&mut self, class: StyleClass) -> &mut Option<String> {
        match class {
            StyleClass::ErEntity => &mut self.er_entity,
            StyleClass::ErEdge => &mut self.er_edge,
            StyleClass::Class => &mut self.class,
            StyleClass::ClassEdge => &mut self.class_edge,
            StyleClass::Actor => &mut self.actor,
            StyleClass::Usecase => &mut self.usecase,
            StyleClass::Vertex => &mut self.vertex,
            StyleClass::Edge => &mut self.edge,
        }
    }
}

/// Where a resolved style came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Caller override for the element class.
    Override,
    /// The element's own `style` reference.
    Element,
    /// A default key of the diagram mode.
    ModeDefault,
    /// Nothing matched; the emitter applies a built-in style.
    Unstyled,
}

/// The style of one element and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    style: String,
    provenance: Provenance,
}

impl ResolvedStyle {
    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_unstyled(&self) -> bool {
        self.provenance == Provenance::Unstyled
    }
}

/// A style key that was not found in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMiss {
    key: String,
    requested_by: Provenance,
}

impl StyleMiss {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The resolution level that asked for the key.
    pub fn requested_by(&self) -> Provenance {
        self.requested_by
    }
}

/// Resolves element styles against one [`StyleTable`] and [`StyleOverrides`].
///
/// Misses are recorded rather than reported one by one; call
/// [`StyleResolver::log_summary`] once per compilation.
#[derive(Debug)]
pub struct StyleResolver<'a> {
    table: &'a StyleTable,
    overrides: &'a StyleOverrides,
    misses: Vec<StyleMiss>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(table: &'a StyleTable, overrides: &'a StyleOverrides) -> Self {
        Self {
            table,
            overrides,
            misses: Vec::new(),
        }
    }

    pub fn resolve_node(&mut self, node: &Node) -> ResolvedStyle {
        self.resolve(
            StyleClass::for_node(node),
            node.style(),
            node_default_keys(node.kind()),
        )
    }

    pub fn resolve_edge(&mut self, mode: Mode, edge: &Edge) -> ResolvedStyle {
        self.resolve(
            StyleClass::for_edge(mode),
            edge.style(),
            edge_default_keys(mode, edge.relation()),
        )
    }

    /// Override, then the element reference, then `defaults` in order.
    pub fn resolve(
        &mut self,
        class: StyleClass,
        element: Option<&str>,
        defaults: &[&str],
    ) -> ResolvedStyle {
        let levels = [
            (self.overrides.get(class), Provenance::Override),
            (element, Provenance::Element),
        ];
        for (reference, provenance) in levels {
            let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
                continue;
            };
            if let Some(style) = self.lookup(StyleRef::parse(reference), provenance) {
                return ResolvedStyle { style, provenance };
            }
        }

        if let Some(style) = self.default_style(class, defaults) {
            return ResolvedStyle {
                style,
                provenance: Provenance::ModeDefault,
            };
        }
        self.misses.extend(defaults.iter().map(|key| StyleMiss {
            key: key.to_string(),
            requested_by: Provenance::ModeDefault,
        }));

        ResolvedStyle {
            style: String::new(),
            provenance: Provenance::Unstyled,
        }
    }

    /// The first default key present in the table; failing that, the first
    /// table key containing one of them. Node lookups skip keys naming edges.
    fn default_style(&self, class: StyleClass, defaults: &[&str]) -> Option<String> {
        if let Some(style) = defaults.iter().find_map(|key| self.table.get(key)) {
            return Some(style.to_string());
        }
        let exclude: &[&str] = if class.is_edge() { &[] } else { &["edge"] };
        defaults.iter().find_map(|default| {
            let (key, style) = self.table.find_containing(default, exclude)?;
            debug!(default = *default, key = key; "Default style matched by key fragment");
            Some(style.to_string())
        })
    }

    fn lookup(&mut self, reference: StyleRef<'_>, requested_by: Provenance) -> Option<String> {
        match reference {
            StyleRef::Literal(style) => Some(style.to_string()),
            StyleRef::Key(key) => {
                let found = self.table.get(key).map(str::to_string);
                if found.is_none() {
                    self.misses.push(StyleMiss {
                        key: key.to_string(),
                        requested_by,
                    });
                }
                found
            }
        }
    }

    pub fn misses(&self) -> &[StyleMiss] {
        &self.misses
    }

    /// Logs the deduplicated missed keys: keys asked for by overrides or
    /// elements as a warning, mode default keys at debug level.
    pub fn log_summary(&self) {
        let mut requested = IndexSet::new();
        let mut defaults = IndexSet::new();
        for miss in &self.misses {
            match miss.requested_by {
                Provenance::ModeDefault => defaults.insert(miss.key()),
                _ => requested.insert(miss.key()),
            };
        }

        if !requested.is_empty() {
            let keys: Vec<&str> = requested.into_iter().collect();
            warn!(
                count = keys.len();
                "Style keys not found in style table: {}", keys.join(", ")
            );
        }
        if !defaults.is_empty() {
            let keys: Vec<&str> = defaults.into_iter().collect();
            debug!(
                count = keys.len();
                "Default style keys not found, using built-in styles: {}", keys.join(", ")
            );
        }
    }
}

/// Table keys tried for a node without an override or own style.
pub fn node_default_keys(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Entity => &["er.entity", "entity", "table"],
        NodeKind::Class => &["uml.class", "class"],
        NodeKind::Lifeline => &["uml.lifeline", "lifeline"],
        NodeKind::Actor => &["uml.actor", "actor"],
        NodeKind::UseCase => &["uml.usecase", "usecase", "shape.ellipse"],
        NodeKind::State => &["uml.state", "state", "shape.rounded"],
        NodeKind::Initial => &["uml.initial", "state.initial"],
        NodeKind::Final => &["uml.final", "state.final"],
        NodeKind::Action => &["activity.action", "shape.rounded"],
        NodeKind::Decision | NodeKind::Merge => &["activity.decision", "shape.rhombus"],
        NodeKind::Rect => &["shape.rect"],
        NodeKind::Round => &["shape.rounded"],
        NodeKind::Rhombus => &["shape.rhombus"],
    }
}

/// Table keys tried for an edge without an override or own style.
pub fn edge_default_keys(mode: Mode, relation: RelationKind) -> &'static [&'static str] {
    match (mode, relation) {
        (Mode::Er, _) => &["edge.entityrelation", "entityrelation", "er.edge"],
        (_, RelationKind::Inheritance) => &["uml.inheritance", "uml.generalization"],
        (_, RelationKind::Realization) => &["uml.realization", "uml.implementation"],
        (_, RelationKind::Composition) => &["uml.composition"],
        (_, RelationKind::Aggregation) => &["uml.aggregation"],
        (_, RelationKind::Dependency) => &["uml.dependency"],
        (_, RelationKind::Association) => &["uml.association"],
        (_, RelationKind::Message) => &["uml.message", "edge.message"],
        (_, RelationKind::AsyncMessage) => &["uml.async", "edge.async"],
        (_, RelationKind::Reply) => &["uml.reply", "edge.reply", "edge.dashed"],
        (_, RelationKind::Include) => &["uml.include", "edge.dashed"],
        (_, RelationKind::Extend) => &["uml.extend", "edge.dashed"],
        _ => &["edge.orthogonal"],
    }
}
