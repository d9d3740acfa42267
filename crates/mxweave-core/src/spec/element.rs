//! Diagram elements: [`Node`], [`Edge`] and their structured content.

use std::{fmt, str::FromStr};

use crate::spec::diagram::ParseKindError;

/// The role a node plays within its diagram mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Entity,
    Class,
    Lifeline,
    State,
    /// Initial pseudo-state or activity start.
    Initial,
    /// Final pseudo-state or activity end.
    Final,
    Action,
    Decision,
    Merge,
    Actor,
    UseCase,
    /// Generic rectangle.
    Rect,
    /// Generic rounded rectangle.
    Round,
    /// Generic diamond.
    Rhombus,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Entity => "entity",
            NodeKind::Class => "class",
            NodeKind::Lifeline => "lifeline",
            NodeKind::State => "state",
            NodeKind::Initial => "initial",
            NodeKind::Final => "final",
            NodeKind::Action => "action",
            NodeKind::Decision => "decision",
            NodeKind::Merge => "merge",
            NodeKind::Actor => "actor",
            NodeKind::UseCase => "usecase",
            NodeKind::Rect => "rect",
            NodeKind::Round => "round",
            NodeKind::Rhombus => "rhombus",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UML member visibility marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    pub fn symbol(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }
}

impl FromStr for Visibility {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "+" | "public" => Ok(Visibility::Public),
            "-" | "private" => Ok(Visibility::Private),
            "#" | "protected" => Ok(Visibility::Protected),
            "~" | "package" => Ok(Visibility::Package),
            _ => Err(ParseKindError::new("visibility", s)),
        }
    }
}

/// A typed column of an ER entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    data_type: String,
    primary_key: bool,
    unique: bool,
    nullable: bool,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        primary_key: bool,
        unique: bool,
        nullable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key,
            unique,
            nullable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Text of the attribute row, e.g. `id: uuid (PK, UQ, NOT NULL)`.
    pub fn row_text(&self) -> String {
        let mut flags = Vec::new();
        if self.primary_key {
            flags.push("PK");
        }
        if self.unique {
            flags.push("UQ");
        }
        if !self.nullable {
            flags.push("NOT NULL");
        }

        let mut row = format!("{}: {}", self.name, self.data_type);
        if !flags.is_empty() {
            row.push_str(&format!(" ({})", flags.join(", ")));
        }
        row
    }
}

/// A class attribute or method line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    visibility: Visibility,
    text: String,
}

impl Member {
    pub fn new(visibility: Visibility, text: impl Into<String>) -> Self {
        Self {
            visibility,
            text: text.into(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text of the member row, e.g. `+ email: string`.
    pub fn row_text(&self) -> String {
        format!("{} {}", self.visibility.symbol(), self.text)
    }
}

/// Structured content rendered inside a node container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeContent {
    /// Only the label.
    #[default]
    Plain,
    /// An ER table with one row per attribute.
    Entity { attributes: Vec<Attribute> },
    /// A UML class with attribute and method sections.
    Class {
        attributes: Vec<Member>,
        methods: Vec<Member>,
    },
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,
    label: String,
    kind: NodeKind,
    content: NodeContent,
    style: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            content: NodeContent::Plain,
            style: None,
        }
    }

    pub fn with_content(mut self, content: NodeContent) -> Self {
        self.content = content;
        self
    }

    /// Attach an explicit style reference (key or literal style string).
    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// The text lines this node displays: its label lines followed by one line
    /// per structured row.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.label.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }

        match &self.content {
            NodeContent::Plain => {}
            NodeContent::Entity { attributes } => {
                lines.extend(attributes.iter().map(Attribute::row_text));
            }
            NodeContent::Class {
                attributes,
                methods,
            } => {
                lines.extend(attributes.iter().map(Member::row_text));
                lines.extend(methods.iter().map(Member::row_text));
            }
        }
        lines
    }
}

/// Semantic kind of an edge, used to pick arrowheads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Plain directed flow.
    #[default]
    Flow,
    /// ER relationship, decorated from its cardinality.
    Relationship,
    Association,
    Aggregation,
    Composition,
    Inheritance,
    Dependency,
    Realization,
    /// Synchronous sequence message.
    Message,
    /// Asynchronous sequence message.
    AsyncMessage,
    /// Sequence reply.
    Reply,
    Transition,
    Include,
    Extend,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Flow => "flow",
            RelationKind::Relationship => "relationship",
            RelationKind::Association => "association",
            RelationKind::Aggregation => "aggregation",
            RelationKind::Composition => "composition",
            RelationKind::Inheritance => "inheritance",
            RelationKind::Dependency => "dependency",
            RelationKind::Realization => "realization",
            RelationKind::Message => "message",
            RelationKind::AsyncMessage => "async",
            RelationKind::Reply => "reply",
            RelationKind::Transition => "transition",
            RelationKind::Include => "include",
            RelationKind::Extend => "extend",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    source: String,
    target: String,
    label: Option<String>,
    relation: RelationKind,
    cardinality: Option<String>,
    source_field: Option<String>,
    target_field: Option<String>,
    style: Option<String>,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: RelationKind,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
            relation,
            cardinality: None,
            source_field: None,
            target_field: None,
            style: None,
        }
    }

    /// Set the label; empty labels are stored as `None`.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_cardinality(mut self, cardinality: Option<String>) -> Self {
        self.cardinality = cardinality.filter(|c| !c.trim().is_empty());
        self
    }

    /// Set the ER column names the relationship connects.
    pub fn with_fields(mut self, source: Option<String>, target: Option<String>) -> Self {
        self.source_field = source;
        self.target_field = target;
        self
    }

    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn relation(&self) -> RelationKind {
        self.relation
    }

    pub fn cardinality(&self) -> Option<&str> {
        self.cardinality.as_deref()
    }

    pub fn source_field(&self) -> Option<&str> {
        self.source_field.as_deref()
    }

    pub fn target_field(&self) -> Option<&str> {
        self.target_field.as_deref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Text shown on the connector: `name (card)`, `card`, `name` or nothing.
    pub fn display_label(&self) -> Option<String> {
        match (self.label.as_deref(), self.cardinality.as_deref()) {
            (Some(label), Some(card)) => Some(format!("{} ({})", label.trim(), card.trim())),
            (Some(label), None) => Some(label.to_string()),
            (None, Some(card)) => Some(card.trim().to_string()),
            (None, None) => None,
        }
    }
}
