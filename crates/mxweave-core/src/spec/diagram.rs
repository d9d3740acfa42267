//! Diagram-level types: the root [`DiagramSpec`], its [`Mode`] and flow [`Direction`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::element::{Edge, Node};

/// The diagram family a specification belongs to.
///
/// The names match external configuration and CLI strings (lowercase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Entity-relationship diagram
    Er,
    /// UML class diagram
    Class,
    /// UML sequence diagram
    Sequence,
    /// State machine diagram
    State,
    /// Activity / flow diagram
    Activity,
    /// UML use case diagram
    Usecase,
    /// Plain graph of boxes and arrows
    Generic,
}

impl Mode {
    /// All supported modes, in the order they are documented.
    pub const ALL: [Mode; 7] = [
        Mode::Er,
        Mode::Class,
        Mode::Sequence,
        Mode::State,
        Mode::Activity,
        Mode::Usecase,
        Mode::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Er => "er",
            Mode::Class => "class",
            Mode::Sequence => "sequence",
            Mode::State => "state",
            Mode::Activity => "activity",
            Mode::Usecase => "usecase",
            Mode::Generic => "generic",
        }
    }

    /// Direction used when neither the caller nor the input asks for one.
    pub fn default_direction(self) -> Direction {
        match self {
            Mode::Sequence | Mode::Usecase => Direction::LeftRight,
            _ => Direction::TopDown,
        }
    }

    /// Direction this mode always renders with, regardless of any request.
    ///
    /// Sequence diagrams put lifelines side by side, so they are always
    /// left-to-right.
    pub fn forced_direction(self) -> Option<Direction> {
        match self {
            Mode::Sequence => Some(Direction::LeftRight),
            _ => None,
        }
    }
}

/// Error returned when a mode or direction string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {what} `{value}`")]
pub struct ParseKindError {
    what: &'static str,
    value: String,
}

impl ParseKindError {
    pub(crate) fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

impl FromStr for Mode {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| ParseKindError::new("mode", s))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode requested by the caller: a concrete mode, or inference from the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModeSelection {
    /// Infer the mode from structural signals in the input.
    #[default]
    Auto,
    /// Use exactly this mode.
    Explicit(Mode),
}

impl FromStr for ModeSelection {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(ModeSelection::Auto);
        }
        s.parse().map(ModeSelection::Explicit)
    }
}

impl fmt::Display for ModeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSelection::Auto => f.write_str("auto"),
            ModeSelection::Explicit(mode) => mode.fmt(f),
        }
    }
}

/// Global flow direction of a diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Direction {
    /// Layers stack downward (`TD`).
    #[default]
    #[serde(rename = "TD", alias = "TB")]
    TopDown,
    /// Layers run left to right (`LR`).
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TopDown => "TD",
            Direction::LeftRight => "LR",
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LeftRight)
    }
}

impl FromStr for Direction {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TD" | "TB" => Ok(Direction::TopDown),
            "LR" => Ok(Direction::LeftRight),
            _ => Err(ParseKindError::new("direction", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, mode-tagged diagram specification.
///
/// Produced by the schema normalizer; node ids are unique and every edge
/// endpoint names a node of the same specification. Node and edge order is the
/// input order and is significant for layout tie-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSpec {
    mode: Mode,
    direction: Direction,
    title: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl DiagramSpec {
    pub fn new(
        mode: Mode,
        direction: Direction,
        title: Option<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            mode,
            direction,
            title,
            nodes,
            edges,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }
}
