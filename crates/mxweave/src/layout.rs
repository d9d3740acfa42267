//! Layout engine for positioning diagram elements.
//!
//! This module turns a validated [`DiagramSpec`](mxweave_core::spec::DiagramSpec)
//! into absolute node bounds and per-edge routes.
//!
//! # Pipeline Position
//!
//! ```text
//! DiagramSpec
//!     ↓ layout (this module)
//! LayoutResult
//!     ↓ export
//! draw.io document
//! ```
//!
//! # Submodules
//!
//! - `layered` - rank-based layout used by every mode except sequence
//! - `lifeline` - one column per participant, one row per message
//! - [`sizing`] - node sizes from text metrics
//!
//! # Re-exports
//!
//! - [`EngineBuilder`] - Builder for creating and configuring layout engines

mod engines;
mod layered;
mod lifeline;
pub mod sizing;

use indexmap::IndexMap;

use mxweave_core::geometry::{Bounds, Point};

pub use engines::{EngineBuilder, LayoutEngine};

/// How an edge should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteHint {
    /// A direct connector between the endpoints.
    Straight,
    /// An orthogonal connector through the route's waypoints.
    Orthogonal,
}

/// The position of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    layer: usize,
    ordinal: usize,
    bounds: Bounds,
}

impl NodePlacement {
    pub fn new(layer: usize, ordinal: usize, bounds: Bounds) -> Self {
        Self {
            layer,
            ordinal,
            bounds,
        }
    }

    /// Rank along the primary flow axis.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// Position within the layer, starting at 0.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Absolute bounds, top-left origin.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// The route of one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    hint: RouteHint,
    waypoints: Vec<Point>,
    terminals: Option<(Point, Point)>,
    back_edge: bool,
}

impl EdgeRoute {
    pub fn straight() -> Self {
        Self {
            hint: RouteHint::Straight,
            waypoints: Vec::new(),
            terminals: None,
            back_edge: false,
        }
    }

    pub fn orthogonal(waypoints: Vec<Point>) -> Self {
        Self {
            hint: RouteHint::Orthogonal,
            waypoints,
            terminals: None,
            back_edge: false,
        }
    }

    /// Pin the connector ends to explicit points.
    pub fn with_terminals(mut self, source: Point, target: Point) -> Self {
        self.terminals = Some((source, target));
        self
    }

    pub fn with_back_edge(mut self, back_edge: bool) -> Self {
        self.back_edge = back_edge;
        self
    }

    pub fn hint(&self) -> RouteHint {
        self.hint
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Explicit source and target points, if the connector is pinned.
    pub fn terminals(&self) -> Option<(Point, Point)> {
        self.terminals
    }

    /// Whether this edge closes a cycle and was ignored for ranking.
    pub fn is_back_edge(&self) -> bool {
        self.back_edge
    }
}

/// Placement of every node and route of every edge of one diagram.
///
/// Node placements are keyed by node id in input order; edge routes are
/// index-aligned with the specification's edges.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    nodes: IndexMap<String, NodePlacement>,
    edges: Vec<EdgeRoute>,
    bounds: Bounds,
}

impl LayoutResult {
    pub fn new(nodes: IndexMap<String, NodePlacement>, edges: Vec<EdgeRoute>) -> Self {
        let bounds = content_bounds(&nodes, &edges);
        Self {
            nodes,
            edges,
            bounds,
        }
    }

    pub fn placement(&self, id: &str) -> Option<&NodePlacement> {
        self.nodes.get(id)
    }

    pub fn placements(&self) -> impl Iterator<Item = (&str, &NodePlacement)> {
        self.nodes.iter().map(|(id, placement)| (id.as_str(), placement))
    }

    pub fn routes(&self) -> &[EdgeRoute] {
        &self.edges
    }

    /// The area covered by nodes and waypoints, from the origin.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

fn content_bounds(nodes: &IndexMap<String, NodePlacement>, edges: &[EdgeRoute]) -> Bounds {
    let origin = Bounds::default();
    let nodes = nodes.values().map(NodePlacement::bounds);
    let points = edges
        .iter()
        .flat_map(|route| {
            let terminals = route.terminals().into_iter().flat_map(|(s, t)| [s, t]);
            route.waypoints().iter().copied().chain(terminals)
        })
        .map(|point| Bounds::new_from_top_left(point, Default::default()));

    nodes
        .chain(points)
        .fold(origin, |acc, bounds| acc.merge(&bounds))
}
