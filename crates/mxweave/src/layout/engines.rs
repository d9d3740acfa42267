//! Layout engine factory module
//!
//! Selects the layout engine for a diagram mode and configures it from
//! [`LayoutConfig`]. Sequence diagrams use the lifeline engine; every other
//! mode uses the layered engine.

use std::collections::HashMap;

use log::{debug, trace};

use mxweave_core::spec::{DiagramSpec, Mode};

use crate::{
    config::LayoutConfig,
    error::MxweaveError,
    layout::{LayoutResult, layered, lifeline},
};

/// Trait defining the interface for layout engines.
pub trait LayoutEngine {
    /// Calculate the layout of a validated diagram.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError::Layout` if the diagram breaks an invariant the
    /// normalizer guarantees, such as an edge naming an unknown node.
    fn calculate(&self, spec: &DiagramSpec) -> Result<LayoutResult, MxweaveError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EngineKind {
    Layered,
    Lifeline,
}

impl EngineKind {
    fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Sequence => EngineKind::Lifeline,
            _ => EngineKind::Layered,
        }
    }
}

/// Builder for creating and configuring layout engines.
///
/// # Examples
///
/// ```
/// use mxweave::{config::LayoutConfig, layout::EngineBuilder};
/// use mxweave_core::spec::{DiagramSpec, Direction, Edge, Mode, Node, NodeKind, RelationKind};
///
/// let spec = DiagramSpec::new(
///     Mode::Generic,
///     Direction::TopDown,
///     None,
///     vec![Node::new("a", "A", NodeKind::Rect), Node::new("b", "B", NodeKind::Rect)],
///     vec![Edge::new("a", "b", RelationKind::Flow)],
/// );
///
/// let layout = EngineBuilder::new()
///     .with_config(LayoutConfig::default())
///     .build(&spec)
///     .unwrap();
/// assert_eq!(layout.placement("b").unwrap().layer(), 1);
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    // Engines are created on first use
    engines: HashMap<EngineKind, Box<dyn LayoutEngine>>,

    config: LayoutConfig,
}

impl EngineBuilder {
    /// Create a new engine builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pitches, gaps and text metrics used by all engines
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self.engines.clear();
        self
    }

    /// Get the engine for `mode` with the configured options
    pub fn engine(&mut self, mode: Mode) -> &dyn LayoutEngine {
        let kind = EngineKind::for_mode(mode);
        let engine = self.engines.entry(kind).or_insert_with(|| match kind {
            EngineKind::Layered => Box::new(layered::Engine::new(&self.config)),
            EngineKind::Lifeline => Box::new(lifeline::Engine::new(&self.config)),
        });
        &**engine
    }

    /// Lay out `spec` with the engine for its mode.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError::Layout` if the engine fails to place the diagram.
    pub fn build(mut self, spec: &DiagramSpec) -> Result<LayoutResult, MxweaveError> {
        debug!(
            mode = spec.mode().as_str(),
            direction = spec.direction().as_str(),
            nodes = spec.nodes().len(),
            edges = spec.edges().len();
            "Calculating layout"
        );
        let layout = self.engine(spec.mode()).calculate(spec)?;
        trace!(layout:? = layout; "Built layout");
        Ok(layout)
    }
}
