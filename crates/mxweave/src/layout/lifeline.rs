//! Lifeline layout engine for sequence diagrams.
//!
//! Participants stand side by side in input order, each in its own layer.
//! Messages are stacked top to bottom in input order, one `message_spacing`
//! apart, and every lifeline is tall enough to carry all of them.

use indexmap::IndexMap;
use log::debug;

use mxweave_core::{
    geometry::{Point, Size},
    spec::DiagramSpec,
};

use crate::{
    config::LayoutConfig,
    error::MxweaveError,
    layout::{
        EdgeRoute, LayoutResult, NodePlacement, engines::LayoutEngine, layered::resolve_edges,
        sizing::TextMetrics,
    },
};

/// The lifeline layout engine.
pub struct Engine {
    metrics: TextMetrics,
    slot_pitch: f32,
    slot_gap: f32,
    message_spacing: f32,
    header: f32,
    bend_offset: f32,
    margin: f32,
}

impl Engine {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            metrics: TextMetrics::new(config),
            slot_pitch: config.slot_pitch(),
            slot_gap: config.slot_gap(),
            message_spacing: config.message_spacing(),
            header: config.lifeline_header(),
            bend_offset: config.bend_offset(),
            margin: config.margin(),
        }
    }

    /// Vertical position of message `index`.
    fn message_y(&self, index: usize) -> f32 {
        self.margin + self.header + (index + 1) as f32 * self.message_spacing
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, spec: &DiagramSpec) -> Result<LayoutResult, MxweaveError> {
        let messages = resolve_edges(spec)?;
        let height = self.header + (messages.len() + 1) as f32 * self.message_spacing;

        let mut centers = Vec::with_capacity(spec.nodes().len());
        let mut placements = IndexMap::with_capacity(spec.nodes().len());
        let mut x = self.margin;
        for (layer, node) in spec.nodes().iter().enumerate() {
            let width = self.metrics.node_size(node).width();
            let slot = self.slot_pitch.max(width + self.slot_gap);
            let bounds =
                Point::new(x + (slot - width) / 2.0, self.margin).to_bounds(Size::new(width, height));

            centers.push(bounds.center().x());
            placements.insert(node.id().to_string(), NodePlacement::new(layer, 0, bounds));
            x += slot;
        }

        let routes = messages
            .iter()
            .enumerate()
            .map(|(index, &(source, target))| {
                let y = self.message_y(index);
                let (from, to) = (centers[source], centers[target]);
                if source == target {
                    let bottom = y + self.message_spacing / 2.0;
                    let outside = from + self.bend_offset;
                    EdgeRoute::orthogonal(vec![Point::new(outside, y), Point::new(outside, bottom)])
                        .with_terminals(Point::new(from, y), Point::new(from, bottom))
                } else {
                    EdgeRoute::straight().with_terminals(Point::new(from, y), Point::new(to, y))
                }
            })
            .collect();

        debug!(
            participants = spec.nodes().len(),
            messages = messages.len();
            "Lifeline layout calculated"
        );
        Ok(LayoutResult::new(placements, routes))
    }
}
