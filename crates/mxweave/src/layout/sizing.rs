//! Node sizes estimated from text metrics.
//!
//! draw.io measures text itself, so sizes only need to be large enough for
//! the label and rows to fit. Widths use a fixed per-character estimate.

use mxweave_core::{
    geometry::Size,
    spec::{Node, NodeContent, NodeKind},
};

use crate::config::LayoutConfig;

/// Height of the line separating class attributes from methods.
pub const SEPARATOR_HEIGHT: f32 = 8.0;

const PSEUDO_STATE_SIZE: f32 = 30.0;
const ACTOR_SIZE: Size = Size::new(40.0, 80.0);

/// Text metrics and minimum sizes shared by layout and export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    char_width: f32,
    line_height: f32,
    padding: f32,
    min_width: f32,
    min_height: f32,
}

impl TextMetrics {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            char_width: config.char_width(),
            line_height: config.line_height(),
            padding: config.node_padding(),
            min_width: config.min_node_width(),
            min_height: config.min_node_height(),
        }
    }

    /// Height of one attribute or member row.
    pub fn row_height(&self) -> f32 {
        self.line_height
    }

    /// Height of the header of an entity or class container.
    pub fn header_height(&self, node: &Node) -> f32 {
        label_line_count(node) as f32 * self.line_height + self.padding
    }

    /// Size of `node`: the configured minimum grown to fit its text.
    pub fn node_size(&self, node: &Node) -> Size {
        match node.kind() {
            NodeKind::Initial | NodeKind::Final => {
                return Size::new(PSEUDO_STATE_SIZE, PSEUDO_STATE_SIZE);
            }
            NodeKind::Actor => return ACTOR_SIZE,
            _ => {}
        }

        let lines = node.display_lines();
        let longest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or_default();
        let width = longest as f32 * self.char_width + 2.0 * self.padding;

        let height = match node.content() {
            NodeContent::Plain => {
                let text = lines.len() as f32 * self.line_height + 2.0 * self.padding;
                match node.kind() {
                    // Diamonds only fit text in their inner half.
                    NodeKind::Decision | NodeKind::Merge | NodeKind::Rhombus => text * 1.5,
                    _ => text,
                }
            }
            NodeContent::Entity { attributes } => {
                self.header_height(node) + attributes.len() as f32 * self.line_height
            }
            NodeContent::Class {
                attributes,
                methods,
            } => {
                self.header_height(node)
                    + (attributes.len() + methods.len()) as f32 * self.line_height
                    + SEPARATOR_HEIGHT
            }
        };

        Size::new(width, height).max(Size::new(self.min_width, self.min_height))
    }
}

fn label_line_count(node: &Node) -> usize {
    node.label().lines().count().max(1)
}
