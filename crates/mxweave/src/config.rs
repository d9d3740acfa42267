//! Configuration types for mxweave diagram compilation.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, styled and named. All types implement [`serde::Deserialize`]
//! for loading from external sources; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout, style and output settings.
//! - [`LayoutConfig`] - Pitches, gaps and text metrics used by the layout engines.
//! - [`StyleConfig`] - Style table location, per-element overrides and page background.
//! - [`OutputConfig`] - Output file extension and content hash suffix.
//!
//! # Example
//!
//! ```
//! # use mxweave::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert_eq!(config.output().extension(), "drawio");
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use mxweave_core::color::Color;

use crate::style::StyleOverrides;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig, output: OutputConfig) -> Self {
        Self {
            layout,
            style,
            output,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Replaces the style section.
    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Replaces the output section.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }
}

/// Spacing and text metrics for the layout engines.
///
/// Lengths are in draw.io units (pixels at 100% zoom).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum distance between consecutive layers.
    layer_pitch: f32,
    /// Minimum distance between consecutive nodes of one layer.
    slot_pitch: f32,
    /// Smallest node width.
    min_node_width: f32,
    /// Smallest node height.
    min_node_height: f32,
    /// Estimated width of one character of label text.
    char_width: f32,
    /// Height of one line of label text.
    line_height: f32,
    /// Space between node text and the node border.
    node_padding: f32,
    /// Free space kept between the thickest node of a layer and the next layer.
    layer_gap: f32,
    /// Free space kept between neighbouring nodes of a layer.
    slot_gap: f32,
    /// Distance of orthogonal bend points from the nodes they avoid.
    bend_offset: f32,
    /// Vertical distance between sequence messages.
    message_spacing: f32,
    /// Height of a lifeline header box.
    lifeline_header: f32,
    /// Empty border around the whole diagram.
    margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layer_pitch: 160.0,
            slot_pitch: 220.0,
            min_node_width: 160.0,
            min_node_height: 60.0,
            char_width: 7.5,
            line_height: 20.0,
            node_padding: 16.0,
            layer_gap: 80.0,
            slot_gap: 60.0,
            bend_offset: 30.0,
            message_spacing: 50.0,
            lifeline_header: 40.0,
            margin: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn layer_pitch(&self) -> f32 {
        self.layer_pitch
    }

    pub fn slot_pitch(&self) -> f32 {
        self.slot_pitch
    }

    pub fn min_node_width(&self) -> f32 {
        self.min_node_width
    }

    pub fn min_node_height(&self) -> f32 {
        self.min_node_height
    }

    pub fn char_width(&self) -> f32 {
        self.char_width
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn node_padding(&self) -> f32 {
        self.node_padding
    }

    pub fn layer_gap(&self) -> f32 {
        self.layer_gap
    }

    pub fn slot_gap(&self) -> f32 {
        self.slot_gap
    }

    pub fn bend_offset(&self) -> f32 {
        self.bend_offset
    }

    pub fn message_spacing(&self) -> f32 {
        self.message_spacing
    }

    pub fn lifeline_header(&self) -> f32 {
        self.lifeline_header
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }
}

/// Visual styling configuration.
///
/// Fields that are not set fall back to built-in styles.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Page background color, as a CSS color string.
    #[serde(default)]
    background_color: Option<String>,

    /// Path of the JSON style table.
    #[serde(default)]
    styles: Option<PathBuf>,

    /// Per-element-class style overrides (keys or literal style strings).
    #[serde(default)]
    overrides: StyleOverrides,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Path of the style table, if one is configured.
    pub fn styles(&self) -> Option<&Path> {
        self.styles.as_deref()
    }

    pub fn overrides(&self) -> &StyleOverrides {
        &self.overrides
    }

    /// Sets the style table path when `path` is given.
    pub fn with_styles(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.styles = path;
        }
        self
    }

    pub fn with_overrides(mut self, overrides: StyleOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Output file naming configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append a content hash to the file name.
    hash: bool,
    /// Number of hex digits of the content hash.
    hash_length: usize,
    /// File extension, without the dot.
    extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            hash: true,
            hash_length: 8,
            extension: "drawio".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn hash(&self) -> bool {
        self.hash
    }

    pub fn hash_length(&self) -> usize {
        self.hash_length
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }
}
