//! mxweave - compiles JSON diagram specifications into draw.io documents.
//!
//! A mode-tagged JSON document (entity-relationship, class, sequence, state,
//! activity, use case or a generic graph) is normalized, laid out, styled and
//! written as a `.drawio` file that opens directly in draw.io.
//!
//! # Pipeline
//!
//! ```text
//! JSON text
//!     ↓ normalize (mxweave-schema)
//! DiagramSpec
//!     ↓ layout
//! LayoutResult
//!     ↓ export (styles resolved per element)
//! mxfile XML
//!     ↓ naming
//! diagram_1a2b3c4d.drawio
//! ```

pub mod config;
pub mod export;
pub mod layout;
pub mod naming;
pub mod style;

mod error;

pub use mxweave_core::{color, geometry, spec};
pub use mxweave_schema::{Normalized, SpecValidationError};

pub use error::MxweaveError;

use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};

use config::AppConfig;
use export::DrawioEmitter;
use naming::OutputNamer;
use spec::{DiagramSpec, Direction, ModeSelection};
use style::StyleTable;

/// Builder for compiling diagram specifications into draw.io documents.
///
/// Holds configuration and the style table only; one builder can compile
/// any number of diagrams.
///
/// # Examples
///
/// ```
/// use mxweave::{DiagramBuilder, config::AppConfig, spec::ModeSelection};
///
/// let source = r#"{
///     "entities": [
///         {"name": "User", "attributes": [{"name": "id", "type": "uuid", "pk": true}]},
///         {"name": "Auth", "attributes": [{"name": "user_id", "type": "uuid"}]}
///     ],
///     "relations": [{"from": "User.id", "to": "Auth.user_id", "cardinality": "1:N"}]
/// }"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let spec = builder.normalize(source, ModeSelection::Auto, None).unwrap();
/// let document = builder.render_drawio(&spec).unwrap();
/// assert!(document.starts_with("<mxfile"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
    styles: StyleTable,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration and an empty
    /// style table.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            styles: StyleTable::empty(),
        }
    }

    /// Use `styles` for every compilation.
    pub fn with_style_table(mut self, styles: StyleTable) -> Self {
        self.styles = styles;
        self
    }

    /// Load the style table named by the configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError` if the configured file exists but cannot be read
    /// or is not a JSON object.
    pub fn with_configured_styles(self) -> Result<Self, MxweaveError> {
        match self.config.style().styles() {
            Some(path) => {
                let styles = StyleTable::load(path)?;
                Ok(self.with_style_table(styles))
            }
            None => Ok(self),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Normalize JSON text into a validated specification.
    ///
    /// Warnings raised while normalizing are logged.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError::Validation` carrying every problem found in the
    /// input together with the input text.
    pub fn normalize(
        &self,
        source: &str,
        selection: ModeSelection,
        direction: Option<Direction>,
    ) -> Result<DiagramSpec, MxweaveError> {
        info!(selection = selection.to_string(); "Normalizing diagram specification");

        let normalized = mxweave_schema::normalize_str(source, selection, direction)
            .map_err(|err| MxweaveError::new_validation_error(err, source))?;
        let (spec, warnings) = normalized.into_parts();
        for warning in &warnings {
            warn!("{warning}");
        }

        debug!(
            mode = spec.mode().as_str(),
            nodes = spec.nodes().len(),
            edges = spec.edges().len();
            "Specification normalized"
        );
        trace!(spec:? = spec; "Normalized specification");
        Ok(spec)
    }

    /// Lay out `spec` and emit it as a draw.io document.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError` if the configured background color is invalid or
    /// the layout breaks an invariant of the specification.
    pub fn render_drawio(&self, spec: &DiagramSpec) -> Result<String, MxweaveError> {
        let background = self
            .config
            .style()
            .background_color()
            .map_err(MxweaveError::Export)?;

        let layout = layout::EngineBuilder::new()
            .with_config(self.config.layout().clone())
            .build(spec)?;
        info!(
            width = layout.bounds().width(),
            height = layout.bounds().height();
            "Layout calculated"
        );

        let document = DrawioEmitter::new(
            &self.styles,
            self.config.style().overrides(),
            self.config.layout(),
        )
        .with_background(background)
        .emit(spec, &layout)?;

        info!(bytes = document.len(); "Document rendered");
        Ok(document)
    }

    /// Normalize, lay out and emit in one step.
    ///
    /// # Errors
    ///
    /// Returns any error of [`DiagramBuilder::normalize`] or
    /// [`DiagramBuilder::render_drawio`].
    pub fn compile(
        &self,
        source: &str,
        selection: ModeSelection,
        direction: Option<Direction>,
    ) -> Result<String, MxweaveError> {
        let spec = self.normalize(source, selection, direction)?;
        self.render_drawio(&spec)
    }

    /// Write `document` into `dir`, named after `base` and the output
    /// configuration. Returns the written path.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError::Io` if the file cannot be written.
    pub fn write(&self, document: &str, dir: &Path, base: &str) -> Result<PathBuf, MxweaveError> {
        let output = self.config.output();
        let namer = OutputNamer::from_config(output);
        let file_name = namer.file_name(base, output.hash(), document);
        namer.write(dir, &file_name, document)
    }
}
