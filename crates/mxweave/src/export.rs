//! Export of laid-out diagrams as draw.io documents.
//!
//! # Pipeline Position
//!
//! ```text
//! DiagramSpec + LayoutResult
//!     ↓ export (this module)
//! mxfile XML string
//!     ↓ naming
//! .drawio file
//! ```
//!
//! The document is built completely in memory. All text reaches it through
//! one escaping writer, so labels containing markup characters or line
//! breaks read back unchanged.

mod builtin;
mod drawio;
mod xml;

pub use builtin::cardinality_markers;
pub use drawio::{DrawioEmitter, LAYER_ID, ROOT_ID};
pub use xml::{XmlWriter, escape};
