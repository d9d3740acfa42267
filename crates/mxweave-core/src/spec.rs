//! The diagram specification model.
//!
//! These types are the validated form of an input specification, produced by
//! the schema normalizer and consumed by layout and emission.
//!
//! # Pipeline Position
//!
//! ```text
//! JSON input
//!     ↓ normalize (mxweave-schema)
//! DiagramSpec (these types)
//!     ↓ layout
//! LayoutResult
//!     ↓ emit
//! draw.io XML
//! ```
//!
//! - [`diagram`] - [`DiagramSpec`], [`Mode`], [`ModeSelection`], [`Direction`]
//! - [`element`] - [`Node`], [`Edge`] and their structured content

pub mod diagram;
pub mod element;

pub use diagram::*;
pub use element::*;
