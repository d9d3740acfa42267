//! Style tables and per-element style resolution.
//!
//! draw.io styles are `key=value;` strings. A diagram element gets its style
//! from, in order: a caller override for its element class, its own `style`
//! reference in the specification, the first mode default key found in the
//! [`StyleTable`], or nothing (the emitter then applies a built-in style).
//!
//! Style references are either keys into the table or literal style strings;
//! see [`StyleRef`].
//!
//! - [`StyleString`] - ordered model of one style string
//! - [`StyleTable`] - key to style string map, loaded from JSON
//! - [`StyleResolver`] - resolution against a table and overrides

mod resolver;
mod string;
mod table;

pub use resolver::{
    Provenance, ResolvedStyle, StyleClass, StyleMiss, StyleOverrides, StyleResolver,
};
pub use string::StyleString;
pub use table::{StyleRef, StyleTable};
