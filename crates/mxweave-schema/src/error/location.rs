//! Locations inside the input document, as JSON pointers (RFC 6901).

use std::fmt;

/// A JSON pointer into the input document, e.g. `/entities/1/attributes`.
///
/// The empty pointer designates the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pointer: String,
}

impl Location {
    /// The location of the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// The location of a member of the object at this location.
    pub fn field(&self, key: &str) -> Self {
        let escaped = key.replace('~', "~0").replace('/', "~1");
        Self {
            pointer: format!("{}/{}", self.pointer, escaped),
        }
    }

    /// The location of an element of the array at this location.
    pub fn index(&self, index: usize) -> Self {
        Self {
            pointer: format!("{}/{}", self.pointer, index),
        }
    }

    pub fn is_root(&self) -> bool {
        self.pointer.is_empty()
    }

    /// The raw pointer; empty for the root.
    pub fn as_str(&self) -> &str {
        &self.pointer
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(document root)")
        } else {
            f.write_str(&self.pointer)
        }
    }
}
