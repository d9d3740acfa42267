//! The style table: named styles loaded from a flat JSON object.

use std::{fs, io, path::Path};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;

use crate::error::MxweaveError;

/// A reference to a style: a key into the [`StyleTable`] or a literal style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRef<'a> {
    Key(&'a str),
    Literal(&'a str),
}

impl<'a> StyleRef<'a> {
    /// A string containing `=` or `;` is a literal style, anything else a key.
    ///
    /// ```
    /// use mxweave::style::StyleRef;
    ///
    /// assert_eq!(StyleRef::parse("er.entity"), StyleRef::Key("er.entity"));
    /// assert_eq!(StyleRef::parse("rounded=1;"), StyleRef::Literal("rounded=1;"));
    /// ```
    pub fn parse(reference: &'a str) -> Self {
        let reference = reference.trim();
        if reference.contains('=') || reference.contains(';') {
            StyleRef::Literal(reference)
        } else {
            StyleRef::Key(reference)
        }
    }
}

/// Named draw.io styles, in file order.
///
/// Loaded once and never modified while compiling; resolvers borrow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTable {
    styles: IndexMap<String, String>,
}

impl StyleTable {
    /// A table without styles. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a table from a JSON file.
    ///
    /// A file that does not exist yields an empty table and a warning.
    ///
    /// # Errors
    ///
    /// Returns [`MxweaveError::Io`] when the file cannot be read and
    /// [`MxweaveError::StyleTable`] when it is not a JSON object.
    pub fn load(path: &Path) -> Result<Self, MxweaveError> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = path.display().to_string(); "Style table not found, using built-in styles");
                return Ok(Self::empty());
            }
            Err(err) => return Err(err.into()),
        };

        let table = Self::from_json_str(&source)
            .map_err(|err| MxweaveError::StyleTable(format!("{}: {err}", path.display())))?;
        info!(path = path.display().to_string(), styles = table.len(); "Style table loaded");
        Ok(table)
    }

    /// Parses a table from JSON text. Entries whose value is not a string are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a message when the text is not JSON or not a JSON object.
    pub fn from_json_str(source: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(source).map_err(|err| err.to_string())?;
        let Value::Object(object) = value else {
            return Err("expected a JSON object of style key to style string".to_string());
        };

        let mut styles = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            match value {
                Value::String(style) => {
                    styles.insert(key, style);
                }
                _ => warn!(key = key.as_str(); "Skipping style table entry that is not a string"),
            }
        }
        Ok(Self { styles })
    }

    /// Looks up `key`: exact match first, then ASCII case-insensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(style) = self.styles.get(key) {
            return Some(style.as_str());
        }
        let found = self
            .styles
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, style)| style.as_str());
        if found.is_some() {
            debug!(key = key; "Style key matched case-insensitively");
        }
        found
    }

    /// First entry whose key contains `token`, ignoring ASCII case, and none
    /// of `exclude`.
    pub fn find_containing(&self, token: &str, exclude: &[&str]) -> Option<(&str, &str)> {
        let token = token.to_ascii_lowercase();
        self.iter().find(|(key, _)| {
            let key = key.to_ascii_lowercase();
            key.contains(&token) && !exclude.iter().any(|ex| key.contains(ex))
        })
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles
            .iter()
            .map(|(key, style)| (key.as_str(), style.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            styles: iter
                .into_iter()
                .map(|(key, style)| (key.into(), style.into()))
                .collect(),
        }
    }
}
