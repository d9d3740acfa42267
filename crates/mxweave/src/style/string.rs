//! Ordered model of a draw.io style string.

use std::fmt;

use indexmap::IndexMap;

/// A parsed `key=value;` style string.
///
/// Entry order is preserved. Bare tokens such as `ellipse` or `swimlane`
/// (style names without a value) are kept as entries without a value.
///
/// # Examples
///
/// ```
/// use mxweave::style::StyleString;
///
/// let mut style = StyleString::parse("ellipse;whiteSpace=wrap;html=1;");
/// style.remove("html");
/// style.set("fillColor", "#dae8fc");
/// assert_eq!(style.to_string(), "ellipse;whiteSpace=wrap;fillColor=#dae8fc;");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleString {
    entries: IndexMap<String, Option<String>>,
}

impl StyleString {
    /// Parses a style string. Empty segments are skipped; a repeated key keeps
    /// its first position and its last value.
    pub fn parse(style: &str) -> Self {
        let mut entries = IndexMap::new();
        for segment in style.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            match segment.split_once('=') {
                Some((key, value)) => {
                    entries.insert(key.trim().to_string(), Some(value.trim().to_string()));
                }
                None => {
                    entries.insert(segment.to_string(), None);
                }
            }
        }
        Self { entries }
    }

    /// The value of `key`; bare tokens yield `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(|value| value.as_deref().unwrap_or_default())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sets `key` to `value`, keeping the position of an existing entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Sets `key` only when it is absent.
    pub fn set_default(&mut self, key: &str, value: &str) {
        if !self.contains(key) {
            self.set(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key).flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order-independent form: entries sorted by key.
    ///
    /// Two styles with the same entries in a different order share one
    /// canonical form.
    pub fn canonical(&self) -> String {
        let mut entries: Vec<(&String, &Option<String>)> = self.entries.iter().collect();
        entries.sort();
        entries
            .into_iter()
            .map(|(key, value)| format_entry(key, value.as_deref()))
            .collect()
    }
}

fn format_entry(key: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{key}={value};"),
        None => format!("{key};"),
    }
}

impl fmt::Display for StyleString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            f.write_str(&format_entry(key, value.as_deref()))?;
        }
        Ok(())
    }
}

impl From<&str> for StyleString {
    fn from(style: &str) -> Self {
        Self::parse(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let style = StyleString::parse("rounded=1; whiteSpace=wrap;;html=1");
        assert_eq!(style.get("rounded"), Some("1"));
        assert_eq!(style.to_string(), "rounded=1;whiteSpace=wrap;html=1;");
    }

    #[test]
    fn test_bare_tokens() {
        let style = StyleString::parse("swimlane;fontStyle=1;");
        assert!(style.contains("swimlane"));
        assert_eq!(style.get("swimlane"), Some(""));
        assert_eq!(style.to_string(), "swimlane;fontStyle=1;");
    }

    #[test]
    fn test_value_with_equals() {
        let style = StyleString::parse("image=data:image/png,a=b;");
        assert_eq!(style.get("image"), Some("data:image/png,a=b"));
    }

    #[test]
    fn test_set_remove_keep_order() {
        let mut style = StyleString::parse("a=1;b=2;c=3;");
        style.set("b", "20");
        style.remove("a");
        style.set_default("c", "30");
        style.set_default("d", "4");
        assert_eq!(style.to_string(), "b=20;c=3;d=4;");
    }

    #[test]
    fn test_canonical_ignores_order() {
        let left = StyleString::parse("b=2;a=1;ellipse;");
        let right = StyleString::parse("ellipse;a=1;b=2");
        assert_ne!(left.to_string(), right.to_string());
        assert_eq!(left.canonical(), right.canonical());
    }
}
