//! Minimal escaping XML writer.
//!
//! Every attribute value passes through [`escape`]; there is no way to write
//! unescaped text. Writing into a `String` cannot fail.

use log::warn;

const INDENT: &str = "  ";

/// Escapes markup characters and encodes line breaks and tabs as character
/// references, so that an XML parser returns `text` unchanged.
///
/// Characters XML 1.0 cannot carry at all, such as most C0 controls, are
/// dropped.
///
/// ```
/// # use mxweave::export::escape;
/// assert_eq!(escape("a < b & \"c\"\n"), "a &lt; b &amp; &quot;c&quot;&#10;");
/// assert_eq!(escape("bell\u{7}ring"), "bellring");
/// ```
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars().filter(|&ch| is_xml_char(ch)) {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Whether `ch` matches the `Char` production of XML 1.0.
fn is_xml_char(ch: char) -> bool {
    !matches!(ch, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Writes indented XML elements into a string.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    open: Vec<&'static str>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `name`; it stays open until the matching [`XmlWriter::end`].
    pub fn start(&mut self, name: &'static str, attrs: &[(&str, &str)]) {
        self.tag(name, attrs, false);
        self.open.push(name);
    }

    /// Writes `<name .../>`.
    pub fn empty(&mut self, name: &'static str, attrs: &[(&str, &str)]) {
        self.tag(name, attrs, true);
    }

    /// Closes the innermost open element. Does nothing when none is open.
    pub fn end(&mut self) {
        if let Some(name) = self.open.pop() {
            self.indent();
            self.out.push_str("</");
            self.out.push_str(name);
            self.out.push_str(">\n");
        }
    }

    /// Closes every open element and returns the document.
    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.end();
        }
        self.out
    }

    fn tag(&mut self, name: &str, attrs: &[(&str, &str)], empty: bool) {
        self.indent();
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            if !value.chars().all(is_xml_char) {
                warn!(element = name, attribute = *key; "Dropping characters XML cannot represent");
            }
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
        self.out.push_str(if empty { "/>\n" } else { ">\n" });
    }

    fn indent(&mut self) {
        for _ in 0..self.open.len() {
            self.out.push_str(INDENT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_elements() {
        let mut xml = XmlWriter::new();
        xml.start("root", &[("a", "1")]);
        xml.empty("leaf", &[("b", "x'y")]);
        let out = xml.finish();

        assert_eq!(out, "<root a=\"1\">\n  <leaf b=\"x&apos;y\"/>\n</root>\n");
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let mut xml = XmlWriter::new();
        xml.empty("cell", &[("value", "bell\u{7}ring\u{0}\u{1f}\u{ffff}!")]);
        let out = xml.finish();

        let doc = roxmltree::Document::parse(&out).unwrap();
        assert_eq!(doc.root_element().attribute("value"), Some("bellring!"));
        assert!(is_xml_char('\n'));
        assert!(!is_xml_char('\u{c}'));
    }

    #[test]
    fn test_end_without_open_element() {
        let mut xml = XmlWriter::new();
        xml.end();
        assert_eq!(xml.finish(), "");
    }

    #[test]
    fn test_escape_round_trip() {
        let text = "<tag attr='v'> & \"quoted\"\r\n\tnext";
        let mut xml = XmlWriter::new();
        xml.empty("cell", &[("value", text)]);
        let out = xml.finish();

        let doc = roxmltree::Document::parse(&out).unwrap();
        assert_eq!(doc.root_element().attribute("value"), Some(text));
    }
}
