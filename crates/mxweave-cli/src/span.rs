//! Mapping of JSON pointers back to byte ranges of the input text.
//!
//! Diagnostics locate problems with JSON pointers; snippets need byte spans.
//! The scanner walks the raw text without building a value tree, so the
//! ranges point into the text exactly as the user wrote it, including any
//! prose or Markdown fences around the object.

use std::ops::Range;

/// Byte range of the value at `pointer`, or of its closest existing ancestor.
///
/// Returns `None` when `src` contains no JSON object at all.
pub fn locate(src: &str, pointer: &str) -> Option<Range<usize>> {
    let start = src.find('{')?;
    let tokens: Vec<String> = pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect();

    (0..=tokens.len())
        .rev()
        .find_map(|depth| Scanner::new(src, start).find(&tokens[..depth]))
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos,
        }
    }

    fn find(mut self, tokens: &[String]) -> Option<Range<usize>> {
        for token in tokens {
            self.skip_ws();
            match self.peek()? {
                b'{' => self.enter_member(token)?,
                b'[' => self.enter_element(token.parse().ok()?)?,
                _ => return None,
            }
        }
        self.skip_ws();
        let begin = self.pos;
        self.skip_value()?;
        Some(begin..self.pos)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> Option<()> {
        self.skip_ws();
        (self.peek()? == byte).then(|| self.pos += 1)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Leaves the cursor on the value of member `key`.
    fn enter_member(&mut self, key: &str) -> Option<()> {
        self.eat(b'{')?;
        loop {
            self.skip_ws();
            if self.peek()? == b'}' {
                return None;
            }
            let key_start = self.pos;
            self.skip_string()?;
            let name: String = serde_json::from_str(&self.src[key_start..self.pos]).ok()?;
            self.eat(b':')?;
            self.skip_ws();
            if name == key {
                return Some(());
            }
            self.skip_value()?;
            self.eat(b',')?;
        }
    }

    /// Leaves the cursor on element `index` of an array.
    fn enter_element(&mut self, index: usize) -> Option<()> {
        self.eat(b'[')?;
        for _ in 0..index {
            self.skip_ws();
            if self.peek()? == b']' {
                return None;
            }
            self.skip_value()?;
            self.eat(b',')?;
        }
        self.skip_ws();
        (self.peek()? != b']').then_some(())
    }

    fn skip_string(&mut self) -> Option<()> {
        if self.peek()? != b'"' {
            return None;
        }
        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some(());
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_value(&mut self) -> Option<()> {
        match self.peek()? {
            b'"' => self.skip_string(),
            b'{' | b'[' => {
                let mut depth = 0usize;
                loop {
                    match self.peek()? {
                        b'"' => {
                            self.skip_string()?;
                            continue;
                        }
                        b'{' | b'[' => depth += 1,
                        b'}' | b']' => {
                            depth -= 1;
                            if depth == 0 {
                                self.pos += 1;
                                return Some(());
                            }
                        }
                        _ => {}
                    }
                    self.pos += 1;
                }
            }
            _ => {
                let begin = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !matches!(b, b',' | b'}' | b']') && !b.is_ascii_whitespace())
                {
                    self.pos += 1;
                }
                (self.pos > begin).then_some(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"Sure:
```json
{
  "mode": "er",
  "entities": [
    {"name": "User", "attributes": []},
    {"name": "a/b", "attributes": [{"name": "id", "pk": true}]}
  ]
}
```"#;

    fn text(pointer: &str) -> &'static str {
        let range = locate(SOURCE, pointer).unwrap();
        &SOURCE[range]
    }

    #[test]
    fn test_locate_member_and_element() {
        assert_eq!(text("/mode"), "\"er\"");
        assert_eq!(text("/entities/0/name"), "\"User\"");
        assert_eq!(text("/entities/1/attributes/0/pk"), "true");
    }

    #[test]
    fn test_locate_root_covers_object() {
        let root = text("");
        assert!(root.starts_with('{'));
        assert!(root.ends_with('}'));
    }

    #[test]
    fn test_missing_member_falls_back_to_parent() {
        assert_eq!(
            text("/entities/0/comment"),
            r#"{"name": "User", "attributes": []}"#
        );
        assert!(text("/entities/7").starts_with('['));
    }

    #[test]
    fn test_escaped_braces_in_strings() {
        let src = r#"{"label": "a } \" [", "next": 1}"#;
        assert_eq!(&src[locate(src, "/next").unwrap()], "1");
    }

    #[test]
    fn test_no_object() {
        assert!(locate("plain text", "/mode").is_none());
    }
}
