//! Recovery of a JSON object from model output that is not bare JSON.

/// Returns the outermost `{ ... }` block of `text`.
///
/// Model answers often wrap the object in Markdown fences or surround it with
/// prose; everything before the first `{` and after the last `}` is dropped.
/// Returns `None` when the text contains no such block.
///
/// # Examples
///
/// ```
/// use mxweave_schema::extract_json_object;
///
/// let answer = "Here you go:\n```json\n{\"nodes\": []}\n```";
/// assert_eq!(extract_json_object(answer), Some("{\"nodes\": []}"));
/// assert_eq!(extract_json_object("no json here"), None);
/// ```
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
