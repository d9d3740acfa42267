//! Schema normalizer for mxweave diagram specifications.
//!
//! This crate turns the JSON document produced by a language model (or written
//! by hand) into a validated [`DiagramSpec`]. Every diagram mode has its own
//! input shape; all of them normalize to the same node and edge model.
//!
//! # Pipeline
//!
//! ```text
//! text ── extract_json_object ──▶ serde_json::Value
//!                                     │ resolve mode (explicit, `mode` field, inference)
//!                                     ▼
//!                                per-mode schema ──▶ draft nodes / edges
//!                                     │ validate ids and endpoints
//!                                     ▼
//!                                 DiagramSpec + warnings
//! ```
//!
//! All problems of a document are collected and reported together as one
//! [`SpecValidationError`]; warnings for repaired input travel with the result
//! in [`Normalized`].
//!
//! # Example
//!
//! ```
//! use mxweave_core::spec::{Direction, Mode, ModeSelection};
//! use mxweave_schema::normalize_str;
//!
//! let source = r#"{
//!     "participants": ["Client", "API"],
//!     "messages": [{"from": "Client", "to": "API", "label": "GET /users"}]
//! }"#;
//!
//! let normalized = normalize_str(source, ModeSelection::Auto, Some(Direction::TopDown)).unwrap();
//! assert_eq!(normalized.spec().mode(), Mode::Sequence);
//! // Sequence diagrams always run left to right.
//! assert_eq!(normalized.spec().direction(), Direction::LeftRight);
//! ```

pub mod error;

mod extract;
mod infer;
mod modes;
mod validate;

use log::{debug, info};
use serde_json::{Map, Value};

use mxweave_core::spec::{DiagramSpec, Direction, Mode, ModeSelection};

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode, Location};

pub use error::SpecValidationError;
pub use extract::extract_json_object;
pub use validate::RESERVED_ID_SEQUENCE;

/// A normalized specification together with the warnings raised while
/// normalizing it.
#[derive(Debug)]
pub struct Normalized {
    spec: DiagramSpec,
    warnings: Vec<Diagnostic>,
}

impl Normalized {
    pub fn spec(&self) -> &DiagramSpec {
        &self.spec
    }

    /// Non-fatal diagnostics: defaults applied or input ignored.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_parts(self) -> (DiagramSpec, Vec<Diagnostic>) {
        (self.spec, self.warnings)
    }
}

/// Normalizes JSON text into a [`DiagramSpec`].
///
/// Text that is not bare JSON is reduced to its outermost `{ ... }` block
/// first; see [`extract_json_object`].
///
/// # Errors
///
/// Returns [`SpecValidationError`] with E002 when no JSON object can be parsed,
/// and every error [`normalize`] reports otherwise.
pub fn normalize_str(
    source: &str,
    selection: ModeSelection,
    direction: Option<Direction>,
) -> Result<Normalized, SpecValidationError> {
    let value = parse_json(source)?;
    normalize(&value, selection, direction)
}

/// Normalizes a parsed JSON document into a [`DiagramSpec`].
///
/// # Arguments
///
/// * `raw` - The document; must be a JSON object.
/// * `selection` - The mode to read the document with, or [`ModeSelection::Auto`].
/// * `direction` - Caller override of the flow direction. Takes precedence over
///   the document's `direction` field, except for modes with a fixed direction.
///
/// # Errors
///
/// Returns [`SpecValidationError`] carrying every error found in the document.
pub fn normalize(
    raw: &Value,
    selection: ModeSelection,
    direction: Option<Direction>,
) -> Result<Normalized, SpecValidationError> {
    let Some(object) = raw.as_object() else {
        return Err(Diagnostic::error(format!(
            "expected a JSON object, found {}",
            modes::value_kind(raw)
        ))
        .with_code(ErrorCode::E001)
        .with_label(Location::root(), "top-level value")
        .with_help("wrap the diagram in an object such as {\"nodes\": [...], \"edges\": [...]}")
        .into());
    };

    let mut collector = DiagnosticCollector::new();

    let Some(mode) = infer::resolve_mode(object, selection, &mut collector) else {
        return Err(collector.into_error());
    };
    let declared = read_direction(object, &mut collector);
    let title = read_title(object, &mut collector);

    let draft = modes::read(mode, object, &mut collector);
    validate::validate(&draft, &mut collector);
    let warnings = collector.finish()?;

    let direction = resolve_direction(mode, direction, declared);
    let nodes = draft.nodes.into_iter().map(|node| node.value).collect();
    let edges = draft.edges.into_iter().map(|edge| edge.value).collect();
    let spec = DiagramSpec::new(mode, direction, title, nodes, edges);

    info!(
        mode = mode.as_str(),
        direction = direction.as_str(),
        nodes = spec.nodes().len(),
        edges = spec.edges().len(),
        warnings = warnings.len();
        "Specification normalized"
    );
    Ok(Normalized { spec, warnings })
}

fn parse_json(source: &str) -> Result<Value, Diagnostic> {
    let err = match serde_json::from_str(source.trim()) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let Some(object) = extract_json_object(source) else {
        return Err(invalid_json(&err));
    };
    debug!("Input is not bare JSON, retrying with its outermost object");
    serde_json::from_str(object).map_err(|err| invalid_json(&err))
}

fn invalid_json(err: &serde_json::Error) -> Diagnostic {
    Diagnostic::error(format!("invalid JSON: {err}"))
        .with_code(ErrorCode::E002)
        .with_label(Location::root(), "unparseable input")
        .with_help("the input must contain a single JSON object")
}

fn read_direction(
    object: &Map<String, Value>,
    collector: &mut DiagnosticCollector,
) -> Option<Direction> {
    let value = object.get("direction")?;
    let parsed = match value {
        Value::Null => return None,
        Value::String(direction) => direction.parse::<Direction>().map_err(|err| err.to_string()),
        other => Err(format!(
            "`direction` must be a string, found {}",
            modes::value_kind(other)
        )),
    };

    parsed
        .map_err(|message| {
            collector.emit(
                Diagnostic::error(message)
                    .with_code(ErrorCode::E204)
                    .with_label(Location::root().field("direction"), "invalid direction")
                    .with_help("use `TD` (top-down) or `LR` (left-right)"),
            );
        })
        .ok()
}

fn read_title(object: &Map<String, Value>, collector: &mut DiagnosticCollector) -> Option<String> {
    match object.get("title")? {
        Value::Null => None,
        Value::String(title) => Some(title.trim().to_string()).filter(|title| !title.is_empty()),
        other => {
            collector.emit(
                Diagnostic::error(format!(
                    "`title` must be a string, found {}",
                    modes::value_kind(other)
                ))
                .with_code(ErrorCode::E100)
                .with_label(Location::root().field("title"), "invalid title"),
            );
            None
        }
    }
}

/// Caller override, then the document field, then the mode default. Modes
/// with a fixed direction ignore both requests.
fn resolve_direction(
    mode: Mode,
    requested: Option<Direction>,
    declared: Option<Direction>,
) -> Direction {
    let wanted = requested.or(declared);
    match mode.forced_direction() {
        Some(forced) => {
            if let Some(wanted) = wanted.filter(|wanted| *wanted != forced) {
                debug!(
                    mode = mode.as_str(),
                    requested = wanted.as_str(),
                    used = forced.as_str();
                    "Direction request ignored for this mode"
                );
            }
            forced
        }
        None => wanted.unwrap_or_else(|| mode.default_direction()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_resolve_direction_priority() {
        use Direction::{LeftRight, TopDown};

        assert_eq!(resolve_direction(Mode::Er, Some(LeftRight), Some(TopDown)), LeftRight);
        assert_eq!(resolve_direction(Mode::Er, None, Some(LeftRight)), LeftRight);
        assert_eq!(resolve_direction(Mode::Er, None, None), TopDown);
        assert_eq!(resolve_direction(Mode::Usecase, None, None), LeftRight);
        assert_eq!(resolve_direction(Mode::Sequence, Some(TopDown), Some(TopDown)), LeftRight);
    }

    #[test]
    fn test_normalize_rejects_non_object() {
        let err = normalize(&json!([1, 2]), ModeSelection::Auto, None).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
        assert_eq!(
            err.to_string(),
            "error[E001]: expected a JSON object, found a list"
        );
    }

    #[test]
    fn test_normalize_str_invalid_json() {
        let err = normalize_str("{\"nodes\": [", ModeSelection::Auto, None).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));

        let err = normalize_str("sorry, I cannot help", ModeSelection::Auto, None).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_normalize_str_fenced_answer() {
        let answer = "Sure!\n```json\n{\"nodes\": [{\"id\": \"a\"}], \"edges\": []}\n```";
        let normalized = normalize_str(answer, ModeSelection::Auto, None).unwrap();
        assert_eq!(normalized.spec().mode(), Mode::Generic);
        assert_eq!(normalized.spec().nodes().len(), 1);
    }

    #[test]
    fn test_normalize_bad_direction_and_title() {
        let input = json!({"nodes": [], "direction": "RL", "title": 3});
        let err = normalize(&input, ModeSelection::Auto, None).unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, vec![ErrorCode::E204, ErrorCode::E100]);
    }

    #[test]
    fn test_normalize_collects_all_errors() {
        let input = json!({
            "mode": "generic",
            "nodes": [{"id": "a"}, {"id": "a"}, {"label": "no id"}],
            "edges": [{"from": "a", "to": "ghost"}]
        });
        let err = normalize(&input, ModeSelection::Auto, None).unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, vec![ErrorCode::E101, ErrorCode::E201, ErrorCode::E203]);
        assert!(err.to_string().ends_with("(+2 more)"));
    }

    #[test]
    fn test_normalize_title_and_warnings() {
        let input = json!({
            "title": "  Orders  ",
            "nodes": [{"id": "a", "shape": "star"}]
        });
        let normalized = normalize(&input, ModeSelection::Auto, None).unwrap();
        assert_eq!(normalized.spec().title(), Some("Orders"));
        assert_eq!(normalized.warnings().len(), 1);
    }
}
