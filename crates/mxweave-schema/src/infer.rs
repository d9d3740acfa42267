//! Mode selection for documents compiled with `--mode auto`.

use indexmap::IndexSet;
use log::debug;
use serde_json::{Map, Value};

use mxweave_core::spec::{Mode, ModeSelection};

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode, Location};

/// Resolves the mode of a document.
///
/// An explicit selection wins. Under [`ModeSelection::Auto`] a valid `mode`
/// field of the document wins; otherwise the mode is inferred from structural
/// signals. Returns `None` after reporting E205 when the `mode` field names an
/// unknown mode.
pub(crate) fn resolve_mode(
    object: &Map<String, Value>,
    selection: ModeSelection,
    collector: &mut DiagnosticCollector,
) -> Option<Mode> {
    match selection {
        ModeSelection::Explicit(mode) => {
            if let Some(declared) = object.get("mode").and_then(Value::as_str) {
                if !declared.eq_ignore_ascii_case(mode.as_str()) {
                    debug!(declared = declared, selected = mode.as_str(); "Ignoring document mode, caller selected a mode");
                }
            }
            Some(mode)
        }
        ModeSelection::Auto => match object.get("mode") {
            None | Some(Value::Null) => Some(infer_mode(object, collector)),
            Some(Value::String(declared)) if declared.trim().eq_ignore_ascii_case("auto") => {
                Some(infer_mode(object, collector))
            }
            Some(Value::String(declared)) => match declared.parse::<Mode>() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    collector.emit(invalid_mode(err.to_string()));
                    None
                }
            },
            Some(_) => {
                collector.emit(invalid_mode("`mode` must be a string".to_string()));
                None
            }
        },
    }
}

fn invalid_mode(message: String) -> Diagnostic {
    let names: Vec<&str> = Mode::ALL.iter().map(|mode| mode.as_str()).collect();
    Diagnostic::error(message)
        .with_code(ErrorCode::E205)
        .with_label(Location::root().field("mode"), "invalid mode")
        .with_help(format!("expected one of: auto, {}", names.join(", ")))
}

/// Infers the mode from the sections and node fields present.
///
/// Exactly one signalled mode is chosen. No signal means [`Mode::Generic`];
/// conflicting signals also fall back to [`Mode::Generic`] with a warning.
pub(crate) fn infer_mode(object: &Map<String, Value>, collector: &mut DiagnosticCollector) -> Mode {
    let signals = signals(object);

    let mode = match signals.len() {
        0 => Mode::Generic,
        1 => signals[0],
        _ => {
            let names: Vec<&str> = signals.iter().map(|mode| mode.as_str()).collect();
            collector.emit(
                Diagnostic::warning(format!(
                    "input matches several modes ({}), using `generic`",
                    names.join(", ")
                ))
                .with_label(Location::root(), "ambiguous document")
                .with_help("add a `mode` field or pass `--mode`"),
            );
            Mode::Generic
        }
    };

    debug!(mode = mode.as_str(), signals = signals.len(); "Inferred diagram mode");
    mode
}

/// Modes suggested by the document structure, in first-detected order.
fn signals(object: &Map<String, Value>) -> IndexSet<Mode> {
    let mut signals = IndexSet::new();
    let has = |key: &str| object.contains_key(key);

    if has("entities") {
        signals.insert(Mode::Er);
    }
    if has("classes") {
        signals.insert(Mode::Class);
    }
    if has("participants") || has("messages") || has("lifelines") {
        signals.insert(Mode::Sequence);
    }
    if has("states") || has("transitions") {
        signals.insert(Mode::State);
    }
    if has("activities") {
        signals.insert(Mode::Activity);
    }
    if has("actors") || has("usecases") || has("use_cases") {
        signals.insert(Mode::Usecase);
    }

    let nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for node in nodes.iter().filter_map(Value::as_object) {
        if let Some(mode) = node_signal(node) {
            signals.insert(mode);
        }
    }

    signals
}

/// The mode a single canonical node object points at, if any.
fn node_signal(node: &Map<String, Value>) -> Option<Mode> {
    if node.contains_key("methods") {
        return Some(Mode::Class);
    }

    let attributes = node
        .get("attributes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for attribute in attributes.iter().filter_map(Value::as_object) {
        if attribute.contains_key("visibility") {
            return Some(Mode::Class);
        }
        if attribute.contains_key("pk") || attribute.contains_key("type") {
            return Some(Mode::Er);
        }
    }

    let kind = node
        .get("kind")
        .or_else(|| node.get("type"))
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase);
    match kind.as_deref() {
        Some("actor" | "usecase" | "use_case") => Some(Mode::Usecase),
        _ => None,
    }
}
