//! Integration tests for the DiagramBuilder API
//!
//! These tests run whole compilations: JSON in, draw.io document out.

use std::fs;

use mxweave::{
    DiagramBuilder, MxweaveError,
    config::{AppConfig, OutputConfig},
    layout::EngineBuilder,
    spec::{Direction, Mode, ModeSelection},
    style::StyleTable,
};

const ER_SOURCE: &str = r#"{
    "mode": "er",
    "entities": [
        {"name": "User", "attributes": [
            {"name": "id", "type": "uuid", "pk": true},
            {"name": "email", "type": "text", "unique": true}
        ]},
        {"name": "Auth", "attributes": [
            {"name": "id", "type": "uuid", "pk": true},
            {"name": "user_id", "type": "uuid"},
            {"name": "secret", "type": "text"}
        ]}
    ],
    "relations": [{"from": "User", "to": "Auth", "cardinality": "1..1"}]
}"#;

fn cells<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    doc.descendants().filter(|n| n.has_tag_name("mxCell"))
}

#[test]
fn test_builder_api_exists() {
    let _builder = DiagramBuilder::default();
}

#[test]
fn test_er_scenario() {
    let builder = DiagramBuilder::default();
    let spec = builder
        .normalize(ER_SOURCE, ModeSelection::Auto, None)
        .expect("Failed to normalize");
    assert_eq!(spec.mode(), Mode::Er);

    let layout = EngineBuilder::new().build(&spec).unwrap();
    let user = layout.placement("User").unwrap();
    let auth = layout.placement("Auth").unwrap();
    assert_ne!(
        (user.layer(), user.ordinal()),
        (auth.layer(), auth.ordinal())
    );

    let document = builder.render_drawio(&spec).expect("Failed to render");
    let doc = roxmltree::Document::parse(&document).unwrap();

    let containers: Vec<_> = cells(&doc)
        .filter(|n| n.attribute("parent") == Some("::layer") && n.attribute("vertex") == Some("1"))
        .collect();
    assert_eq!(containers.len(), 2);

    let connectors: Vec<_> = cells(&doc)
        .filter(|n| n.attribute("edge") == Some("1"))
        .collect();
    assert_eq!(connectors.len(), 1);
    assert_eq!(connectors[0].attribute("source"), Some("User"));
    assert_eq!(connectors[0].attribute("target"), Some("Auth"));

    let user_rows: Vec<&str> = cells(&doc)
        .filter(|n| n.attribute("parent") == Some("User"))
        .filter_map(|n| n.attribute("value"))
        .collect();
    assert_eq!(user_rows.len(), 2);
    assert!(user_rows[0].contains("PK"));

    let dir = tempfile::tempdir().unwrap();
    let path = builder.write(&document, dir.path(), "diagram").unwrap();
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("diagram_"));
    assert!(name.ends_with(".drawio"));
    let hash = &name["diagram_".len()..name.len() - ".drawio".len()];
    assert_eq!(hash.len(), 8);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_sequence_scenario() {
    let source = r#"{
        "messages": [
            {"from": "Client", "to": "API", "label": "GET /users"},
            {"from": "API", "to": "DB", "label": "SELECT"},
            {"from": "DB", "to": "API", "label": "rows", "kind": "reply"}
        ]
    }"#;

    let builder = DiagramBuilder::default();
    let spec = builder
        .normalize(source, ModeSelection::Auto, Some(Direction::TopDown))
        .unwrap();
    assert_eq!(spec.mode(), Mode::Sequence);
    assert_eq!(spec.direction(), Direction::LeftRight);

    let ids: Vec<&str> = spec.nodes().iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec!["Client", "API", "DB"]);

    let document = builder.render_drawio(&spec).unwrap();
    let doc = roxmltree::Document::parse(&document).unwrap();
    let lifelines: Vec<&str> = cells(&doc)
        .filter(|n| {
            n.attribute("style")
                .is_some_and(|style| style.contains("shape=umlLifeline"))
        })
        .filter_map(|n| n.attribute("id"))
        .collect();
    assert_eq!(lifelines, ids);

    let message_points = cells(&doc)
        .filter(|n| n.attribute("edge") == Some("1"))
        .map(|edge| {
            edge.descendants()
                .filter(|n| n.has_tag_name("mxPoint"))
                .count()
        })
        .collect::<Vec<_>>();
    assert_eq!(message_points, vec![2, 2, 2]);
}

#[test]
fn test_no_hash_overwrites() {
    let config = AppConfig::default().with_output(OutputConfig::default().with_hash(false));
    let builder = DiagramBuilder::new(config);
    let dir = tempfile::tempdir().unwrap();

    let first = builder
        .compile(ER_SOURCE, ModeSelection::Auto, None)
        .unwrap();
    let path = builder.write(&first, dir.path(), "diagram").unwrap();
    assert_eq!(path.file_name().unwrap(), "diagram.drawio");

    let second = builder
        .compile(
            &ER_SOURCE.replace("secret", "token"),
            ModeSelection::Auto,
            None,
        )
        .unwrap();
    let again = builder.write(&second, dir.path(), "diagram").unwrap();
    assert_eq!(path, again);
    assert_eq!(fs::read_to_string(&again).unwrap(), second);
}

#[test]
fn test_compile_is_deterministic() {
    let builder = DiagramBuilder::default();
    let first = builder.compile(ER_SOURCE, ModeSelection::Auto, None).unwrap();
    let second = builder.compile(ER_SOURCE, ModeSelection::Auto, None).unwrap();
    assert_eq!(first, second);

    let renamed = builder
        .compile(
            &ER_SOURCE.replace("\"email\"", "\"mail\""),
            ModeSelection::Auto,
            None,
        )
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let a = builder.write(&first, dir.path(), "diagram").unwrap();
    let b = builder.write(&renamed, dir.path(), "diagram").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_style_table_is_applied() {
    let styles: StyleTable = [("er.entity", "shape=table;html=1;fillColor=#eeeeee;")]
        .into_iter()
        .collect();
    let builder = DiagramBuilder::default().with_style_table(styles);
    let document = builder.compile(ER_SOURCE, ModeSelection::Auto, None).unwrap();

    let doc = roxmltree::Document::parse(&document).unwrap();
    let user = cells(&doc)
        .find(|n| n.attribute("id") == Some("User"))
        .unwrap();
    let style = user.attribute("style").unwrap();
    assert!(style.starts_with("shape=table;fillColor=#eeeeee;"));
    assert!(!style.contains("html"));
}

#[test]
fn test_invalid_input_reports_all_errors() {
    let source = r#"{"mode": "generic", "nodes": [{"id": "a"}, {"id": "a"}],
                     "edges": [{"from": "a", "to": "missing"}]}"#;
    let err = DiagramBuilder::default()
        .compile(source, ModeSelection::Auto, None)
        .unwrap_err();

    let MxweaveError::Validation { err, src } = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(src, source);
    assert_eq!(err.errors().count(), 2);
}
