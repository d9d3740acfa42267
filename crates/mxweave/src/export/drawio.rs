//! draw.io document emission.

use log::debug;
use sha2::{Digest, Sha256};

use mxweave_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    spec::{DiagramSpec, Edge, Node, NodeContent, NodeKind, RelationKind},
};

use crate::{
    config::LayoutConfig,
    error::MxweaveError,
    export::{builtin, xml::XmlWriter},
    layout::{
        EdgeRoute, LayoutResult, RouteHint,
        sizing::{SEPARATOR_HEIGHT, TextMetrics},
    },
    style::{Provenance, ResolvedStyle, StyleOverrides, StyleResolver, StyleString, StyleTable},
};

/// Id of the structural root cell.
pub const ROOT_ID: &str = "::root";
/// Id of the default layer every diagram element belongs to.
pub const LAYER_ID: &str = "::layer";

const DEFAULT_PAGE_NAME: &str = "Page-1";
const MIN_PAGE_WIDTH: f32 = 1920.0;
const MIN_PAGE_HEIGHT: f32 = 1080.0;

/// Writes a laid-out diagram as a draw.io (`mxfile`) document.
///
/// The emitter borrows the style table and overrides; one emitter can
/// serve any number of diagrams.
#[derive(Debug, Clone)]
pub struct DrawioEmitter<'a> {
    table: &'a StyleTable,
    overrides: &'a StyleOverrides,
    metrics: TextMetrics,
    lifeline_header: f32,
    margin: f32,
    background: Option<Color>,
}

impl<'a> DrawioEmitter<'a> {
    pub fn new(table: &'a StyleTable, overrides: &'a StyleOverrides, config: &LayoutConfig) -> Self {
        Self {
            table,
            overrides,
            metrics: TextMetrics::new(config),
            lifeline_header: config.lifeline_header(),
            margin: config.margin(),
            background: None,
        }
    }

    /// Set the page background color.
    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    /// Emits the document for `spec` placed by `layout`.
    ///
    /// The output depends only on the arguments: identical input yields a
    /// byte-identical document.
    ///
    /// # Errors
    ///
    /// Returns `MxweaveError::Export` if `layout` does not cover every node and
    /// edge of `spec`.
    pub fn emit(&self, spec: &DiagramSpec, layout: &LayoutResult) -> Result<String, MxweaveError> {
        if layout.routes().len() != spec.edges().len() {
            return Err(MxweaveError::Export(format!(
                "layout routes {} edges, diagram has {}",
                layout.routes().len(),
                spec.edges().len()
            )));
        }

        let mut resolver = StyleResolver::new(self.table, self.overrides);
        let mut xml = XmlWriter::new();

        let diagram_id = diagram_id(spec);
        let page_width = format_number(page_extent(layout.bounds().max_x() + self.margin, MIN_PAGE_WIDTH));
        let page_height =
            format_number(page_extent(layout.bounds().max_y() + self.margin, MIN_PAGE_HEIGHT));
        let background = self.background.map(Color::to_hex);

        xml.start("mxfile", &[("host", "mxweave"), ("type", "device")]);
        xml.start(
            "diagram",
            &[
                ("id", diagram_id.as_str()),
                ("name", spec.title().unwrap_or(DEFAULT_PAGE_NAME)),
            ],
        );

        let mut model = vec![
            ("grid", "1"),
            ("gridSize", "10"),
            ("guides", "1"),
            ("tooltips", "1"),
            ("connect", "1"),
            ("arrows", "1"),
            ("fold", "1"),
            ("page", "1"),
            ("pageScale", "1"),
            ("pageWidth", page_width.as_str()),
            ("pageHeight", page_height.as_str()),
            ("math", "0"),
            ("shadow", "0"),
        ];
        if let Some(background) = &background {
            model.push(("background", background.as_str()));
        }
        xml.start("mxGraphModel", &model);
        xml.start("root", &[]);
        xml.empty("mxCell", &[("id", ROOT_ID)]);
        xml.empty("mxCell", &[("id", LAYER_ID), ("parent", ROOT_ID)]);

        for node in spec.nodes() {
            let bounds = node_bounds(layout, node.id())?;
            let resolved = resolver.resolve_node(node);
            self.write_node(&mut xml, node, bounds, &resolved);
        }

        for (index, (edge, route)) in spec.edges().iter().zip(layout.routes()).enumerate() {
            let resolved = resolver.resolve_edge(spec.mode(), edge);
            let style = self.edge_style(spec, layout, edge, route, &resolved)?;
            write_edge(&mut xml, index, edge, route, &style);
        }

        resolver.log_summary();
        debug!(
            nodes = spec.nodes().len(),
            edges = spec.edges().len();
            "Document emitted"
        );
        Ok(xml.finish())
    }

    fn write_node(&self, xml: &mut XmlWriter, node: &Node, bounds: Bounds, resolved: &ResolvedStyle) {
        let mut style = base_style(resolved, builtin::node_style(node.kind()));
        let header = self.metrics.header_height(node);
        match node.content() {
            NodeContent::Entity { .. } | NodeContent::Class { .. } => {
                style.set_default("container", "1");
                style.set_default("startSize", &format_number(header));
            }
            NodeContent::Plain => {}
        }
        if node.kind() == NodeKind::Lifeline {
            style.set_default("size", &format_number(self.lifeline_header));
        }

        let style = style.to_string();
        xml.start(
            "mxCell",
            &[
                ("id", node.id()),
                ("value", node.label()),
                ("style", style.as_str()),
                ("vertex", "1"),
                ("parent", LAYER_ID),
            ],
        );
        write_geometry(xml, bounds);
        xml.end();

        let row_height = self.metrics.row_height();
        let width = bounds.width();
        let mut rows = RowWriter {
            parent: node.id(),
            width,
            y: header,
            count: 0,
        };
        match node.content() {
            NodeContent::Plain => {}
            NodeContent::Entity { attributes } => {
                for attribute in attributes {
                    rows.row(xml, &attribute.row_text(), row_height);
                }
            }
            NodeContent::Class {
                attributes,
                methods,
            } => {
                for member in attributes {
                    rows.row(xml, &member.row_text(), row_height);
                }
                rows.separator(xml);
                for member in methods {
                    rows.row(xml, &member.row_text(), row_height);
                }
            }
        }
    }

    fn edge_style(
        &self,
        spec: &DiagramSpec,
        layout: &LayoutResult,
        edge: &Edge,
        route: &EdgeRoute,
        resolved: &ResolvedStyle,
    ) -> Result<String, MxweaveError> {
        let mut style = base_style(resolved, builtin::edge_style(edge.relation()));

        if edge.relation() == RelationKind::Relationship {
            if let Some((start, end)) = edge.cardinality().and_then(builtin::cardinality_markers) {
                if matches!(resolved.provenance(), Provenance::Override | Provenance::Element) {
                    style.set_default("startArrow", start);
                    style.set_default("endArrow", end);
                } else {
                    style.set("startArrow", start);
                    style.set("endArrow", end);
                }
                style.set_default("startFill", "0");
                style.set_default("endFill", "0");
            }
        }

        if route.hint() == RouteHint::Orthogonal && !style.contains("edgeStyle") {
            style.set("edgeStyle", "orthogonalEdgeStyle");
        }

        let source = node_bounds(layout, edge.source())?;
        let target = node_bounds(layout, edge.target())?;
        if let Some((source_point, target_point)) = route.terminals() {
            anchor(&mut style, "exit", source, source_point);
            anchor(&mut style, "entry", target, target_point);
        } else {
            if let Some(row) = self.field_row_center(spec, edge.source(), edge.source_field()) {
                anchor(&mut style, "exit", source, Point::new(source.max_x(), source.min_y() + row));
            }
            if let Some(row) = self.field_row_center(spec, edge.target(), edge.target_field()) {
                anchor(&mut style, "entry", target, Point::new(target.min_x(), target.min_y() + row));
            }
        }

        Ok(style.to_string())
    }

    /// Offset from the top of entity `node` to the middle of the row of `field`.
    fn field_row_center(&self, spec: &DiagramSpec, node: &str, field: Option<&str>) -> Option<f32> {
        let field = field?;
        let node = spec.node(node)?;
        let NodeContent::Entity { attributes } = node.content() else {
            return None;
        };
        let row = attributes
            .iter()
            .position(|attribute| attribute.name() == field)?;
        Some(self.metrics.header_height(node) + (row as f32 + 0.5) * self.metrics.row_height())
    }
}

/// The resolved style, or `builtin` when nothing resolved, without the
/// `html` flag so labels render as plain text.
fn base_style(resolved: &ResolvedStyle, builtin: &str) -> StyleString {
    let mut style = if resolved.is_unstyled() {
        StyleString::parse(builtin)
    } else {
        StyleString::parse(resolved.style())
    };
    style.remove("html");
    style
}

/// Pins one connector end to `point` relative to `bounds`, unless the style
/// already places it.
fn anchor(style: &mut StyleString, side: &str, bounds: Bounds, point: Point) {
    let x_key = format!("{side}X");
    let y_key = format!("{side}Y");
    if style.contains(&x_key) || style.contains(&y_key) {
        return;
    }
    let relative = |offset: f32, extent: f32| {
        if extent > 0.0 {
            (offset / extent).clamp(0.0, 1.0)
        } else {
            0.5
        }
    };
    style.set(
        x_key,
        format_ratio(relative(point.x() - bounds.min_x(), bounds.width())),
    );
    style.set(
        y_key,
        format_ratio(relative(point.y() - bounds.min_y(), bounds.height())),
    );
    style.set(format!("{side}Dx"), "0");
    style.set(format!("{side}Dy"), "0");
}

struct RowWriter<'n> {
    parent: &'n str,
    width: f32,
    y: f32,
    count: usize,
}

impl RowWriter<'_> {
    fn row(&mut self, xml: &mut XmlWriter, text: &str, height: f32) {
        let id = format!("{}::row{}", self.parent, self.count);
        self.child(xml, &id, text, builtin::ROW_STYLE, height);
        self.count += 1;
    }

    fn separator(&mut self, xml: &mut XmlWriter) {
        let id = format!("{}::separator", self.parent);
        self.child(xml, &id, "", builtin::SEPARATOR_STYLE, SEPARATOR_HEIGHT);
    }

    fn child(&mut self, xml: &mut XmlWriter, id: &str, text: &str, style: &str, height: f32) {
        xml.start(
            "mxCell",
            &[
                ("id", id),
                ("value", text),
                ("style", style),
                ("vertex", "1"),
                ("parent", self.parent),
            ],
        );
        write_geometry(
            xml,
            Point::new(0.0, self.y).to_bounds(Size::new(self.width, height)),
        );
        xml.end();
        self.y += height;
    }
}

fn write_edge(xml: &mut XmlWriter, index: usize, edge: &Edge, route: &EdgeRoute, style: &str) {
    let id = format!("::edge{index}");
    let label = edge.display_label().unwrap_or_default();
    xml.start(
        "mxCell",
        &[
            ("id", id.as_str()),
            ("value", label.as_str()),
            ("style", style),
            ("edge", "1"),
            ("parent", LAYER_ID),
            ("source", edge.source()),
            ("target", edge.target()),
        ],
    );
    xml.start("mxGeometry", &[("relative", "1"), ("as", "geometry")]);

    if let Some((source, target)) = route.terminals() {
        write_point(xml, source, Some("sourcePoint"));
        write_point(xml, target, Some("targetPoint"));
    }
    if !route.waypoints().is_empty() {
        xml.start("Array", &[("as", "points")]);
        for point in route.waypoints() {
            write_point(xml, *point, None);
        }
        xml.end();
    }

    xml.end();
    xml.end();
}

fn write_geometry(xml: &mut XmlWriter, bounds: Bounds) {
    let x = format_number(bounds.min_x());
    let y = format_number(bounds.min_y());
    let width = format_number(bounds.width());
    let height = format_number(bounds.height());
    xml.empty(
        "mxGeometry",
        &[
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
            ("as", "geometry"),
        ],
    );
}

fn write_point(xml: &mut XmlWriter, point: Point, role: Option<&str>) {
    let x = format_number(point.x());
    let y = format_number(point.y());
    let mut attrs = vec![("x", x.as_str()), ("y", y.as_str())];
    if let Some(role) = role {
        attrs.push(("as", role));
    }
    xml.empty("mxPoint", &attrs);
}

fn node_bounds(layout: &LayoutResult, id: &str) -> Result<Bounds, MxweaveError> {
    layout
        .placement(id)
        .map(|placement| placement.bounds())
        .ok_or_else(|| MxweaveError::Export(format!("node `{id}` has no placement")))
}

fn page_extent(content: f32, minimum: f32) -> f32 {
    content.max(minimum).ceil()
}

/// Deterministic diagram id derived from the mode, title and node ids.
fn diagram_id(spec: &DiagramSpec) -> String {
    let mut hasher = Sha256::new();
    hasher.update(spec.mode().as_str());
    hasher.update([0u8]);
    hasher.update(spec.title().unwrap_or_default());
    for node in spec.nodes() {
        hasher.update([0u8]);
        hasher.update(node.id());
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("mxweave-{}", &hex[..16])
}

/// Coordinates with at most two decimals and no trailing zeros.
fn format_number(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Ratios with at most four decimals.
fn format_ratio(value: f32) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}
