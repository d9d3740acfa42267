//! Style harvesting from existing draw.io documents and shape libraries.
//!
//! Every `style` attribute of an `mxCell` found in the scanned files becomes
//! an entry of a style table, under a key guessed from the style itself.
//! Styles that differ only in entry order are stored once.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};
use serde_json::{Map, Value};
use walkdir::WalkDir;

use mxweave::{MxweaveError, style::StyleString};

use crate::args::HarvestArgs;

/// Shape directories inside an unpacked draw.io desktop app.
const APP_SHAPE_DIRS: [&str; 5] = [
    "drawio/src/main/webapp/shapes",
    "drawio/src/main/webapp/js/shapes",
    "drawio/src/main/webapp/templates",
    "app/resources/shapes",
    "resources/shapes",
];

const EXTENSIONS: [&str; 2] = ["drawio", "xml"];

/// Outcome of one harvest run.
#[derive(Debug, Default)]
pub struct HarvestReport {
    files: usize,
    files_with_styles: usize,
    cells: usize,
    styles: IndexMap<String, String>,
}

impl HarvestReport {
    /// Number of files scanned.
    pub fn files(&self) -> usize {
        self.files
    }

    /// Number of scanned files holding at least one styled cell.
    pub fn files_with_styles(&self) -> usize {
        self.files_with_styles
    }

    /// Number of styled cells seen, duplicates included.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Harvested styles by key, in discovery order.
    pub fn styles(&self) -> &IndexMap<String, String> {
        &self.styles
    }
}

/// Scan `args.inputs` and write the style table to `args.styles_out`.
///
/// # Errors
///
/// Returns `MxweaveError::Io` if an input does not exist or the table cannot
/// be written, and `MxweaveError::StyleTable` if no file or no style was found
/// (the latter unless `force_write` is set).
pub fn run(args: &HarvestArgs) -> Result<HarvestReport, MxweaveError> {
    let files = collect_files(&args.inputs)?;
    if files.is_empty() {
        return Err(MxweaveError::StyleTable(
            "no .drawio or .xml files found in the given paths".to_string(),
        ));
    }
    info!(files = files.len(); "Harvesting styles");

    let mut collector = StyleCollector::default();
    let mut report = HarvestReport {
        files: files.len(),
        ..HarvestReport::default()
    };

    for file in &files {
        let cells = match harvest_file(file) {
            Ok(cells) => cells,
            Err(err) => {
                debug!(path = file.display().to_string(), err:% = err; "Skipping unreadable file");
                continue;
            }
        };
        if !cells.is_empty() {
            report.files_with_styles += 1;
        }
        report.cells += cells.len();
        for cell in cells {
            let style = StyleString::parse(&cell.style);
            collector.insert(&guess_key(&style, cell.edge), &cell.style, &style);
        }
    }

    report.styles = collector.into_styles();
    info!(
        cells = report.cells,
        files_with_styles = report.files_with_styles,
        styles = report.styles.len();
        "Styles harvested"
    );

    if report.styles.is_empty() && !args.force_write {
        return Err(MxweaveError::StyleTable(
            "no styles were extracted; point at draw.io shape directories or pass --force-write"
                .to_string(),
        ));
    }

    write_table(&args.styles_out, &report.styles)?;
    Ok(report)
}

fn write_table(path: &Path, styles: &IndexMap<String, String>) -> Result<(), MxweaveError> {
    let table: Map<String, Value> = styles
        .iter()
        .map(|(key, style)| (key.clone(), Value::String(style.clone())))
        .collect();
    let json = serde_json::to_string_pretty(&Value::Object(table))
        .map_err(|err| MxweaveError::StyleTable(err.to_string()))?;
    fs::write(path, json)?;

    info!(path = path.display().to_string(), styles = styles.len(); "Style table written");
    Ok(())
}

/// Expand `inputs` into the list of candidate files, without duplicates.
///
/// A directory that looks like an unpacked draw.io app is narrowed to its
/// shape directories; any other directory is walked recursively.
fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, MxweaveError> {
    let mut files = IndexSet::new();

    for input in inputs {
        if !input.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            )
            .into());
        }

        if !input.is_dir() {
            if has_extension(input) {
                files.insert(canonical(input));
            } else {
                debug!(path = input.display().to_string(); "Skipping file with unknown extension");
            }
            continue;
        }

        let shape_dirs: Vec<PathBuf> = APP_SHAPE_DIRS
            .iter()
            .map(|rel| input.join(rel))
            .filter(|dir| dir.is_dir())
            .collect();

        if shape_dirs.is_empty() {
            walk(input, &mut files);
        } else {
            for dir in &shape_dirs {
                debug!(path = dir.display().to_string(); "Scanning app shape directory");
                walk(dir, &mut files);
            }
        }
    }

    Ok(files.into_iter().collect())
}

fn walk(dir: &Path, files: &mut IndexSet<PathBuf>) {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && has_extension(entry.path()) => {
                files.insert(canonical(entry.path()));
            }
            Ok(_) => {}
            Err(err) => {
                debug!(path = dir.display().to_string(), err:% = err; "Skipping unreadable entry");
            }
        }
    }
}

fn has_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HarvestedCell {
    style: String,
    edge: bool,
}

fn harvest_file(path: &Path) -> Result<Vec<HarvestedCell>, String> {
    let bytes = fs::read(path).map_err(|err| err.to_string())?;
    let text = String::from_utf8_lossy(&bytes);
    extract_cells(&text).map_err(|err| err.to_string())
}

/// Styled cells of one XML document, including cells of `<mxlibrary>` entries.
fn extract_cells(xml: &str) -> Result<Vec<HarvestedCell>, roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut cells = Vec::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "mxCell" => {
                let style = node.attribute("style").map(str::trim).unwrap_or_default();
                if !style.is_empty() {
                    cells.push(HarvestedCell {
                        style: style.to_string(),
                        edge: node.attribute("edge") == Some("1"),
                    });
                }
            }
            "mxlibrary" => {
                if let Some(text) = node.text() {
                    cells.extend(library_cells(text));
                }
            }
            "diagram" if !node.children().any(|c| c.is_element()) => {
                // Compressed pages are base64 deflate and carry no readable cells.
                debug!("Skipping compressed diagram page");
            }
            _ => {}
        }
    }

    Ok(cells)
}

fn library_cells(json: &str) -> Vec<HarvestedCell> {
    let entries: Vec<Value> = match serde_json::from_str(json.trim()) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(err:% = err; "Skipping malformed mxlibrary");
            return Vec::new();
        }
    };

    entries
        .iter()
        .filter_map(|entry| entry.get("xml")?.as_str())
        .filter(|xml| xml.trim_start().starts_with('<'))
        .flat_map(|xml| {
            extract_cells(xml).unwrap_or_else(|err| {
                debug!(err:% = err; "Skipping unreadable mxlibrary entry");
                Vec::new()
            })
        })
        .collect()
}

/// Readable key for `style`.
///
/// Vertices are named after their shape (`shape=mxgraph.er.entity` becomes
/// `er.entity`, `shape=cylinder3` or a bare `ellipse` token becomes
/// `shape.cylinder3` / `shape.ellipse`); edges after their edge style or arrow.
fn guess_key(style: &StyleString, edge: bool) -> String {
    let key = if edge {
        if let Some(edge_style) = style.get("edgeStyle").filter(|s| !s.is_empty()) {
            format!("edge.{}", edge_style.trim_end_matches("EdgeStyle"))
        } else if let Some(arrow) = ["endArrow", "startArrow"]
            .iter()
            .find_map(|key| style.get(key).filter(|s| !s.is_empty()))
        {
            format!("edge.{arrow}")
        } else {
            "edge.orthogonal".to_string()
        }
    } else if let Some(shape) = style.get("shape").filter(|s| !s.is_empty()) {
        match shape.strip_prefix("mxgraph.") {
            Some(stencil) => stencil.to_string(),
            None => format!("shape.{shape}"),
        }
    } else if let Some(token) = BARE_SHAPES.iter().find(|token| style.get(token) == Some("")) {
        format!("shape.{token}")
    } else {
        "shape.rect".to_string()
    };
    sanitize_key(&key)
}

/// Bare style names that select a shape.
const BARE_SHAPES: [&str; 8] = [
    "ellipse", "rhombus", "swimlane", "triangle", "line", "text", "image", "label",
];

/// Lowercase `key`, replacing every run of characters outside `[a-z0-9_.-]`
/// with a single `-`.
fn sanitize_key(key: &str) -> String {
    let mut sanitized = String::with_capacity(key.len());
    for c in key.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-') {
            if !(c == '-' && sanitized.ends_with('-')) {
                sanitized.push(c);
            }
        } else if !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }

    let sanitized = sanitized.trim_matches('-');
    if sanitized.is_empty() {
        "style".to_string()
    } else {
        sanitized.to_string()
    }
}

/// Deduplicating style table under construction.
#[derive(Debug, Default)]
struct StyleCollector {
    styles: IndexMap<String, String>,
    by_canonical: HashMap<String, String>,
}

impl StyleCollector {
    /// Adds `raw` under `base_key`, or under `base_key-N` when the key is
    /// taken. Returns the key the style is stored under.
    fn insert(&mut self, base_key: &str, raw: &str, parsed: &StyleString) -> String {
        let canonical = parsed.canonical();
        if !self.by_canonical.contains_key(&canonical) {
            let key = (0..)
                .map(|n| match n {
                    0 => base_key.to_string(),
                    n => format!("{base_key}-{n}"),
                })
                .find(|key| !self.styles.contains_key(key))
                .unwrap_or_else(|| base_key.to_string());
            if key != base_key {
                debug!(key = base_key, stored_as:% = key; "Style key collision");
            }
            self.styles.insert(key.clone(), raw.to_string());
            self.by_canonical.insert(canonical.clone(), key);
        }
        self.by_canonical
            .get(&canonical)
            .cloned()
            .unwrap_or_else(|| base_key.to_string())
    }

    fn into_styles(self) -> IndexMap<String, String> {
        self.styles
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn key(style: &str, edge: bool) -> String {
        guess_key(&StyleString::parse(style), edge)
    }

    #[test]
    fn test_guess_vertex_keys() {
        assert_eq!(key("shape=mxgraph.er.entity;whiteSpace=wrap;", false), "er.entity");
        assert_eq!(key("shape=cylinder3;size=15;", false), "shape.cylinder3");
        assert_eq!(key("ellipse;whiteSpace=wrap;html=1;", false), "shape.ellipse");
        assert_eq!(key("rounded=1;fillColor=#fff;", false), "shape.rect");
        assert_eq!(key("shape=mxgraph.aws4.Lambda Function;", false), "aws4.lambda-function");
    }

    #[test]
    fn test_guess_edge_keys() {
        assert_eq!(
            key("edgeStyle=entityRelationEdgeStyle;endArrow=ERmany;", true),
            "edge.entityrelation"
        );
        assert_eq!(key("endArrow=block;dashed=1;", true), "edge.block");
        assert_eq!(key("startArrow=diamond;", true), "edge.diamond");
        assert_eq!(key("rounded=0;", true), "edge.orthogonal");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("  UML Class  "), "uml-class");
        assert_eq!(sanitize_key("a//b__c"), "a-b__c");
        assert_eq!(sanitize_key("---"), "style");
        assert_eq!(sanitize_key("ÁRVORE"), "rvore");
    }

    #[test]
    fn test_collector_dedupes_and_disambiguates() {
        let mut collector = StyleCollector::default();
        let a = "rounded=1;fillColor=#fff;";
        let a_reordered = "fillColor=#fff;rounded=1;";
        let b = "rounded=0;";
        let c = "rounded=1;dashed=1;";

        assert_eq!(collector.insert("shape.rect", a, &StyleString::parse(a)), "shape.rect");
        assert_eq!(
            collector.insert("shape.rect", a_reordered, &StyleString::parse(a_reordered)),
            "shape.rect"
        );
        assert_eq!(collector.insert("shape.rect", b, &StyleString::parse(b)), "shape.rect-1");
        assert_eq!(collector.insert("shape.rect", c, &StyleString::parse(c)), "shape.rect-2");

        let styles = collector.into_styles();
        assert_eq!(styles.len(), 3);
        assert_eq!(styles["shape.rect"], a);
    }

    #[test]
    fn test_extract_cells() {
        let xml = r#"<mxfile><diagram id="p"><mxGraphModel><root>
            <mxCell id="0"/>
            <mxCell id="1" parent="0"/>
            <mxCell id="2" style="ellipse;fillColor=#dae8fc;" vertex="1" parent="1"/>
            <mxCell id="3" style="endArrow=open;" edge="1" parent="1"/>
            <object id="4"><mxCell style="shape=cylinder3;" vertex="1" parent="1"/></object>
        </root></mxGraphModel></diagram></mxfile>"#;

        let cells = extract_cells(xml).unwrap();
        assert_eq!(cells.len(), 3);
        assert!(!cells[0].edge);
        assert!(cells[1].edge);
        assert_eq!(cells[2].style, "shape=cylinder3;");
    }

    #[test]
    fn test_extract_library_cells() {
        let xml = r#"<mxlibrary>[{"xml":"&lt;mxGraphModel&gt;&lt;root&gt;&lt;mxCell id=\"0\"/&gt;&lt;mxCell id=\"2\" style=\"shape=mxgraph.er.entity;\" vertex=\"1\"/&gt;&lt;/root&gt;&lt;/mxGraphModel&gt;","w":100,"h":40},{"xml":"7ZRNb4MwDIZ/","w":10}]</mxlibrary>"#;

        let cells = extract_cells(xml).unwrap();
        assert_eq!(
            cells,
            vec![HarvestedCell {
                style: "shape=mxgraph.er.entity;".to_string(),
                edge: false,
            }]
        );
    }

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.drawio"), "<mxfile/>").unwrap();
        fs::write(nested.join("b.XML"), "<mxlibrary>[]</mxlibrary>").unwrap();
        fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let files = collect_files(&[dir.path().to_path_buf(), dir.path().join("a.drawio")]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.drawio"), "<mxfile/>").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("a.drawio"), dir.path().join("link.drawio"))
            .unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.drawio"));
    }

    #[test]
    fn test_collect_files_prefers_app_shape_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let shapes = dir.path().join("resources/shapes");
        fs::create_dir_all(&shapes).unwrap();
        fs::write(shapes.join("er.xml"), "<mxfile/>").unwrap();
        fs::write(dir.path().join("package.xml"), "<package/>").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("er.xml"));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_files(&[dir.path().join("absent")]).unwrap_err();
        assert!(matches!(err, MxweaveError::Io(_)));
    }

    #[test]
    fn test_run_writes_table_and_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.drawio"),
            r#"<mxfile><diagram><mxGraphModel><root>
                <mxCell id="2" style="shape=mxgraph.er.entity;" vertex="1"/>
                <mxCell id="3" style="edgeStyle=orthogonalEdgeStyle;" edge="1"/>
            </root></mxGraphModel></diagram></mxfile>"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.xml"), "<mxfile><unclosed>").unwrap();
        let out = dir.path().join("styles.json");

        let report = run(&HarvestArgs {
            inputs: vec![dir.path().to_path_buf()],
            styles_out: out.clone(),
            print_summary: false,
            force_write: false,
        })
        .unwrap();

        assert_eq!(report.files(), 2);
        assert_eq!(report.files_with_styles(), 1);
        assert_eq!(report.cells(), 2);

        let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written["er.entity"], "shape=mxgraph.er.entity;");
        assert_eq!(written["edge.orthogonal"], "edgeStyle=orthogonalEdgeStyle;");
    }

    #[test]
    fn test_zero_styles_requires_force_write() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.drawio"), "<mxfile/>").unwrap();
        let out = dir.path().join("styles.json");
        let mut args = HarvestArgs {
            inputs: vec![dir.path().join("empty.drawio")],
            styles_out: out.clone(),
            print_summary: false,
            force_write: false,
        };

        assert!(matches!(run(&args), Err(MxweaveError::StyleTable(_))));
        assert!(!out.exists());

        args.force_write = true;
        let report = run(&args).unwrap();
        assert!(report.styles().is_empty());
        assert_eq!(fs::read_to_string(&out).unwrap(), "{}");
    }
}
