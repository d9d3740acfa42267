//! Command-line argument definitions for the mxweave CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. The `compile` subcommand turns a JSON specification into a
//! draw.io file; `harvest` builds a style table from existing draw.io files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mxweave::{
    spec::{Direction, ModeSelection},
    style::{StyleClass, StyleOverrides},
};

/// Command-line arguments for the mxweave diagram compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a JSON diagram specification into a draw.io file
    Compile(CompileArgs),
    /// Collect named styles from draw.io files into a style table
    Harvest(HarvestArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct CompileArgs {
    /// Path to the JSON specification, or `-` for standard input
    pub input: String,

    /// Diagram mode (auto, er, class, sequence, state, activity, usecase, generic)
    #[arg(long, default_value = "auto")]
    pub mode: ModeSelection,

    /// Flow direction (TD or LR); overrides the specification
    #[arg(long)]
    pub direction: Option<Direction>,

    /// Base name of the output file
    #[arg(long, default_value = "diagram")]
    pub out: String,

    /// Directory the output file is written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Do not append a content hash to the file name
    #[arg(long)]
    pub no_hash: bool,

    /// Path to the JSON style table
    #[arg(long)]
    pub styles: Option<PathBuf>,

    #[command(flatten)]
    pub style_overrides: StyleOverrideArgs,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Per-element-class styles: a style table key or a literal style string.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StyleOverrideArgs {
    /// Style for ER entities
    #[arg(long = "style-er-entity")]
    pub er_entity: Option<String>,

    /// Style for ER relationships
    #[arg(long = "style-er-edge")]
    pub er_edge: Option<String>,

    /// Style for classes
    #[arg(long = "style-class")]
    pub class: Option<String>,

    /// Style for class relations
    #[arg(long = "style-class-edge")]
    pub class_edge: Option<String>,

    /// Style for actors
    #[arg(long = "style-actor")]
    pub actor: Option<String>,

    /// Style for use cases
    #[arg(long = "style-usecase")]
    pub usecase: Option<String>,

    /// Style for any other node
    #[arg(long = "style-vertex")]
    pub vertex: Option<String>,

    /// Style for any other edge
    #[arg(long = "style-edge")]
    pub edge: Option<String>,
}

impl StyleOverrideArgs {
    /// Layers the flags that were given over `overrides`.
    pub fn apply(&self, overrides: StyleOverrides) -> StyleOverrides {
        [
            (StyleClass::ErEntity, &self.er_entity),
            (StyleClass::ErEdge, &self.er_edge),
            (StyleClass::Class, &self.class),
            (StyleClass::ClassEdge, &self.class_edge),
            (StyleClass::Actor, &self.actor),
            (StyleClass::Usecase, &self.usecase),
            (StyleClass::Vertex, &self.vertex),
            (StyleClass::Edge, &self.edge),
        ]
        .into_iter()
        .fold(overrides, |overrides, (class, value)| {
            overrides.with(class, value.clone())
        })
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct HarvestArgs {
    /// draw.io files, libraries or directories to scan
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path of the style table to write
    #[arg(long, default_value = "styles.json")]
    pub styles_out: PathBuf,

    /// Print a summary of the harvested styles
    #[arg(long)]
    pub print_summary: bool,

    /// Write the style table even when no style was found
    #[arg(long)]
    pub force_write: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use mxweave::spec::Mode;

    use super::*;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_compile() {
        let args = Args::parse_from([
            "mxweave",
            "compile",
            "spec.json",
            "--mode",
            "er",
            "--direction",
            "LR",
            "--no-hash",
            "--style-er-entity",
            "shape=table;",
        ]);
        let Command::Compile(compile) = args.command else {
            panic!("expected compile");
        };
        assert_eq!(compile.mode, ModeSelection::Explicit(Mode::Er));
        assert_eq!(compile.direction, Some(Direction::LeftRight));
        assert!(compile.no_hash);
        assert_eq!(compile.out, "diagram");

        let overrides = compile.style_overrides.apply(StyleOverrides::default());
        assert_eq!(overrides.get(StyleClass::ErEntity), Some("shape=table;"));
        assert_eq!(overrides.get(StyleClass::Edge), None);
    }

    #[test]
    fn test_flags_layer_over_config() {
        let config = StyleOverrides::default()
            .with(StyleClass::Actor, Some("uml.actor".to_string()))
            .with(StyleClass::Edge, Some("edge.dashed".to_string()));
        let flags = StyleOverrideArgs {
            edge: Some("edge.orthogonal".to_string()),
            ..StyleOverrideArgs::default()
        };

        let merged = flags.apply(config);
        assert_eq!(merged.get(StyleClass::Actor), Some("uml.actor"));
        assert_eq!(merged.get(StyleClass::Edge), Some("edge.orthogonal"));
    }

    #[test]
    fn test_parse_harvest() {
        let args = Args::parse_from(["mxweave", "harvest", "a.drawio", "shapes/", "--force-write"]);
        let Command::Harvest(harvest) = args.command else {
            panic!("expected harvest");
        };
        assert_eq!(harvest.inputs.len(), 2);
        assert!(harvest.force_write);
        assert_eq!(harvest.styles_out, PathBuf::from("styles.json"));
    }
}
