//! Library surface of the `mxweave` command-line tool.

pub mod error_adapter;
pub mod harvest;

mod args;
mod config;
mod span;

pub use args::{Args, Command, CompileArgs, HarvestArgs, StyleOverrideArgs};

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use log::{debug, info};

use mxweave::{DiagramBuilder, MxweaveError};

/// Run the subcommand selected by `args`.
///
/// `compile` prints the written path; `harvest` prints a one-line JSON
/// summary and, when asked, the first harvested styles.
///
/// # Errors
///
/// Returns any error of [`compile`] or [`harvest::run`].
pub fn run(args: &Args) -> Result<(), MxweaveError> {
    match &args.command {
        Command::Compile(compile_args) => {
            let path = compile(compile_args)?;
            println!("{}", path.display());
        }
        Command::Harvest(harvest_args) => {
            let report = harvest::run(harvest_args)?;
            print_harvest_summary(harvest_args, &report);
        }
    }
    Ok(())
}

/// Compile the input named by `args` and write the draw.io file.
///
/// Flags override the configuration file, which overrides the defaults.
///
/// # Errors
///
/// Returns `MxweaveError` if the configuration, the style table or the input
/// cannot be read, the input is invalid, or the output cannot be written.
pub fn compile(args: &CompileArgs) -> Result<PathBuf, MxweaveError> {
    info!(input = args.input.as_str(), mode = args.mode.to_string(); "Compiling diagram");

    let app_config = config::load_config(args.config.as_ref())?;
    let style = app_config
        .style()
        .clone()
        .with_styles(args.styles.clone())
        .with_overrides(
            args.style_overrides
                .apply(app_config.style().overrides().clone()),
        );
    let output = app_config.output().clone().with_hash(app_config.output().hash() && !args.no_hash);
    let app_config = app_config.with_style(style).with_output(output);
    debug!(config:? = app_config; "Effective configuration");

    let source = read_input(&args.input)?;
    let builder = DiagramBuilder::new(app_config).with_configured_styles()?;
    let document = builder.compile(&source, args.mode, args.direction)?;
    builder.write(&document, &args.out_dir, &args.out)
}

fn read_input(input: &str) -> Result<String, MxweaveError> {
    if input == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn print_harvest_summary(args: &HarvestArgs, report: &harvest::HarvestReport) {
    if args.print_summary {
        println!(
            "files: {} | files with styles: {} | cells: {} | unique styles: {}",
            report.files(),
            report.files_with_styles(),
            report.cells(),
            report.styles().len()
        );
        for (key, style) in report.styles().iter().take(20) {
            let snippet: String = style.chars().take(120).collect();
            let ellipsis = if snippet.len() < style.len() { "..." } else { "" };
            println!("- {key}: {snippet}{ellipsis}");
        }
    }

    println!(
        "{}",
        serde_json::json!({
            "styles_json": args.styles_out.display().to_string(),
            "styles_count": report.styles().len(),
        })
    );
}
