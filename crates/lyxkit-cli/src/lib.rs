//! lyxkit CLI library
//!
//! This module contains the core CLI logic for the lyxkit document tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fmt::Write as _, fs, path::Path};

use log::{info, warn};

use lyxkit::{
    Document, DocumentBuilder, LyxError, NodeId, Parsed,
    config::AppConfig,
    io,
};

use error_adapter::{render, warning_reportables};

/// Run the lyxkit CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `LyxError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Serialization errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), LyxError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Check { input, tree } => check(app_config, input, *tree),
        Command::Format { input, output } => format(app_config, input, output.as_deref()),
        Command::Html {
            input,
            output,
            css_files,
            js_files,
            keep_data,
        } => {
            let html = app_config.html();
            let html = html
                .clone()
                .with_css_files([html.css_files(), css_files.as_slice()].concat())
                .with_js_files([html.js_files(), js_files.as_slice()].concat(), html.js_in_head())
                .with_keep_data(html.keep_data() || *keep_data);
            let app_config = AppConfig::new(app_config.parser().clone(), html);
            render_html(app_config, input, output.as_deref())
        }
        Command::Replace {
            input,
            find,
            replace,
        } => {
            let changed =
                io::transform_lines(Path::new(input), |line| line.replace(find.as_str(), replace))?;
            if changed {
                info!(input_path = input; "Document updated");
            } else {
                info!(input_path = input; "Nothing to replace");
            }
            Ok(())
        }
    }
}

fn parse(builder: &DocumentBuilder, input: &str) -> Result<(String, Parsed), LyxError> {
    let source = fs::read_to_string(input)?;
    let parsed = builder.parse(&source)?;
    for report in render(&warning_reportables(parsed.warnings(), &source)) {
        warn!("{report}");
    }
    Ok((source, parsed))
}

fn check(config: AppConfig, input: &str, tree: bool) -> Result<(), LyxError> {
    info!(input_path = input; "Checking document");
    let builder = DocumentBuilder::new(config);
    let (_, parsed) = parse(&builder, input)?;

    if tree {
        print!("{}", outline(parsed.document()));
    }
    println!("{input}: {} warning(s)", parsed.warnings().len());
    Ok(())
}

fn format(config: AppConfig, input: &str, output: Option<&str>) -> Result<(), LyxError> {
    let builder = DocumentBuilder::new(config);
    let (source, parsed) = parse(&builder, input)?;
    let text = builder.serialize(parsed.document())?;

    let output = output.unwrap_or(input);
    if output == input && text == source {
        info!(input_path = input; "Document already formatted");
        return Ok(());
    }
    io::write_document(Path::new(output), &text)?;
    info!(output_file = output; "Document written");
    Ok(())
}

fn render_html(config: AppConfig, input: &str, output: Option<&str>) -> Result<(), LyxError> {
    let builder = DocumentBuilder::new(config);
    let (_, parsed) = parse(&builder, input)?;
    let page = builder.render_html(parsed.document())?;

    let output = match output {
        Some(output) => Path::new(output).to_path_buf(),
        None => io::correct_name(Path::new(input), "html"),
    };
    io::write_document(&output, &page)?;
    info!(output_file = output.display().to_string(); "HTML exported successfully");
    Ok(())
}

/// One line per node, indented by depth.
pub fn outline(document: &Document) -> String {
    let mut out = String::new();
    let tree = document.tree();
    for &child in tree.children(document.root()) {
        write_node(&mut out, document, child, 0);
    }
    out
}

fn write_node(out: &mut String, document: &Document, id: NodeId, depth: usize) {
    let node = document.node(id);
    let _ = writeln!(out, "{:indent$}{}", "", node.describe(), indent = depth * 2);
    for &child in node.children() {
        write_node(out, document, child, depth + 1);
    }
}
