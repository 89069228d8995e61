//! Command-line argument definitions for the lyxkit CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global options select the configuration file and logging
//! verbosity; each [`Command`] carries its own input and output paths.

use clap::{Parser, Subcommand};

/// Command-line arguments for the lyxkit document tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a document and report its warnings
    Check {
        /// Path to the input LyX file
        input: String,

        /// Print the parsed tree
        #[arg(long)]
        tree: bool,
    },

    /// Rewrite a document in canonical form
    Format {
        /// Path to the input LyX file
        input: String,

        /// Write here instead of replacing the input
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render a document as an HTML page
    Html {
        /// Path to the input LyX file
        input: String,

        /// Path to the output HTML file [default: input with `.html`]
        #[arg(short, long)]
        output: Option<String>,

        /// Stylesheet to link, in addition to the configured ones
        #[arg(long = "css")]
        css_files: Vec<String>,

        /// Script to load, in addition to the configured ones
        #[arg(long = "js")]
        js_files: Vec<String>,

        /// Keep the original object attributes as `data-*` attributes
        #[arg(long)]
        keep_data: bool,
    },

    /// Replace text in every line of a document, in place
    Replace {
        /// Path to the LyX file to edit
        input: String,

        /// Text to look for
        find: String,

        /// Replacement text
        replace: String,
    },
}
