//! Configuration types for lyxkit.
//!
//! This module provides the configuration structures that control parsing
//! and HTML rendering. All types implement [`serde::Deserialize`] so they can
//! be loaded from a configuration file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining parser and HTML settings.
//! - [`ParserConfig`] - Bounds applied while parsing.
//! - [`HtmlConfig`] - Assets and features of the rendered page.
//!
//! # Example
//!
//! ```
//! # use lyxkit::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.parser().max_depth(), 4096);
//! assert!(config.html().mathjax());
//! ```

use serde::Deserialize;

use lyxkit_parser::{DEFAULT_MAX_DEPTH, ParseConfig};

/// Top-level configuration combining parser and HTML settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parser configuration section.
    #[serde(default)]
    parser: ParserConfig,

    /// HTML rendering configuration section.
    #[serde(default)]
    html: HtmlConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `parser` - Bounds applied while parsing.
    /// * `html` - Options of the HTML renderer.
    pub fn new(parser: ParserConfig, html: HtmlConfig) -> Self {
        Self { parser, html }
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }

    /// Returns the HTML configuration.
    pub fn html(&self) -> &HtmlConfig {
        &self.html
    }
}

/// Bounds applied while parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Maximum depth of the branch stack.
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The parser-level configuration.
    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig::new(self.max_depth)
    }
}

/// Options of the HTML renderer.
///
/// Stylesheets and scripts are linked, never inlined. Scripts go to the end
/// of the body unless `js_in_head` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    #[serde(default)]
    css_files: Vec<String>,

    #[serde(default)]
    js_files: Vec<String>,

    #[serde(default)]
    js_in_head: bool,

    /// Mirror the original object attributes as `data-*` attributes.
    #[serde(default)]
    keep_data: bool,

    #[serde(default = "enabled")]
    mathjax: bool,

    /// Expand `CommandInset toc` into a table of contents.
    #[serde(default = "enabled")]
    toc: bool,

    /// Prefix numbered headings with their section number.
    #[serde(default = "enabled")]
    numbering: bool,
}

fn enabled() -> bool {
    true
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            css_files: Vec::new(),
            js_files: Vec::new(),
            js_in_head: false,
            keep_data: false,
            mathjax: true,
            toc: true,
            numbering: true,
        }
    }
}

impl HtmlConfig {
    pub fn css_files(&self) -> &[String] {
        &self.css_files
    }

    pub fn js_files(&self) -> &[String] {
        &self.js_files
    }

    pub fn js_in_head(&self) -> bool {
        self.js_in_head
    }

    pub fn keep_data(&self) -> bool {
        self.keep_data
    }

    pub fn mathjax(&self) -> bool {
        self.mathjax
    }

    pub fn toc(&self) -> bool {
        self.toc
    }

    pub fn numbering(&self) -> bool {
        self.numbering
    }

    pub fn with_css_files(mut self, files: Vec<String>) -> Self {
        self.css_files = files;
        self
    }

    pub fn with_js_files(mut self, files: Vec<String>, in_head: bool) -> Self {
        self.js_files = files;
        self.js_in_head = in_head;
        self
    }

    pub fn with_keep_data(mut self, keep_data: bool) -> Self {
        self.keep_data = keep_data;
        self
    }

    pub fn with_mathjax(mut self, mathjax: bool) -> Self {
        self.mathjax = mathjax;
        self
    }

    pub fn with_toc(mut self, toc: bool) -> Self {
        self.toc = toc;
        self
    }

    pub fn with_numbering(mut self, numbering: bool) -> Self {
        self.numbering = numbering;
        self
    }
}
