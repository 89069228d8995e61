//! Grammar catalog: what every known object looks like.
//!
//! Objects are keyed by the `(command, category, details)` triple read from
//! their opening line. The catalog answers, for a triple, which class of
//! object it is, where it may nest ([`ObjectSpec::rank`]), how it is closed
//! ([`EndToken`]), which attribute lines it declares ([`FieldSpec`]) and
//! which HTML tag renders it.
//!
//! The standard table is built once and shared read-only:
//!
//! ```
//! use lyxkit_core::catalog::{Catalog, ObjectClass};
//!
//! let catalog = Catalog::standard();
//! let section = catalog.lookup("layout", "Section", "").unwrap();
//! assert_eq!(section.class(), ObjectClass::Layout);
//! assert!(section.is_heading());
//!
//! // Many insets only differ by details; a wildcard entry covers them.
//! let reference = catalog.lookup("inset", "CommandInset", "ref").unwrap();
//! assert!(reference.field("LatexCommand").is_some_and(|f| f.is_required()));
//! ```

mod standard;

use std::{collections::HashMap, fmt, sync::OnceLock};

/// Rank of the synthetic document root: accepts anything.
pub const PRIMARY_SENTINEL: i32 = -100;

/// Rank of objects that may nest anywhere their class allows.
pub const DEFAULT_RANK: i32 = 100;

/// Highest rank that still denotes a heading level.
pub const HEADING_MAX: i32 = 6;

/// Catalog key component matching any word.
pub const WILDCARD: &str = "*";

/// Broad classes of objects, each with its own nesting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// Document skeleton: `document`, `header`, `body`, `preamble`, ...
    Primary,
    /// A paragraph (`\begin_layout`), headings included.
    Layout,
    /// An inset (`\begin_inset`).
    Inset,
    /// A font toggle or single-line special (`\series bold`, `\backslash`).
    Design,
    /// A setting of the enclosing paragraph (`\align center`).
    ParagraphSetting,
    /// A document setting in the header (`\textclass article`).
    Setting,
    /// An element of an embedded table block (`<row>`, `<cell>`).
    Markup,
}

impl ObjectClass {
    /// How an opening marker of this class is written.
    pub fn form(self) -> Form {
        match self {
            ObjectClass::Primary | ObjectClass::Layout | ObjectClass::Inset => Form::Begin,
            ObjectClass::Design | ObjectClass::ParagraphSetting | ObjectClass::Setting => {
                Form::Bare
            }
            ObjectClass::Markup => Form::Tag,
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectClass::Primary => "primary",
            ObjectClass::Layout => "layout",
            ObjectClass::Inset => "inset",
            ObjectClass::Design => "design",
            ObjectClass::ParagraphSetting => "paragraph setting",
            ObjectClass::Setting => "setting",
            ObjectClass::Markup => "markup",
        };
        f.write_str(name)
    }
}

/// Shape of an opening marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// `\begin_<command> <category> <details>`
    Begin,
    /// `\<command> <value>`
    Bare,
    /// `<name attr="value">`
    Tag,
}

/// How an open object is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndToken {
    /// `\end_<command>` (or `</name>` for markup).
    Standard,
    /// `\<command> <word>`, e.g. `\series default`.
    Sentinel(&'static str),
    /// `\<command> <document language>`; used by `\lang`.
    DocumentLanguage,
    /// The object spans a single line and is never explicitly closed.
    None,
}

/// An attribute line an object declares, e.g. `status open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    name: &'static str,
    quoted: bool,
    required: bool,
}

impl FieldSpec {
    /// A field whose value is written verbatim.
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            quoted: false,
            required: false,
        }
    }

    /// A field whose value is written between double quotes.
    pub const fn quoted(name: &'static str) -> Self {
        Self {
            name,
            quoted: true,
            required: false,
        }
    }

    /// Marks the field as mandatory for serialization.
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Grammar metadata for one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpec {
    class: ObjectClass,
    rank: i32,
    tag: &'static str,
    group: Option<&'static str>,
    fields: &'static [FieldSpec],
    field_indent: &'static str,
    end_token: EndToken,
    verbatim: bool,
    inline_argument: bool,
    text_bearing: bool,
    table_bearing: bool,
    opaque: bool,
    body: bool,
    settings_scope: bool,
    plain: bool,
    cell: bool,
    embedded_root: bool,
    unnumbered: bool,
    theorem: bool,
}

impl ObjectSpec {
    /// A new entry with the class's usual end token and no flags.
    pub fn new(class: ObjectClass, rank: i32, tag: &'static str) -> Self {
        let end_token = match class {
            ObjectClass::Design => EndToken::Sentinel("default"),
            ObjectClass::ParagraphSetting | ObjectClass::Setting => EndToken::None,
            ObjectClass::Primary | ObjectClass::Layout | ObjectClass::Inset => EndToken::Standard,
            ObjectClass::Markup => EndToken::Standard,
        };
        Self {
            class,
            rank,
            tag,
            group: None,
            fields: &[],
            field_indent: "",
            end_token,
            verbatim: false,
            inline_argument: false,
            text_bearing: false,
            table_bearing: false,
            opaque: false,
            body: false,
            settings_scope: false,
            plain: false,
            cell: false,
            embedded_root: false,
            unnumbered: false,
            theorem: false,
        }
    }

    pub fn with_fields(mut self, fields: &'static [FieldSpec]) -> Self {
        self.fields = fields;
        self
    }

    /// Attribute lines of this object are prefixed with `indent`.
    pub fn with_field_indent(mut self, indent: &'static str) -> Self {
        self.field_indent = indent;
        self
    }

    pub fn with_end(mut self, end_token: EndToken) -> Self {
        self.end_token = end_token;
        self
    }

    /// Consecutive siblings of this object are rendered inside `group`.
    pub fn with_group(mut self, group: &'static str) -> Self {
        self.group = Some(group);
        self
    }

    /// Lines inside the object are raw text until its end marker.
    pub fn verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    /// Everything after the category on the opening line is one argument.
    pub fn inline_argument(mut self) -> Self {
        self.inline_argument = true;
        self
    }

    /// The inset holds running text (and therefore paragraphs).
    pub fn text_bearing(mut self) -> Self {
        self.text_bearing = true;
        self
    }

    /// The inset hosts an embedded table block.
    pub fn table_bearing(mut self) -> Self {
        self.table_bearing = true;
        self
    }

    /// The inset accepts any child.
    pub fn opaque(mut self) -> Self {
        self.opaque = true;
        self.text_bearing = true;
        self
    }

    pub(crate) fn body(mut self) -> Self {
        self.body = true;
        self
    }

    pub(crate) fn settings_scope(mut self) -> Self {
        self.settings_scope = true;
        self
    }

    pub(crate) fn plain(mut self) -> Self {
        self.plain = true;
        self
    }

    pub(crate) fn cell(mut self) -> Self {
        self.cell = true;
        self
    }

    pub(crate) fn embedded_root(mut self) -> Self {
        self.embedded_root = true;
        self
    }

    pub(crate) fn unnumbered(mut self) -> Self {
        self.unnumbered = true;
        self
    }

    pub(crate) fn theorem(mut self) -> Self {
        self.theorem = true;
        self
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    pub fn rank(&self) -> i32 {
        self.rank
    }

    /// HTML tag used when rendering the object.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// HTML tag wrapping a run of consecutive siblings, e.g. `ul`.
    pub fn group(&self) -> Option<&'static str> {
        self.group
    }

    /// Declared attribute lines, in serialization order.
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_indent(&self) -> &'static str {
        self.field_indent
    }

    pub fn end_token(&self) -> EndToken {
        self.end_token
    }

    /// Single-line objects are closed as soon as they are read.
    pub fn closes_immediately(&self) -> bool {
        self.end_token == EndToken::None
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    pub fn has_inline_argument(&self) -> bool {
        self.inline_argument
    }

    pub fn is_text_bearing(&self) -> bool {
        self.text_bearing
    }

    pub fn is_table_bearing(&self) -> bool {
        self.table_bearing
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// The document body: holds paragraphs only.
    pub fn is_body(&self) -> bool {
        self.body
    }

    /// Bare lines inside this object are document settings.
    pub fn is_settings_scope(&self) -> bool {
        self.settings_scope
    }

    /// The bare paragraph used inside insets (`Plain Layout`).
    pub fn is_plain(&self) -> bool {
        self.plain
    }

    /// A table cell: holds text insets only.
    pub fn is_cell(&self) -> bool {
        self.cell
    }

    /// The root element of an embedded block (`<lyxtabular>`).
    pub fn is_embedded_root(&self) -> bool {
        self.embedded_root
    }

    pub fn is_numbered(&self) -> bool {
        self.is_heading() && !self.unnumbered
    }

    /// A theorem-like paragraph that takes a number, e.g. `Lemma`.
    ///
    /// Starred variants and `Proof` are not numbered.
    pub fn is_numbered_theorem(&self) -> bool {
        self.theorem
    }

    pub fn is_heading(&self) -> bool {
        self.class == ObjectClass::Layout && (0..=HEADING_MAX).contains(&self.rank)
    }

    pub fn is_paragraph(&self) -> bool {
        self.class == ObjectClass::Layout
    }

    pub fn is_inset(&self) -> bool {
        self.class == ObjectClass::Inset
    }

    pub fn is_design(&self) -> bool {
        self.class == ObjectClass::Design
    }

    pub fn is_paragraph_setting(&self) -> bool {
        self.class == ObjectClass::ParagraphSetting
    }

    pub fn is_setting(&self) -> bool {
        self.class == ObjectClass::Setting
    }

    pub fn is_markup(&self) -> bool {
        self.class == ObjectClass::Markup
    }

    pub fn is_primary(&self) -> bool {
        self.class == ObjectClass::Primary
    }
}

#[derive(Debug, Default)]
struct CommandEntry {
    whole_category: bool,
    categories: HashMap<&'static str, HashMap<&'static str, ObjectSpec>>,
}

/// Immutable lookup table of known objects.
#[derive(Debug, Default)]
pub struct Catalog {
    commands: HashMap<&'static str, CommandEntry>,
    generic_setting: Option<ObjectSpec>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of LyX objects, built on first use.
    pub fn standard() -> &'static Catalog {
        static STANDARD: OnceLock<Catalog> = OnceLock::new();
        STANDARD.get_or_init(standard::build)
    }

    /// Registers `spec` under a key. `category` and `details` may be
    /// [`WILDCARD`].
    pub fn insert(
        &mut self,
        command: &'static str,
        category: &'static str,
        details: &'static str,
        spec: ObjectSpec,
    ) {
        self.commands
            .entry(command)
            .or_default()
            .categories
            .entry(category)
            .or_default()
            .insert(details, spec);
    }

    /// Declares that the whole remainder of `command`'s opening line is its
    /// category, as for `\begin_layout Plain Layout`.
    pub fn set_whole_category(&mut self, command: &'static str) {
        self.commands.entry(command).or_default().whole_category = true;
    }

    /// Spec used for header settings that have no entry of their own.
    pub fn set_generic_setting(&mut self, spec: ObjectSpec) {
        self.generic_setting = Some(spec);
    }

    pub fn whole_category(&self, command: &str) -> bool {
        self.commands
            .get(command)
            .is_some_and(|entry| entry.whole_category)
    }

    /// Looks a triple up, falling back to wildcard category and details.
    pub fn lookup(&self, command: &str, category: &str, details: &str) -> Option<&ObjectSpec> {
        let entry = self.commands.get(command)?;
        let details_table = entry
            .categories
            .get(category)
            .or_else(|| entry.categories.get(WILDCARD))?;
        details_table
            .get(details)
            .or_else(|| details_table.get(WILDCARD))
    }

    /// Spec of a bare line read inside the header.
    ///
    /// Settings with their own entry (block settings such as `\index`) keep
    /// it; everything else is a generic single-line setting.
    pub fn setting(&self, command: &str, category: &str) -> Option<ObjectSpec> {
        self.lookup(command, category, "")
            .filter(|spec| spec.is_setting())
            .copied()
            .or(self.generic_setting)
    }

    /// Spec of an embedded markup element.
    pub fn markup(&self, name: &str) -> Option<&ObjectSpec> {
        self.lookup(name, "", "").filter(|spec| spec.is_markup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact() {
        let catalog = Catalog::standard();
        let spec = catalog.lookup("layout", "Standard", "").unwrap();
        assert_eq!(spec.class(), ObjectClass::Layout);
        assert_eq!(spec.rank(), DEFAULT_RANK);
        assert!(!spec.is_heading());
    }

    #[test]
    fn test_lookup_wildcard_details() {
        let catalog = Catalog::standard();
        let note = catalog.lookup("inset", "Note", "Greyedout").unwrap();
        assert!(note.is_opaque());
        let float = catalog.lookup("inset", "Float", "algorithm").unwrap();
        assert!(float.is_text_bearing());
    }

    #[test]
    fn test_lookup_wildcard_category() {
        let catalog = Catalog::standard();
        let series = catalog.lookup("series", "bold", "").unwrap();
        assert!(series.is_design());
        assert_eq!(series.end_token(), EndToken::Sentinel("default"));
        let color = catalog.lookup("color", "red", "").unwrap();
        assert_eq!(color.end_token(), EndToken::Sentinel("inherit"));
        let lang = catalog.lookup("lang", "hebrew", "").unwrap();
        assert_eq!(lang.end_token(), EndToken::DocumentLanguage);
    }

    #[test]
    fn test_lookup_unknown() {
        let catalog = Catalog::standard();
        assert!(catalog.lookup("inset", "Hologram", "").is_none());
        assert!(catalog.lookup("nonsense", "", "").is_none());
    }

    #[test]
    fn test_heading_ranks() {
        let catalog = Catalog::standard();
        let ranks: Vec<i32> = [
            "Part",
            "Chapter",
            "Section",
            "Subsection",
            "Subsubsection",
            "Paragraph",
            "Subparagraph",
        ]
        .iter()
        .map(|name| catalog.lookup("layout", name, "").unwrap().rank())
        .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6]);

        let starred = catalog.lookup("layout", "Section*", "").unwrap();
        assert!(starred.is_heading());
        assert!(!starred.is_numbered());
    }

    #[test]
    fn test_numbered_theorems() {
        let catalog = Catalog::standard();
        let numbered = |name: &str| {
            catalog
                .lookup("layout", name, "")
                .unwrap()
                .is_numbered_theorem()
        };
        assert!(numbered("Theorem"));
        assert!(numbered("Lemma"));
        assert!(!numbered("Theorem*"));
        assert!(!numbered("Proof"));
        assert!(!numbered("Standard"));
        assert!(!numbered("Section"));
    }

    #[test]
    fn test_formula_is_verbatim_with_inline_argument() {
        let formula = Catalog::standard().lookup("inset", "Formula", "").unwrap();
        assert!(formula.is_verbatim());
        assert!(formula.has_inline_argument());
    }

    #[test]
    fn test_whole_category() {
        let catalog = Catalog::standard();
        assert!(catalog.whole_category("layout"));
        assert!(!catalog.whole_category("inset"));
        assert!(catalog.lookup("layout", "Plain Layout", "").unwrap().is_plain());
    }

    #[test]
    fn test_settings() {
        let catalog = Catalog::standard();
        let textclass = catalog.setting("textclass", "article").unwrap();
        assert!(textclass.closes_immediately());
        let index = catalog.setting("index", "Index").unwrap();
        assert_eq!(index.end_token(), EndToken::Standard);
    }

    #[test]
    fn test_markup() {
        let catalog = Catalog::standard();
        assert!(catalog.markup("lyxtabular").unwrap().is_embedded_root());
        assert!(catalog.markup("cell").unwrap().is_cell());
        assert!(catalog.markup("features").unwrap().closes_immediately());
        assert!(catalog.markup("layout").is_none());
    }

    #[test]
    fn test_class_forms() {
        assert_eq!(ObjectClass::Inset.form(), Form::Begin);
        assert_eq!(ObjectClass::Design.form(), Form::Bare);
        assert_eq!(ObjectClass::Markup.form(), Form::Tag);
    }
}
