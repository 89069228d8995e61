//! Scenario tests for the structural parser.
//!
//! Every successful parse is also re-checked with
//! [`lyxkit_core::nesting::validate`], so each scenario doubles as a
//! nesting-invariant test.

use lyxkit_core::{Document, NodeId, nesting::validate};

use crate::{ErrorCode, ParseConfig, ParseError, Parsed, parse};

/// Parses `source` and asserts the result is nesting-valid.
fn parse_ok(source: &str) -> Parsed {
    let parsed = match parse(source, &ParseConfig::default()) {
        Ok(parsed) => parsed,
        Err(err) => panic!("Expected parsing to succeed, but got error: {err}"),
    };
    if let Err(rejection) = validate(parsed.document().tree()) {
        panic!("Parsed tree violates nesting: {rejection}");
    }
    parsed
}

fn parse_err_with(source: &str, config: &ParseConfig) -> ParseError {
    match parse(source, config) {
        Ok(_) => panic!("Expected parsing to fail, but it succeeded"),
        Err(err) => err,
    }
}

fn fatal_code(source: &str) -> Option<ErrorCode> {
    let err = parse_err_with(source, &ParseConfig::default());
    err.fatal().and_then(|fatal| fatal.code())
}

fn warning_codes(parsed: &Parsed) -> Vec<ErrorCode> {
    parsed
        .warnings()
        .iter()
        .filter_map(|warning| warning.code())
        .collect()
}

/// One line per node below the root, indented by depth.
fn outline(document: &Document) -> Vec<String> {
    let tree = document.tree();
    tree.descendants(document.root())
        .skip(1)
        .map(|id| {
            let depth = tree.ancestors(id).count() - 1;
            format!("{}{}", "  ".repeat(depth), tree.node(id).describe())
        })
        .collect()
}

/// First node, in document order, whose description is `described`.
fn find(document: &Document, described: &str) -> NodeId {
    let tree = document.tree();
    tree.descendants(document.root())
        .find(|&id| tree.node(id).describe() == described)
        .unwrap_or_else(|| panic!("no `{described}` in the tree"))
}

fn lines(content: &lyxkit_core::Content) -> Vec<&str> {
    content.lines().iter().map(String::as_str).collect()
}

#[cfg(test)]
mod structure_tests {
    use super::*;

    #[test]
    fn test_paragraph_with_text_inset() {
        let source = "\\begin_layout Standard
Hello
\\begin_inset Text
\\begin_layout Plain Layout
inner
\\end_layout
\\end_inset
world
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();

        assert_eq!(
            outline(document),
            vec![
                "layout Standard",
                "  inset Text",
                "    layout Plain Layout",
            ]
        );

        let standard = document.node(find(document, "layout Standard"));
        assert_eq!(lines(standard.text()), vec!["Hello"]);
        assert!(standard.closed_by_marker());

        let text = document.node(find(document, "inset Text"));
        assert!(text.text().is_empty());
        assert_eq!(lines(text.tail()), vec!["world"]);

        let plain = document.node(find(document, "layout Plain Layout"));
        assert_eq!(lines(plain.text()), vec!["inner"]);
        assert!(parsed.warnings().is_empty());
    }

    #[test]
    fn test_sections_group_by_rank() {
        let source = "\\begin_layout Section
Intro
\\end_layout
\\begin_layout Standard
A
\\end_layout
\\begin_layout Subsection
Detail
\\end_layout
\\begin_layout Standard
B
\\end_layout
\\begin_layout Section
Next
\\end_layout
";
        let parsed = parse_ok(source);

        assert_eq!(
            outline(parsed.document()),
            vec![
                "section (rank 2)",
                "  layout Section",
                "  layout Standard",
                "  section (rank 3)",
                "    layout Subsection",
                "    layout Standard",
                "section (rank 2)",
                "  layout Section",
            ]
        );
    }

    #[test]
    fn test_every_node_is_closed_after_parse() {
        let source = "\\begin_layout Standard
\\begin_inset Foot
status open

\\begin_layout Plain Layout
note
\\end_layout

\\end_inset

\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();

        assert!(
            tree.descendants(document.root())
                .all(|id| !tree.node(id).is_open())
        );
        let foot = document.node(find(document, "inset Foot"));
        assert_eq!(foot.attribute("status"), Some("open"));
        assert_eq!(lines(foot.text()), vec![""]);
    }

    #[test]
    fn test_document_skeleton_and_settings() {
        let source = "#LyX 2.3 created this file. For more info see http://www.lyx.org/
\\lyxformat 544
\\begin_document
\\begin_header
\\textclass article
\\language hebrew
\\index Index
\\shortcut idx
\\color #008000
\\end_index
\\end_header

\\begin_body

\\begin_layout Standard
\\lang english
Hello
\\lang hebrew
\\end_layout

\\end_body
\\end_document
";
        let parsed = parse_ok(source);
        let document = parsed.document();

        assert!(parsed.warnings().is_empty());
        assert_eq!(document.format(), Some(544));
        assert_eq!(document.setting("textclass").as_deref(), Some("article"));
        assert_eq!(document.language(), "hebrew");
        assert_eq!(
            lines(document.node(document.root()).text()),
            vec!["#LyX 2.3 created this file. For more info see http://www.lyx.org/"]
        );

        let index = find(document, "index Index");
        let settings: Vec<String> = document
            .tree()
            .children(index)
            .iter()
            .map(|&id| document.node(id).describe())
            .collect();
        assert_eq!(settings, vec!["shortcut idx", "color #008000"]);
        assert!(document.node(index).closed_by_marker());

        let lang = document.node(find(document, "lang english"));
        assert_eq!(lines(lang.text()), vec!["Hello"]);
        assert!(lang.closed_by_marker());
        assert!(document.body().is_some());
    }

    #[test]
    fn test_command_inset_attributes() {
        let source = "\\begin_layout Standard
\\begin_inset CommandInset ref
LatexCommand ref
reference \"sec:intro\"

\\end_inset
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let reference = document.node(find(document, "inset CommandInset ref"));

        assert_eq!(reference.attribute("LatexCommand"), Some("ref"));
        assert_eq!(reference.attribute("reference"), Some("sec:intro"));
        assert_eq!(lines(reference.text()), vec![""]);
    }

    #[test]
    fn test_formula_is_verbatim() {
        let source = "\\begin_layout Standard
\\begin_inset Formula $x^2$
\\end_inset
\\begin_inset Formula \\begin{equation}
a
\\end{equation}
\\end_inset
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();
        let standard = find(document, "layout Standard");
        let formulas = tree.children(standard);

        assert_eq!(formulas.len(), 2);
        let inline = tree.node(formulas[0]);
        assert_eq!(inline.inline(), Some("$x^2$"));
        assert!(inline.text().is_empty());

        let display = tree.node(formulas[1]);
        assert_eq!(display.inline(), Some("\\begin{equation}"));
        assert_eq!(lines(display.text()), vec!["a", "\\end{equation}"]);
        assert!(display.children().is_empty());
    }

    #[test]
    fn test_formula_end_marker_with_trailing_space() {
        let source =
            "\\begin_layout Standard\n\\begin_inset Formula $x$\n\\end_inset \nafter\n\\end_layout\n";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();

        assert!(parsed.warnings().is_empty());
        let formula = document.node(find(document, "inset Formula"));
        assert!(formula.text().is_empty());
        assert!(formula.closed_by_marker());
        assert_eq!(lines(formula.tail()), vec!["after"]);
        let standard = find(document, "layout Standard");
        assert_eq!(tree.children(standard).len(), 1);
    }
}

#[cfg(test)]
mod design_tests {
    use super::*;

    #[test]
    fn test_interrupted_design_continues() {
        let source = "\\begin_layout Standard
\\series bold
\\shape italic
x
\\series default
y
\\shape default
z
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();

        assert_eq!(
            outline(document),
            vec![
                "layout Standard",
                "  series bold",
                "    shape italic",
                "  shape italic",
            ]
        );

        let standard = find(document, "layout Standard");
        let children = tree.children(standard);
        let series = tree.node(children[0]);
        assert!(series.closed_by_marker());

        let interrupted = tree.node(series.children()[0]);
        assert_eq!(lines(interrupted.text()), vec!["x"]);
        assert!(!interrupted.closed_by_marker());

        let continuation = tree.node(children[1]);
        assert!(!continuation.opened_by_marker());
        assert!(continuation.closed_by_marker());
        assert_eq!(lines(continuation.text()), vec!["y"]);
        assert_eq!(lines(continuation.tail()), vec!["z"]);
    }

    #[test]
    fn test_color_sentinel_closes() {
        let source = "\\begin_layout Standard
\\color red
warm
\\color inherit
cool
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let color = document.node(find(document, "color red"));

        assert!(color.closed_by_marker());
        assert_eq!(lines(color.text()), vec!["warm"]);
        assert_eq!(lines(color.tail()), vec!["cool"]);
    }
}

#[cfg(test)]
mod deeper_tests {
    use super::*;

    #[test]
    fn test_deeper_block_nests_in_previous_paragraph() {
        let source = "\\begin_layout Itemize
A
\\end_layout

\\begin_deeper
\\begin_layout Itemize
B
\\end_layout

\\end_deeper
\\begin_layout Itemize
C
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();

        assert_eq!(
            outline(document),
            vec!["layout Itemize", "  layout Itemize", "layout Itemize"]
        );

        let roots = tree.children(document.root());
        let a = tree.node(roots[0]);
        assert_eq!(lines(a.text()), vec!["A"]);
        assert_eq!(lines(a.gap()), vec![""]);
        assert!(a.tail().is_empty());

        let b = tree.node(a.children()[0]);
        assert_eq!(lines(b.text()), vec!["B"]);
        assert_eq!(lines(b.tail()), vec![""]);

        assert_eq!(lines(tree.node(roots[1]).text()), vec!["C"]);
        assert!(parsed.warnings().is_empty());
    }

    #[test]
    fn test_deeper_after_unknown_is_kept_in_tail() {
        let source = "\\begin_layout Standard
A
\\end_layout
\\foo
\\begin_deeper
\\begin_layout Standard
B
\\end_layout
\\end_deeper
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();
        let roots = tree.children(document.root());

        assert_eq!(roots.len(), 2);
        let unknown = tree.node(roots[1]);
        assert!(unknown.is_unknown());
        assert_eq!(
            lines(unknown.tail()),
            vec![
                "\\begin_deeper",
                "\\begin_layout Standard",
                "B",
                "\\end_layout",
                "\\end_deeper",
            ]
        );
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W200]);
    }

    #[test]
    fn test_unclosed_deeper_warns() {
        let source = "\\begin_layout Standard
A
\\end_layout
\\begin_deeper
\\begin_layout Standard
B
\\end_layout
";
        let parsed = parse_ok(source);
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W202]);
    }
}

#[cfg(test)]
mod unknown_tests {
    use super::*;

    #[test]
    fn test_unknown_inset_captured_and_reported_once() {
        let source = "\\begin_layout Standard
\\begin_inset Hologram
\\begin_layout Plain Layout
x
\\end_layout
\\end_inset
\\begin_inset Hologram
\\end_inset
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();
        let tree = document.tree();

        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W200]);
        assert!(parsed.warnings()[0].message().contains("inset Hologram"));

        let standard = find(document, "layout Standard");
        let unknowns = tree.children(standard);
        assert_eq!(unknowns.len(), 2);
        let first = tree.node(unknowns[0]);
        assert!(first.is_unknown());
        assert!(first.closed_by_marker());
        assert_eq!(
            lines(first.text()),
            vec!["\\begin_layout Plain Layout", "x", "\\end_layout"]
        );
        assert!(first.children().is_empty());
    }

    #[test]
    fn test_unknown_closed_by_foreign_end() {
        let source = "\\begin_layout Standard
\\begin_inset Hologram
x
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();

        let unknown = document.node(find(document, "inset Hologram"));
        assert!(!unknown.closed_by_marker());
        assert_eq!(lines(unknown.text()), vec!["x"]);
        assert!(document.node(find(document, "layout Standard")).closed_by_marker());
    }

    #[test]
    fn test_bare_unknown_keeps_following_text() {
        let source = "\\begin_layout Standard
\\foo bar
text
\\end_layout
";
        let parsed = parse_ok(source);
        let document = parsed.document();

        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W200]);
        assert!(parsed.warnings()[0].message().contains("\\foo"));
        let unknown = document.node(find(document, "foo bar"));
        assert_eq!(lines(unknown.tail()), vec!["text"]);
    }

    #[test]
    fn test_stray_end_is_ignored() {
        let with_stray = "\\begin_layout Standard
A
\\end_inset
B
\\end_layout
";
        let without = "\\begin_layout Standard
A
B
\\end_layout
";
        let parsed = parse_ok(with_stray);
        let clean = parse_ok(without);

        assert_eq!(outline(parsed.document()), outline(clean.document()));
        let standard = parsed.document().node(find(parsed.document(), "layout Standard"));
        assert_eq!(lines(standard.text()), vec!["A", "B"]);
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W201]);
        assert_eq!(parsed.warnings()[0].line(), Some(3));
    }

    #[test]
    fn test_stray_end_deeper() {
        let parsed = parse_ok("\\end_deeper\n");
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W201]);
    }

    #[test]
    fn test_unterminated_object_warns() {
        let parsed = parse_ok("\\begin_layout Standard\nA\n");
        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W202]);
        assert_eq!(parsed.warnings()[0].line(), Some(1));
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;

    const TABLE: &str = "\\begin_layout Standard
\\begin_inset Tabular
<lyxtabular version=\"3\" rows=\"1\" columns=\"2\">
<features tabularvalignment=\"middle\">
<column alignment=\"center\" valignment=\"top\">
<column alignment=\"center\" valignment=\"top\">
<row>
<cell alignment=\"center\" valignment=\"top\" usebox=\"none\">
\\begin_inset Text

\\begin_layout Plain Layout
a
\\end_layout

\\end_inset
</cell>
<cell alignment=\"center\" valignment=\"top\" usebox=\"none\">
\\begin_inset Text

\\begin_layout Plain Layout
b < c
\\end_layout

\\end_inset
</cell>
</row>
</lyxtabular>

\\end_inset

\\end_layout
";

    #[test]
    fn test_table_structure() {
        let parsed = parse_ok(TABLE);
        let document = parsed.document();

        assert!(parsed.warnings().is_empty());
        assert_eq!(
            outline(document),
            vec![
                "layout Standard",
                "  inset Tabular",
                "    lyxtabular",
                "      features",
                "      column",
                "      column",
                "      row",
                "        cell",
                "          inset Text",
                "            layout Plain Layout",
                "        cell",
                "          inset Text",
                "            layout Plain Layout",
            ]
        );

        let table = document.node(find(document, "lyxtabular"));
        assert_eq!(table.attribute("rows"), Some("1"));
        assert_eq!(table.attribute("columns"), Some("2"));
        assert_eq!(lines(table.tail()), vec![""]);
        assert_eq!(table.children().len(), 4);

        let column = document.node(find(document, "column"));
        assert_eq!(column.attribute("alignment"), Some("center"));
        assert!(!column.closed_by_marker());
    }

    #[test]
    fn test_cell_text_is_unescaped() {
        let parsed = parse_ok(TABLE);
        let document = parsed.document();
        let tree = document.tree();

        let plains: Vec<NodeId> = tree
            .descendants(document.root())
            .filter(|&id| tree.node(id).describe() == "layout Plain Layout")
            .collect();
        assert_eq!(plains.len(), 2);
        assert_eq!(lines(tree.node(plains[0]).text()), vec!["a"]);
        assert_eq!(lines(tree.node(plains[1]).text()), vec!["b < c"]);
        assert_eq!(lines(tree.node(plains[1]).tail()), vec![""]);

        let text = tree.node(tree.parent(plains[0]).unwrap_or_else(|| panic!("orphan")));
        assert_eq!(lines(text.text()), vec![""]);
        assert!(text.closed_by_marker());
    }

    /// A one-cell `Tabular` inset whose cell holds `content` lines.
    fn one_cell_table(content: &str) -> String {
        format!(
            "\\begin_inset Tabular
<lyxtabular version=\"3\" rows=\"1\" columns=\"1\">
<features tabularvalignment=\"middle\">
<column alignment=\"center\" valignment=\"top\">
<row>
<cell alignment=\"center\" valignment=\"top\" usebox=\"none\">
\\begin_inset Text

\\begin_layout Plain Layout
{content}
\\end_layout

\\end_inset
</cell>
</row>
</lyxtabular>

\\end_inset
"
        )
    }

    #[test]
    fn test_table_inside_cell() {
        let inner = one_cell_table("inner");
        let source = format!(
            "\\begin_layout Standard\n{}\n\\end_layout\n",
            one_cell_table(inner.trim_end())
        );
        let parsed = parse_ok(&source);
        let document = parsed.document();
        let tree = document.tree();

        assert!(parsed.warnings().is_empty());
        assert_eq!(
            outline(document),
            vec![
                "layout Standard",
                "  inset Tabular",
                "    lyxtabular",
                "      features",
                "      column",
                "      row",
                "        cell",
                "          inset Text",
                "            layout Plain Layout",
                "              inset Tabular",
                "                lyxtabular",
                "                  features",
                "                  column",
                "                  row",
                "                    cell",
                "                      inset Text",
                "                        layout Plain Layout",
            ]
        );

        let plains: Vec<NodeId> = tree
            .descendants(document.root())
            .filter(|&id| tree.node(id).describe() == "layout Plain Layout")
            .collect();
        assert_eq!(plains.len(), 2);
        assert_eq!(lines(tree.node(plains[1]).text()), vec!["inner"]);
        assert!(tree.node(plains[0]).text().is_empty());
    }

    #[test]
    fn test_self_closed_elements_are_not_closed_by_marker() {
        let source = "\\begin_inset Tabular
<lyxtabular version=\"3\" rows=\"0\" columns=\"0\">
<weird a=\"1\">
</weird>
<odd b=\"2\"/>
</lyxtabular>
\\end_inset
";
        let parsed = parse_ok(source);
        let document = parsed.document();

        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W203, ErrorCode::W203]);
        let weird = document.node(find(document, "weird"));
        assert_eq!(weird.attribute("a"), Some("1"));
        assert!(weird.closed_by_marker());
        let odd = document.node(find(document, "odd"));
        assert!(!odd.closed_by_marker());
    }

    #[test]
    fn test_unknown_table_element_warns() {
        let source = "\\begin_inset Tabular
<lyxtabular version=\"3\" rows=\"1\" columns=\"1\">
<extra/>
<row>
<cell>
\\begin_inset Text
\\begin_layout Plain Layout
x
\\end_layout
\\end_inset
</cell>
</row>
</lyxtabular>
\\end_inset
";
        let parsed = parse_ok(source);
        let document = parsed.document();

        assert_eq!(warning_codes(&parsed), vec![ErrorCode::W203]);
        assert!(parsed.warnings()[0].message().contains("<extra>"));
        let extra = document.node(find(document, "extra"));
        assert!(extra.is_unknown());
        assert_eq!(parsed.warnings()[0].line(), Some(3));
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_primary_object_in_deeper_block() {
        let source = "\\begin_layout Standard
A
\\end_layout
\\begin_deeper
\\begin_body
";
        assert_eq!(fatal_code(source), Some(ErrorCode::E100));
    }

    #[test]
    fn test_unplaceable_object_reports_branch() {
        let source = "\\begin_layout Standard
A
\\end_layout
\\begin_deeper
\\begin_body
";
        let err = parse_err_with(source, &ParseConfig::default());
        let Some(fatal) = err.fatal() else {
            panic!("expected a fatal diagnostic");
        };
        assert_eq!(fatal.line(), Some(5));
        assert!(fatal.help().is_some_and(|help| help.contains("layout Standard")));
    }

    #[test]
    fn test_depth_limit() {
        let source = "\\begin_layout Standard
\\begin_inset Text
\\begin_layout Plain Layout
";
        let err = parse_err_with(source, &ParseConfig::new(3));
        assert_eq!(err.fatal().and_then(|d| d.code()), Some(ErrorCode::E101));
        assert!(parse(source, &ParseConfig::new(4)).is_ok());
    }

    #[test]
    fn test_deeper_without_paragraph() {
        assert_eq!(fatal_code("\\begin_deeper\n"), Some(ErrorCode::E102));

        let open_paragraph = "\\begin_layout Standard
\\begin_deeper
";
        assert_eq!(fatal_code(open_paragraph), Some(ErrorCode::E102));
    }

    #[test]
    fn test_unterminated_table() {
        let source = "\\begin_layout Standard
\\begin_inset Tabular
<lyxtabular version=\"3\" rows=\"1\" columns=\"1\">
<row>
";
        assert_eq!(fatal_code(source), Some(ErrorCode::E103));
    }

    #[test]
    fn test_malformed_table() {
        let source = "\\begin_inset Tabular
<lyxtabular version=\"3\">
<row>
</cell>
</lyxtabular>
\\end_inset
";
        assert_eq!(fatal_code(source), Some(ErrorCode::E104));
    }

    #[test]
    fn test_malformed_opening_line() {
        assert_eq!(fatal_code("\\begin_\n"), Some(ErrorCode::E001));
    }

    #[test]
    fn test_warnings_survive_fatal_error() {
        let source = "\\end_inset
\\begin_deeper
";
        let err = parse_err_with(source, &ParseConfig::default());
        let codes: Vec<Option<ErrorCode>> = err.diagnostics().iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![Some(ErrorCode::E102), Some(ErrorCode::W201)]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // =====================================================================
    // Strategies
    // =====================================================================

    fn word_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    /// Lines of one piece of paragraph content.
    fn inline_strategy() -> impl Strategy<Value = Vec<String>> {
        prop_oneof![
            word_strategy().prop_map(|word| vec![word]),
            word_strategy().prop_map(|word| vec![
                "\\begin_inset Text".to_string(),
                "\\begin_layout Plain Layout".to_string(),
                word,
                "\\end_layout".to_string(),
                "\\end_inset".to_string(),
            ]),
            word_strategy().prop_map(|word| vec![
                "\\series bold".to_string(),
                word,
                "\\series default".to_string(),
            ]),
            word_strategy().prop_map(|word| vec![
                format!("\\begin_inset Formula ${word}$"),
                "\\end_inset".to_string(),
            ]),
        ]
    }

    fn paragraph_strategy(layouts: &'static [&'static str]) -> impl Strategy<Value = Vec<String>> {
        (
            prop::sample::select(layouts),
            prop::collection::vec(inline_strategy(), 0..4),
        )
            .prop_map(|(layout, pieces)| {
                let mut lines = vec![format!("\\begin_layout {layout}")];
                lines.extend(pieces.into_iter().flatten());
                lines.push("\\end_layout".to_string());
                lines.push(String::new());
                lines
            })
    }

    const ANY: &[&str] = &["Standard", "Itemize", "Section", "Subsection", "Quote"];
    const REGULAR: &[&str] = &["Standard", "Itemize", "Enumerate"];

    /// A paragraph, optionally continued by a deeper block.
    fn block_strategy() -> impl Strategy<Value = Vec<String>> {
        prop_oneof![
            3 => paragraph_strategy(ANY),
            1 => (
                paragraph_strategy(REGULAR),
                prop::collection::vec(paragraph_strategy(REGULAR), 1..3),
            )
                .prop_map(|(head, nested)| {
                    let mut lines = head;
                    lines.push("\\begin_deeper".to_string());
                    lines.extend(nested.into_iter().flatten());
                    lines.push("\\end_deeper".to_string());
                    lines
                }),
        ]
    }

    fn body_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(block_strategy(), 1..8)
    }

    fn join(blocks: &[Vec<String>]) -> String {
        let mut source = String::new();
        for line in blocks.iter().flatten() {
            source.push_str(line);
            source.push('\n');
        }
        source
    }

    // =====================================================================
    // Property Test Functions
    // =====================================================================

    fn check_parsed_tree_is_nesting_valid(blocks: &[Vec<String>]) -> Result<(), TestCaseError> {
        let source = join(blocks);
        let parsed = parse(&source, &ParseConfig::default());
        prop_assert!(parsed.is_ok(), "parse failed for:\n{}", source);
        let Ok(parsed) = parsed else {
            return Ok(());
        };

        prop_assert!(parsed.warnings().is_empty());
        let checked = validate(parsed.document().tree());
        prop_assert!(checked.is_ok(), "{:?}", checked);
        Ok(())
    }

    fn check_stray_end_changes_nothing(
        blocks: &[Vec<String>],
        position: usize,
    ) -> Result<(), TestCaseError> {
        let mut with_stray = blocks.to_vec();
        with_stray.insert(position % (blocks.len() + 1), vec!["\\end_inset".to_string()]);

        let clean = parse(&join(blocks), &ParseConfig::default());
        let noisy = parse(&join(&with_stray), &ParseConfig::default());
        let (Ok(clean), Ok(noisy)) = (clean, noisy) else {
            prop_assert!(false, "parse failed");
            return Ok(());
        };

        prop_assert_eq!(outline(clean.document()), outline(noisy.document()));
        let tree = noisy.document().tree();
        let texts: Vec<_> = tree
            .descendants(tree.root())
            .map(|id| (tree.node(id).text().clone(), tree.node(id).tail().clone()))
            .collect();
        let reference = clean.document().tree();
        let expected: Vec<_> = reference
            .descendants(reference.root())
            .map(|id| (reference.node(id).text().clone(), reference.node(id).tail().clone()))
            .collect();
        prop_assert_eq!(texts, expected);
        prop_assert_eq!(warning_codes(&noisy), vec![ErrorCode::W201]);
        Ok(())
    }

    // =====================================================================
    // Proptest Wrappers
    // =====================================================================

    proptest! {
        #[test]
        fn parsed_tree_is_nesting_valid(blocks in body_strategy()) {
            check_parsed_tree_is_nesting_valid(&blocks)?;
        }

        #[test]
        fn stray_end_changes_nothing(blocks in body_strategy(), position in 0usize..16) {
            check_stray_end_changes_nothing(&blocks, position)?;
        }
    }
}
