//! The built-in table of LyX objects.

use super::{
    Catalog, DEFAULT_RANK, EndToken, FieldSpec, ObjectClass, ObjectSpec, WILDCARD,
};

const STATUS: &[FieldSpec] = &[FieldSpec::plain("status")];

const BOX: &[FieldSpec] = &[
    FieldSpec::quoted("position"),
    FieldSpec::quoted("hor_pos"),
    FieldSpec::plain("has_inner_box"),
    FieldSpec::quoted("inner_pos"),
    FieldSpec::plain("use_parbox"),
    FieldSpec::plain("use_makebox"),
    FieldSpec::quoted("width"),
    FieldSpec::quoted("special"),
    FieldSpec::quoted("height"),
    FieldSpec::quoted("height_special"),
    FieldSpec::quoted("thickness"),
    FieldSpec::quoted("separation"),
    FieldSpec::quoted("shadowsize"),
    FieldSpec::quoted("framecolor"),
    FieldSpec::quoted("backgroundcolor"),
    FieldSpec::plain("status"),
];

const FLOAT: &[FieldSpec] = &[
    FieldSpec::plain("placement"),
    FieldSpec::plain("alignment"),
    FieldSpec::plain("wide"),
    FieldSpec::plain("sideways"),
    FieldSpec::plain("status"),
];

const WRAP: &[FieldSpec] = &[
    FieldSpec::plain("lines"),
    FieldSpec::plain("placement"),
    FieldSpec::plain("overhang"),
    FieldSpec::quoted("width"),
    FieldSpec::plain("status"),
];

const GRAPHICS: &[FieldSpec] = &[
    FieldSpec::plain("filename").required(),
    FieldSpec::plain("lyxscale"),
    FieldSpec::plain("scale"),
    FieldSpec::plain("width"),
    FieldSpec::plain("height"),
    FieldSpec::plain("keepAspectRatio"),
    FieldSpec::plain("rotateAngle"),
    FieldSpec::plain("rotateOrigin"),
    FieldSpec::plain("special"),
    FieldSpec::plain("groupId"),
    FieldSpec::plain("clip"),
];

const COMMAND: &[FieldSpec] = &[
    FieldSpec::plain("LatexCommand").required(),
    FieldSpec::quoted("after"),
    FieldSpec::quoted("before"),
    FieldSpec::quoted("bibfiles"),
    FieldSpec::quoted("btprint"),
    FieldSpec::quoted("description"),
    FieldSpec::quoted("filename"),
    FieldSpec::quoted("key"),
    FieldSpec::quoted("name"),
    FieldSpec::quoted("options"),
    FieldSpec::quoted("prefix"),
    FieldSpec::quoted("reference"),
    FieldSpec::quoted("symbol"),
    FieldSpec::quoted("target"),
    FieldSpec::quoted("type"),
    FieldSpec::quoted("plural"),
    FieldSpec::quoted("caps"),
    FieldSpec::quoted("noprefix"),
    FieldSpec::quoted("nolink"),
    FieldSpec::quoted("literal"),
];

/// Nomenclature entries, in the order LyX writes them.
const NOMENCLATURE: &[FieldSpec] = &[
    FieldSpec::plain("LatexCommand").required(),
    FieldSpec::quoted("prefix"),
    FieldSpec::quoted("symbol"),
    FieldSpec::quoted("description"),
    FieldSpec::quoted("literal"),
];

const BIBTEX: &[FieldSpec] = &[
    FieldSpec::plain("LatexCommand").required(),
    FieldSpec::quoted("btprint"),
    FieldSpec::quoted("bibfiles"),
    FieldSpec::quoted("options"),
    FieldSpec::quoted("encoding"),
    FieldSpec::quoted("biblatexopts"),
];

const INFO: &[FieldSpec] = &[
    FieldSpec::quoted("type").required(),
    FieldSpec::quoted("arg").required(),
];

const LISTINGS: &[FieldSpec] = &[
    FieldSpec::quoted("lstparams"),
    FieldSpec::plain("inline"),
    FieldSpec::plain("status"),
];

/// Theorem-like layouts that never carry a number.
const UNNUMBERED_THEOREMS: &[&str] = &["Proof", "Case", "Notation", "Summary", "Acknowledgement"];

fn primary(rank: i32, tag: &'static str) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Primary, rank, tag)
}

fn layout(tag: &'static str) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Layout, DEFAULT_RANK, tag)
}

fn heading(rank: i32, tag: &'static str) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Layout, rank, tag)
}

fn inset(tag: &'static str) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Inset, DEFAULT_RANK, tag)
}

fn design(tag: &'static str) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Design, DEFAULT_RANK, tag)
}

fn setting(rank: i32) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Setting, rank, "")
}

fn markup(rank: i32, tag: &'static str) -> ObjectSpec {
    ObjectSpec::new(ObjectClass::Markup, rank, tag)
}

pub(super) fn build() -> Catalog {
    let mut catalog = Catalog::new();
    skeleton(&mut catalog);
    layouts(&mut catalog);
    insets(&mut catalog);
    designs(&mut catalog);
    settings(&mut catalog);
    tables(&mut catalog);
    catalog
}

fn skeleton(catalog: &mut Catalog) {
    catalog.insert("document", "", "", primary(-4, "html"));
    catalog.insert("header", "", "", primary(-3, "head").settings_scope());
    catalog.insert("body", "", "", primary(-2, "body").body());
    for block in [
        "preamble",
        "modules",
        "removed_modules",
        "local_layout",
        "forced_local_layout",
        "includeonly",
    ] {
        catalog.insert(block, "", "", primary(-2, "").verbatim());
    }
}

fn layouts(catalog: &mut Catalog) {
    catalog.set_whole_category("layout");

    let headings = [
        ("Part", 0, "h1"),
        ("Chapter", 1, "h1"),
        ("Section", 2, "h2"),
        ("Subsection", 3, "h3"),
        ("Subsubsection", 4, "h4"),
        ("Paragraph", 5, "h5"),
        ("Subparagraph", 6, "h6"),
    ];
    for (name, rank, tag) in headings {
        catalog.insert("layout", name, "", heading(rank, tag));
    }
    let starred = [
        ("Part*", 0, "h1"),
        ("Chapter*", 1, "h1"),
        ("Section*", 2, "h2"),
        ("Subsection*", 3, "h3"),
        ("Subsubsection*", 4, "h4"),
        ("Paragraph*", 5, "h5"),
        ("Subparagraph*", 6, "h6"),
        ("Addchap", 1, "h1"),
        ("Addsec", 2, "h2"),
    ];
    for (name, rank, tag) in starred {
        catalog.insert("layout", name, "", heading(rank, tag).unnumbered());
    }

    catalog.insert("layout", "Plain Layout", "", layout("div").plain());
    for name in ["Standard", "Author", "Date", "Abstract", "Address", "Right Address"] {
        catalog.insert("layout", name, "", layout("div"));
    }
    catalog.insert("layout", "Title", "", layout("h1"));
    catalog.insert("layout", "Subtitle", "", layout("h2"));
    for name in ["Quote", "Quotation", "Verse"] {
        catalog.insert("layout", name, "", layout("blockquote"));
    }
    catalog.insert("layout", "LyX-Code", "", layout("pre"));
    catalog.insert("layout", "Itemize", "", layout("li").with_group("ul"));
    catalog.insert("layout", "Enumerate", "", layout("li").with_group("ol"));
    catalog.insert("layout", "Bibliography", "", layout("li").with_group("ol"));
    for name in ["Description", "List", "Labeling"] {
        catalog.insert("layout", name, "", layout("div").with_group("dl"));
    }
    for name in [
        "Theorem",
        "Theorem*",
        "Lemma",
        "Lemma*",
        "Corollary",
        "Corollary*",
        "Proposition",
        "Proposition*",
        "Conjecture",
        "Definition",
        "Definition*",
        "Example",
        "Example*",
        "Remark",
        "Remark*",
        "Claim",
        "Proof",
        "Exercise",
        "Solution",
        "Problem",
        "Notation",
        "Case",
        "Criterion",
        "Algorithm",
        "Axiom",
        "Fact",
        "Summary",
        "Acknowledgement",
    ] {
        let spec = layout("div");
        let numbered = !name.ends_with('*') && !UNNUMBERED_THEOREMS.contains(&name);
        let spec = if numbered { spec.theorem() } else { spec };
        catalog.insert("layout", name, "", spec);
    }
}

fn insets(catalog: &mut Catalog) {
    catalog.insert("inset", "Text", "", inset("div").text_bearing());
    catalog.insert(
        "inset",
        "Formula",
        "",
        inset("span").verbatim().inline_argument(),
    );
    catalog.insert(
        "inset",
        "FormulaMacro",
        "",
        inset("span").verbatim().inline_argument(),
    );

    for (category, tag) in [
        ("Foot", "aside"),
        ("Marginal", "aside"),
        ("Argument", "span"),
        ("Flex", "span"),
        ("Index", "span"),
        ("Phantom", "span"),
        ("IPA", "span"),
        ("ERT", "span"),
    ] {
        catalog.insert(
            "inset",
            category,
            WILDCARD,
            inset(tag).text_bearing().with_fields(STATUS),
        );
    }
    catalog.insert("inset", "Note", WILDCARD, inset("aside").opaque().with_fields(STATUS));
    catalog.insert("inset", "Branch", WILDCARD, inset("div").opaque().with_fields(STATUS));
    catalog.insert("inset", "Box", WILDCARD, inset("div").opaque().with_fields(BOX));
    catalog.insert(
        "inset",
        "Float",
        WILDCARD,
        inset("figure").text_bearing().with_fields(FLOAT),
    );
    catalog.insert(
        "inset",
        "Wrap",
        WILDCARD,
        inset("figure").text_bearing().with_fields(WRAP),
    );
    catalog.insert("inset", "Caption", WILDCARD, inset("figcaption").text_bearing());
    catalog.insert(
        "inset",
        "listings",
        "",
        inset("pre").text_bearing().with_fields(LISTINGS),
    );
    catalog.insert("inset", "Tabular", "", inset("div").table_bearing());
    catalog.insert(
        "inset",
        "Graphics",
        "",
        inset("img").with_fields(GRAPHICS).with_field_indent("\t"),
    );
    catalog.insert("inset", "Info", "", inset("span").with_fields(INFO));
    catalog.insert("inset", "Preview", "", inset("span").text_bearing());
    catalog.insert("inset", "Quotes", WILDCARD, inset("span"));
    catalog.insert("inset", "Newline", WILDCARD, inset("br"));
    catalog.insert("inset", "Newpage", WILDCARD, inset("hr"));
    catalog.insert("inset", "line", "", inset("hr"));
    catalog.insert("inset", "space", WILDCARD, inset("span"));
    catalog.insert("inset", "VSpace", WILDCARD, inset("div"));
    catalog.insert("inset", "Separator", WILDCARD, inset("span"));
    catalog.insert("inset", "script", "superscript", inset("sup").text_bearing());
    catalog.insert("inset", "script", "subscript", inset("sub").text_bearing());

    catalog.insert("inset", "CommandInset", WILDCARD, inset("span").with_fields(COMMAND));
    for (details, tag) in [
        ("ref", "a"),
        ("label", "a"),
        ("href", "a"),
        ("citation", "cite"),
        ("toc", "nav"),
        ("include", "div"),
    ] {
        catalog.insert("inset", "CommandInset", details, inset(tag).with_fields(COMMAND));
    }
    catalog.insert("inset", "CommandInset", "bibtex", inset("div").with_fields(BIBTEX));
    catalog.insert(
        "inset",
        "CommandInset",
        "nomenclature",
        inset("span").with_fields(NOMENCLATURE),
    );
}

fn designs(catalog: &mut Catalog) {
    for command in [
        "family", "series", "shape", "size", "numeric", "bar", "strikeout", "xout", "uuline",
        "uwave", "noun",
    ] {
        catalog.insert(command, WILDCARD, WILDCARD, design("span"));
    }
    catalog.insert("emph", WILDCARD, WILDCARD, design("em"));
    catalog.insert(
        "color",
        WILDCARD,
        WILDCARD,
        design("span").with_end(EndToken::Sentinel("inherit")),
    );
    catalog.insert(
        "lang",
        WILDCARD,
        WILDCARD,
        design("span").with_end(EndToken::DocumentLanguage),
    );

    for command in [
        "backslash",
        "SpecialChar",
        "change_inserted",
        "change_deleted",
        "change_unchanged",
    ] {
        catalog.insert(
            command,
            WILDCARD,
            WILDCARD,
            design("span").with_end(EndToken::None),
        );
    }
    catalog.insert(
        "lyxline",
        WILDCARD,
        WILDCARD,
        design("hr").with_end(EndToken::None),
    );

    for command in [
        "align",
        "noindent",
        "paragraph_spacing",
        "leftindent",
        "labelwidthstring",
        "start_of_appendix",
        "added_space_top",
        "added_space_bottom",
    ] {
        catalog.insert(
            command,
            WILDCARD,
            WILDCARD,
            ObjectSpec::new(ObjectClass::ParagraphSetting, DEFAULT_RANK, ""),
        );
    }
}

fn settings(catalog: &mut Catalog) {
    catalog.set_generic_setting(setting(-1));
    catalog.insert("lyxformat", WILDCARD, WILDCARD, setting(-1));
    for block in ["index", "branch"] {
        catalog.insert(
            block,
            WILDCARD,
            WILDCARD,
            setting(-2).with_end(EndToken::Standard),
        );
    }
}

fn tables(catalog: &mut Catalog) {
    catalog.insert("lyxtabular", "", "", markup(-7, "table").embedded_root());
    catalog.insert(
        "features",
        "",
        "",
        markup(-6, "").with_end(EndToken::None),
    );
    catalog.insert("column", "", "", markup(-6, "col").with_end(EndToken::None));
    catalog.insert("row", "", "", markup(-6, "tr"));
    catalog.insert("cell", "", "", markup(-5, "td").cell());
}
