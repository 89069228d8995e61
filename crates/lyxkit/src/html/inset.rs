//! Insets with a rendering of their own.

use markup5ever_rcdom::Handle;

use lyxkit_core::{Node, NodeId};

use super::{
    Error,
    convert::{Converter, joined},
    dom,
    numbering::toc_list,
    table,
};

/// Heading of the generated table of contents.
const TOC_TITLE: &str = "Table of Contents";

pub(crate) fn convert(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let node = cx.tree().node(id);
    let category = node.key().category().to_string();

    match category.as_str() {
        "Formula" | "FormulaMacro" => formula(cx, node, parent),
        "Graphics" => graphics(cx, node, parent),
        "CommandInset" => return command(cx, id, parent),
        "Quotes" => dom::append_text(parent, quote(&node.key().details().to_string())),
        "space" => dom::append_text(parent, space(&node.key().details().to_string())),
        "Newline" => dom::append(parent, dom::element("br", &[])),
        "Newpage" | "line" => dom::append(parent, dom::element("hr", &[])),
        "Note" | "Separator" => {}
        "Tabular" => return table::convert(cx, id, parent),
        "Foot" => return footnote(cx, id, parent),
        "Float" => return float(cx, id, parent),
        "Caption" => return caption(cx, id, parent),
        "Box" => return boxed(cx, id, parent),
        _ => {
            let element = cx.open(node, node.tag());
            dom::append(parent, element.clone());
            return cx.content(id, &element);
        }
    }
    Ok(())
}

fn formula(cx: &Converter<'_>, node: &Node, parent: &Handle) {
    let mut lines: Vec<&str> = node.inline().into_iter().collect();
    lines.extend(node.text().lines().iter().map(String::as_str));
    // A macro definition is its first line; the rest is its LaTeX form.
    if node.key().category() == "FormulaMacro" {
        lines.truncate(1);
    }
    let element = cx.open(node, node.tag());
    dom::append_text(&element, &correct_formula(&lines.join("\n")));
    dom::append(parent, element);
}

/// Delimits a formula the way MathJax expects.
///
/// Display math keeps (or gains) `\[` ... `\]`; everything else becomes
/// inline `\(` ... `\)`.
pub(crate) fn correct_formula(formula: &str) -> String {
    let formula = formula.trim_end_matches('\n');
    if formula.starts_with("\\[") {
        if formula.ends_with("\\]") {
            return formula.to_string();
        }
        return format!("{formula}\\]");
    }
    if formula.starts_with("\\begin{") {
        return format!("\\[{formula}\\]");
    }

    let inner = formula.strip_prefix('$').unwrap_or(formula);
    let inner = inner.strip_suffix('$').unwrap_or(inner);
    let inner = inner.strip_prefix("\\(").unwrap_or(inner);
    let inner = inner.strip_suffix("\\)").unwrap_or(inner);
    format!("\\({inner}\\)")
}

fn graphics(cx: &Converter<'_>, node: &Node, parent: &Handle) {
    let element = cx.open(node, node.tag());
    if let Some(filename) = node.attribute("filename") {
        dom::set_attribute(&element, "src", filename);
        dom::set_attribute(&element, "alt", filename);
    }
    if let Some(scale) = node.attribute("scale").and_then(|s| s.parse::<f64>().ok()) {
        let width = (scale * 1.5).min(100.0).round();
        dom::add_style(&element, &format!("max-width: {width}%"));
    }
    dom::append(parent, element);
}

fn command(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let node = cx.tree().node(id);
    let details = node.key().details().to_string();
    let element = cx.open(node, node.tag());
    dom::append(parent, element.clone());

    match details.as_str() {
        "ref" => {
            let reference = node.attribute("reference").unwrap_or_default();
            dom::set_attribute(&element, "href", &format!("#{reference}"));
            dom::append_text(&element, reference);
        }
        "label" => {
            if let Some(name) = node.attribute("name") {
                dom::set_attribute(&element, "id", name);
            }
        }
        "href" => {
            let target = node.attribute("target").unwrap_or_default();
            dom::set_attribute(&element, "href", target);
            let name = node.attribute("name").filter(|name| !name.is_empty());
            dom::append_text(&element, name.unwrap_or(target));
        }
        "citation" => {
            let key = node.attribute("key").unwrap_or_default();
            dom::append_text(&element, &format!("[{key}]"));
        }
        "toc" if cx.config().toc() => {
            let title = dom::element("h2", &[]);
            dom::append_text(&title, TOC_TITLE);
            dom::append(&element, title);
            dom::append(&element, toc_list(cx.outline().entries()));
        }
        _ => {}
    }
    Ok(())
}

fn footnote(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let node = cx.tree().node(id);
    let element = cx.open(node, node.tag());
    let label = dom::element("span", &[("class", "label")]);
    dom::append_text(&label, &cx.next_footnote().to_string());
    dom::append(&element, label);
    dom::append(parent, element.clone());
    cx.content(id, &element)
}

fn float(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let node = cx.tree().node(id);
    let element = cx.open(node, node.tag());
    dom::append(parent, element.clone());
    cx.start_float(&node.key().details().to_string());
    let result = cx.content(id, &element);
    cx.end_float();
    result
}

fn caption(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let node = cx.tree().node(id);
    let element = cx.open(node, node.tag());
    if let Some(prefix) = cx.take_caption_prefix() {
        let label = dom::element("span", &[("class", "label")]);
        dom::append_text(&label, &prefix);
        dom::append(&element, label);
    }
    dom::append(parent, element.clone());
    cx.content(id, &element)
}

fn boxed(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let node = cx.tree().node(id);
    let element = cx.open(node, node.tag());

    if node.key().details() != "Frameless" {
        dom::add_style(&element, "border: solid 1px");
        if let Some(color) = node.attribute("framecolor").filter(|c| *c != "default") {
            dom::add_style(&element, &format!("border-color: {color}"));
        }
    }
    if let Some(color) = node.attribute("backgroundcolor").filter(|c| *c != "none") {
        dom::add_style(&element, &format!("background-color: {color}"));
    }
    if let Some(width) = node.attribute("width") {
        let width = width.replace("col%", "%");
        if width.ends_with('%') {
            dom::add_style(&element, &format!("width: {width}"));
        }
    }
    dom::append(parent, element.clone());
    dom::append_text(&element, &joined(node.text()));
    cx.children(id, &element)
}

/// Glyph of a `Quotes` inset, e.g. `eld` is an English left double quote.
///
/// The details are three letters: quotation style, side and double/single.
fn quote(details: &str) -> &'static str {
    let mut chars = details.chars();
    let style = chars.next().unwrap_or('e');
    let left = chars.next() == Some('l');
    let double = chars.next() != Some('s');

    let (open_double, close_double, open_single, close_single) = match style {
        's' => ("\u{201d}", "\u{201d}", "\u{2019}", "\u{2019}"),
        'g' => ("\u{201e}", "\u{201c}", "\u{201a}", "\u{2018}"),
        'p' => ("\u{201e}", "\u{201d}", "\u{201a}", "\u{2019}"),
        'f' => ("\u{ab}", "\u{bb}", "\u{2039}", "\u{203a}"),
        'a' => ("\u{bb}", "\u{ab}", "\u{203a}", "\u{2039}"),
        _ => ("\u{201c}", "\u{201d}", "\u{2018}", "\u{2019}"),
    };
    match (left, double) {
        (true, true) => open_double,
        (false, true) => close_double,
        (true, false) => open_single,
        (false, false) => close_single,
    }
}

fn space(details: &str) -> &'static str {
    match details {
        "~" | "\\space{}" | "\\nobreakspace{}" => "\u{a0}",
        "\\thinspace{}" | "\\negthinspace{}" => "\u{2009}",
        "\\enskip{}" | "\\enspace{}" => "\u{2002}",
        "\\quad{}" => "\u{2003}",
        "\\qquad{}" => "\u{2003}\u{2003}",
        _ => " ",
    }
}
