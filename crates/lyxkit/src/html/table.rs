//! `Tabular` insets.
//!
//! The embedded `<lyxtabular>` markup is already a tree of markup nodes:
//! `features`, one `column` per column and `row`s of `cell`s. Merged cells
//! are spread over the grid in LyX: the first cell of a merge carries
//! `multicolumn="1"` (or `multirow="3"`) and the cells it covers carry `2`
//! (or `4`). Those covered cells are dropped and counted into a span.

use markup5ever_rcdom::Handle;

use lyxkit_core::{Node, NodeId};

use super::{Error, convert::Converter, dom};

pub(crate) fn convert(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let tree = cx.tree();
    let node = tree.node(id);
    let wrapper = cx.open(node, node.tag());
    dom::append(parent, wrapper.clone());

    for &child in tree.children(id) {
        if tree.node(child).key().command() == "lyxtabular" {
            table(cx, child, &wrapper)?;
        }
    }
    Ok(())
}

fn table(cx: &mut Converter<'_>, id: NodeId, parent: &Handle) -> Result<(), Error> {
    let tree = cx.tree();
    let node = tree.node(id);
    let table = dom::element(node.tag(), &[]);
    cx.data_attributes(node, &table);
    dom::append(parent, table.clone());

    let (columns, rows): (Vec<NodeId>, Vec<NodeId>) = tree
        .children(id)
        .iter()
        .copied()
        .filter(|&child| matches!(tree.node(child).key().command().to_string().as_str(), "column" | "row"))
        .partition(|&child| tree.node(child).key().command() == "column");

    if !columns.is_empty() {
        let colgroup = dom::element("colgroup", &[]);
        for &column in &columns {
            let column = tree.node(column);
            let col = dom::element(column.tag(), &[]);
            if let Some(alignment) = column.attribute("alignment") {
                dom::add_style(&col, &format!("text-align: {alignment}"));
            }
            if let Some(width) = column.attribute("width").filter(|width| !width.is_empty()) {
                dom::add_style(&col, &format!("width: {width}"));
            }
            cx.data_attributes(column, &col);
            dom::append(&colgroup, col);
        }
        dom::append(&table, colgroup);
    }

    // The cell still accepting covered rows, per column.
    let mut row_spans: Vec<Option<(Handle, usize)>> = vec![None; columns.len()];

    for &row in &rows {
        let row_node = tree.node(row);
        let tr = dom::element(row_node.tag(), &[]);
        cx.data_attributes(row_node, &tr);
        dom::append(&table, tr.clone());

        let mut column_span: Option<(Handle, usize)> = None;
        for (column, &cell) in tree.children(row).iter().enumerate() {
            let cell_node = tree.node(cell);
            if cell_node.key().command() != "cell" {
                continue;
            }
            if column >= row_spans.len() {
                row_spans.resize(column + 1, None);
            }

            if cell_node.attribute("multicolumn") == Some("2") {
                if let Some((td, span)) = column_span.as_mut() {
                    *span += 1;
                    dom::set_attribute(td, "colspan", &span.to_string());
                    continue;
                }
            }
            if cell_node.attribute("multirow") == Some("4") {
                if let Some((td, span)) = row_spans[column].as_mut() {
                    *span += 1;
                    dom::set_attribute(td, "rowspan", &span.to_string());
                    continue;
                }
            }

            let td = dom::element(cell_node.tag(), &[]);
            cell_style(cell_node, &td);
            cx.data_attributes(cell_node, &td);
            dom::append(&tr, td.clone());

            column_span = (cell_node.attribute("multicolumn") == Some("1")).then(|| (td.clone(), 1));
            row_spans[column] = (cell_node.attribute("multirow") == Some("3")).then(|| (td.clone(), 1));
            cx.children(cell, &td)?;
        }
    }
    Ok(())
}

fn cell_style(cell: &Node, td: &Handle) {
    if let Some(alignment) = cell.attribute("alignment") {
        dom::add_style(td, &format!("text-align: {alignment}"));
    }
    if let Some(valignment) = cell.attribute("valignment") {
        let valignment = if valignment == "center" { "middle" } else { valignment };
        dom::add_style(td, &format!("vertical-align: {valignment}"));
    }
    for side in ["top", "bottom", "left", "right"] {
        if cell.attribute(&format!("{side}line")) == Some("true") {
            dom::add_style(td, &format!("border-{side}: solid 1px"));
        }
    }
}
