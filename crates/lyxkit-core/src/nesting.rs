//! Nesting rules: which node may be a child of which.
//!
//! [`can_nest`] is a pure function of the two nodes. The tree calls it on
//! every insertion, so a [`Tree`](crate::tree::Tree) is nesting-valid by
//! construction. The rules are checked in order and the first one that
//! applies decides.

use std::fmt;

use thiserror::Error;

use crate::{
    catalog::{DEFAULT_RANK, PRIMARY_SENTINEL},
    node::Node,
    tree::Tree,
};

/// Why a child was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    ParentClosed,
    HeadingNeedsSection,
    SectionAwaitsHeading,
    SectionOutOfPlace,
    FormulaIsLeaf,
    ParagraphHoldsInsets,
    DesignHoldsInsets,
    BodyHoldsParagraphs,
    CellHoldsTextInsets,
    DeeperNeedsParagraph,
    NeedsParagraph,
    NeedsTableInset,
    PrimaryRank,
    NotAllowed,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::ParentClosed => "the parent is already closed",
            Reason::HeadingNeedsSection => "a heading only opens an empty section of its own rank",
            Reason::SectionAwaitsHeading => "an empty section only accepts its heading",
            Reason::SectionOutOfPlace => "sections nest in the body or in a higher-level section",
            Reason::FormulaIsLeaf => "formulas hold raw text only",
            Reason::ParagraphHoldsInsets => "paragraphs only hold insets",
            Reason::DesignHoldsInsets => "font and paragraph settings only hold insets",
            Reason::BodyHoldsParagraphs => "the body only holds paragraphs",
            Reason::CellHoldsTextInsets => "table cells only hold text insets",
            Reason::DeeperNeedsParagraph => "a deeper block continues a regular paragraph",
            Reason::NeedsParagraph => "paragraph settings belong to a paragraph",
            Reason::NeedsTableInset => "tables belong to a table inset",
            Reason::PrimaryRank => "primary objects nest in a less deeply ranked object",
            Reason::NotAllowed => "no rule allows it",
        };
        f.write_str(text)
    }
}

/// A rejected insertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{child}` cannot nest in `{parent}`: {reason}")]
pub struct Rejection {
    pub child: String,
    pub parent: String,
    pub reason: Reason,
}

impl Rejection {
    fn new(child: &Node, parent: &Node, reason: Reason) -> Self {
        Self {
            child: child.describe(),
            parent: parent.describe(),
            reason,
        }
    }
}

/// Decides whether `child` may be appended to `parent`.
///
/// # Examples
///
/// ```
/// use lyxkit_core::{catalog::Catalog, nesting::can_nest, node::{Node, ObjectKey}};
///
/// let catalog = Catalog::standard();
/// let node = |command: &str, category: &str| {
///     let spec = *catalog.lookup(command, category, "").unwrap();
///     Node::environment(ObjectKey::new(command, category, ""), spec, None)
/// };
///
/// let paragraph = node("layout", "Standard");
/// assert!(can_nest(&node("inset", "Text"), &paragraph).is_ok());
/// assert!(can_nest(&node("layout", "Section"), &paragraph).is_err());
/// ```
pub fn can_nest(child: &Node, parent: &Node) -> Result<(), Rejection> {
    let reject = |reason| Err(Rejection::new(child, parent, reason));

    if !parent.is_open() {
        return reject(Reason::ParentClosed);
    }
    if parent.rank() == PRIMARY_SENTINEL {
        return Ok(());
    }
    let parent_spec = parent.spec();
    if parent_spec.is_some_and(|spec| spec.is_opaque()) {
        return Ok(());
    }

    // Passthrough objects keep whatever position the input gave them.
    if child.is_unknown() {
        return Ok(());
    }
    if child.is_section() {
        return section_rule(child, parent).or_else(reject);
    }

    let child_spec = child.spec();
    if child.is_paragraph() || child.is_inset() {
        return structural_rule(child, parent).or_else(reject);
    }

    if child.is_deeper() {
        let continues = parent.is_paragraph() || parent.is_deeper();
        return if continues && parent.has_regular_rank() {
            Ok(())
        } else {
            reject(Reason::DeeperNeedsParagraph)
        };
    }

    if child.is_design() {
        return if parent.is_paragraph() || parent.is_inset() || parent.is_design() {
            Ok(())
        } else {
            reject(Reason::DesignHoldsInsets)
        };
    }

    if child_spec.is_some_and(|spec| spec.is_paragraph_setting()) {
        return if parent.is_paragraph() {
            Ok(())
        } else {
            reject(Reason::NeedsParagraph)
        };
    }

    if child_spec.is_some_and(|spec| spec.is_embedded_root()) {
        return if parent_spec.is_some_and(|spec| spec.is_table_bearing()) {
            Ok(())
        } else {
            reject(Reason::NeedsTableInset)
        };
    }

    if child.rank() < 0 {
        return if child.rank() > parent.rank() {
            Ok(())
        } else {
            reject(Reason::PrimaryRank)
        };
    }

    reject(Reason::NotAllowed)
}

/// Re-checks every parent/child edge of a finished tree.
///
/// Each edge is evaluated as it was when the child was appended: with the
/// parent open and holding only the siblings before the child.
pub fn validate(tree: &Tree) -> Result<(), Rejection> {
    for parent in tree.descendants(tree.root()) {
        let node = tree.node(parent);
        for (index, &child) in node.children().iter().enumerate() {
            let mut probe = node.clone();
            probe.set_open(true);
            probe.children.truncate(index);
            can_nest(tree.node(child), &probe)?;
        }
    }
    Ok(())
}

fn section_rule(child: &Node, parent: &Node) -> Result<(), Reason> {
    if parent.is_section() {
        if child.rank() > parent.rank() || child.rank() == DEFAULT_RANK {
            return Ok(());
        }
        return Err(Reason::SectionOutOfPlace);
    }
    if parent.spec().is_some_and(|spec| spec.is_body()) {
        return Ok(());
    }
    Err(Reason::SectionOutOfPlace)
}

/// Paragraphs and insets.
fn structural_rule(child: &Node, parent: &Node) -> Result<(), Reason> {
    if child.is_heading() {
        let seeds = parent.is_section() && parent.children().is_empty();
        return if seeds && parent.rank() == child.rank() {
            Ok(())
        } else {
            Err(Reason::HeadingNeedsSection)
        };
    }

    if parent.is_section() {
        return if parent.children().is_empty() {
            Err(Reason::SectionAwaitsHeading)
        } else {
            Ok(())
        };
    }

    let Some(parent_spec) = parent.spec() else {
        return Err(Reason::NotAllowed);
    };

    if parent_spec.is_inset() && parent_spec.is_verbatim() {
        return Err(Reason::FormulaIsLeaf);
    }

    if parent_spec.is_paragraph() {
        if child.is_inset() {
            return Ok(());
        }
        if parent.rank() == DEFAULT_RANK && child.has_regular_rank() {
            return Ok(());
        }
        return Err(Reason::ParagraphHoldsInsets);
    }

    if parent_spec.is_design() || parent_spec.is_paragraph_setting() {
        return if child.is_inset() {
            Ok(())
        } else {
            Err(Reason::DesignHoldsInsets)
        };
    }

    if parent_spec.is_inset() {
        let plain = child.spec().is_some_and(|spec| spec.is_plain());
        let differs = parent.key() != child.key();
        return if differs && (parent_spec.is_text_bearing() || child.is_inset() || plain) {
            Ok(())
        } else {
            Err(Reason::NotAllowed)
        };
    }

    if parent_spec.is_body() {
        return if child.is_paragraph() {
            Ok(())
        } else {
            Err(Reason::BodyHoldsParagraphs)
        };
    }

    if parent_spec.is_cell() {
        let text = child.is_inset() && child.spec().is_some_and(|spec| spec.is_text_bearing());
        return if text {
            Ok(())
        } else {
            Err(Reason::CellHoldsTextInsets)
        };
    }

    Err(Reason::NotAllowed)
}
