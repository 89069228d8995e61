//! Small helpers over `markup5ever_rcdom` handles.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use html5ever::{
    Attribute, LocalName, QualName, ns, serialize,
    serialize::{SerializeOpts, TraversalScope},
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};

use super::Error;

/// Create an element with the given attributes.
pub(crate) fn element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node.
pub(crate) fn text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

pub(crate) fn append(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Append text, skipping empty strings.
pub(crate) fn append_text(parent: &Handle, content: &str) {
    if !content.is_empty() {
        append(parent, text(content));
    }
}

pub(crate) fn attribute(handle: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| attr.value.to_string())
}

/// Set an attribute, replacing any previous value.
pub(crate) fn set_attribute(handle: &Handle, name: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
        Some(attr) => attr.value = value.to_string().into(),
        None => attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        }),
    }
}

/// Append a declaration to the element's `style` attribute.
pub(crate) fn add_style(handle: &Handle, declaration: &str) {
    let style = match attribute(handle, "style") {
        Some(style) if !style.is_empty() => format!("{style}; {declaration}"),
        _ => declaration.to_string(),
    };
    set_attribute(handle, "style", &style);
}

/// Serialize `handle` and everything below it.
pub(crate) fn to_html(handle: &Handle) -> Result<String, Error> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(handle.clone());
    serialize(&mut output, &serializable, opts)
        .map_err(|err| Error::Render(format!("HTML serialization failed: {err}")))?;

    String::from_utf8(output).map_err(|err| Error::Render(format!("UTF-8 conversion failed: {err}")))
}
