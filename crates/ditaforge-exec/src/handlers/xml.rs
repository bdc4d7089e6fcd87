//! Shared XML plumbing for the structure-mutating handlers.
//!
//! Strictly structural: load, save, traverse, build. No DITA semantics
//! live here.

use std::fs::File;
use std::path::Path;
use xmltree::{Element, XMLNode};

/// Parse an XML file, mapping every failure to a message suitable for a
/// failed action result.
pub(crate) fn load(path: &Path) -> Result<Element, String> {
    let file =
        File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    Element::parse(file).map_err(|e| format!("invalid XML in {}: {e}", path.display()))
}

/// Persist an element tree, creating parent directories first.
pub(crate) fn save(element: &Element, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }
    let file =
        File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    element
        .write(file)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Every element in the tree, root included, in document order.
pub(crate) fn descendants(root: &Element) -> Vec<&Element> {
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

fn walk<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    out.push(element);
    for child in &element.children {
        if let XMLNode::Element(e) = child {
            walk(e, out);
        }
    }
}

/// First descendant (depth-first, root excluded) with the given name.
pub(crate) fn find_descendant_mut<'a>(
    element: &'a mut Element,
    name: &str,
) -> Option<&'a mut Element> {
    for child in element.children.iter_mut() {
        if let XMLNode::Element(e) = child {
            if e.name == name {
                return Some(e);
            }
            if let Some(found) = find_descendant_mut(e, name) {
                return Some(found);
            }
        }
    }
    None
}

/// Leaf element carrying only a text node.
pub(crate) fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

/// Element with a single attribute set.
pub(crate) fn element_with_attr(name: &str, attr: &str, value: &str) -> Element {
    let mut element = Element::new(name);
    element.attributes.insert(attr.to_string(), value.to_string());
    element
}
