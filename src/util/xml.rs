//! XML helpers.
//!
//! Reading goes through `roxmltree`; these functions only add the small
//! child-element conveniences the descriptor parsers need. Writing uses a
//! tiny element tree that renders indented XML with escaped attributes.

use std::fmt::Write as _;

use roxmltree::Node;

/// Iterate over the element children of `node`.
pub fn elements<'a, 'input: 'a>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Iterate over the element children of `node` with the given tag name.
pub fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

/// Find the first element child of `node` with the given tag name.
pub fn find_child<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &'static str) -> Option<Node<'a, 'input>> {
    children_named(node, tag).next()
}

/// Iterate over the children of every `<outer>` child, filtered by `inner`.
///
/// Descriptor files nest lists like `<dependencies><dependency/>...`; this
/// flattens the two levels.
pub fn nested<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    outer: &'static str,
    inner: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    children_named(node, outer).flat_map(move |n| children_named(n, inner))
}

/// Trimmed text content of an element, empty if there is none.
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// Non-empty attribute value.
pub fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).map(str::trim).filter(|v| !v.is_empty())
}

/// An element to be rendered as XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: Option<String>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Add an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add a child element.
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child element in place.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render as a standalone document with an XML declaration.
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.render(&mut out, 0);
        out
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str(" />\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape(text), self.name);
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{}  {}", indent, escape(text));
                }
                for child in &self.children {
                    child.render(out, depth + 1);
                }
                let _ = writeln!(out, "{}</{}>", indent, self.name);
            }
        }
    }
}

/// Escape text for use in attribute values and element content.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
