//! Owned SVG tree: parsing, building and serialization.
//!
//! Source documents are parsed with [`roxmltree`] (read-only, borrowed) and
//! immediately converted into an owned [`Element`] tree. Generated elements
//! are built by insertion into fresh trees, so a node never belongs to two
//! parents: children of a sprite root are *cloned* into the `<symbol>`,
//! never moved. Trees are written back out through [`quick_xml::Writer`].
//!
//! # Modules
//!
//! - [`attributes`]: which source-root attributes may be copied onto which
//!   generated element
//! - [`geometry`]: width/height/viewBox resolution per sprite

pub mod attributes;
pub mod geometry;

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::{self, Write};
use thiserror::Error;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("document has no root element")]
    NoRootElement,
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// A node in an owned SVG tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its qualified name (`prefix:local` or `local`),
/// attributes in document order, and children.
///
/// Namespace declarations are ordinary attributes here (`xmlns`,
/// `xmlns:xlink`), which keeps serialization a straight walk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute lookup ignoring ASCII case (`viewBox` matches `viewbox`).
    pub fn attribute_ignore_case(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, overwriting in place when it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Whether a direct child element has exactly this (case-sensitive) name.
    pub fn has_child_element(&self, name: &str) -> bool {
        self.child_elements().any(|e| e.name == name)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize the subtree. Childless elements self-close.
    pub fn to_xml_string(&self) -> String {
        let mut writer = Writer::new(Vec::new());
        // A Vec sink never reports an I/O error.
        let _ = self.write_xml(&mut writer);
        String::from_utf8_lossy(&writer.into_inner()).into_owned()
    }

    /// Write the subtree as quick-xml events. Attribute values are fully
    /// escaped; text only escapes `&`, `<` and `>`.
    pub fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start));
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_xml(writer)?,
                Node::Text(t) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(t.as_str()))))?;
                }
                Node::Comment(c) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Element(e) => collect_text(e, out),
            Node::Text(t) => out.push_str(t),
            Node::Comment(_) => {}
        }
    }
}

/// Parse SVG text into an owned tree rooted at the document element.
///
/// DTDs are allowed (editors like to emit them); processing instructions
/// are dropped.
pub fn parse_document(text: &str) -> Result<Element, ParseError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(|e| match e {
        roxmltree::Error::NoRootNode => ParseError::NoRootElement,
        other => ParseError::Malformed(other.to_string()),
    })?;
    Ok(convert_element(doc.root_element()))
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qualified_name(node, tag.namespace(), tag.name()));

    for (prefix, uri) in declared_namespaces(node) {
        let name = match prefix {
            Some(p) => format!("xmlns:{p}"),
            None => "xmlns".to_string(),
        };
        element.attributes.push((name, uri));
    }
    for attr in node.attributes() {
        element.attributes.push((
            qualified_name(node, attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    for child in node.children() {
        match child.node_type() {
            roxmltree::NodeType::Element => element.push_element(convert_element(child)),
            roxmltree::NodeType::Text => {
                if let Some(text) = child.text() {
                    element.children.push(Node::Text(text.to_string()));
                }
            }
            roxmltree::NodeType::Comment => {
                if let Some(text) = child.text() {
                    element.children.push(Node::Comment(text.to_string()));
                }
            }
            _ => {}
        }
    }
    element
}

/// Namespaces declared on this element itself, not inherited from its parent.
fn declared_namespaces(node: roxmltree::Node<'_, '_>) -> Vec<(Option<String>, String)> {
    let parent = node.parent_element();
    node.namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| {
            parent.is_none_or(|p| {
                !p.namespaces()
                    .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
            })
        })
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect()
}

fn qualified_name(node: roxmltree::Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_prefixed_attribute_names() {
        let root = parse_document(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##,
        )
        .unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attribute("xmlns"), Some(SVG_NAMESPACE));
        assert_eq!(root.attribute("xmlns:xlink"), Some(XLINK_NAMESPACE));
        let use_el = root.child_elements().next().unwrap();
        assert_eq!(use_el.name, "use");
        assert_eq!(use_el.attribute("xlink:href"), Some("#a"));
    }

    #[test]
    fn nested_elements_do_not_redeclare_inherited_namespaces() {
        let root = parse_document(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><path d="M0 0"/></g></svg>"#,
        )
        .unwrap();
        let g = root.child_elements().next().unwrap();
        assert!(g.attribute("xmlns").is_none());
    }

    #[test]
    fn parse_allows_doctype() {
        let text = r#"<?xml version="1.0"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg viewBox="0 0 1 1"/>"#;
        assert!(parse_document(text).is_ok());
    }

    #[test]
    fn parse_reports_missing_root() {
        assert_eq!(
            parse_document(r#"<?xml version="1.0"?>"#),
            Err(ParseError::NoRootElement)
        );
    }

    #[test]
    fn parse_reports_malformed() {
        assert!(matches!(
            parse_document("<svg><g></svg>"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn serialize_escapes_text_and_attributes() {
        let mut el = Element::new("title");
        el.set_attribute("data-x", "a\"b&c");
        el.children.push(Node::Text("1 < 2".into()));
        assert_eq!(
            el.to_xml_string(),
            r#"<title data-x="a&quot;b&amp;c">1 &lt; 2</title>"#
        );
    }

    #[test]
    fn text_keeps_quotes_while_attributes_escape_them() {
        let mut el = Element::new("style");
        el.set_attribute("media", "a>'b'");
        el.children
            .push(Node::Text(r#"text { font-family: 'x', "y"; } a > b"#.into()));
        assert_eq!(
            el.to_xml_string(),
            r#"<style media="a&gt;&apos;b&apos;">text { font-family: 'x', "y"; } a &gt; b</style>"#
        );
    }

    #[test]
    fn nested_tree_writes_start_and_end_tags() {
        let root = parse_document(r#"<svg><g id="a"><path d="M0 0"/>t</g></svg>"#).unwrap();
        assert_eq!(
            root.to_xml_string(),
            r#"<svg><g id="a"><path d="M0 0"/>t</g></svg>"#
        );
    }

    #[test]
    fn empty_element_self_closes() {
        let mut el = Element::new("path");
        el.set_attribute("d", "M0 0");
        assert_eq!(el.to_xml_string(), r#"<path d="M0 0"/>"#);
    }

    #[test]
    fn set_attribute_overwrites_in_place() {
        let mut el = Element::new("svg");
        el.set_attribute("a", "1");
        el.set_attribute("b", "2");
        el.set_attribute("a", "3");
        assert_eq!(
            el.attributes,
            vec![("a".into(), "3".into()), ("b".into(), "2".into())]
        );
    }

    #[test]
    fn attribute_lookup_ignoring_case() {
        let root = parse_document(r#"<svg viewbox="0 0 1 1"/>"#).unwrap();
        assert_eq!(root.attribute_ignore_case("viewBox"), Some("0 0 1 1"));
        assert_eq!(root.attribute("viewBox"), None);
    }

    #[test]
    fn round_trip_preserves_comments() {
        let root = parse_document("<svg><!-- hi --><g/></svg>").unwrap();
        assert_eq!(root.to_xml_string(), "<svg><!-- hi --><g/></svg>");
    }
}
