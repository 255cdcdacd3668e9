//! Document parsing and markup cleanup.

use scraper::Html;
use serpgraph_core::{Error, Result};

/// Parse raw markup into a queryable document.
///
/// The underlying parser is error-recovering, so the only hard failure here is
/// a payload with no usable markup at all.
pub fn parse_document(html: &str) -> Result<Html> {
    if html.trim().is_empty() {
        return Err(Error::DocumentParse("empty document".into()));
    }
    Ok(Html::parse_document(html))
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

const DROPPED_ELEMENTS: &[&str] = &["script", "style", "noscript"];

/// Re-serialize markup with scripts, styles and comments removed.
///
/// Used before archiving raw pages: the selector catalogues only ever address
/// element structure and text, so the executable payload is dead weight.
pub fn cleaned_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 2);
    write_node(doc.tree.root(), &mut out);
    out
}

fn write_node(node: ego_tree::NodeRef<'_, scraper::Node>, out: &mut String) {
    use scraper::Node;
    match node.value() {
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node(child, out);
            }
        }
        Node::Doctype(doctype) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(&doctype.name());
            out.push('>');
        }
        Node::Comment(_) | Node::ProcessingInstruction(_) => {}
        Node::Text(text) => push_escaped(&text.text, out),
        Node::Element(element) => {
            let name = element.name();
            if DROPPED_ELEMENTS.contains(&name) {
                return;
            }
            out.push('<');
            out.push_str(name);
            for (attr, value) in element.attrs() {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                push_attr_escaped(value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            for child in node.children() {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn push_escaped(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_attr_escaped(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
