//! Parse markup fragments into detached [`Element`] trees.

use crate::page::Element;
use scraper::{ElementRef, Html, Node};

/// Parsed fragment: loose top-level text plus the top-level elements.
#[derive(Debug, Default)]
pub(crate) struct Fragment {
    pub text: String,
    pub nodes: Vec<ParsedNode>,
}

#[derive(Debug)]
pub(crate) struct ParsedNode {
    pub element: Element,
    pub children: Vec<ParsedNode>,
}

/// Parse `markup` as body content. Comments and doctypes are skipped and
/// runs of whitespace in text collapse to one space.
pub(crate) fn parse(markup: &str) -> Fragment {
    let html = Html::parse_fragment(markup);
    let (text, nodes) = convert_children(html.root_element());
    Fragment { text, nodes }
}

fn convert_children(parent: ElementRef<'_>) -> (String, Vec<ParsedNode>) {
    let mut text = String::new();
    let mut nodes = Vec::new();
    for child in parent.children() {
        match child.value() {
            Node::Text(t) => push_words(&mut text, t),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    nodes.push(convert(el));
                }
            }
            _ => {}
        }
    }
    (text, nodes)
}

fn convert(el: ElementRef<'_>) -> ParsedNode {
    let value = el.value();
    let mut element = Element::new(value.name());
    for (name, v) in value.attrs() {
        element = match name {
            "id" => element.with_id(v),
            "class" => element.with_class(v),
            _ => element.with_attr(name, v),
        };
    }
    let (text, children) = convert_children(el);
    ParsedNode {
        element: element.with_text(text),
        children,
    }
}

fn push_words(out: &mut String, text: &str) {
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
}
