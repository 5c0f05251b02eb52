//! Reading and writing the HTML fragments that the editing surface accepts
//! as content.
//!
//! The reader recovers the way a browser does: comments and doctypes are
//! skipped, void elements never take an end tag, elements whose end tag HTML
//! lets you omit (`p`, `li`, table cells) close when a sibling opens, stray
//! end tags are dropped and anything still open at the end is closed. Only a
//! tag cut off before its `>` is reported as a [`MarkupError`].

use std::sync::OnceLock;

use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

use crate::core::{Attrs, ElementNode, Node};
use crate::error::MarkupError;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const IMPLIED_END_TAGS: &[&str] = &[
    "colgroup", "dd", "dt", "li", "option", "p", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Open elements that a start tag of `tag` closes first.
fn implied_closes(tag: &str) -> &'static [&'static str] {
    match tag {
        "li" => &["li"],
        "dt" | "dd" => &["dt", "dd"],
        "td" | "th" => &["td", "th"],
        "tr" => &["tr", "td", "th"],
        "thead" | "tbody" | "tfoot" => &["thead", "tbody", "tfoot", "tr", "td", "th"],
        "option" => &["option"],
        "address" | "article" | "aside" | "blockquote" | "div" | "dl" | "fieldset" | "footer"
        | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hr" | "main" | "nav"
        | "ol" | "p" | "pre" | "section" | "table" | "ul" => &["p"],
        _ => &[],
    }
}

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r#"(?s)<!--.*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9:_-]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
        )
        .expect("tag regex must compile")
    })
}

fn attr_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute regex must compile")
    })
}

fn entity_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]*);")
            .expect("entity regex must compile")
    })
}

fn stray_tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"<[/!A-Za-z]").expect("stray tag regex must compile"))
}

struct OpenElement {
    element: ElementNode,
}

/// Parses an HTML fragment into top-level nodes.
pub fn parse_fragment(input: &str) -> Result<Vec<Node>, MarkupError> {
    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut cursor = 0usize;

    for caps in tag_regex().captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        push_text(&input[cursor..whole.start()], cursor, &mut stack, &mut roots)?;
        cursor = whole.end();

        // Comments, doctypes and other `<!...>` constructs carry no content.
        let Some(name) = caps.get(2) else {
            continue;
        };
        let tag = name.as_str().to_ascii_lowercase();
        let is_end = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        if is_end {
            if !is_void_tag(&tag) {
                close_element(&tag, &mut stack, &mut roots);
            }
            continue;
        }

        close_implied(&tag, &mut stack, &mut roots);

        let attrs = parse_attrs(caps.get(3).map(|m| m.as_str()).unwrap_or(""));
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());
        let element = ElementNode {
            tag,
            attrs,
            children: Vec::new(),
        };

        if self_closing || is_void_tag(&element.tag) {
            append(Node::Element(element), &mut stack, &mut roots);
        } else {
            stack.push(OpenElement { element });
        }
    }

    push_text(&input[cursor..], cursor, &mut stack, &mut roots)?;
    pop_to(0, &mut stack, &mut roots);

    Ok(roots)
}

fn push_text(
    raw: &str,
    offset: usize,
    stack: &mut [OpenElement],
    roots: &mut Vec<Node>,
) -> Result<(), MarkupError> {
    if raw.is_empty() {
        return Ok(());
    }
    if let Some(stray) = stray_tag_regex().find(raw) {
        return Err(MarkupError::UnterminatedTag {
            offset: offset + stray.start(),
        });
    }

    let text = decode_entities(raw);
    let children = match stack.last_mut() {
        Some(open) => &mut open.element.children,
        None => roots,
    };
    if let Some(Node::Text(last)) = children.last_mut() {
        last.text.push_str(&text);
    } else {
        children.push(Node::text(text));
    }
    Ok(())
}

fn append(node: Node, stack: &mut [OpenElement], roots: &mut Vec<Node>) {
    match stack.last_mut() {
        Some(open) => open.element.children.push(node),
        None => roots.push(node),
    }
}

/// Closes every open element from `position` up.
fn pop_to(position: usize, stack: &mut Vec<OpenElement>, roots: &mut Vec<Node>) {
    while stack.len() > position {
        let Some(open) = stack.pop() else {
            break;
        };
        append(Node::Element(open.element), stack, roots);
    }
}

/// Closes `tag` and everything opened inside it. An end tag with no open
/// element is dropped.
fn close_element(tag: &str, stack: &mut Vec<OpenElement>, roots: &mut Vec<Node>) {
    if let Some(position) = stack.iter().rposition(|open| open.element.tag == tag) {
        pop_to(position, stack, roots);
    }
}

/// Closes the outermost element that `tag` ends implicitly. The search only
/// crosses elements whose own end tag is optional, so `<li>` inside a nested
/// list leaves the outer item open.
fn close_implied(tag: &str, stack: &mut Vec<OpenElement>, roots: &mut Vec<Node>) {
    let closes = implied_closes(tag);
    if closes.is_empty() {
        return;
    }
    let target = stack
        .iter()
        .enumerate()
        .rev()
        .take_while(|(_, open)| IMPLIED_END_TAGS.contains(&open.element.tag.as_str()))
        .filter(|(_, open)| closes.contains(&open.element.tag.as_str()))
        .map(|(position, _)| position)
        .last();
    if let Some(position) = target {
        pop_to(position, stack, roots);
    }
}

fn parse_attrs(raw: &str) -> Attrs {
    let mut attrs = Attrs::new();
    for caps in attr_regex().captures_iter(raw) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| decode_entities(m.as_str()))
            .unwrap_or_default();
        attrs
            .entry(name.as_str().to_ascii_lowercase())
            .or_insert(value);
    }
    attrs
}

pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    entity_regex()
        .replace_all(raw, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else {
                resolve_html5_entity(body).map(str::to_string)
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Serializes nodes the way `innerHTML` does: attributes double-quoted,
/// void elements without an end tag.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => escape_into(&t.text, false, out),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if is_void_tag(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_into(raw: &str, attr: bool, out: &mut String) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}
