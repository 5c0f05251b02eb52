use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ApplyError, PathError};
use crate::ops::{Op, Path};

/// Attributes in source order, as `innerHTML` writes them back.
pub type Attrs = IndexMap<String, String>;

/// The editable region. Its direct children are the region's top-level
/// nodes; the empty path addresses the region itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn element(tag: impl Into<String>, attrs: Attrs, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            tag: tag.into(),
            attrs,
            children,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element("p", Attrs::default(), vec![Node::text(text)])
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element(el) => el.attrs.get(name).map(String::as_str),
            Node::Text(_) => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Elements marked `contenteditable="false"` are edited as one unit.
    pub fn is_atomic(&self) -> bool {
        self.attr("contenteditable")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    fn collect_editable_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&t.text),
            Node::Element(_) if self.is_atomic() => out.clear(),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_editable_text(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

/// A boundary point. Inside a text node `offset` is a byte offset on a
/// char boundary; inside a container it is a child index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn first_range(&self) -> Range {
        if self.anchor <= self.focus {
            Range::new(self.anchor.clone(), self.focus.clone())
        } else {
            Range::new(self.focus.clone(), self.anchor.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point.clone(), point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &ix in rest {
            node = match node {
                Node::Element(el) => el.children.get(ix)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Children of the container at `path`; `None` for text nodes and
    /// unresolved paths.
    pub fn children_at(&self, path: &[usize]) -> Option<&[Node]> {
        if path.is_empty() {
            return Some(&self.children);
        }
        match self.node(path)? {
            Node::Element(el) => Some(&el.children),
            Node::Text(_) => None,
        }
    }

    pub fn is_text(&self, path: &[usize]) -> bool {
        matches!(self.node(path), Some(Node::Text(_)))
    }

    pub fn contains_point(&self, point: &Point) -> bool {
        if let Some(Node::Text(t)) = self.node(&point.path) {
            return point.offset <= t.text.len() && t.text.is_char_boundary(point.offset);
        }
        self.children_at(&point.path)
            .is_some_and(|children| point.offset <= children.len())
    }

    /// The nearest node at or above `path` (the region itself excluded)
    /// that satisfies `pred`.
    pub fn closest(&self, path: &[usize], pred: impl Fn(&Node) -> bool) -> Option<Path> {
        let mut current = path.to_vec();
        while !current.is_empty() {
            if self.node(&current).is_some_and(&pred) {
                return Some(current);
            }
            current.pop();
        }
        None
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Text from the start of the point's node up to the point, the way a
    /// DOM range from `(node, 0)` to the point stringifies. An atomic element
    /// is a boundary: only the text after the last one counts.
    pub fn text_before(&self, point: &Point) -> Option<String> {
        if let Some(Node::Text(t)) = self.node(&point.path) {
            let end = clamp_to_char_boundary(&t.text, point.offset);
            return Some(t.text[..end].to_string());
        }
        let children = self.children_at(&point.path)?;
        let mut out = String::new();
        for child in children.iter().take(point.offset) {
            child.collect_editable_text(&mut out);
        }
        Some(out)
    }
}

pub fn child_path(parent: &[usize], index: usize) -> Path {
    let mut path = parent.to_vec();
    path.push(index);
    path
}

/// The container point immediately after the node at `path`.
pub fn point_after(path: &[usize]) -> Option<Point> {
    let (index, parent) = path.split_last()?;
    Some(Point::new(parent.to_vec(), index + 1))
}

/// The container point where the node at `path` starts.
pub fn point_before(path: &[usize]) -> Option<Point> {
    let (index, parent) = path.split_last()?;
    Some(Point::new(parent.to_vec(), *index))
}

/// Ops that place `node` at `point`, splitting a text node in two when the
/// point is inside text. Returns the ops and the path the node ends up at.
pub fn insert_node_ops(doc: &Document, point: &Point, node: Node) -> Option<(Vec<Op>, Path)> {
    if let Some(Node::Text(t)) = doc.node(&point.path) {
        let (index, parent) = point.path.split_last()?;
        return Some(split_text_ops(parent, *index, &t.text, point.offset, node));
    }

    let len = doc.children_at(&point.path)?.len();
    if point.offset > len {
        return None;
    }
    let path = child_path(&point.path, point.offset);
    Some((
        vec![Op::InsertNode {
            path: path.clone(),
            node,
        }],
        path,
    ))
}

/// Replaces the text node at `parent/index` (whose content is `text`) with
/// `text[..at]`, `node` and `text[at..]`. Empty halves are not created.
pub fn split_text_ops(
    parent: &[usize],
    index: usize,
    text: &str,
    at: usize,
    node: Node,
) -> (Vec<Op>, Path) {
    let at = clamp_to_char_boundary(text, at);
    let (left, right) = text.split_at(at);

    let mut ops = vec![Op::RemoveNode {
        path: child_path(parent, index),
    }];
    let mut next = index;
    if !left.is_empty() {
        ops.push(Op::InsertNode {
            path: child_path(parent, next),
            node: Node::text(left),
        });
        next += 1;
    }

    let node_path = child_path(parent, next);
    ops.push(Op::InsertNode {
        path: node_path.clone(),
        node,
    });

    if !right.is_empty() {
        ops.push(Op::InsertNode {
            path: child_path(parent, next + 1),
            node: Node::text(right),
        });
    }

    (ops, node_path)
}

pub(crate) fn apply_op_to(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    op: Op,
) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let text_node = node_text_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&text_node.text, offset);
            text_node.text.insert_str(offset, &text);
            for point in points_mut(selection) {
                if point.path == path && point.offset >= offset {
                    point.offset = point.offset.saturating_add(text.len());
                }
            }
            Ok(Op::RemoveText {
                path,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { path, range } => {
            let text_node = node_text_mut(doc, &path)?;
            let start = clamp_to_char_boundary(&text_node.text, range.start);
            let end = clamp_to_char_boundary(&text_node.text, range.end);
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = text_node.text[start..end].to_string();
            text_node.text.replace_range(start..end, "");
            for point in points_mut(selection) {
                if point.path != path || point.offset <= start {
                    continue;
                }
                point.offset = if point.offset >= end {
                    point.offset - (end - start)
                } else {
                    start
                };
            }
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            for point in points_mut(selection) {
                transform_point_insert_node(point, &path);
            }
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            for point in points_mut(selection) {
                transform_point_remove_node(point, &path);
            }
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
    }
}

fn points_mut(selection: &mut Option<Selection>) -> impl Iterator<Item = &mut Point> {
    selection
        .iter_mut()
        .flat_map(|sel| [&mut sel.anchor, &mut sel.focus])
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn transform_point_insert_node(point: &mut Point, path: &[usize]) {
    let Some((&index, parent)) = path.split_last() else {
        return;
    };
    let depth = parent.len();

    if point.path.len() > depth && point.path.starts_with(parent) {
        if point.path[depth] >= index {
            point.path[depth] += 1;
        }
    } else if point.path == parent && point.offset > index {
        point.offset += 1;
    }
}

fn transform_point_remove_node(point: &mut Point, path: &[usize]) {
    let Some((&index, parent)) = path.split_last() else {
        return;
    };
    let depth = parent.len();

    if point.path.len() > depth && point.path.starts_with(parent) {
        let ix = point.path[depth];
        if ix > index {
            point.path[depth] = ix - 1;
        } else if ix == index {
            // Point was inside the removed subtree; it collapses to where
            // the subtree used to start.
            *point = Point::new(parent.to_vec(), index);
        }
    } else if point.path == parent && point.offset > index {
        point.offset -= 1;
    }
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let (&first, rest) = path.split_first().ok_or(PathError::Empty)?;
    let len = doc.children.len();
    let mut node = doc
        .children
        .get_mut(first)
        .ok_or(PathError::OutOfBounds {
            depth: 0,
            index: first,
            len,
        })?;

    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Element(el) => {
                let len = el.children.len();
                el.children.get_mut(ix).ok_or(PathError::OutOfBounds {
                    depth: depth + 1,
                    index: ix,
                    len,
                })?
            }
            Node::Text(_) => return Err(PathError::NotContainer { depth }),
        };
    }
    Ok(node)
}

fn node_text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, PathError> {
    match node_mut(doc, path)? {
        Node::Text(t) => Ok(t),
        Node::Element(_) => Err(PathError::NotText {
            path: path.to_vec(),
        }),
    }
}

fn children_mut<'a>(doc: &'a mut Document, parent: &[usize]) -> Result<&'a mut Vec<Node>, PathError> {
    if parent.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Text(_) => Err(PathError::NotContainer {
            depth: parent.len() - 1,
        }),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let (&index, parent) = path.split_last().ok_or(PathError::Empty)?;
    let children = children_mut(doc, parent)?;
    if index > children.len() {
        return Err(PathError::OutOfBounds {
            depth: parent.len(),
            index,
            len: children.len(),
        });
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let (&index, parent) = path.split_last().ok_or(PathError::Empty)?;
    let children = children_mut(doc, parent)?;
    if index >= children.len() {
        return Err(PathError::OutOfBounds {
            depth: parent.len(),
            index,
            len: children.len(),
        });
    }
    Ok(children.remove(index))
}
