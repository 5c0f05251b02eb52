use tracing::{debug, trace, warn};

use crate::config::SurfaceConfig;
use crate::core::{
    Document, Node, Point, Range, Selection, apply_op_to, child_path, clamp_to_char_boundary,
    insert_node_ops, point_after,
};
use crate::error::{ApplyError, MarkupError};
use crate::event::{EventKind, Key};
use crate::listener::{ListenerId, ListenerOptions, ListenerRegistry};
use crate::markup;
use crate::ops::{Op, Path, Transaction};
use crate::surface::layout::caret_stops;
use crate::surface::{HostSurface, Rect};

#[derive(Debug, Clone)]
struct UndoRecord {
    inverse_ops: Vec<Op>,
    selection_before: Option<Selection>,
    selection_after: Option<Selection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

/// An in-memory editing surface: a DOM-like tree, a native selection,
/// undo history, a monospace layout for caret geometry, and the native
/// editing behavior of the keys a user types.
#[derive(Debug)]
pub struct MemorySurface {
    doc: Document,
    selection: Option<Selection>,
    config: SurfaceConfig,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    listeners: ListenerRegistry,
    scroll: (f32, f32),
    input_count: u64,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl MemorySurface {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            selection: None,
            config: SurfaceConfig::default().with_defaults(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            listeners: ListenerRegistry::default(),
            scroll: (0.0, 0.0),
            input_count: 0,
        }
    }

    pub fn from_markup(markup: &str) -> Result<Self, MarkupError> {
        Ok(Self::new(Document::new(markup::parse_fragment(markup)?)))
    }

    pub fn with_config(mut self, config: SurfaceConfig) -> Self {
        self.config = config.with_defaults();
        self
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn set_caret(&mut self, point: Point) {
        self.selection = Some(Selection::collapsed(point));
    }

    pub fn set_scroll_offset(&mut self, x: f32, y: f32) {
        self.scroll = (x, y);
    }

    /// Number of input notifications fired so far.
    pub fn input_count(&self) -> u64 {
        self.input_count
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut redo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops {
            match apply_op_to(&mut self.doc, &mut self.selection, op) {
                Ok(inv) => redo_ops.push(inv),
                Err(err) => {
                    warn!(%err, "undo stopped at an op that no longer applies");
                    break;
                }
            }
        }
        redo_ops.reverse();

        self.selection = selection_before.clone();
        self.redo_stack.push(UndoRecord {
            inverse_ops: redo_ops,
            selection_before,
            selection_after,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut undo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops {
            match apply_op_to(&mut self.doc, &mut self.selection, op) {
                Ok(inv) => undo_ops.push(inv),
                Err(err) => {
                    warn!(%err, "redo stopped at an op that no longer applies");
                    break;
                }
            }
        }
        undo_ops.reverse();

        self.selection = selection_after.clone();
        self.undo_stack.push(UndoRecord {
            inverse_ops: undo_ops,
            selection_before,
            selection_after,
        });
        true
    }

    /// Applies `ops` in order and returns their inverses, ready to be
    /// applied. On failure everything already applied is reverted.
    fn apply_ops(&mut self, ops: Vec<Op>) -> Result<Vec<Op>, ApplyError> {
        let selection_before = self.selection.clone();
        let mut inverse_ops: Vec<Op> = Vec::with_capacity(ops.len());
        for op in ops {
            match apply_op_to(&mut self.doc, &mut self.selection, op) {
                Ok(inv) => inverse_ops.push(inv),
                Err(err) => {
                    inverse_ops.reverse();
                    self.revert(inverse_ops, selection_before);
                    return Err(err);
                }
            }
        }
        inverse_ops.reverse();
        Ok(inverse_ops)
    }

    fn revert(&mut self, inverse_ops: Vec<Op>, selection: Option<Selection>) {
        for op in inverse_ops {
            if let Err(err) = apply_op_to(&mut self.doc, &mut self.selection, op) {
                warn!(%err, "failed to revert op");
            }
        }
        self.selection = selection;
    }

    fn selection_resolves(&self, selection: &Selection) -> bool {
        self.doc.contains_point(&selection.anchor) && self.doc.contains_point(&selection.focus)
    }

    fn caret(&self) -> Option<Point> {
        let selection = self.selection.as_ref()?;
        if !selection.is_collapsed() {
            return None;
        }
        let caret = selection.focus.clone();
        // The caret never edits inside an atomic widget.
        if self.doc.closest(&caret.path, Node::is_atomic).is_some() {
            return None;
        }
        Some(caret)
    }

    fn native_edit(&mut self, ops: Vec<Op>, after: Point, source: &str) -> bool {
        let tx = Transaction::new(ops)
            .selection_after(Selection::collapsed(after))
            .source(source);
        match self.apply(tx) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, source, "native edit rejected");
                false
            }
        }
    }

    fn native_insert_text(&mut self, text: &str) -> bool {
        let Some(caret) = self.caret() else {
            return false;
        };

        if let Some(Node::Text(t)) = self.doc.node(&caret.path) {
            let offset = clamp_to_char_boundary(&t.text, caret.offset);
            let after = Point::new(caret.path.clone(), offset + text.len());
            let op = Op::InsertText {
                path: caret.path,
                offset,
                text: text.to_string(),
            };
            return self.native_edit(vec![op], after, "native:insert_text");
        }

        let Some(children) = self.doc.children_at(&caret.path) else {
            return false;
        };

        let before = caret.offset.checked_sub(1).and_then(|ix| children.get(ix));
        let (op, after) = match (before, children.get(caret.offset)) {
            (Some(Node::Text(prev)), _) => {
                let path = child_path(&caret.path, caret.offset - 1);
                let offset = prev.text.len();
                (
                    Op::InsertText {
                        path: path.clone(),
                        offset,
                        text: text.to_string(),
                    },
                    Point::new(path, offset + text.len()),
                )
            }
            (_, Some(Node::Text(_))) => {
                let path = child_path(&caret.path, caret.offset);
                (
                    Op::InsertText {
                        path: path.clone(),
                        offset: 0,
                        text: text.to_string(),
                    },
                    Point::new(path, text.len()),
                )
            }
            _ => {
                let path = child_path(&caret.path, caret.offset);
                (
                    Op::InsertNode {
                        path: path.clone(),
                        node: Node::text(text),
                    },
                    Point::new(path, text.len()),
                )
            }
        };
        self.native_edit(vec![op], after, "native:insert_text")
    }

    fn native_line_break(&mut self) -> bool {
        let Some(caret) = self.caret() else {
            return false;
        };
        let br = Node::element("br", Default::default(), Vec::new());
        let Some((ops, br_path)) = insert_node_ops(&self.doc, &caret, br) else {
            return false;
        };
        let Some(after) = point_after(&br_path) else {
            return false;
        };
        self.native_edit(ops, after, "native:line_break")
    }

    fn native_delete(&mut self, direction: Direction) -> bool {
        let Some(caret) = self.caret() else {
            return false;
        };

        match self.doc.node(&caret.path) {
            Some(Node::Text(t)) => {
                let text = t.text.clone();
                self.delete_from_text(caret, &text, direction)
            }
            _ => self.delete_from_container(caret, direction),
        }
    }

    fn delete_from_text(&mut self, caret: Point, text: &str, direction: Direction) -> bool {
        let offset = clamp_to_char_boundary(text, caret.offset);
        let Some((&index, parent)) = caret.path.split_last() else {
            return false;
        };

        match direction {
            Direction::Backward if offset > 0 => {
                let start = prev_boundary(text, offset);
                let op = Op::RemoveText {
                    path: caret.path.clone(),
                    range: start..offset,
                };
                self.native_edit(vec![op], Point::new(caret.path, start), "native:backspace")
            }
            Direction::Forward if offset < text.len() => {
                let end = next_boundary(text, offset);
                let op = Op::RemoveText {
                    path: caret.path.clone(),
                    range: offset..end,
                };
                self.native_edit(vec![op], Point::new(caret.path, offset), "native:delete")
            }
            Direction::Backward => {
                let Some(prev_ix) = index.checked_sub(1) else {
                    return false;
                };
                let sibling_path = child_path(parent, prev_ix);
                match self.doc.node(&sibling_path) {
                    // Browsers drop a non-editable neighbor as a whole.
                    Some(node) if node.is_atomic() => {
                        let after = Point::new(child_path(parent, index - 1), 0);
                        let op = Op::RemoveNode { path: sibling_path };
                        self.native_edit(vec![op], after, "native:backspace")
                    }
                    Some(Node::Text(prev)) if !prev.text.is_empty() => {
                        let end = prev.text.len();
                        let start = prev_boundary(&prev.text, end);
                        let op = Op::RemoveText {
                            path: sibling_path.clone(),
                            range: start..end,
                        };
                        self.native_edit(vec![op], Point::new(sibling_path, start), "native:backspace")
                    }
                    _ => false,
                }
            }
            Direction::Forward => {
                let sibling_path = child_path(parent, index + 1);
                match self.doc.node(&sibling_path) {
                    Some(node) if node.is_atomic() => {
                        let op = Op::RemoveNode { path: sibling_path };
                        self.native_edit(vec![op], caret, "native:delete")
                    }
                    Some(Node::Text(next)) if !next.text.is_empty() => {
                        let end = next_boundary(&next.text, 0);
                        let op = Op::RemoveText {
                            path: sibling_path,
                            range: 0..end,
                        };
                        self.native_edit(vec![op], caret, "native:delete")
                    }
                    _ => false,
                }
            }
        }
    }

    /// Plain character deletion next to a container caret. Like native
    /// contenteditable, it reaches into the neighboring element and eats a
    /// single character of its text.
    fn delete_from_container(&mut self, caret: Point, direction: Direction) -> bool {
        let neighbor_ix = match direction {
            Direction::Backward => match caret.offset.checked_sub(1) {
                Some(ix) => ix,
                None => return false,
            },
            Direction::Forward => caret.offset,
        };
        let neighbor_path = child_path(&caret.path, neighbor_ix);
        let Some(neighbor) = self.doc.node(&neighbor_path) else {
            return false;
        };

        let text_path = match direction {
            Direction::Backward => edge_text_path(neighbor, &neighbor_path, true),
            Direction::Forward => edge_text_path(neighbor, &neighbor_path, false),
        };
        let Some(text_path) = text_path else {
            let op = Op::RemoveNode {
                path: neighbor_path,
            };
            let after = Point::new(caret.path.clone(), neighbor_ix);
            return self.native_edit(vec![op], after, "native:delete_node");
        };

        let Some(Node::Text(t)) = self.doc.node(&text_path) else {
            return false;
        };
        let range = match direction {
            Direction::Backward => prev_boundary(&t.text, t.text.len())..t.text.len(),
            Direction::Forward => 0..next_boundary(&t.text, 0),
        };
        let after = match direction {
            Direction::Backward => Point::new(text_path.clone(), range.start),
            Direction::Forward => caret,
        };
        let op = Op::RemoveText {
            path: text_path,
            range,
        };
        self.native_edit(vec![op], after, "native:delete_char")
    }
}

/// The last (or first) non-empty text node at or below `node`.
fn edge_text_path(node: &Node, path: &[usize], last: bool) -> Option<Path> {
    match node {
        Node::Text(t) if !t.text.is_empty() => Some(path.to_vec()),
        Node::Text(_) => None,
        Node::Element(el) => {
            let mut indexed: Vec<(usize, &Node)> = el.children.iter().enumerate().collect();
            if last {
                indexed.reverse();
            }
            indexed
                .into_iter()
                .find_map(|(ix, child)| edge_text_path(child, &child_path(path, ix), last))
        }
    }
}

fn prev_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .char_indices()
        .next_back()
        .map_or(0, |(ix, _)| ix)
}

fn next_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map_or(offset, |ch| offset + ch.len_utf8())
}

impl HostSurface for MemorySurface {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.filter(|sel| self.selection_resolves(sel));
    }

    fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let source = tx.meta.source.clone().unwrap_or_default();

        // Nothing to undo; only the selection moves.
        if tx.is_empty() {
            if let Some(selection) = tx.selection_after {
                if !self.selection_resolves(&selection) {
                    return Err(ApplyError::InvalidSelection);
                }
                self.selection = Some(selection);
            }
            trace!(source = %source, "empty transaction");
            return Ok(());
        }

        let selection_before = self.selection.clone();

        let inverse_ops = match self.apply_ops(tx.ops) {
            Ok(ops) => ops,
            Err(err) => {
                warn!(%err, source = %source, "transaction rejected");
                return Err(err);
            }
        };

        if let Some(selection) = tx.selection_after {
            if !self.selection_resolves(&selection) {
                self.revert(inverse_ops, selection_before);
                warn!(source = %source, "transaction selection does not resolve");
                return Err(ApplyError::InvalidSelection);
            }
            self.selection = Some(selection);
        }

        trace!(source = %source, ops = inverse_ops.len(), "transaction applied");
        self.undo_stack.push(UndoRecord {
            inverse_ops,
            selection_before,
            selection_after: self.selection.clone(),
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > self.config.max_undo {
            self.undo_stack.remove(0);
        }
        Ok(())
    }

    fn set_contents(&mut self, markup: &str) -> Result<(), MarkupError> {
        let children = markup::parse_fragment(markup)?;
        self.doc = Document::new(children);
        self.selection = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
        debug!(nodes = self.doc.children.len(), "contents replaced");
        Ok(())
    }

    fn emit_input(&mut self) {
        self.input_count += 1;
        trace!(count = self.input_count, "input notification");
    }

    fn perform_default_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Character(ch) => self.native_insert_text(&ch.to_string()),
            Key::Space => self.native_insert_text(" "),
            Key::Enter => self.native_line_break(),
            Key::Backspace => self.native_delete(Direction::Backward),
            Key::Delete => self.native_delete(Direction::Forward),
            Key::Tab
            | Key::Escape
            | Key::ArrowUp
            | Key::ArrowDown
            | Key::ArrowLeft
            | Key::ArrowRight => false,
        }
    }

    fn caret_rect(&self, point: &Point) -> Option<Rect> {
        let stop = caret_stops(&self.doc)
            .into_iter()
            .find(|stop| stop.point == *point)?;
        let top = stop.line as f32 * self.config.line_height - self.scroll.1;
        let left = stop.col as f32 * self.config.char_width - self.scroll.0;
        Some(Rect {
            top,
            left,
            bottom: top + self.config.line_height,
            right: left,
        })
    }

    fn range_from_point(&self, x: f32, y: f32) -> Option<Range> {
        let page_x = x + self.scroll.0;
        let page_y = y + self.scroll.1;
        if page_x < 0.0 || page_y < 0.0 {
            return None;
        }

        let line = (page_y / self.config.line_height).floor() as usize;
        let col = (page_x / self.config.char_width).round() as usize;

        // Prefer text outside atomic widgets, then container boundaries,
        // then anything inside a widget.
        let stop = caret_stops(&self.doc)
            .into_iter()
            .filter(|stop| stop.line == line)
            .enumerate()
            .min_by_key(|(order, stop)| {
                let rank: u8 = if self.doc.closest(&stop.point.path, Node::is_atomic).is_some() {
                    2
                } else if self.doc.is_text(&stop.point.path) {
                    0
                } else {
                    1
                };
                (stop.col.abs_diff(col), rank, *order)
            })
            .map(|(_, stop)| stop)?;

        trace!(x, y, point = ?stop.point, "hit-tested caret");
        Some(Range::collapsed(stop.point))
    }

    fn scroll_offset(&self) -> (f32, f32) {
        self.scroll
    }

    fn add_listener(&mut self, kind: EventKind, options: ListenerOptions) -> ListenerId {
        self.listeners.add(kind, options)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn listeners(&self, kind: EventKind) -> Vec<ListenerId> {
        self.listeners.listeners(kind)
    }
}
