use tracing::{debug, warn};

use crate::core::{
    Node, Point, Range, Selection, clamp_to_char_boundary, insert_node_ops, point_after,
    split_text_ops,
};
use crate::ops::{Op, Path, Transaction};
use crate::surface::HostSurface;
use crate::widget::{Alias, AliasWidgetFactory, closest_token};

/// Places alias tokens into the document as single history steps.
#[derive(Debug, Clone, Default)]
pub struct TokenInsertionEngine {
    factory: AliasWidgetFactory,
}

impl TokenInsertionEngine {
    pub fn new(factory: AliasWidgetFactory) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &AliasWidgetFactory {
        &self.factory
    }

    /// Inserts a token at `range.start` and leaves the caret collapsed right
    /// after it. Returns the token's path, or `None` when nothing changed.
    pub fn insert_at_range<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        range: &Range,
        alias: &Alias,
    ) -> Option<Path> {
        let start = range.start.clone();
        let doc = surface.document();
        if !doc.contains_point(&start) {
            debug!(point = ?start, "insertion point does not resolve");
            return None;
        }
        if closest_token(doc, &start.path).is_some() {
            debug!(point = ?start, "insertion point is inside a token");
            return None;
        }

        surface.set_selection(Some(Selection::collapsed(start.clone())));

        let node = self.widget(alias)?;
        let (ops, path) = insert_node_ops(surface.document(), &start, node)?;
        self.commit(surface, ops, path, "alias:insert")
    }

    /// Replaces the `@query` that ends at `anchor` with a token. When that
    /// text is no longer there, inserts at the caret instead (or at
    /// `anchor` with no caret) and deletes nothing.
    pub fn replace_query_and_insert<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        anchor: &Point,
        query: &str,
        alias: &Alias,
    ) -> Option<Path> {
        if let Some((ops, path)) = self.query_replacement_ops(surface, anchor, query, alias) {
            return self.commit(surface, ops, path, "alias:mention");
        }

        let point = surface
            .selection()
            .map(|selection| selection.focus.clone())
            .unwrap_or_else(|| anchor.clone());
        debug!(?point, query, "query span is gone; inserting at caret");
        self.insert_at_range(surface, &Range::collapsed(point), alias)
    }

    fn query_replacement_ops<S: HostSurface + ?Sized>(
        &self,
        surface: &S,
        anchor: &Point,
        query: &str,
        alias: &Alias,
    ) -> Option<(Vec<Op>, Path)> {
        let doc = surface.document();
        let Some(Node::Text(t)) = doc.node(&anchor.path) else {
            return None;
        };
        if closest_token(doc, &anchor.path).is_some() {
            return None;
        }

        let needle = format!("@{query}");
        let end = clamp_to_char_boundary(&t.text, anchor.offset);
        if !t.text[..end].ends_with(&needle) {
            return None;
        }
        let start = end - needle.len();
        let remaining = format!("{}{}", &t.text[..start], &t.text[end..]);

        let node = self.widget(alias)?;
        let (index, parent) = anchor.path.split_last()?;
        let (split_ops, path) = split_text_ops(parent, *index, &remaining, start, node);

        let mut ops = vec![Op::RemoveText {
            path: anchor.path.clone(),
            range: start..end,
        }];
        ops.extend(split_ops);
        Some((ops, path))
    }

    fn widget(&self, alias: &Alias) -> Option<Node> {
        let markup = self.factory.render(alias);
        let node = self.factory.parse(&markup);
        if node.is_none() {
            warn!(alias = %alias.id, "token markup did not parse into a single element");
        }
        node
    }

    fn commit<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        ops: Vec<Op>,
        path: Path,
        source: &str,
    ) -> Option<Path> {
        let after = point_after(&path)?;
        let tx = Transaction::new(ops)
            .selection_after(Selection::collapsed(after))
            .source(source);
        match surface.apply(tx) {
            Ok(()) => {
                debug!(?path, source, "alias token inserted");
                Some(path)
            }
            Err(err) => {
                warn!(%err, source, "alias token insertion failed");
                None
            }
        }
    }
}
