mod layout;
mod memory;

use serde::{Deserialize, Serialize};

use crate::core::{Document, Point, Range, Selection};
use crate::error::{ApplyError, MarkupError};
use crate::event::{EventKind, Key};
use crate::listener::{ListenerId, ListenerOptions};
use crate::markup;
use crate::ops::Transaction;

pub use memory::MemorySurface;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub top: f32,
    pub left: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

/// The rich-text editing surface the alias engine runs against.
///
/// The surface owns the document tree and the native selection; the engine
/// only reads them and mutates through [`HostSurface::apply`].
pub trait HostSurface {
    fn document(&self) -> &Document;

    fn markup(&self) -> String {
        markup::serialize(&self.document().children)
    }

    /// `None` when the region has no active selection.
    fn selection(&self) -> Option<&Selection>;

    fn set_selection(&mut self, selection: Option<Selection>);

    /// Applies a transaction as one history step. A failing transaction
    /// leaves the document and selection unchanged.
    fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError>;

    /// Replaces the whole content with serialized markup.
    fn set_contents(&mut self, markup: &str) -> Result<(), MarkupError>;

    /// Fires the region's input notification for upstream observers.
    fn emit_input(&mut self);

    /// Runs the native editing behavior of `key`. Returns whether the
    /// content changed.
    fn perform_default_key(&mut self, key: &Key) -> bool;

    /// Client-space box of a collapsed caret at `point`.
    fn caret_rect(&self, point: &Point) -> Option<Rect>;

    /// Hit-tests client coordinates to a caret range.
    fn range_from_point(&self, x: f32, y: f32) -> Option<Range>;

    fn scroll_offset(&self) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn add_listener(&mut self, kind: EventKind, options: ListenerOptions) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId) -> bool;

    fn listeners(&self, kind: EventKind) -> Vec<ListenerId>;
}
