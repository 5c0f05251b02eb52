use tracing::{debug, trace};

use crate::caret::CaretLocator;
use crate::core::{Range, Selection};
use crate::event::EventOutcome;
use crate::insert::TokenInsertionEngine;
use crate::surface::HostSurface;
use crate::widget::{Alias, closest_token};

/// Drag-and-drop of a palette alias onto the editing surface.
#[derive(Debug, Clone, Default)]
pub struct DragAliasSource {
    dragged: Option<Alias>,
    saved_range: Option<Range>,
    engine: TokenInsertionEngine,
}

impl DragAliasSource {
    pub fn new(engine: TokenInsertionEngine) -> Self {
        Self {
            dragged: None,
            saved_range: None,
            engine,
        }
    }

    pub fn drag_start(&mut self, alias: Alias) {
        debug!(alias = %alias.id, "alias drag started");
        self.dragged = Some(alias);
    }

    pub fn drag_end(&mut self) {
        self.dragged = None;
    }

    pub fn dragged(&self) -> Option<&Alias> {
        self.dragged.as_ref()
    }

    /// The caret range the pointer last hovered.
    pub fn saved_range(&self) -> Option<&Range> {
        self.saved_range.as_ref()
    }

    /// Tracks the drop position under the pointer and shows the caret there.
    pub fn on_drag_over<S: HostSurface + ?Sized>(&mut self, surface: &mut S, x: f32, y: f32) -> EventOutcome {
        if let Some(range) = CaretLocator::locate_from_pointer(surface, x, y) {
            trace!(?range, "drag caret moved");
            surface.set_selection(Some(Selection {
                anchor: range.start.clone(),
                focus: range.end.clone(),
            }));
            self.saved_range = Some(range);
        }
        EventOutcome::ignored().prevent_default()
    }

    pub fn on_drop<S: HostSurface + ?Sized>(&mut self, surface: &mut S, target: Option<&[usize]>) -> EventOutcome {
        let outcome = EventOutcome::ignored().prevent_default();
        let saved_range = self.saved_range.take();

        let Some(alias) = self.dragged.clone() else {
            return outcome;
        };
        let Some(range) = saved_range else {
            debug!("drop without a hovered caret position");
            return outcome;
        };

        let doc = surface.document();
        if target.is_some_and(|target| closest_token(doc, target).is_some())
            || closest_token(doc, &range.start.path).is_some()
        {
            debug!(alias = %alias.id, "drop onto a token ignored");
            return outcome;
        }

        let inserted = self.engine.insert_at_range(surface, &range, &alias).is_some();
        let notify = self.engine.factory().config().notify_on_insert;
        outcome.changed(inserted && notify)
    }
}
