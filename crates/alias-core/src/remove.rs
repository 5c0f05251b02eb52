use tracing::{debug, warn};

use crate::core::{Selection, child_path, point_before};
use crate::event::{EventOutcome, Key, PointerTarget};
use crate::ops::{Op, Transaction};
use crate::surface::HostSurface;
use crate::widget::{ALIAS_DELETE_ATTR, closest_token, is_token};

/// Deletes alias tokens as whole units, from their delete control or from
/// Backspace/Delete next to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRemovalEngine;

impl TokenRemovalEngine {
    /// Window-wide pointer handler. Only activations of a token's delete
    /// control (or anything inside it) remove the token.
    pub fn handle_pointer_activation<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        target: &PointerTarget,
    ) -> EventOutcome {
        let PointerTarget::Region(path) = target else {
            return EventOutcome::ignored();
        };

        let doc = surface.document();
        let Some(token) = closest_token(doc, path) else {
            return EventOutcome::ignored();
        };
        let marker = doc.closest(path, |node| node.has_attr(ALIAS_DELETE_ATTR));
        if !marker.is_some_and(|marker| marker.starts_with(&token)) {
            return EventOutcome::ignored();
        }

        let changed = self.remove_token(surface, &token);
        EventOutcome::ignored().changed(changed)
    }

    /// Backspace/Delete with the caret between element children removes the
    /// adjacent token. Carets inside text are left to native editing.
    pub fn handle_key_intent<S: HostSurface + ?Sized>(
        &self,
        surface: &mut S,
        key: &Key,
    ) -> EventOutcome {
        let Some(selection) = surface.selection() else {
            return EventOutcome::ignored();
        };
        if !selection.is_collapsed() {
            return EventOutcome::ignored();
        }
        let caret = selection.focus.clone();
        if surface.document().is_text(&caret.path) {
            return EventOutcome::ignored();
        }

        let index = match key {
            Key::Backspace => caret.offset.checked_sub(1),
            Key::Delete => Some(caret.offset),
            _ => None,
        };
        let Some(index) = index else {
            return EventOutcome::ignored();
        };

        let candidate = child_path(&caret.path, index);
        if !surface.document().node(&candidate).is_some_and(is_token) {
            return EventOutcome::ignored();
        }

        let changed = self.remove_token(surface, &candidate);
        EventOutcome::ignored().prevent_default().changed(changed)
    }

    /// Removes the token at `path` in one history step and collapses the
    /// caret where it was.
    pub fn remove_token<S: HostSurface + ?Sized>(&self, surface: &mut S, path: &[usize]) -> bool {
        if !surface.document().node(path).is_some_and(is_token) {
            return false;
        }
        let Some(caret) = point_before(path) else {
            return false;
        };

        let tx = Transaction::new(vec![Op::RemoveNode {
            path: path.to_vec(),
        }])
        .selection_after(Selection::collapsed(caret))
        .source("alias:remove");

        match surface.apply(tx) {
            Ok(()) => {
                debug!(?path, "alias token removed");
                true
            }
            Err(err) => {
                warn!(%err, ?path, "alias token removal failed");
                false
            }
        }
    }
}
