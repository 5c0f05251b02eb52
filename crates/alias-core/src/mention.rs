use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::caret::CaretLocator;
use crate::event::{EventOutcome, Key};
use crate::insert::TokenInsertionEngine;
use crate::ops::Path;
use crate::surface::{HostSurface, Position};
use crate::widget::Alias;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MentionState {
    #[default]
    Idle,
    Querying {
        query: String,
        position: Position,
        highlighted: usize,
    },
    /// Dismissed with Escape; input is ignored until a word break.
    Cooldown,
}

/// What a suggestion panel renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestionState {
    pub show_panel: bool,
    pub query: String,
    pub position: Position,
    pub highlighted_index: Option<usize>,
    pub disabled_until_next_break: bool,
}

/// The `@mention` autocomplete state machine.
#[derive(Debug, Clone)]
pub struct MentionController {
    catalog: Vec<Alias>,
    state: MentionState,
    engine: TokenInsertionEngine,
}

impl MentionController {
    pub fn new(catalog: Vec<Alias>, engine: TokenInsertionEngine) -> Self {
        Self {
            catalog,
            state: MentionState::Idle,
            engine,
        }
    }

    pub fn catalog(&self) -> &[Alias] {
        &self.catalog
    }

    pub fn state(&self) -> &MentionState {
        &self.state
    }

    pub fn query(&self) -> Option<&str> {
        match &self.state {
            MentionState::Querying { query, .. } => Some(query),
            _ => None,
        }
    }

    pub fn suggestion_state(&self) -> SuggestionState {
        match &self.state {
            MentionState::Idle => SuggestionState::default(),
            MentionState::Querying {
                query,
                position,
                highlighted,
            } => SuggestionState {
                show_panel: true,
                query: query.clone(),
                position: *position,
                highlighted_index: Some(*highlighted),
                disabled_until_next_break: false,
            },
            MentionState::Cooldown => SuggestionState {
                disabled_until_next_break: true,
                ..SuggestionState::default()
            },
        }
    }

    /// Catalog entries whose label contains the current query, ignoring
    /// case, in catalog order.
    pub fn filtered_aliases(&self) -> Vec<&Alias> {
        let needle = self.query().unwrap_or_default().to_lowercase();
        self.catalog
            .iter()
            .filter(|alias| alias.label.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn reset(&mut self) {
        if self.state != MentionState::Idle {
            debug!("mention panel reset");
        }
        self.state = MentionState::Idle;
    }

    pub fn on_input<S: HostSurface + ?Sized>(&mut self, surface: &S) -> EventOutcome {
        if self.state == MentionState::Cooldown {
            return EventOutcome::ignored();
        }

        let Some(query) = CaretLocator::extract_query(surface) else {
            self.reset();
            return EventOutcome::ignored();
        };

        let position = match &self.state {
            MentionState::Querying { position, .. } => *position,
            _ => CaretLocator::locate(surface),
        };
        debug!(query = %query, "mention query");
        self.state = MentionState::Querying {
            query,
            position,
            highlighted: 0,
        };
        EventOutcome::ignored()
    }

    /// Capture-phase keydown: navigation and selection inside the panel.
    pub fn on_key_down<S: HostSurface + ?Sized>(&mut self, surface: &mut S, key: &Key) -> EventOutcome {
        let MentionState::Querying { highlighted, .. } = &self.state else {
            return EventOutcome::ignored();
        };
        let highlighted = *highlighted;
        let count = self.filtered_aliases().len();

        match key {
            Key::ArrowDown | Key::ArrowUp if count > 0 => {
                let current = highlighted.min(count - 1);
                let next = if *key == Key::ArrowDown {
                    (current + 1) % count
                } else {
                    (current + count - 1) % count
                };
                if let MentionState::Querying { highlighted, .. } = &mut self.state {
                    *highlighted = next;
                }
                EventOutcome::ignored().prevent_default().stop_propagation()
            }
            Key::Enter if highlighted < count => {
                let inserted = self.select_index(surface, highlighted).is_some();
                EventOutcome::ignored()
                    .prevent_default()
                    .stop_propagation()
                    .changed(inserted && self.notifies())
            }
            Key::Escape => {
                debug!("mention panel dismissed");
                self.state = MentionState::Cooldown;
                EventOutcome::ignored().prevent_default().stop_propagation()
            }
            _ => EventOutcome::ignored(),
        }
    }

    pub fn on_key_up(&mut self, key: &Key) -> EventOutcome {
        if self.state == MentionState::Cooldown && key.is_break() {
            debug!("mention cooldown released");
            self.state = MentionState::Idle;
        }
        EventOutcome::ignored()
    }

    pub fn select_index<S: HostSurface + ?Sized>(&mut self, surface: &mut S, index: usize) -> Option<Path> {
        let alias = self.filtered_aliases().get(index).map(|alias| (*alias).clone())?;
        self.select_alias(surface, &alias)
    }

    /// Replaces the live `@query` with a token for `alias` and closes the
    /// panel.
    pub fn select_alias<S: HostSurface + ?Sized>(&mut self, surface: &mut S, alias: &Alias) -> Option<Path> {
        let query = self.query().unwrap_or_default().to_string();
        let anchor = surface.selection().map(|selection| selection.anchor.clone());
        self.reset();

        let anchor = anchor?;
        self.engine
            .replace_query_and_insert(surface, &anchor, &query, alias)
    }

    pub(crate) fn notifies(&self) -> bool {
        self.engine.factory().config().notify_on_insert
    }
}
