use tracing::debug;

use crate::config::AliasConfig;
use crate::drag::DragAliasSource;
use crate::event::{EditorEvent, EventKind, EventOutcome, Key, PointerTarget};
use crate::insert::TokenInsertionEngine;
use crate::listener::{ListenerId, ListenerOptions};
use crate::mention::{MentionController, SuggestionState};
use crate::ops::Path;
use crate::remove::TokenRemovalEngine;
use crate::surface::HostSurface;
use crate::widget::{Alias, AliasWidgetFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    MentionKeyDown,
    MentionInput,
    CooldownKeyUp,
    RemovalKeyDown,
    DragOver,
    Drop,
    DeleteClick,
}

/// Alias behavior attached to one editing surface.
///
/// Attaching registers the session's listeners with the surface; dropping
/// the session releases them again.
pub struct AliasSession<'a, S: HostSurface + ?Sized> {
    surface: &'a mut S,
    config: AliasConfig,
    mention: MentionController,
    drag: DragAliasSource,
    removal: TokenRemovalEngine,
    handlers: Vec<(ListenerId, Handler)>,
}

impl<'a, S: HostSurface + ?Sized> AliasSession<'a, S> {
    pub fn attach(surface: &'a mut S, catalog: Vec<Alias>, config: AliasConfig) -> Self {
        let config = config.with_defaults();
        let engine = TokenInsertionEngine::new(AliasWidgetFactory::new(config.clone()));

        let registrations = [
            (EventKind::KeyDown, ListenerOptions::capture(), Handler::MentionKeyDown),
            (EventKind::Input, ListenerOptions::default(), Handler::MentionInput),
            (EventKind::KeyUp, ListenerOptions::default(), Handler::CooldownKeyUp),
            (EventKind::KeyDown, ListenerOptions::default(), Handler::RemovalKeyDown),
            (EventKind::DragOver, ListenerOptions::default(), Handler::DragOver),
            (EventKind::Drop, ListenerOptions::default(), Handler::Drop),
            (EventKind::Pointer, ListenerOptions::window(), Handler::DeleteClick),
        ];
        let handlers: Vec<(ListenerId, Handler)> = registrations
            .into_iter()
            .map(|(kind, options, handler)| (surface.add_listener(kind, options), handler))
            .collect();
        debug!(listeners = handlers.len(), aliases = catalog.len(), "alias session attached");

        Self {
            surface,
            config,
            mention: MentionController::new(catalog, engine.clone()),
            drag: DragAliasSource::new(engine),
            removal: TokenRemovalEngine,
            handlers,
        }
    }

    pub fn surface(&self) -> &S {
        &*self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut *self.surface
    }

    pub fn config(&self) -> &AliasConfig {
        &self.config
    }

    pub fn mention(&self) -> &MentionController {
        &self.mention
    }

    pub fn drag(&self) -> &DragAliasSource {
        &self.drag
    }

    pub fn suggestion_state(&self) -> SuggestionState {
        self.mention.suggestion_state()
    }

    pub fn filtered_aliases(&self) -> Vec<&Alias> {
        self.mention.filtered_aliases()
    }

    /// Runs the session's listeners for `event`. A content change is
    /// announced to the host and followed by one `input` round.
    pub fn dispatch(&mut self, event: &EditorEvent) -> EventOutcome {
        let mut outcome = self.dispatch_once(event);
        if outcome.content_changed {
            self.surface.emit_input();
            if event.kind() != EventKind::Input {
                outcome.merge(self.dispatch_once(&EditorEvent::Input));
            }
        }
        outcome
    }

    fn dispatch_once(&mut self, event: &EditorEvent) -> EventOutcome {
        let mut outcome = EventOutcome::ignored();
        for id in self.surface.listeners(event.kind()) {
            let Some(handler) = self.handler(id) else {
                continue;
            };
            outcome.merge(self.run(handler, event));
            if outcome.propagation_stopped {
                break;
            }
        }
        outcome
    }

    fn handler(&self, id: ListenerId) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(registered, _)| *registered == id)
            .map(|(_, handler)| *handler)
    }

    fn run(&mut self, handler: Handler, event: &EditorEvent) -> EventOutcome {
        match (handler, event) {
            (Handler::MentionKeyDown, EditorEvent::KeyDown(key)) => {
                self.mention.on_key_down(&mut *self.surface, key)
            }
            (Handler::MentionInput, EditorEvent::Input) => self.mention.on_input(&*self.surface),
            (Handler::CooldownKeyUp, EditorEvent::KeyUp(key)) => self.mention.on_key_up(key),
            (Handler::RemovalKeyDown, EditorEvent::KeyDown(key)) => {
                self.removal.handle_key_intent(&mut *self.surface, key)
            }
            (Handler::DragOver, EditorEvent::DragOver { x, y }) => {
                self.drag.on_drag_over(&mut *self.surface, *x, *y)
            }
            (Handler::Drop, EditorEvent::Drop { target }) => {
                self.drag.on_drop(&mut *self.surface, target.as_deref())
            }
            (Handler::DeleteClick, EditorEvent::Pointer(target)) => {
                self.removal.handle_pointer_activation(&mut *self.surface, target)
            }
            _ => EventOutcome::ignored(),
        }
    }

    /// Notifies the host and the session's input listeners of an edit.
    fn input(&mut self) -> EventOutcome {
        self.surface.emit_input();
        self.dispatch_once(&EditorEvent::Input)
    }

    /// A full keystroke: keydown, the native edit unless a listener
    /// prevented it, `input` when the content changed, then keyup.
    pub fn press_key(&mut self, key: Key) -> EventOutcome {
        let mut outcome = self.dispatch(&EditorEvent::KeyDown(key.clone()));
        if !outcome.default_prevented && self.surface.perform_default_key(&key) {
            outcome.content_changed = true;
            outcome.merge(self.input());
        }
        outcome.merge(self.dispatch(&EditorEvent::KeyUp(key)));
        outcome
    }

    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press_key(Key::from_char(ch));
        }
    }

    pub fn click(&mut self, target: PointerTarget) -> EventOutcome {
        self.dispatch(&EditorEvent::Pointer(target))
    }

    pub fn drag_start(&mut self, alias: Alias) {
        self.drag.drag_start(alias);
    }

    pub fn drag_end(&mut self) {
        self.drag.drag_end();
    }

    pub fn drag_over(&mut self, x: f32, y: f32) -> EventOutcome {
        self.dispatch(&EditorEvent::DragOver { x, y })
    }

    pub fn drop_at(&mut self, target: Option<Path>) -> EventOutcome {
        self.dispatch(&EditorEvent::Drop { target })
    }

    /// Drags `alias` from the palette and releases it at `(x, y)`.
    pub fn drag_alias(&mut self, alias: Alias, x: f32, y: f32, target: Option<Path>) -> EventOutcome {
        self.drag_start(alias);
        self.drag_over(x, y);
        let outcome = self.drop_at(target);
        self.drag_end();
        outcome
    }

    /// Picks a suggestion with the pointer.
    pub fn select_suggestion(&mut self, index: usize) -> Option<Path> {
        let path = self.mention.select_index(&mut *self.surface, index);
        if path.is_some() && self.config.notify_on_insert {
            self.input();
        }
        path
    }
}

impl<S: HostSurface + ?Sized> Drop for AliasSession<'_, S> {
    fn drop(&mut self) {
        for (id, _) in self.handlers.drain(..) {
            self.surface.remove_listener(id);
        }
        debug!("alias session detached");
    }
}
