use crate::event::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    Capture,
    #[default]
    Bubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Attached to the editable region.
    #[default]
    Region,
    /// Attached to the whole window; sees events from anywhere.
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    pub phase: Phase,
    pub scope: Scope,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            phase: Phase::Capture,
            scope: Scope::Region,
        }
    }

    pub fn window() -> Self {
        Self {
            phase: Phase::Bubble,
            scope: Scope::Window,
        }
    }
}

#[derive(Debug, Clone)]
struct Registration {
    id: ListenerId,
    kind: EventKind,
    options: ListenerOptions,
}

/// Event listener bookkeeping for a surface. Dispatch order follows the
/// DOM: window capture, region capture, region bubble, window bubble, and
/// registration order within each group.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl ListenerRegistry {
    pub fn add(&mut self, kind: EventKind, options: ListenerOptions) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.registrations.push(Registration { id, kind, options });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub fn listeners(&self, kind: EventKind) -> Vec<ListenerId> {
        let mut matching: Vec<&Registration> = self
            .registrations
            .iter()
            .filter(|r| r.kind == kind)
            .collect();
        matching.sort_by_key(|r| dispatch_rank(r.options));
        matching.into_iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

fn dispatch_rank(options: ListenerOptions) -> u8 {
    match (options.scope, options.phase) {
        (Scope::Window, Phase::Capture) => 0,
        (Scope::Region, Phase::Capture) => 1,
        (Scope::Region, Phase::Bubble) => 2,
        (Scope::Window, Phase::Bubble) => 3,
    }
}
