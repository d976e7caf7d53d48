//! The event/listener bridge between the host input surface and actions.
//!
//! [`InputHub`] is the registration table: actions attach callbacks for named
//! event kinds during state entry and must detach exactly those during state
//! exit. Identity is carried by [`ListenerHandle`] rather than closure
//! equality, so attach/detach always refer to the same registration.
//!
//! The runtime is single-threaded and callback-driven: handlers own `Rc`
//! shares of their action's observable state and run inline when the host
//! emits an event, between ticks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::trace;

use crate::events::{EventKind, InputEvent};

/// Identity of one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    kind: EventKind,
    id: u64,
}

impl ListenerHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

struct Entry {
    id: u64,
    callback: Box<dyn FnMut(&InputEvent)>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: HashMap<EventKind, Vec<Entry>>,
    // Entries checked out for dispatch, outermost first. Emitting from
    // inside a callback nests dispatches, so this is a stack; each slot
    // records whether the entry was unlistened while checked out.
    checked_out: SmallVec<[(u64, bool); 2]>,
}

/// Cheap-to-clone handle to the shared listener table.
#[derive(Clone, Default)]
pub struct InputHub {
    inner: Rc<RefCell<HubInner>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for events of `kind` and returns its identity.
    pub fn listen(&self, kind: EventKind, callback: impl FnMut(&InputEvent) + 'static) -> ListenerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.entry(kind).or_default().push(Entry {
            id,
            callback: Box::new(callback),
        });
        trace!(%kind, id, "listener attached");
        ListenerHandle { kind, id }
    }

    /// Removes the registration behind `handle`. Returns whether a listener
    /// was actually removed; detaching twice is a no-op.
    pub fn unlisten(&self, handle: ListenerHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        if let Some(entries) = inner.listeners.get_mut(&handle.kind) {
            if let Some(index) = entries.iter().position(|e| e.id == handle.id) {
                entries.remove(index);
                trace!(kind = %handle.kind, id = handle.id, "listener detached");
                return true;
            }
        }
        // The entry may be checked out for dispatch right now, possibly in
        // an outer frame of a nested emit; mark it so it is not re-inserted
        // afterwards.
        if let Some(slot) = inner
            .checked_out
            .iter_mut()
            .find(|(id, removed)| *id == handle.id && !*removed)
        {
            slot.1 = true;
            return true;
        }
        false
    }

    /// Dispatches `event` to every listener of its kind, in registration
    /// order. Listeners registered during dispatch are not invoked for this
    /// event; listeners removed during dispatch are skipped.
    pub fn emit(&self, event: &InputEvent) {
        let kind = event.kind();
        let ids: SmallVec<[u64; 8]> = {
            let inner = self.inner.borrow();
            inner
                .listeners
                .get(&kind)
                .map(|entries| entries.iter().map(|e| e.id).collect())
                .unwrap_or_default()
        };

        for id in ids {
            // Check the entry out so the callback can freely call back into
            // the hub without holding the RefCell borrow.
            let entry = {
                let mut inner = self.inner.borrow_mut();
                let Some(entries) = inner.listeners.get_mut(&kind) else { continue };
                let Some(index) = entries.iter().position(|e| e.id == id) else {
                    continue;
                };
                let entry = entries.remove(index);
                inner.checked_out.push((id, false));
                entry
            };

            let mut entry = entry;
            (entry.callback)(event);

            let mut inner = self.inner.borrow_mut();
            // Dispatches nest strictly, so the top of the stack is ours.
            let removed = inner.checked_out.pop().map_or(false, |(_, removed)| removed);
            if !removed {
                let entries = inner.listeners.entry(kind).or_default();
                // Re-insert at its id-ordered position to preserve
                // registration order for future dispatches.
                let position = entries.partition_point(|e| e.id < entry.id);
                entries.insert(position, entry);
            }
        }
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.borrow().listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Total number of listeners across all event kinds.
    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().listeners.values().map(Vec::len).sum()
    }
}

/// Tracks the listeners one action has attached so its exit hook can detach
/// exactly what its setup hook attached, in any number of cycles.
///
/// Detaching is safe when nothing was ever attached, which covers exit being
/// invoked after a failed or skipped setup.
#[derive(Default)]
pub struct ListenerSet {
    entries: SmallVec<[(InputHub, ListenerHandle); 2]>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, hub: &InputHub, kind: EventKind, callback: impl FnMut(&InputEvent) + 'static) {
        let handle = hub.listen(kind, callback);
        self.entries.push((hub.clone(), handle));
    }

    pub fn detach_all(&mut self) {
        for (hub, handle) in self.entries.drain(..) {
            hub.unlisten(handle);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        self.detach_all();
    }
}

/// A named logical output event, fired by bridge actions such as the WASD
/// mapper and drained by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicEvent {
    pub name: &'static str,
}

/// Accumulates logical output events between ticks.
#[derive(Clone, Default)]
pub struct LogicBus {
    events: Rc<RefCell<Vec<LogicEvent>>>,
}

impl LogicBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self, name: &'static str) {
        trace!(name, "logic event fired");
        self.events.borrow_mut().push(LogicEvent { name });
    }

    /// Takes all accumulated events, leaving the bus empty.
    pub fn drain(&self) -> Vec<LogicEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}
