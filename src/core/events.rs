//! Single-threaded event delivery over a [`Document`].
//!
//! Design intent:
//! - One thread, no suspension: `dispatch` runs every matching handler to
//!   completion, one at a time, before returning.
//! - Handlers only see the document; they cannot add or remove listeners
//!   while an event is in flight.
//! - The ready-state lifecycle mirrors a browser page: `Loading` until the
//!   tree is fully parsed, then content-loaded callbacks run exactly once.

use hashbrown::HashMap;

use crate::document::{Document, NodeId};
use crate::error::DocumentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Fires on every value change while the user interacts (each drag tick).
    Input,
    /// Fires when the user commits a value (release).
    Change,
    /// Fires once on the root when the tree is fully parsed.
    ContentLoaded,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::ContentLoaded => "DOMContentLoaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub target: NodeId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type Handler = Box<dyn FnMut(&mut Document, &Event)>;

type ReadyCallback = Box<dyn FnOnce(&mut Page)>;

struct Registered {
    target: NodeId,
    kind: EventKind,
    handler: Handler,
}

/// A document plus its listener table and load lifecycle.
pub struct Page {
    doc: Document,
    ready: ReadyState,
    by_target: HashMap<(NodeId, EventKind), Vec<ListenerId>>,
    listeners: HashMap<ListenerId, Registered>,
    next_listener: u64,
    pending_ready: Vec<ReadyCallback>,
}

impl Page {
    /// Wrap a document that is still being parsed.
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            ready: ReadyState::Loading,
            by_target: HashMap::new(),
            listeners: HashMap::new(),
            next_listener: 0,
            pending_ready: Vec::new(),
        }
    }

    /// Wrap a document whose tree is already complete.
    pub fn loaded(doc: Document) -> Self {
        let mut page = Self::new(doc);
        page.ready = ReadyState::Complete;
        page
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    #[inline]
    pub fn ready_state(&self) -> ReadyState {
        self.ready
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn add_listener<F>(&mut self, target: NodeId, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&mut Document, &Event) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(
            id,
            Registered {
                target,
                kind,
                handler: Box::new(handler),
            },
        );
        self.by_target.entry((target, kind)).or_default().push(id);
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(reg) = self.listeners.remove(&id) else {
            return false;
        };
        if let Some(ids) = self.by_target.get_mut(&(reg.target, reg.kind)) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.by_target.remove(&(reg.target, reg.kind));
            }
        }
        true
    }

    /// Deliver `kind` to every listener on `target`, in registration order.
    /// Returns the number of handlers invoked.
    pub fn dispatch(&mut self, target: NodeId, kind: EventKind) -> usize {
        let Some(ids) = self.by_target.get(&(target, kind)) else {
            return 0;
        };
        let event = Event { target, kind };
        let mut invoked = 0;
        for id in ids {
            if let Some(reg) = self.listeners.get_mut(id) {
                (reg.handler)(&mut self.doc, &event);
                invoked += 1;
            }
        }
        tracing::trace!(?target, event = kind.as_str(), invoked, "dispatched");
        invoked
    }

    /// Run `callback` once the tree is fully parsed. Runs immediately if the
    /// page is already past `Loading`.
    pub fn on_content_loaded<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Page) + 'static,
    {
        if self.ready == ReadyState::Loading {
            self.pending_ready.push(Box::new(callback));
        } else {
            callback(self);
        }
    }

    /// The content-loaded checkpoint: `Loading -> Interactive`, then queued
    /// callbacks in queue order, then `ContentLoaded` on the root. Later calls
    /// are no-ops.
    pub fn finish_parsing(&mut self) {
        if self.ready != ReadyState::Loading {
            return;
        }
        self.ready = ReadyState::Interactive;
        let pending = std::mem::take(&mut self.pending_ready);
        tracing::debug!(callbacks = pending.len(), "content loaded");
        for cb in pending {
            cb(self);
        }
        let root = self.doc.root();
        self.dispatch(root, EventKind::ContentLoaded);
    }

    /// All subresources done. Implies `finish_parsing`.
    pub fn finish_loading(&mut self) {
        self.finish_parsing();
        self.ready = ReadyState::Complete;
    }

    /// One drag tick: set the control's value, then fire `Input` on it.
    pub fn drag(&mut self, slider: NodeId, value: &str) -> Result<usize, DocumentError> {
        self.doc.set_value(slider, value)?;
        Ok(self.dispatch(slider, EventKind::Input))
    }

    /// Commit the current value: fire `Change`.
    pub fn release(&mut self, slider: NodeId) -> usize {
        self.dispatch(slider, EventKind::Change)
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("ready", &self.ready)
            .field("nodes", &self.doc.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_fire_in_registration_order() {
        let mut page = Page::loaded(Document::new());
        let root = page.document().root();
        let log = Rc::new(RefCell::new(Vec::new()));

        for n in 0..3 {
            let log = Rc::clone(&log);
            page.add_listener(root, EventKind::Input, move |_, _| log.borrow_mut().push(n));
        }
        assert_eq!(page.dispatch(root, EventKind::Input), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(page.dispatch(root, EventKind::Change), 0);
    }

    #[test]
    fn removed_listener_stops_firing() {
        let mut page = Page::loaded(Document::new());
        let root = page.document().root();
        let hits = Rc::new(RefCell::new(0));
        let id = {
            let hits = Rc::clone(&hits);
            page.add_listener(root, EventKind::Input, move |_, _| *hits.borrow_mut() += 1)
        };
        page.dispatch(root, EventKind::Input);
        assert!(page.remove_listener(id));
        assert!(!page.remove_listener(id));
        page.dispatch(root, EventKind::Input);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn content_loaded_runs_once_and_in_order() {
        let mut page = Page::new(Document::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for n in 0..2 {
            let log = Rc::clone(&log);
            page.on_content_loaded(move |_| log.borrow_mut().push(n));
        }
        assert!(log.borrow().is_empty());

        page.finish_parsing();
        page.finish_parsing();
        assert_eq!(*log.borrow(), vec![0, 1]);
        assert_eq!(page.ready_state(), ReadyState::Interactive);

        // Past the checkpoint: runs immediately.
        let log2 = Rc::clone(&log);
        page.on_content_loaded(move |_| log2.borrow_mut().push(9));
        assert_eq!(*log.borrow(), vec![0, 1, 9]);

        page.finish_loading();
        assert_eq!(page.ready_state(), ReadyState::Complete);
    }

    #[test]
    fn drag_sets_value_before_dispatch() {
        let mut doc = Document::new();
        let slider = doc.create_element("input").unwrap();
        let root = doc.root();
        doc.append_child(root, slider).unwrap();
        let mut page = Page::loaded(doc);

        let seen = Rc::new(RefCell::new(String::new()));
        {
            let seen = Rc::clone(&seen);
            page.add_listener(slider, EventKind::Input, move |doc, ev| {
                *seen.borrow_mut() = doc.value(ev.target).unwrap_or_default().to_string();
            });
        }
        assert_eq!(page.drag(slider, "7").unwrap(), 1);
        assert_eq!(*seen.borrow(), "7");
    }
}
