//! Label synchronizer: keeps a text label showing its slider's live value.
//!
//! Pairing rule: for every slider under the root (document order), the label
//! is the first descendant of the slider's immediate parent that carries the
//! configured marker class. Sliders without a label are left alone.
//!
//! The handler copies the value string verbatim. No parsing, rounding, or
//! formatting is applied, and the label's initial markup text is not touched
//! until the first event.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SyncConfig;
use crate::document::{Document, NodeId};
use crate::events::{Event, ListenerId, Page};
use crate::query::{self, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub slider: NodeId,
    pub label: NodeId,
}

/// An active slider -> label binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub slider: NodeId,
    pub label: NodeId,
    pub listener: ListenerId,
}

impl Subscription {
    /// Stop following the slider. Returns `false` if already detached.
    pub fn detach(self, page: &mut Page) -> bool {
        page.remove_listener(self.listener)
    }
}

/// Find every slider under `root` that has a label.
pub fn discover(doc: &Document, root: NodeId, config: &SyncConfig) -> Vec<Pairing> {
    let mut out = Vec::new();
    for slider in query::query_all(doc, root, &Selector::Slider) {
        match query::find_label(doc, slider, &config.label_class) {
            Some(label) => out.push(Pairing { slider, label }),
            None => tracing::debug!(?slider, marker = %config.label_class, "slider has no label; skipped"),
        }
    }
    out
}

/// Discover and subscribe. Each returned subscription stays live until
/// detached or the page is dropped.
pub fn bind(page: &mut Page, root: NodeId, config: &SyncConfig) -> Vec<Subscription> {
    let pairings = discover(page.document(), root, config);
    let trigger = config.trigger();

    let subs: Vec<Subscription> = pairings
        .into_iter()
        .map(|Pairing { slider, label }| {
            let listener = page.add_listener(slider, trigger, move |doc, ev| {
                copy_value(doc, ev, label);
            });
            Subscription {
                slider,
                label,
                listener,
            }
        })
        .collect();

    tracing::info!(
        bound = subs.len(),
        event = trigger.as_str(),
        "label synchronizer bound"
    );
    subs
}

fn copy_value(doc: &mut Document, ev: &Event, label: NodeId) {
    let Some(value) = doc.value(ev.target).map(str::to_owned) else {
        return;
    };
    if let Err(e) = doc.set_text_content(label, &value) {
        tracing::debug!(error = %e, "label update ignored");
    }
}

/// Subscriptions made by [`install`], filled in at the content-loaded
/// checkpoint.
#[derive(Debug, Clone, Default)]
pub struct Installation {
    subs: Rc<RefCell<Vec<Subscription>>>,
}

impl Installation {
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subs.borrow().clone()
    }

    pub fn is_bound(&self) -> bool {
        !self.subs.borrow().is_empty()
    }
}

/// Bind over the whole page once it reaches the content-loaded checkpoint
/// (immediately if it already has).
pub fn install(page: &mut Page, config: SyncConfig) -> Installation {
    let installation = Installation::default();
    let subs = Rc::clone(&installation.subs);
    page.on_content_loaded(move |page| {
        let root = page.document().root();
        let bound = bind(page, root, &config);
        subs.borrow_mut().extend(bound);
    });
    installation
}
