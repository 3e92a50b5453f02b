//! # rating_sync
//!
//! Keeps a slider's value label in sync with the slider while it is dragged.
//!
//! The crate carries a small host-side document model so the behavior can be
//! exercised natively; the browser binding in `rating_sync_web` applies the
//! same pairing rule to the real DOM.
//!
//! ## Quick Start
//!
//! ```
//! use rating_sync::prelude::*;
//!
//! let row = ElementBuilder::new("div")
//!     .child(ElementBuilder::range("5"))
//!     .child(ElementBuilder::new("span").class("rating-value").text("5"));
//! let mut page = Page::new(Document::from_tree(&row.into()).unwrap());
//!
//! let installed = install(&mut page, SyncConfig::default());
//! page.finish_parsing();
//!
//! let sub = installed.subscriptions()[0];
//! page.drag(sub.slider, "8").unwrap();
//! assert_eq!(page.document().text_content(sub.label), "8");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): JSON page fixtures and JSON config
//! - `cli` (default): The `rating-sync` simulator binary
//!
//! ## Modules
//!
//! - [`document`]: Element tree
//! - [`query`]: Structural lookup (slider, marker class, label rule)
//! - [`events`]: Page lifecycle and event dispatch
//! - [`sync`]: The label synchronizer

#[path = "core/document.rs"]
pub mod document;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/query.rs"]
pub mod query;

#[path = "core/events.rs"]
pub mod events;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/sync.rs"]
pub mod sync;

#[cfg(feature = "serde")]
#[path = "core/fixture.rs"]
pub mod fixture;

pub mod prelude {
    pub use crate::config::{SyncConfig, DEFAULT_LABEL_CLASS};
    pub use crate::document::{Document, ElementBuilder, NodeId, NodeTree};
    pub use crate::error::{DocumentError, LoadError};
    pub use crate::events::{Event, EventKind, Page, ReadyState};
    pub use crate::query::Selector;
    pub use crate::sync::{bind, discover, install, Installation, Pairing, Subscription};
}
