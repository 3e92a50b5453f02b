//! Browser binding for the label synchronizer.
//!
//! This crate is a stub by default so the workspace builds on native targets
//! without a wasm toolchain.
//!
//! Enable the real binding with: `--features web` (and a wasm32 target).

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::{bind_document, start, WebSubscription};
