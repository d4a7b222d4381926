//! Browser bridge, compiled with the `hydrate` feature.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`host::WebHost`] implements the [`crate::host`] traits on top of
//! `web-sys`. [`bridge`] owns the mounted [`crate::app::App`], translates DOM
//! events into [`crate::event::HostEvent`]s and exposes the WASM entry points.

pub mod bridge;
pub mod host;

pub use bridge::{start, unmount};
pub use host::WebHost;
