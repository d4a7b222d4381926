//! Interactive layer for a static portfolio page.
//!
//! This crate is compiled to WebAssembly and attaches behavior to markup the
//! page already ships: a persisted light/dark theme, a responsive navigation
//! menu with scroll-spy highlighting, one-shot reveal animations, and a few
//! accessibility affordances. It never creates layout; it only toggles
//! classes, attributes and inline styles on existing elements.
//!
//! All behavior is written against the [`host`] traits so it runs unchanged
//! against the browser (the `hydrate` feature) and against the in-memory host
//! used by the tests.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Bootstrapper: builds components in order, routes events, teardown |
//! | [`theme`] | Preference store and theme controller |
//! | [`scroll`] | Section geometry and the scroll-spy computation |
//! | [`nav`] | Menu state machine, focus trap, active links |
//! | [`reveal`] | Reveal-on-intersect animator |
//! | [`a11y`] | Skip link, keyboard activation, menu focus |
//! | [`host`] | Traits the components use to touch the page |
//! | [`event`] | Host events, keys, timers and dispatch outcomes |
//! | [`config`] | Tunables with page-level JSON overrides |
//! | [`error`] | Crate error type |
//! | [`consts`] | DOM contract names and algorithm constants |
//! | `web` | `web-sys` host and listener wiring (`hydrate` only) |

pub mod a11y;
pub mod app;
pub mod config;
pub mod consts;
pub mod error;
pub mod event;
pub mod host;
pub mod nav;
pub mod reveal;
pub mod scroll;
pub mod theme;

#[cfg(feature = "hydrate")]
pub mod web;

#[cfg(test)]
pub(crate) mod fake;
