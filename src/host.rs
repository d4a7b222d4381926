//! The seam between components and the page.
//!
//! Components never hold browser objects. They refer to elements through
//! [`NodeId`] handles handed out by the host and perform every read and write
//! through these traits, so the same logic runs against `web-sys` in the
//! browser and against the in-memory host in tests.
//!
//! Mutating calls on [`Dom`] do not return errors: a failed class or style
//! write leaves the page usable, so implementations log and carry on.

use crate::error::UiError;
use crate::event::Timer;

/// Opaque handle to an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Element lookup and mutation.
pub trait Dom {
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// First element in document order matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<NodeId>;
    /// All elements in document order matching `selector`.
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId>;
    /// Descendants of `root` in document order matching `selector`.
    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId>;
    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Upper-case tag name, e.g. `"BUTTON"`.
    fn tag_name(&self, node: NodeId) -> String;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    /// Add (`on`) or remove a class.
    fn set_class(&mut self, node: NodeId, class: &str, on: bool);
    fn text(&self, node: NodeId) -> Option<String>;
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Set an inline style property; an empty `value` removes it.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);
    /// Inline style property value, empty when unset.
    fn style(&self, node: NodeId, property: &str) -> String;

    /// The `<html>` element.
    fn document_element(&self) -> Option<NodeId>;
    fn body(&self) -> Option<NodeId>;
    /// Insert a new `<a>` as the first child of `parent`.
    fn prepend_anchor(&mut self, parent: NodeId, href: &str, text: &str, class: &str) -> Option<NodeId>;
    fn remove(&mut self, node: NodeId);

    fn focus(&mut self, node: NodeId);
    fn active_element(&self) -> Option<NodeId>;

    /// Layout offset of the element from the top of the document.
    fn offset_top(&self, node: NodeId) -> f64;
    fn offset_height(&self, node: NodeId) -> f64;
    /// Top of the element's bounding box relative to the viewport.
    fn bounding_top(&self, node: NodeId) -> f64;

    fn supports_intersection_observer(&self) -> bool;
    /// Start observing `node`; returns `false` when observation is unavailable.
    fn observe_intersection(&mut self, node: NodeId) -> bool;
    fn unobserve_intersection(&mut self, node: NodeId);
}

/// Window geometry and OS-level signals.
pub trait Viewport {
    fn scroll_y(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn document_height(&self) -> f64;
    /// Smooth-scroll the window so `top` is at the top of the viewport.
    fn scroll_to(&mut self, top: f64);
    /// Whether the OS currently prefers a dark colour scheme.
    fn prefers_dark(&self) -> bool;
}

/// Persistent string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, UiError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), UiError>;
}

/// Deferred work. Fired work comes back as [`crate::event::HostEvent`]s.
pub trait Scheduler {
    /// Deliver [`crate::event::HostEvent::Timer`] after `delay_ms`.
    fn set_timeout(&mut self, delay_ms: u32, timer: Timer);
    /// Deliver [`crate::event::HostEvent::Frame`] before the next repaint.
    fn request_frame(&mut self);
}

/// Everything a component may need.
pub trait Host: Dom + Viewport + KeyValueStore + Scheduler {}

impl<T: Dom + Viewport + KeyValueStore + Scheduler> Host for T {}
