//! `web-sys` implementation of the host traits.
//!
//! Elements are interned in a [`NodeRegistry`] the first time they are seen
//! and handed out as [`NodeId`]s. Failed DOM writes are logged at debug level
//! and otherwise ignored; reads that fail report an empty value.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Map};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MediaQueryList, NodeList, ScrollBehavior, ScrollToOptions, Storage, Window,
};

use super::bridge::Dispatcher;
use crate::consts::{DARK_SCHEME_QUERY, REVEAL_ROOT_MARGIN, REVEAL_THRESHOLD};
use crate::error::UiError;
use crate::event::{HostEvent, Timer};
use crate::host::{Dom, KeyValueStore, NodeId, Scheduler, Viewport};

/// Shared element table. Clones refer to the same table.
///
/// `index` maps each interned element to its slot. A JS `Map` keys objects
/// by identity, so lookups need no walk over the table.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    elements: Rc<RefCell<Vec<Element>>>,
    index: Map,
}

impl NodeRegistry {
    /// Handle for `element`, reusing the existing one for the same node.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn intern(&self, element: Element) -> NodeId {
        if let Some(slot) = self.index.get(&element).as_f64() {
            return NodeId(slot as usize);
        }
        let mut elements = self.elements.borrow_mut();
        let slot = elements.len();
        self.index.set(&element, &JsValue::from(slot as f64));
        elements.push(element);
        NodeId(slot)
    }

    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.elements.borrow().get(node.0).cloned()
    }
}

/// Keeps the observer and its callback alive together.
struct RevealObserver {
    inner: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Drop for RevealObserver {
    fn drop(&mut self) {
        self.inner.disconnect();
    }
}

pub struct WebHost {
    window: Window,
    document: Document,
    nodes: NodeRegistry,
    storage: Option<Storage>,
    color_scheme: Option<MediaQueryList>,
    observer: Option<RevealObserver>,
    dispatcher: Dispatcher,
}

impl WebHost {
    pub fn new(window: Window, document: Document, nodes: NodeRegistry, dispatcher: Dispatcher) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::warn!("local storage blocked: {}", describe(&err));
                None
            }
        };
        let color_scheme = logged("matchMedia", window.match_media(DARK_SCHEME_QUERY)).flatten();
        let observer = reveal_observer(&window, &nodes, &dispatcher);
        Self { window, document, nodes, storage, color_scheme, observer, dispatcher }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The `(prefers-color-scheme: dark)` query, for subscribing to changes.
    pub fn color_scheme(&self) -> Option<&MediaQueryList> {
        self.color_scheme.as_ref()
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.element(node)
    }

    fn html_element(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node).and_then(|el| el.dyn_ref::<HtmlElement>().cloned())
    }

    fn collect(&self, list: &NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_ref::<Element>().cloned())
            .map(|el| self.nodes.intern(el))
            .collect()
    }
}

impl Dom for WebHost {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.document.get_element_by_id(id).map(|el| self.nodes.intern(el))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        logged("querySelector", self.document.query_selector(selector)).flatten().map(|el| self.nodes.intern(el))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        logged("querySelectorAll", self.document.query_selector_all(selector))
            .map_or_else(Vec::new, |list| self.collect(&list))
    }

    fn query_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(root) = self.element(root) else {
            return Vec::new();
        };
        logged("querySelectorAll", root.query_selector_all(selector)).map_or_else(Vec::new, |list| self.collect(&list))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Some(ancestor), Some(node)) => ancestor.contains(Some(&*node)),
            _ => false,
        }
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node).map(|el| el.tag_name().to_ascii_uppercase()).unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element(node) {
            report("setAttribute", el.set_attribute(name, value));
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.class_list().contains(class))
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if let Some(el) = self.element(node) {
            report("classList.toggle", el.class_list().toggle_with_force(class, on));
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.element(node)?.text_content()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.element(node) {
            el.set_text_content(Some(text));
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.html_element(node) else {
            return;
        };
        let style = el.style();
        if value.is_empty() {
            report("style.removeProperty", style.remove_property(property));
        } else {
            report("style.setProperty", style.set_property(property, value));
        }
    }

    fn style(&self, node: NodeId, property: &str) -> String {
        self.html_element(node)
            .and_then(|el| logged("style.getPropertyValue", el.style().get_property_value(property)))
            .unwrap_or_default()
    }

    fn document_element(&self) -> Option<NodeId> {
        self.document.document_element().map(|el| self.nodes.intern(el))
    }

    fn body(&self) -> Option<NodeId> {
        self.document.body().map(|body| self.nodes.intern(body.into()))
    }

    fn prepend_anchor(&mut self, parent: NodeId, href: &str, text: &str, class: &str) -> Option<NodeId> {
        let parent = self.element(parent)?;
        let anchor = logged("createElement", self.document.create_element("a"))?;
        report("setAttribute", anchor.set_attribute("href", href));
        anchor.set_class_name(class);
        anchor.set_text_content(Some(text));
        logged("prepend", parent.prepend_with_node_1(&anchor))?;
        Some(self.nodes.intern(anchor))
    }

    fn remove(&mut self, node: NodeId) {
        if let Some(el) = self.element(node) {
            el.remove();
        }
    }

    fn focus(&mut self, node: NodeId) {
        if let Some(el) = self.html_element(node) {
            report("focus", el.focus());
        }
    }

    fn active_element(&self) -> Option<NodeId> {
        self.document.active_element().map(|el| self.nodes.intern(el))
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.html_element(node).map_or(0.0, |el| f64::from(el.offset_top()))
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.html_element(node).map_or(0.0, |el| f64::from(el.offset_height()))
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        self.element(node).map_or(0.0, |el| el.get_bounding_client_rect().top())
    }

    fn supports_intersection_observer(&self) -> bool {
        self.observer.is_some()
    }

    fn observe_intersection(&mut self, node: NodeId) -> bool {
        match (&self.observer, self.element(node)) {
            (Some(observer), Some(el)) => {
                observer.inner.observe(&el);
                true
            }
            _ => false,
        }
    }

    fn unobserve_intersection(&mut self, node: NodeId) {
        if let (Some(observer), Some(el)) = (&self.observer, self.element(node)) {
            observer.inner.unobserve(&el);
        }
    }
}

impl Viewport for WebHost {
    fn scroll_y(&self) -> f64 {
        logged("scrollY", self.window.scroll_y()).unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        logged("innerHeight", self.window.inner_height()).and_then(|h| h.as_f64()).unwrap_or(0.0)
    }

    fn document_height(&self) -> f64 {
        self.document.document_element().map_or(0.0, |el| f64::from(el.scroll_height()))
    }

    fn scroll_to(&mut self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn prefers_dark(&self) -> bool {
        self.color_scheme.as_ref().is_some_and(MediaQueryList::matches)
    }
}

impl KeyValueStore for WebHost {
    fn get(&self, key: &str) -> Result<Option<String>, UiError> {
        let storage = self.storage.as_ref().ok_or(UiError::StorageUnavailable)?;
        storage.get_item(key).map_err(|err| UiError::Storage { op: "getItem", message: describe(&err) })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), UiError> {
        let storage = self.storage.as_ref().ok_or(UiError::StorageUnavailable)?;
        storage.set_item(key, value).map_err(|err| UiError::Storage { op: "setItem", message: describe(&err) })
    }
}

impl Scheduler for WebHost {
    fn set_timeout(&mut self, delay_ms: u32, timer: Timer) {
        let dispatcher = self.dispatcher.clone();
        Timeout::new(delay_ms, move || dispatcher.deliver(HostEvent::Timer(timer))).forget();
    }

    fn request_frame(&mut self) {
        let dispatcher = self.dispatcher.clone();
        let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let holder_for_cb = Rc::clone(&holder);
        let cb = Closure::wrap(Box::new(move |_ts: f64| {
            dispatcher.deliver(HostEvent::Frame);
            holder_for_cb.borrow_mut().take();
        }) as Box<dyn FnMut(f64)>);

        match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(_) => *holder.borrow_mut() = Some(cb),
            Err(err) => {
                log::debug!("requestAnimationFrame failed, running frame now: {}", describe(&err));
                self.dispatcher.deliver(HostEvent::Frame);
            }
        }
    }
}

/// Build the reveal observer, or `None` when the browser has no
/// `IntersectionObserver`.
fn reveal_observer(window: &Window, nodes: &NodeRegistry, dispatcher: &Dispatcher) -> Option<RevealObserver> {
    match js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(err) => {
            log::debug!("IntersectionObserver feature check failed: {}", describe(&err));
            return None;
        }
    }

    let nodes = nodes.clone();
    let dispatcher = dispatcher.clone();
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Some(entry) = entry.dyn_ref::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    let target = nodes.intern(entry.target());
                    dispatcher.deliver(HostEvent::Intersect { target });
                }
            }
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));
    options.set_root_margin(REVEAL_ROOT_MARGIN);
    let inner = logged(
        "new IntersectionObserver",
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options),
    )?;
    Some(RevealObserver { inner, _callback: callback })
}

/// Readable text for a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn logged<T>(call: &'static str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("{}", UiError::Dom { call, message: describe(&err) });
            None
        }
    }
}

fn report<T>(call: &'static str, result: Result<T, JsValue>) {
    if let Err(err) = result {
        log::debug!("{}", UiError::Dom { call, message: describe(&err) });
    }
}
