//! Mounting, DOM listeners and the WASM entry points.
//!
//! ARCHITECTURE
//! ============
//! The mounted [`App`] and its [`WebHost`] live together in one
//! `Rc<RefCell<Runtime>>`. Every listener, timer, frame and observer callback
//! reaches it through a [`Dispatcher`], which holds only a weak reference, so
//! callbacks that fire after unmount find nothing and do nothing.
//!
//! Handlers run to completion. A DOM call made inside a handler can fire
//! another event synchronously (`focus()` fires `focusin`); such events find
//! the runtime borrowed, are queued and run right after the current handler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, DocumentReadyState, Element, ErrorEvent, Event, EventTarget, KeyboardEvent,
    MediaQueryList, MediaQueryListEvent, PromiseRejectionEvent, StorageEvent,
};

use super::host::{NodeRegistry, WebHost, describe};
use crate::app::App;
use crate::config::Config;
use crate::error::UiError;
use crate::event::{HostEvent, Key, Outcome};
use crate::host::NodeId;

struct Runtime {
    host: WebHost,
    app: App,
}

/// Delivers host events to the mounted runtime, queueing re-entrant ones.
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Weak<RefCell<Runtime>>,
    backlog: Rc<RefCell<VecDeque<HostEvent>>>,
}

impl Dispatcher {
    /// Run `event` now, or queue it if a handler is already running.
    ///
    /// Queued events report [`Outcome::Ignored`]; their handling happens
    /// after the originating DOM event has returned.
    pub fn dispatch(&self, event: HostEvent) -> Outcome {
        let Some(runtime) = self.runtime.upgrade() else {
            return Outcome::Ignored;
        };
        let Ok(mut guard) = runtime.try_borrow_mut() else {
            self.backlog.borrow_mut().push_back(event);
            return Outcome::Ignored;
        };
        let Runtime { host, app } = &mut *guard;
        let outcome = app.dispatch(host, event);
        self.drain(host, app);
        outcome
    }

    /// Dispatch an event that has no browser default to prevent.
    pub fn deliver(&self, event: HostEvent) {
        self.dispatch(event);
    }

    fn drain(&self, host: &mut WebHost, app: &mut App) {
        while let Some(next) = self.next_queued() {
            app.dispatch(host, next);
        }
    }

    fn next_queued(&self) -> Option<HostEvent> {
        self.backlog.borrow_mut().pop_front()
    }
}

/// An attached DOM listener; dropping it detaches the callback.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, UiError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| UiError::Dom { call: "addEventListener", message: describe(&err) })?;
        Ok(Self { target: target.clone(), kind, callback })
    }

    /// Attach a listener that translates the DOM event and dispatches it,
    /// preventing the default action when the app consumes it.
    fn forward(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        dispatcher: &Dispatcher,
        nodes: &NodeRegistry,
        translate: fn(&Event, &NodeRegistry) -> Option<HostEvent>,
    ) -> Result<Self, UiError> {
        let dispatcher = dispatcher.clone();
        let nodes = nodes.clone();
        Self::attach(target, kind, passive, move |event: Event| {
            let Some(host_event) = translate(&event, &nodes) else {
                return;
            };
            if dispatcher.dispatch(host_event).is_consumed() {
                event.prevent_default();
            }
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let removed =
            self.target.remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
        if let Err(err) = removed {
            log::debug!("removeEventListener({}) failed: {}", self.kind, describe(&err));
        }
    }
}

// =============================================================
// Event translation
// =============================================================

fn target_of(event: &Event, nodes: &NodeRegistry) -> Option<NodeId> {
    let target = event.target()?;
    let element = target.dyn_ref::<Element>()?;
    Some(nodes.intern(element.clone()))
}

fn click(event: &Event, nodes: &NodeRegistry) -> Option<HostEvent> {
    Some(HostEvent::Click { target: target_of(event, nodes)? })
}

fn key_down(event: &Event, nodes: &NodeRegistry) -> Option<HostEvent> {
    let keyboard = event.dyn_ref::<KeyboardEvent>()?;
    Some(HostEvent::KeyDown {
        key: Key::from_browser(&keyboard.key()),
        shift: keyboard.shift_key(),
        target: target_of(event, nodes),
    })
}

fn focus_in(event: &Event, nodes: &NodeRegistry) -> Option<HostEvent> {
    Some(HostEvent::Focus { target: target_of(event, nodes)? })
}

fn focus_out(event: &Event, nodes: &NodeRegistry) -> Option<HostEvent> {
    Some(HostEvent::Blur { target: target_of(event, nodes)? })
}

fn scroll(_event: &Event, _nodes: &NodeRegistry) -> Option<HostEvent> {
    Some(HostEvent::Scroll)
}

fn storage(event: &Event, _nodes: &NodeRegistry) -> Option<HostEvent> {
    let change = event.dyn_ref::<StorageEvent>()?;
    Some(HostEvent::Storage { key: change.key(), value: change.new_value() })
}

fn color_scheme(event: &Event, _nodes: &NodeRegistry) -> Option<HostEvent> {
    let change = event.dyn_ref::<MediaQueryListEvent>()?;
    Some(HostEvent::ColorScheme { dark: change.matches() })
}

fn log_uncaught_error(event: Event) {
    if let Some(error) = event.dyn_ref::<ErrorEvent>() {
        log::error!("uncaught error: {} ({}:{})", error.message(), error.filename(), error.lineno());
    }
}

fn log_unhandled_rejection(event: Event) {
    if let Some(rejection) = event.dyn_ref::<PromiseRejectionEvent>() {
        log::error!("unhandled promise rejection: {}", describe(&rejection.reason()));
    }
}

// =============================================================
// Mounting
// =============================================================

struct Mounted {
    runtime: Rc<RefCell<Runtime>>,
    listeners: Vec<Listener>,
}

impl Mounted {
    fn teardown(self) {
        let Self { runtime, listeners } = self;
        drop(listeners);
        match runtime.try_borrow_mut() {
            Ok(mut guard) => {
                let Runtime { host, app } = &mut *guard;
                app.teardown(host);
            }
            Err(_) => log::warn!("unmount requested while a handler is running; listeners removed only"),
        }
    }
}

fn mount() -> Result<Mounted, UiError> {
    let window = web_sys::window().ok_or(UiError::MissingRoot("html"))?;
    let document = window.document().ok_or(UiError::MissingRoot("html"))?;
    let nodes = NodeRegistry::default();
    let backlog = Rc::new(RefCell::new(VecDeque::new()));

    let runtime = Rc::new_cyclic(|weak: &Weak<RefCell<Runtime>>| {
        let dispatcher = Dispatcher { runtime: weak.clone(), backlog: Rc::clone(&backlog) };
        let host = WebHost::new(window.clone(), document.clone(), nodes.clone(), dispatcher);
        RefCell::new(Runtime { host, app: App::default() })
    });
    let dispatcher = Dispatcher { runtime: Rc::downgrade(&runtime), backlog };

    let listeners = {
        let mut guard = runtime.borrow_mut();
        let Runtime { host, app } = &mut *guard;
        let config = Config::load(&*host);
        *app = App::mount(host, &config);
        dispatcher.drain(host, app);
        app.bind(host, |host| listen(&window, &document, host.color_scheme(), &dispatcher, &nodes))?
    };

    Ok(Mounted { runtime, listeners })
}

/// Attach every page listener. Listeners attached before a failure are
/// dropped, and so detached, with the error.
fn listen(
    window: &EventTarget,
    document: &EventTarget,
    scheme_query: Option<&MediaQueryList>,
    dispatcher: &Dispatcher,
    nodes: &NodeRegistry,
) -> Result<Vec<Listener>, UiError> {
    let mut listeners = vec![
        Listener::forward(document, "click", false, dispatcher, nodes, click)?,
        Listener::forward(document, "keydown", false, dispatcher, nodes, key_down)?,
        Listener::forward(document, "focusin", false, dispatcher, nodes, focus_in)?,
        Listener::forward(document, "focusout", false, dispatcher, nodes, focus_out)?,
        Listener::forward(window, "scroll", true, dispatcher, nodes, scroll)?,
        Listener::forward(window, "storage", false, dispatcher, nodes, storage)?,
        Listener::attach(window, "error", false, log_uncaught_error)?,
        Listener::attach(window, "unhandledrejection", false, log_unhandled_rejection)?,
    ];
    if let Some(query) = scheme_query {
        listeners.push(Listener::forward(query, "change", false, dispatcher, nodes, color_scheme)?);
    }
    Ok(listeners)
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

fn mount_once() {
    if MOUNTED.with(|slot| slot.borrow().is_some()) {
        log::debug!("already mounted");
        return;
    }
    match mount() {
        Ok(mounted) => MOUNTED.with(|slot| *slot.borrow_mut() = Some(mounted)),
        Err(err) => log::error!("mount failed: {err}"),
    }
}

/// Module start hook: install logging, then mount once the DOM is parsed.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    if let Err(err) = console_log::init_with_level(level) {
        log::debug!("console logger not installed: {err}");
    }

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::error!("no document to mount into");
        return;
    };
    if document.ready_state() != DocumentReadyState::Loading {
        mount_once();
        return;
    }

    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let on_ready = Closure::once_into_js(mount_once);
    let attached = document.add_event_listener_with_callback_and_add_event_listener_options(
        "DOMContentLoaded",
        on_ready.unchecked_ref(),
        &options,
    );
    if let Err(err) = attached {
        log::warn!("DOMContentLoaded listener failed, mounting now: {}", describe(&err));
        mount_once();
    }
}

/// Detach every listener and undo the components' page changes.
#[wasm_bindgen]
pub fn unmount() {
    match MOUNTED.with(|slot| slot.borrow_mut().take()) {
        Some(mounted) => mounted.teardown(),
        None => log::debug!("unmount with nothing mounted"),
    }
}
