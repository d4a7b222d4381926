//! Navigation menu state machine, focus trap, and active-link tracking.
//!
//! DESIGN
//! ======
//! The menu is either closed or open and only the transition methods change
//! it. Entering `Open` engages the body scroll lock and installs the focus
//! trap and Escape handlers; every path back to `Closed` (hamburger, link
//! click, outside click, Escape, teardown) goes through the same exit routine
//! and releases all three. Key events reach the handlers only while they are
//! installed, so the trap exists exactly while the menu is open.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use crate::app::Component;
use crate::config::Config;
use crate::consts::{
    CLASS_ACTIVE, CLASS_SCROLLED, FOCUSABLE_SELECTOR, HAMBURGER_ID, NAV_LINK_SELECTOR, NAV_MENU_ID, NAVBAR_SELECTOR,
};
use crate::error::UiError;
use crate::event::{Key, Outcome};
use crate::host::{Dom, Host, NodeId};
use crate::scroll::{FrameGate, ScrollMetrics, current_section, read_sections};

/// Whether the responsive menu is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Document-level key handlers owned by the navigation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandler {
    FocusTrap,
    EscapeDismiss,
}

/// Installed key handlers. Each handler is present at most once.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    installed: Vec<KeyHandler>,
}

impl Subscriptions {
    /// Returns `false` if `handler` was already installed.
    pub fn install(&mut self, handler: KeyHandler) -> bool {
        if self.is_installed(handler) {
            return false;
        }
        self.installed.push(handler);
        true
    }

    /// Returns `false` if `handler` was not installed.
    pub fn uninstall(&mut self, handler: KeyHandler) -> bool {
        let before = self.installed.len();
        self.installed.retain(|h| *h != handler);
        self.installed.len() != before
    }

    #[must_use]
    pub fn is_installed(&self, handler: KeyHandler) -> bool {
        self.installed.contains(&handler)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

/// Tab order confined to the menu's focusable descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    items: Vec<NodeId>,
}

impl FocusTrap {
    /// Capture the focusable descendants of `menu` in document order.
    pub fn capture(dom: &impl Dom, menu: NodeId) -> Self {
        Self { items: dom.query_within(menu, FOCUSABLE_SELECTOR) }
    }

    #[must_use]
    pub fn first(&self) -> Option<NodeId> {
        self.items.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.items.last().copied()
    }

    /// Where focus must go for a Tab (`backwards` = Shift+Tab) press, or
    /// `None` when the browser's own tab order stays inside the trap.
    ///
    /// Tab on the last item wraps to the first and Shift+Tab on the first
    /// wraps to the last. Focus outside the trap is pulled back in.
    #[must_use]
    pub fn redirect(&self, active: Option<NodeId>, backwards: bool) -> Option<NodeId> {
        let first = self.first()?;
        let last = self.last()?;
        let Some(active) = active.filter(|node| self.items.contains(node)) else {
            return Some(if backwards { last } else { first });
        };
        match (backwards, active) {
            (true, a) if a == first => Some(last),
            (false, a) if a == last => Some(first),
            _ => None,
        }
    }
}

/// A `.nav-link` and whether it is highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub node: NodeId,
    pub href: String,
    pub active: bool,
}

impl NavLink {
    /// The in-page id this link points at, for `#fragment` hrefs.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.href.strip_prefix('#')
    }
}

#[derive(Debug, Clone)]
pub struct NavController {
    hamburger: Option<NodeId>,
    menu: Option<NodeId>,
    navbar: Option<NodeId>,
    body: Option<NodeId>,
    links: Vec<NavLink>,
    state: MenuState,
    trap: Option<FocusTrap>,
    handlers: Subscriptions,
    gate: FrameGate,
    header_offset_px: f64,
    scrolled_threshold_px: f64,
}

impl NavController {
    /// Look up the navigation elements and highlight the initial section.
    pub fn initialize<H: Host>(host: &mut H, config: &Config) -> Result<Self, UiError> {
        let links = host
            .query_selector_all(NAV_LINK_SELECTOR)
            .into_iter()
            .map(|node| NavLink {
                node,
                href: host.attribute(node, "href").unwrap_or_default(),
                active: host.has_class(node, CLASS_ACTIVE),
            })
            .collect();

        let mut nav = Self {
            hamburger: host.element_by_id(HAMBURGER_ID),
            menu: host.element_by_id(NAV_MENU_ID),
            navbar: host.query_selector(NAVBAR_SELECTOR),
            body: host.body(),
            links,
            state: MenuState::Closed,
            trap: None,
            handlers: Subscriptions::default(),
            gate: FrameGate::default(),
            header_offset_px: config.header_offset_px,
            scrolled_threshold_px: config.scrolled_threshold_px,
        };
        if let Some(hamburger) = nav.hamburger {
            host.set_attribute(hamburger, "aria-expanded", "false");
        }
        nav.update_active_link(host);
        Ok(nav)
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    #[must_use]
    pub fn menu(&self) -> Option<NodeId> {
        self.menu
    }

    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// The highlighted link's href, if any.
    #[must_use]
    pub fn active_href(&self) -> Option<&str> {
        self.links.iter().find(|l| l.active).map(|l| l.href.as_str())
    }

    #[must_use]
    pub fn handlers(&self) -> &Subscriptions {
        &self.handlers
    }

    // --- Transitions ---

    /// Hamburger behavior: open when closed, close when open.
    pub fn toggle_menu<H: Host>(&mut self, host: &mut H) {
        match self.state {
            MenuState::Closed => self.open(host),
            MenuState::Open => self.close(host),
        }
    }

    /// Open the menu. No-op without a menu element or when already open.
    pub fn open<H: Host>(&mut self, host: &mut H) {
        let Some(menu) = self.menu else {
            return;
        };
        if self.is_open() {
            return;
        }
        self.state = MenuState::Open;
        self.set_open_markers(host, true);
        if let Some(body) = self.body {
            host.set_style(body, "overflow", "hidden");
        }

        let trap = FocusTrap::capture(host, menu);
        if let Some(first) = trap.first() {
            host.focus(first);
        }
        self.trap = Some(trap);
        self.handlers.install(KeyHandler::FocusTrap);
        self.handlers.install(KeyHandler::EscapeDismiss);
        log::debug!("menu opened");
    }

    /// Close the menu, releasing the scroll lock and key handlers.
    pub fn close<H: Host>(&mut self, host: &mut H) {
        if !self.is_open() {
            return;
        }
        self.state = MenuState::Closed;
        self.set_open_markers(host, false);
        if let Some(body) = self.body {
            host.set_style(body, "overflow", "");
        }
        self.trap = None;
        self.handlers.uninstall(KeyHandler::FocusTrap);
        self.handlers.uninstall(KeyHandler::EscapeDismiss);
        log::debug!("menu closed");
    }

    fn set_open_markers(&self, dom: &mut impl Dom, open: bool) {
        if let Some(hamburger) = self.hamburger {
            dom.set_class(hamburger, CLASS_ACTIVE, open);
            dom.set_attribute(hamburger, "aria-expanded", if open { "true" } else { "false" });
        }
        if let Some(menu) = self.menu {
            dom.set_class(menu, CLASS_ACTIVE, open);
        }
    }

    // --- Events ---

    pub fn on_click<H: Host>(&mut self, host: &mut H, target: NodeId) -> Outcome {
        if self.hamburger.is_some_and(|h| host.contains(h, target)) {
            self.toggle_menu(host);
            return Outcome::Consumed;
        }

        if let Some(index) = self.links.iter().position(|l| host.contains(l.node, target)) {
            return self.follow_link(host, index);
        }

        if self.is_open() && !self.menu.is_some_and(|m| host.contains(m, target)) {
            self.close(host);
        }
        Outcome::Ignored
    }

    fn follow_link<H: Host>(&mut self, host: &mut H, index: usize) -> Outcome {
        self.close(host);
        let Some(fragment) = self.links[index].fragment().map(str::to_owned) else {
            return Outcome::Ignored;
        };
        if let Some(target) = host.element_by_id(&fragment) {
            let top = (host.offset_top(target) - self.header_offset_px).max(0.0);
            host.scroll_to(top);
        }
        self.activate(host, index);
        Outcome::Consumed
    }

    pub fn on_key<H: Host>(&mut self, host: &mut H, key: &Key, shift: bool) -> Outcome {
        match key {
            Key::Escape if self.handlers.is_installed(KeyHandler::EscapeDismiss) => {
                self.close(host);
                if let Some(hamburger) = self.hamburger {
                    host.focus(hamburger);
                }
                Outcome::Consumed
            }
            Key::Tab if self.handlers.is_installed(KeyHandler::FocusTrap) => {
                let next = self.trap.as_ref().and_then(|trap| trap.redirect(host.active_element(), shift));
                match next {
                    Some(node) => {
                        host.focus(node);
                        Outcome::Consumed
                    }
                    None => Outcome::Ignored,
                }
            }
            _ => Outcome::Ignored,
        }
    }

    /// Note a scroll; the active link is recomputed on the next frame.
    pub fn on_scroll<H: Host>(&mut self, host: &mut H) {
        self.gate.schedule(host);
    }

    pub fn on_frame<H: Host>(&mut self, host: &mut H) {
        if self.gate.take() {
            self.update_active_link(host);
        }
    }

    /// Run scroll-spy once: highlight the current section's link and mark
    /// the nav bar as scrolled past the threshold.
    ///
    /// A current section without a link hands the highlight to the nearest
    /// earlier section that has one, else to the first link, so exactly one
    /// link is active whenever links exist.
    pub fn update_active_link<H: Host>(&mut self, host: &mut H) {
        let metrics = ScrollMetrics::measure(host);
        if let Some(navbar) = self.navbar {
            host.set_class(navbar, CLASS_SCROLLED, metrics.scroll_y > self.scrolled_threshold_px);
        }
        if self.links.is_empty() {
            return;
        }

        let sections = read_sections(host);
        let index = current_section(&sections, &metrics)
            .and_then(|current| sections[..=current].iter().rev().find_map(|s| self.link_for(&s.id)))
            .unwrap_or(0);
        self.activate(host, index);
    }

    fn link_for(&self, id: &str) -> Option<usize> {
        self.links.iter().position(|l| l.fragment() == Some(id))
    }

    /// Highlight exactly the link at `index`.
    fn activate(&mut self, dom: &mut impl Dom, index: usize) {
        for (i, link) in self.links.iter_mut().enumerate() {
            let active = i == index;
            if link.active != active || dom.has_class(link.node, CLASS_ACTIVE) != active {
                dom.set_class(link.node, CLASS_ACTIVE, active);
            }
            link.active = active;
        }
    }
}

impl Component for NavController {
    const NAME: &'static str = "navigation";

    /// Release everything an open menu holds.
    fn teardown<H: Host>(&mut self, host: &mut H) {
        self.close(host);
    }
}
