//! Accessibility affordances layered over the markup.
//!
//! - A skip link injected as the first child of `<body>`, off-screen until it
//!   receives focus.
//! - Enter/Space activation for a theme toggle that is not a native control.
//! - Focus moved into the navigation menu shortly after it opens.

#[cfg(test)]
#[path = "a11y_test.rs"]
mod a11y_test;

use crate::app::Component;
use crate::config::Config;
use crate::consts::{CLASS_SKIP_LINK, NAV_LINK_SELECTOR, SECTION_SELECTOR, SKIP_LINK_SELECTOR, THEME_TOGGLE_ID};
use crate::error::UiError;
use crate::event::{Key, Timer};
use crate::host::{Dom, Host, NodeId};

const MAIN_ID: &str = "main";
const GENERATED_MAIN_ID: &str = "main-content";
const SKIP_LINK_HIDDEN_TOP: &str = "-40px";

#[derive(Debug, Clone)]
pub struct A11yEnhancer {
    skip_link: Option<NodeId>,
    /// Whether `skip_link` was injected here rather than found in the markup.
    owns_skip_link: bool,
    custom_toggle: Option<NodeId>,
    menu_focus_delay_ms: u32,
    menu_focus_pending: bool,
}

impl A11yEnhancer {
    pub fn initialize<H: Host>(host: &mut H, config: &Config) -> Result<Self, UiError> {
        let body = host.body().ok_or(UiError::MissingRoot("body"))?;

        let (skip_link, owns_skip_link) = match host.query_selector(SKIP_LINK_SELECTOR) {
            Some(existing) => (Some(existing), false),
            None => {
                let injected = inject_skip_link(host, body, config);
                (injected, injected.is_some())
            }
        };
        if let Some(link) = skip_link {
            hide_skip_link(host, link);
        }

        let custom_toggle = host.element_by_id(THEME_TOGGLE_ID).filter(|t| !is_native_control(&*host, *t));
        if let Some(toggle) = custom_toggle {
            if host.attribute(toggle, "role").is_none() {
                host.set_attribute(toggle, "role", "button");
            }
            if host.attribute(toggle, "tabindex").is_none() {
                host.set_attribute(toggle, "tabindex", "0");
            }
        }

        Ok(Self {
            skip_link,
            owns_skip_link,
            custom_toggle,
            menu_focus_delay_ms: config.menu_focus_delay_ms,
            menu_focus_pending: false,
        })
    }

    #[must_use]
    pub fn skip_link(&self) -> Option<NodeId> {
        self.skip_link
    }

    pub fn on_focus(&self, dom: &mut impl Dom, target: NodeId) {
        if self.skip_link == Some(target) {
            dom.set_style(target, "top", "0");
        }
    }

    pub fn on_blur(&self, dom: &mut impl Dom, target: NodeId) {
        if self.skip_link == Some(target) {
            hide_skip_link(dom, target);
        }
    }

    /// Whether `key` pressed on `target` should activate the theme toggle.
    #[must_use]
    pub fn activates_toggle(&self, dom: &impl Dom, key: &Key, target: Option<NodeId>) -> bool {
        let (Some(toggle), Some(target)) = (self.custom_toggle, target) else {
            return false;
        };
        key.is_activation() && dom.contains(toggle, target)
    }

    /// Schedule moving focus into the menu that just opened.
    pub fn on_menu_opened<H: Host>(&mut self, host: &mut H) {
        self.menu_focus_pending = true;
        host.set_timeout(self.menu_focus_delay_ms, Timer::MenuFocus);
    }

    /// Focus the first nav link of `menu` if it is still open.
    pub fn on_menu_focus(&mut self, dom: &mut impl Dom, menu: Option<NodeId>, open: bool) {
        if !std::mem::take(&mut self.menu_focus_pending) || !open {
            return;
        }
        let Some(first) = menu.and_then(|m| dom.query_within(m, NAV_LINK_SELECTOR).into_iter().next()) else {
            return;
        };
        dom.focus(first);
    }
}

impl Component for A11yEnhancer {
    const NAME: &'static str = "accessibility";

    fn teardown<H: Host>(&mut self, host: &mut H) {
        self.menu_focus_pending = false;
        if self.owns_skip_link {
            if let Some(link) = self.skip_link.take() {
                host.remove(link);
            }
            self.owns_skip_link = false;
        }
    }
}

fn is_native_control(dom: &impl Dom, node: NodeId) -> bool {
    matches!(dom.tag_name(node).as_str(), "BUTTON" | "A" | "INPUT")
}

/// Pick the element the skip link jumps to: the configured id, `#main`, the
/// `<main>` element, then the first section. Returns its id.
fn resolve_skip_target(dom: &mut impl Dom, config: &Config) -> Option<String> {
    if let Some(id) = config.skip_link_target.as_deref() {
        if dom.element_by_id(id).is_some() {
            return Some(id.to_owned());
        }
        log::warn!("skip link target #{id} not found");
    }
    if dom.element_by_id(MAIN_ID).is_some() {
        return Some(MAIN_ID.to_owned());
    }
    if let Some(main) = dom.query_selector("main") {
        if let Some(id) = dom.attribute(main, "id").filter(|id| !id.is_empty()) {
            return Some(id);
        }
        dom.set_attribute(main, "id", GENERATED_MAIN_ID);
        return Some(GENERATED_MAIN_ID.to_owned());
    }
    dom.query_selector(SECTION_SELECTOR).and_then(|s| dom.attribute(s, "id"))
}

fn inject_skip_link(dom: &mut impl Dom, body: NodeId, config: &Config) -> Option<NodeId> {
    let Some(target) = resolve_skip_target(dom, config) else {
        log::debug!("no skip link target on this page");
        return None;
    };
    dom.prepend_anchor(body, &format!("#{target}"), &config.skip_link_label, CLASS_SKIP_LINK)
}

fn hide_skip_link(dom: &mut impl Dom, link: NodeId) {
    dom.set_style(link, "position", "absolute");
    dom.set_style(link, "left", "0");
    dom.set_style(link, "z-index", "1000");
    dom.set_style(link, "top", SKIP_LINK_HIDDEN_TOP);
}
