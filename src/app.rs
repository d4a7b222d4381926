//! Application bootstrapper and event router.
//!
//! ARCHITECTURE
//! ============
//! `App::mount` builds the components in a fixed order: theme, navigation,
//! reveal, accessibility. Each construction is its own failure boundary; a
//! component that fails to initialize is logged and left out while the rest
//! keep working. Afterwards every host event goes through `App::dispatch`,
//! which hands it to the components that own the affected state.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use crate::a11y::A11yEnhancer;
use crate::config::Config;
use crate::error::UiError;
use crate::event::{HostEvent, Key, Outcome, Timer};
use crate::host::{Host, NodeId};
use crate::nav::NavController;
use crate::reveal::RevealAnimator;
use crate::theme::ThemeController;

/// A mounted piece of page behavior.
pub trait Component {
    /// Name used in logs.
    const NAME: &'static str;

    /// Undo whatever the component changed on the page. Optional.
    fn teardown<H: Host>(&mut self, _host: &mut H) {}
}

impl Component for ThemeController {
    const NAME: &'static str = "theme";
}

/// The mounted components. Any of them may be missing if it failed to start.
#[derive(Debug, Default)]
pub struct App {
    theme: Option<ThemeController>,
    nav: Option<NavController>,
    reveal: Option<RevealAnimator>,
    a11y: Option<A11yEnhancer>,
}

impl App {
    /// Construct every component against `host`.
    pub fn mount<H: Host>(host: &mut H, config: &Config) -> Self {
        let theme = guarded(ThemeController::initialize(host));
        let nav = guarded(NavController::initialize(host, config));
        let reveal = guarded(RevealAnimator::initialize(host, config));
        let a11y = guarded(A11yEnhancer::initialize(host, config));

        let app = Self { theme, nav, reveal, a11y };
        log::info!("mounted {} of 4 components", app.mounted_count());
        app
    }

    #[must_use]
    pub fn mounted_count(&self) -> usize {
        [self.theme.is_some(), self.nav.is_some(), self.reveal.is_some(), self.a11y.is_some()]
            .into_iter()
            .filter(|mounted| *mounted)
            .count()
    }

    #[must_use]
    pub fn theme(&self) -> Option<&ThemeController> {
        self.theme.as_ref()
    }

    #[must_use]
    pub fn nav(&self) -> Option<&NavController> {
        self.nav.as_ref()
    }

    #[must_use]
    pub fn reveal(&self) -> Option<&RevealAnimator> {
        self.reveal.as_ref()
    }

    #[must_use]
    pub fn a11y(&self) -> Option<&A11yEnhancer> {
        self.a11y.as_ref()
    }

    /// Route one event. `Consumed` means the browser default must be prevented.
    pub fn dispatch<H: Host>(&mut self, host: &mut H, event: HostEvent) -> Outcome {
        match event {
            HostEvent::Click { target } => self.on_click(host, target),
            HostEvent::KeyDown { key, shift, target } => self.on_key(host, &key, shift, target),
            HostEvent::Focus { target } => {
                if let Some(a11y) = &self.a11y {
                    a11y.on_focus(host, target);
                }
                Outcome::Ignored
            }
            HostEvent::Blur { target } => {
                if let Some(a11y) = &self.a11y {
                    a11y.on_blur(host, target);
                }
                Outcome::Ignored
            }
            HostEvent::Scroll => {
                if let Some(nav) = &mut self.nav {
                    nav.on_scroll(host);
                }
                Outcome::Ignored
            }
            HostEvent::Frame => {
                if let Some(nav) = &mut self.nav {
                    nav.on_frame(host);
                }
                Outcome::Ignored
            }
            HostEvent::Timer(Timer::RevealSettle) => {
                if let Some(reveal) = &mut self.reveal {
                    reveal.on_settle(host);
                }
                Outcome::Ignored
            }
            HostEvent::Timer(Timer::MenuFocus) => {
                let (menu, open) = self.nav.as_ref().map_or((None, false), |nav| (nav.menu(), nav.is_open()));
                if let Some(a11y) = &mut self.a11y {
                    a11y.on_menu_focus(host, menu, open);
                }
                Outcome::Ignored
            }
            HostEvent::ColorScheme { dark } => {
                if let Some(theme) = &mut self.theme {
                    theme.on_color_scheme(host, dark);
                }
                Outcome::Ignored
            }
            HostEvent::Storage { key, value } => {
                if let Some(theme) = &mut self.theme {
                    theme.on_storage(host, key.as_deref(), value.as_deref());
                }
                Outcome::Ignored
            }
            HostEvent::Intersect { target } => {
                if let Some(reveal) = &mut self.reveal {
                    reveal.on_intersect(host, target);
                }
                Outcome::Ignored
            }
        }
    }

    fn on_click<H: Host>(&mut self, host: &mut H, target: NodeId) -> Outcome {
        if let Some(theme) = &mut self.theme {
            if theme.is_toggle_target(host, target) {
                // The toggle lives outside the menu but is not an outside click.
                theme.toggle(host);
                return Outcome::Consumed;
            }
        }
        let was_open = self.menu_open();
        let outcome = match &mut self.nav {
            Some(nav) => nav.on_click(host, target),
            None => Outcome::Ignored,
        };
        self.after_nav(host, was_open);
        outcome
    }

    fn on_key<H: Host>(&mut self, host: &mut H, key: &Key, shift: bool, target: Option<NodeId>) -> Outcome {
        if let (Some(a11y), Some(theme)) = (&self.a11y, &mut self.theme) {
            if a11y.activates_toggle(host, key, target) {
                theme.toggle(host);
                return Outcome::Consumed;
            }
        }
        let was_open = self.menu_open();
        let outcome = match &mut self.nav {
            Some(nav) => nav.on_key(host, key, shift),
            None => Outcome::Ignored,
        };
        self.after_nav(host, was_open);
        outcome
    }

    fn menu_open(&self) -> bool {
        self.nav.as_ref().is_some_and(NavController::is_open)
    }

    fn after_nav<H: Host>(&mut self, host: &mut H, was_open: bool) {
        if !was_open && self.menu_open() {
            if let Some(a11y) = &mut self.a11y {
                a11y.on_menu_opened(host);
            }
        }
    }

    /// Wire the mounted app to its event sources. If `attach` fails the app
    /// is torn down before the error is returned.
    pub fn bind<H: Host, T>(
        &mut self,
        host: &mut H,
        attach: impl FnOnce(&mut H) -> Result<T, UiError>,
    ) -> Result<T, UiError> {
        let wired = attach(&mut *host);
        wired.inspect_err(|err| {
            log::error!("event wiring failed, unmounting: {err}");
            self.teardown(host);
        })
    }

    /// Tear components down in reverse mount order.
    pub fn teardown<H: Host>(&mut self, host: &mut H) {
        teardown_slot(&mut self.a11y, host);
        teardown_slot(&mut self.reveal, host);
        teardown_slot(&mut self.nav, host);
        teardown_slot(&mut self.theme, host);
        log::info!("unmounted");
    }
}

fn guarded<C: Component>(result: Result<C, UiError>) -> Option<C> {
    match result {
        Ok(component) => Some(component),
        Err(err) => {
            log::error!("{} failed to initialize: {err}", C::NAME);
            None
        }
    }
}

fn teardown_slot<C: Component, H: Host>(slot: &mut Option<C>, host: &mut H) {
    if let Some(mut component) = slot.take() {
        component.teardown(host);
    }
}
