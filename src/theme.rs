//! Theme preference and controller.
//!
//! The persisted value under `theme` is the user's explicit choice. While it
//! is absent the page follows the OS colour scheme live; the first explicit
//! toggle persists a value and from then on OS changes are ignored.
//!
//! [`ThemeController::apply`] only touches the document. Persisting is left
//! to [`ThemeController::toggle`] so OS-driven changes never turn into a
//! stored user choice.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use crate::consts::{THEME_ATTRIBUTE, THEME_ICON_SELECTOR, THEME_STORAGE_KEY, THEME_TOGGLE_ID};
use crate::error::UiError;
use crate::host::{Dom, Host, KeyValueStore, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value; anything other than `light`/`dark` is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    /// Material icon name shown on the toggle: the theme a click switches to.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "dark_mode",
            Self::Dark => "light_mode",
        }
    }

    fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Switch to dark theme",
            Self::Dark => "Switch to light theme",
        }
    }
}

/// The single persisted theme flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceStore;

impl PreferenceStore {
    /// The stored explicit choice, if any.
    pub fn load(self, store: &impl KeyValueStore) -> Result<Option<Theme>, UiError> {
        let raw = store.get(THEME_STORAGE_KEY)?;
        Ok(raw.as_deref().and_then(Theme::parse))
    }

    pub fn save(self, store: &mut impl KeyValueStore, theme: Theme) -> Result<(), UiError> {
        store.set(THEME_STORAGE_KEY, theme.as_str())
    }

    /// Whether the user has made an explicit choice. Unreadable storage
    /// counts as no choice.
    pub fn has_choice(self, store: &impl KeyValueStore) -> bool {
        matches!(self.load(store), Ok(Some(_)))
    }
}

/// Owns the document's `data-theme` attribute.
#[derive(Debug, Clone)]
pub struct ThemeController {
    root: NodeId,
    toggle: Option<NodeId>,
    icon: Option<NodeId>,
    store: PreferenceStore,
    current: Theme,
    /// Set once the user picks a theme, even if persisting it failed.
    explicit: bool,
}

impl ThemeController {
    /// Resolve the initial theme and apply it.
    ///
    /// A stored choice wins over the OS preference. An unreadable store
    /// falls back to light.
    pub fn initialize<H: Host>(host: &mut H) -> Result<Self, UiError> {
        let root = host.document_element().ok_or(UiError::MissingRoot("html"))?;
        let toggle = host.element_by_id(THEME_TOGGLE_ID);
        let icon = toggle.and_then(|t| host.query_within(t, THEME_ICON_SELECTOR).into_iter().next());
        let store = PreferenceStore;

        let initial = match store.load(host) {
            Ok(Some(theme)) => theme,
            Ok(None) => Theme::from_dark(host.prefers_dark()),
            Err(err) => {
                log::warn!("theme preference unreadable, using light: {err}");
                Theme::Light
            }
        };

        let mut controller = Self { root, toggle, icon, store, current: initial, explicit: false };
        controller.apply(host, initial);
        log::debug!("theme initialized to {}", initial.as_str());
        Ok(controller)
    }

    #[must_use]
    pub fn current(&self) -> Theme {
        self.current
    }

    #[must_use]
    pub fn toggle_element(&self) -> Option<NodeId> {
        self.toggle
    }

    /// Flip, apply and persist.
    pub fn toggle<H: Host>(&mut self, host: &mut H) -> Theme {
        let next = self.current.flipped();
        self.explicit = true;
        self.apply(host, next);
        if let Err(err) = self.store.save(host, next) {
            log::warn!("theme preference not saved: {err}");
        }
        next
    }

    /// Write the theme to the document without persisting it.
    pub fn apply(&mut self, dom: &mut impl Dom, theme: Theme) {
        self.current = theme;
        dom.set_attribute(self.root, THEME_ATTRIBUTE, theme.as_str());
        if let Some(icon) = self.icon {
            dom.set_text(icon, theme.icon());
        }
        if let Some(toggle) = self.toggle {
            dom.set_attribute(toggle, "aria-label", theme.toggle_label());
        }
    }

    /// Whether a click on `target` activates the toggle.
    #[must_use]
    pub fn is_toggle_target(&self, dom: &impl Dom, target: NodeId) -> bool {
        self.toggle.is_some_and(|toggle| dom.contains(toggle, target))
    }

    /// Follow an OS colour-scheme change unless the user chose explicitly.
    pub fn on_color_scheme<H: Host>(&mut self, host: &mut H, dark: bool) {
        if self.explicit || self.store.has_choice(host) {
            return;
        }
        self.apply(host, Theme::from_dark(dark));
    }

    /// Mirror a change to the stored value made in another tab.
    ///
    /// A removed or unrecognized value falls back to the OS preference.
    pub fn on_storage<H: Host>(&mut self, host: &mut H, key: Option<&str>, value: Option<&str>) {
        // `key` is `None` when the whole store was cleared.
        if key.is_some_and(|k| k != THEME_STORAGE_KEY) {
            return;
        }
        let chosen = value.and_then(Theme::parse);
        self.explicit = chosen.is_some();
        let theme = chosen.unwrap_or_else(|| Theme::from_dark(host.prefers_dark()));
        self.apply(host, theme);
    }
}
