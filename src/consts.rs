//! DOM contract names and scroll-spy constants.

// ── Element ids ─────────────────────────────────────────────────

pub const THEME_TOGGLE_ID: &str = "theme-toggle";
pub const HAMBURGER_ID: &str = "hamburger";
pub const NAV_MENU_ID: &str = "nav-menu";
pub const CONFIG_ELEMENT_ID: &str = "portfolio-config";

// ── Selectors ───────────────────────────────────────────────────

pub const THEME_ICON_SELECTOR: &str = ".theme-icon";
pub const NAV_LINK_SELECTOR: &str = ".nav-link";
pub const NAVBAR_SELECTOR: &str = ".navbar, nav";
pub const SECTION_SELECTOR: &str = "section[id]";
pub const REVEAL_SELECTOR: &str = "section:not(#hero)";
pub const FOCUSABLE_SELECTOR: &str = "a, button, [tabindex]:not([tabindex=\"-1\"])";
pub const SKIP_LINK_SELECTOR: &str = ".skip-link";

// ── CSS hooks ───────────────────────────────────────────────────

pub const CLASS_ACTIVE: &str = "active";
pub const CLASS_SCROLLED: &str = "scrolled";
pub const CLASS_VISIBLE: &str = "visible";
pub const CLASS_FADE_IN: &str = "fade-in-section";
pub const CLASS_SKIP_LINK: &str = "skip-link";

pub const THEME_ATTRIBUTE: &str = "data-theme";

// ── Storage ─────────────────────────────────────────────────────

pub const THEME_STORAGE_KEY: &str = "theme";

// ── Scroll-spy ──────────────────────────────────────────────────

/// Fraction of the viewport height the reference point sits below the nav bar.
pub const REFERENCE_VIEWPORT_RATIO: f64 = 0.35;

/// Upper bound on the reference point's distance below the nav bar, in pixels.
pub const REFERENCE_MAX_PX: f64 = 260.0;

/// Extra lead applied to every section's start so it activates slightly early.
pub const SECTION_LEAD_PX: f64 = 12.0;

/// Viewport bottom within this distance of the document bottom counts as end of page.
pub const END_OF_PAGE_SLACK_PX: f64 = 4.0;

// ── Reveal ──────────────────────────────────────────────────────

/// Visible fraction at which a deferred element counts as intersecting.
pub const REVEAL_THRESHOLD: f64 = 0.1;

/// Observer root margin; the bottom inset delays reveals slightly past the fold.
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";

// ── Media queries ───────────────────────────────────────────────

pub const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";
