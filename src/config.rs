//! Tunables with page-level overrides.
//!
//! Defaults match the stock stylesheet. A page may override any subset by
//! embedding a JSON object in `<script type="application/json"
//! id="portfolio-config">`; keys are camelCase field names.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::CONFIG_ELEMENT_ID;
use crate::host::Dom;

pub const DEFAULT_HEADER_OFFSET_PX: f64 = 80.0;
pub const DEFAULT_SCROLLED_THRESHOLD_PX: f64 = 50.0;
pub const DEFAULT_REVEAL_SETTLE_MS: u32 = 100;
pub const DEFAULT_BELOW_FOLD_MARGIN_PX: f64 = 100.0;
pub const DEFAULT_REVEAL_OFFSET_PX: f64 = 24.0;
pub const DEFAULT_MENU_FOCUS_DELAY_MS: u32 = 100;
pub const DEFAULT_SKIP_LINK_LABEL: &str = "Skip to main content";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field {field} must be a non-negative number, got {value}")]
    Invalid { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Height of the fixed header subtracted from smooth-scroll targets.
    pub header_offset_px: f64,
    /// Scroll distance after which the nav bar gets the `scrolled` class.
    pub scrolled_threshold_px: f64,
    /// Delay before below-the-fold elements are measured.
    pub reveal_settle_ms: u32,
    /// Elements whose top lies further than this below the viewport are deferred.
    pub below_fold_margin_px: f64,
    /// Vertical offset a deferred element slides in from.
    pub reveal_offset_px: f64,
    /// Delay before focus moves into a freshly opened menu.
    pub menu_focus_delay_ms: u32,
    pub skip_link_label: String,
    /// Element id the skip link jumps to; detected from the page when unset.
    pub skip_link_target: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_offset_px: DEFAULT_HEADER_OFFSET_PX,
            scrolled_threshold_px: DEFAULT_SCROLLED_THRESHOLD_PX,
            reveal_settle_ms: DEFAULT_REVEAL_SETTLE_MS,
            below_fold_margin_px: DEFAULT_BELOW_FOLD_MARGIN_PX,
            reveal_offset_px: DEFAULT_REVEAL_OFFSET_PX,
            menu_focus_delay_ms: DEFAULT_MENU_FOCUS_DELAY_MS,
            skip_link_label: DEFAULT_SKIP_LINK_LABEL.to_owned(),
            skip_link_target: None,
        }
    }
}

impl Config {
    /// Parse and validate a JSON override block.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the page's override block, falling back to defaults.
    ///
    /// A missing or empty block is silent; a broken one is logged.
    pub fn load(dom: &impl Dom) -> Self {
        let Some(raw) = dom.element_by_id(CONFIG_ELEMENT_ID).and_then(|node| dom.text(node)) else {
            return Self::default();
        };
        if raw.trim().is_empty() {
            return Self::default();
        }
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring page config: {err}");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            ("headerOffsetPx", self.header_offset_px),
            ("scrolledThresholdPx", self.scrolled_threshold_px),
            ("belowFoldMarginPx", self.below_fold_margin_px),
            ("revealOffsetPx", self.reveal_offset_px),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }
}
