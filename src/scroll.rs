//! Scroll-spy: which section is "current" for a given scroll position.
//!
//! The reference point sits below the nav bar, biased toward the upper middle
//! of the viewport, so a section becomes current before it reaches the top.
//! Geometry is read fresh for every computation and never cached.

#[cfg(test)]
#[path = "scroll_test.rs"]
mod scroll_test;

use crate::consts::{
    END_OF_PAGE_SLACK_PX, NAVBAR_SELECTOR, REFERENCE_MAX_PX, REFERENCE_VIEWPORT_RATIO, SECTION_LEAD_PX,
    SECTION_SELECTOR,
};
use crate::host::{Dom, Host, Scheduler};

/// A `section[id]` as laid out right now.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Window measurements taken together for one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    pub nav_height: f64,
}

impl ScrollMetrics {
    /// Measure the host. The nav height is zero on pages without a nav bar.
    pub fn measure<H: Host>(host: &H) -> Self {
        let nav_height = host.query_selector(NAVBAR_SELECTOR).map_or(0.0, |nav| host.offset_height(nav));
        Self {
            scroll_y: host.scroll_y(),
            viewport_height: host.viewport_height(),
            document_height: host.document_height(),
            nav_height,
        }
    }

    /// The y coordinate a section must contain to be current.
    #[must_use]
    pub fn reference_y(&self) -> f64 {
        let bias = (REFERENCE_VIEWPORT_RATIO * self.viewport_height).min(REFERENCE_MAX_PX);
        self.scroll_y + self.nav_height + bias
    }

    /// Whether the viewport bottom has reached the end of the document.
    #[must_use]
    pub fn at_end_of_page(&self) -> bool {
        self.scroll_y + self.viewport_height >= self.document_height - END_OF_PAGE_SLACK_PX
    }
}

impl Section {
    fn start(&self, nav_height: f64) -> f64 {
        self.top - nav_height - SECTION_LEAD_PX
    }

    /// Whether `y` falls inside this section's nav-adjusted span.
    #[must_use]
    pub fn contains(&self, y: f64, nav_height: f64) -> bool {
        let start = self.start(nav_height);
        y >= start && y < start + self.height
    }
}

/// Read every `section[id]` in document order.
pub fn read_sections(dom: &impl Dom) -> Vec<Section> {
    dom.query_selector_all(SECTION_SELECTOR)
        .into_iter()
        .filter_map(|node| {
            let id = dom.attribute(node, "id").filter(|id| !id.is_empty())?;
            Some(Section { id, top: dom.offset_top(node), height: dom.offset_height(node) })
        })
        .collect()
}

/// Index of the current section, `None` only when there are no sections.
///
/// The end of the page forces the last section so a short final section can
/// still become current. When the reference point falls in no span it is
/// either above the first section (first wins) or in a gap or below the last
/// span, where the last section it has passed wins.
#[must_use]
pub fn current_section(sections: &[Section], metrics: &ScrollMetrics) -> Option<usize> {
    let last = sections.len().checked_sub(1)?;
    if metrics.at_end_of_page() {
        return Some(last);
    }

    let y = metrics.reference_y();
    if let Some(index) = sections.iter().position(|s| s.contains(y, metrics.nav_height)) {
        return Some(index);
    }
    if y < sections[0].start(metrics.nav_height) {
        return Some(0);
    }
    let passed = sections.iter().rposition(|s| s.start(metrics.nav_height) <= y);
    Some(passed.unwrap_or(0))
}

/// Coalesces scroll events into one computation per animation frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    /// Note a scroll event; asks for a frame unless one is already pending.
    pub fn schedule(&mut self, scheduler: &mut impl Scheduler) {
        if self.pending {
            return;
        }
        self.pending = true;
        scheduler.request_frame();
    }

    /// Consume the pending frame. Returns `false` for a frame nobody asked for.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
