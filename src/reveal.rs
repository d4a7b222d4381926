//! One-shot reveal animation for page sections.
//!
//! Every tracked section is made visible as soon as the animator starts, so
//! clients that never scroll or never report intersections still see the
//! whole page. Once layout settles, sections starting well below the fold are
//! shifted slightly and observed; the first intersection slides each back
//! into place and stops observing it. When the host cannot observe
//! intersections nothing is deferred.

#[cfg(test)]
#[path = "reveal_test.rs"]
mod reveal_test;

use crate::app::Component;
use crate::config::Config;
use crate::consts::{CLASS_FADE_IN, CLASS_VISIBLE, REVEAL_SELECTOR};
use crate::error::UiError;
use crate::event::Timer;
use crate::host::{Dom, Host, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// Shown in place; no animation pending.
    Shown,
    /// Offset and observed, waiting for its first intersection.
    Deferred,
    /// Slid into place after intersecting. Terminal.
    Revealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealElement {
    pub node: NodeId,
    pub state: RevealState,
}

#[derive(Debug, Clone)]
pub struct RevealAnimator {
    elements: Vec<RevealElement>,
    settle_pending: bool,
    below_fold_margin_px: f64,
    offset: String,
}

impl RevealAnimator {
    /// Show every tracked element and schedule the settle pass.
    pub fn initialize<H: Host>(host: &mut H, config: &Config) -> Result<Self, UiError> {
        let mut elements = Vec::new();
        for node in host.query_selector_all(REVEAL_SELECTOR) {
            show(host, node);
            elements.push(RevealElement { node, state: RevealState::Shown });
        }

        let settle_pending = !elements.is_empty() && host.supports_intersection_observer();
        if settle_pending {
            host.set_timeout(config.reveal_settle_ms, Timer::RevealSettle);
        } else if !elements.is_empty() {
            log::debug!("intersection observer unavailable, reveal effect skipped");
        }

        Ok(Self {
            elements,
            settle_pending,
            below_fold_margin_px: config.below_fold_margin_px,
            offset: format!("translateY({}px)", config.reveal_offset_px),
        })
    }

    #[must_use]
    pub fn elements(&self) -> &[RevealElement] {
        &self.elements
    }

    /// Defer elements that start more than the margin below the viewport.
    pub fn on_settle<H: Host>(&mut self, host: &mut H) {
        if !std::mem::take(&mut self.settle_pending) {
            return;
        }
        let threshold = host.viewport_height() + self.below_fold_margin_px;
        let mut deferred = 0_usize;
        for element in &mut self.elements {
            if element.state != RevealState::Shown || host.bounding_top(element.node) <= threshold {
                continue;
            }
            if !host.observe_intersection(element.node) {
                continue;
            }
            host.set_class(element.node, CLASS_FADE_IN, true);
            host.set_style(element.node, "transform", &self.offset);
            element.state = RevealState::Deferred;
            deferred += 1;
        }
        log::debug!("reveal deferred {deferred} of {} sections", self.elements.len());
    }

    /// Slide a deferred element into place. Returns `false` for anything
    /// that was not waiting.
    pub fn on_intersect<H: Host>(&mut self, host: &mut H, target: NodeId) -> bool {
        let Some(element) =
            self.elements.iter_mut().find(|e| e.node == target && e.state == RevealState::Deferred)
        else {
            return false;
        };
        host.set_style(element.node, "transform", "none");
        host.set_class(element.node, CLASS_VISIBLE, true);
        host.unobserve_intersection(element.node);
        element.state = RevealState::Revealed;
        true
    }
}

impl Component for RevealAnimator {
    const NAME: &'static str = "reveal";

    /// Stop observing and put every deferred element back in place.
    fn teardown<H: Host>(&mut self, host: &mut H) {
        self.settle_pending = false;
        for element in &mut self.elements {
            if element.state == RevealState::Deferred {
                host.unobserve_intersection(element.node);
                host.set_style(element.node, "transform", "none");
                element.state = RevealState::Shown;
            }
        }
    }
}

fn show(dom: &mut impl Dom, node: NodeId) {
    dom.set_class(node, CLASS_VISIBLE, true);
    dom.set_style(node, "opacity", "1");
    dom.set_style(node, "transform", "none");
}
