use tracing::trace;

use crate::config::GridConfig;
use crate::layout::Rect;

/// Region ahead of and behind the viewport whose thumbnails are preheated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreheatWindow(Rect);

impl PreheatWindow {
    pub const ZERO: PreheatWindow = PreheatWindow(Rect::ZERO);

    pub fn rect(&self) -> Rect {
        self.0
    }
}

/// Turns scroll positions into a debounced preheat window.
///
/// The window is the viewport grown along the scroll axis by
/// `inset_ratio * viewport.height` on each side. It only moves once its
/// center would shift by more than `viewport.height / debounce_divisor`.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    previous: PreheatWindow,
    inset_ratio: f64,
    debounce_divisor: f64,
}

impl ViewportTracker {
    pub fn new(inset_ratio: f64, debounce_divisor: f64) -> Self {
        Self {
            previous: PreheatWindow::ZERO,
            inset_ratio,
            debounce_divisor,
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.preheat_inset_ratio, config.debounce_divisor)
    }

    /// The window recorded last, `PreheatWindow::ZERO` before the first scroll
    /// or after a reset.
    pub fn window(&self) -> PreheatWindow {
        self.previous
    }

    /// Records a new viewport. Returns the new window when it moved far enough
    /// to be worth recomputing, leaving the stored window untouched otherwise.
    pub fn record_scroll(&mut self, viewport: Rect) -> Option<PreheatWindow> {
        let candidate = viewport.inset(0.0, -self.inset_ratio * viewport.height);
        let delta = (candidate.mid_y() - self.previous.rect().mid_y()).abs();
        let threshold = viewport.height / self.debounce_divisor;

        if delta <= threshold {
            trace!(delta, threshold, "Scroll below preheat threshold");
            return None;
        }

        self.previous = PreheatWindow(candidate);
        Some(self.previous)
    }

    /// Forgets the previous window so the next scroll preheats from scratch.
    pub fn reset(&mut self) {
        self.previous = PreheatWindow::ZERO;
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}
