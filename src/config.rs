//! Tunables for a media grid.
//!
//! Build with `GridConfig::builder()`; every field has a default matching the
//! stock picker screen.

use crate::models::IndexBias;
use crate::providers::{AssetFilter, ContentMode, TargetSize};

/// Default fraction of the viewport height added above and below it.
const DEFAULT_PREHEAT_INSET_RATIO: f64 = 0.5;

/// Maximum preheat inset ratio.
const MAX_PREHEAT_INSET_RATIO: f64 = 4.0;

/// Default divisor of the viewport height giving the debounce threshold.
const DEFAULT_DEBOUNCE_DIVISOR: f64 = 3.0;

/// Default number of undelivered ChangeSets buffered between the store and
/// the rendering thread.
const DEFAULT_FEED_CAPACITY: usize = 64;

/// What to do when a store hands over a ChangeSet with impossible indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractPolicy {
    /// Panic with the offending index. Default in debug builds.
    Panic,
    /// Log, then fall back to a full reload. Default in release builds.
    FullReload,
}

impl Default for ContractPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::FullReload
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridConfig {
    pub index_bias: IndexBias,
    pub target_size: TargetSize,
    pub content_mode: ContentMode,
    /// Fraction of the viewport height the preheat window extends on each side.
    pub preheat_inset_ratio: f64,
    /// The window is recomputed once its center moved more than
    /// `viewport.height / debounce_divisor`.
    pub debounce_divisor: f64,
    pub contract_policy: ContractPolicy,
    pub filter: AssetFilter,
    pub feed_capacity: usize,
}

impl GridConfig {
    pub fn builder() -> GridConfigBuilder {
        GridConfigBuilder::new()
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfigBuilder::new().build()
    }
}

/// Builder for GridConfig with clamping of out-of-range values.
pub struct GridConfigBuilder {
    index_bias: IndexBias,
    target_size: TargetSize,
    content_mode: ContentMode,
    preheat_inset_ratio: f64,
    debounce_divisor: f64,
    contract_policy: ContractPolicy,
    filter: AssetFilter,
    feed_capacity: usize,
}

impl GridConfigBuilder {
    pub fn new() -> Self {
        Self {
            index_bias: IndexBias::NONE,
            target_size: TargetSize::default(),
            content_mode: ContentMode::default(),
            preheat_inset_ratio: DEFAULT_PREHEAT_INSET_RATIO,
            debounce_divisor: DEFAULT_DEBOUNCE_DIVISOR,
            contract_policy: ContractPolicy::default(),
            filter: AssetFilter::default(),
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }

    pub fn index_bias(mut self, bias: IndexBias) -> Self {
        self.index_bias = bias;
        self
    }

    /// Shorthand for a grid that shows a capture cell before the assets.
    pub fn leading_placeholder(self, enabled: bool) -> Self {
        self.index_bias(IndexBias::from_placeholder(enabled))
    }

    pub fn target_size(mut self, size: TargetSize) -> Self {
        self.target_size = size;
        self
    }

    pub fn content_mode(mut self, mode: ContentMode) -> Self {
        self.content_mode = mode;
        self
    }

    pub fn preheat_inset_ratio(mut self, ratio: f64) -> Self {
        self.preheat_inset_ratio = ratio;
        self
    }

    pub fn debounce_divisor(mut self, divisor: f64) -> Self {
        self.debounce_divisor = divisor;
        self
    }

    pub fn contract_policy(mut self, policy: ContractPolicy) -> Self {
        self.contract_policy = policy;
        self
    }

    pub fn filter(mut self, filter: AssetFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    pub fn build(self) -> GridConfig {
        let preheat_inset_ratio = if self.preheat_inset_ratio.is_finite() {
            self.preheat_inset_ratio.clamp(0.0, MAX_PREHEAT_INSET_RATIO)
        } else {
            DEFAULT_PREHEAT_INSET_RATIO
        };
        let debounce_divisor = if self.debounce_divisor.is_finite() {
            self.debounce_divisor.max(1.0)
        } else {
            DEFAULT_DEBOUNCE_DIVISOR
        };

        GridConfig {
            index_bias: self.index_bias,
            target_size: self.target_size,
            content_mode: self.content_mode,
            preheat_inset_ratio,
            debounce_divisor,
            contract_policy: self.contract_policy,
            filter: self.filter,
            feed_capacity: self.feed_capacity.max(1),
        }
    }
}

impl Default for GridConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
