//! Engine configuration objects.
//!
//! A config is owned independently of the nodes created with it. Nodes keep
//! its key, not a pointer, so freeing a config that nodes still mention leaves
//! them on the default config instead of dangling.

use crate::arena::arena_key;
use crate::types::{Errata, ExperimentalFeature, ExperimentalFeatures};

arena_key! {
    /// Key of a config inside the engine's config arena.
    pub struct ConfigId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeConfig {
    pub errata: Errata,
    pub experimental_features: ExperimentalFeatures,
    /// Pixels per point used when rounding results. 0 disables rounding.
    pub point_scale_factor: f32,
    /// Start nodes with web defaults (row direction, shrink 1, stretch content).
    pub use_web_defaults: bool,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            errata: Errata::NONE,
            experimental_features: ExperimentalFeatures::empty(),
            point_scale_factor: 1.0,
            use_web_defaults: false,
        }
    }
}

impl NativeConfig {
    pub fn set_experimental_feature_enabled(&mut self, feature: ExperimentalFeature, enabled: bool) {
        self.experimental_features.set(feature.into(), enabled);
    }

    pub fn is_experimental_feature_enabled(&self, feature: ExperimentalFeature) -> bool {
        self.experimental_features.contains(feature.into())
    }

    /// Negative factors are meaningless; they behave like 0 (no rounding).
    pub fn set_point_scale_factor(&mut self, pixels_in_point: f32) {
        self.point_scale_factor = if pixels_in_point > 0.0 { pixels_in_point } else { 0.0 };
    }

    pub fn rounds_layout(&self) -> bool {
        self.point_scale_factor != 0.0
    }
}
