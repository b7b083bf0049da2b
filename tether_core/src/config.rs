// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization settings and the per-call context.
//!
//! Everything a proxy would otherwise read from ambient globals (the device
//! pixel ratio, the host environment, the diagnostics sink) is passed in
//! explicitly through a [`SyncContext`].

use core::fmt;

use crate::host::ElementHost;
use crate::trace::Tracer;

/// How a proxy decides whether its ancestors are visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AncestorVisibility {
    /// Walk the parent chain on every tick. O(depth), always current.
    #[default]
    Walk,
    /// Use the store's cached effective-hidden state. O(1), but only
    /// current once [`LayerStore::evaluate`](crate::layer::LayerStore::evaluate)
    /// has run after the last visibility or topology change.
    Cached,
}

/// Settings for mirroring layer state onto foreign elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncConfig {
    /// Ratio of the renderer's physical pixels to the host's CSS pixels.
    pub device_pixel_ratio: f64,
    /// Decimal digits used when serializing matrix components.
    pub precision: usize,
    /// Also write `-webkit-` prefixed transform properties.
    pub vendor_prefix: bool,
    /// Ancestor visibility strategy.
    pub ancestor_visibility: AncestorVisibility,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            precision: 4,
            vendor_prefix: true,
            ancestor_visibility: AncestorVisibility::Walk,
        }
    }
}

impl SyncConfig {
    /// Returns a copy with the given device pixel ratio.
    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Returns a copy with the given matrix precision.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Returns a copy with vendor-prefixed writes enabled or disabled.
    #[must_use]
    pub fn with_vendor_prefix(mut self, vendor_prefix: bool) -> Self {
        self.vendor_prefix = vendor_prefix;
        self
    }

    /// Returns a copy with the given ancestor visibility strategy.
    #[must_use]
    pub fn with_ancestor_visibility(mut self, mode: AncestorVisibility) -> Self {
        self.ancestor_visibility = mode;
        self
    }

    /// The ratio actually used for scaling.
    ///
    /// Non-finite and non-positive ratios fall back to 1.
    #[must_use]
    pub fn effective_device_pixel_ratio(&self) -> f64 {
        let ratio = self.device_pixel_ratio;
        if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        }
    }
}

/// Everything a proxy operation needs besides the tree itself.
pub struct SyncContext<'a, H: ElementHost> {
    /// The environment hosting the foreign elements.
    pub host: &'a mut H,
    /// Synchronization settings.
    pub config: &'a SyncConfig,
    /// Diagnostics.
    pub tracer: Tracer<'a>,
}

impl<H: ElementHost> fmt::Debug for SyncContext<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("config", self.config)
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}

impl<'a, H: ElementHost> SyncContext<'a, H> {
    /// Creates a context without diagnostics.
    #[must_use]
    pub fn new(host: &'a mut H, config: &'a SyncConfig) -> Self {
        Self {
            host,
            config,
            tracer: Tracer::none(),
        }
    }

    /// Creates a context that reports to `tracer`.
    #[must_use]
    pub fn with_tracer(host: &'a mut H, config: &'a SyncConfig, tracer: Tracer<'a>) -> Self {
        Self {
            host,
            config,
            tracer,
        }
    }
}
