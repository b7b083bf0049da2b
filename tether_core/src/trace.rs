// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for proxy synchronization.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! proxies and the stage call as they bind, mount, release and write styles.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use kurbo::Size;

use crate::error::InitError;
use crate::host::Display;
use crate::layer::LayerId;
use crate::stage::FrameReport;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a proxy binds to an element.
#[derive(Clone, Copy, Debug)]
pub struct BindEvent {
    /// The proxy's layer.
    pub layer: LayerId,
    /// Bounds measured from the element's style.
    pub bounds: Size,
    /// `false` if either dimension was not a pixel length and fell back to 0.
    pub exact: bool,
}

/// A change in a proxy's element ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// The element was inserted into the mount container.
    Mounted,
    /// The element was unmounted and the handle discarded.
    Released,
}

/// Emitted when a proxy mounts or releases its element.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleEvent {
    /// The proxy's layer.
    pub layer: LayerId,
    /// What happened.
    pub kind: LifecycleKind,
}

/// Emitted when a proxy toggles its element's `display`.
#[derive(Clone, Copy, Debug)]
pub struct DisplayEvent {
    /// The proxy's layer.
    pub layer: LayerId,
    /// The new display state.
    pub display: Display,
}

/// Emitted for each transform or opacity write.
#[derive(Clone, Copy, Debug)]
pub struct StyleEvent<'a> {
    /// The proxy's layer.
    pub layer: LayerId,
    /// CSS property name.
    pub property: &'a str,
    /// Written value.
    pub value: &'a str,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives synchronization diagnostics.
///
/// Every method has a no-op default.
pub trait TraceSink {
    /// A proxy bound to an element.
    fn on_bind(&mut self, e: &BindEvent) {
        _ = e;
    }

    /// A proxy failed to bind and stays unbound.
    fn on_bind_failed(&mut self, layer: LayerId, error: &InitError) {
        _ = (layer, error);
    }

    /// A proxy mounted or released its element.
    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        _ = e;
    }

    /// A proxy toggled its element's `display`.
    fn on_display(&mut self, e: &DisplayEvent) {
        _ = e;
    }

    /// A proxy wrote a transform or opacity.
    fn on_style(&mut self, e: &StyleEvent<'_>) {
        _ = e;
    }

    /// A stage finished an update pass.
    fn on_frame(&mut self, report: &FrameReport) {
        _ = report;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Zero-overhead wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is off, all methods are no-ops that the compiler
/// eliminates entirely.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer with no sink (all calls are no-ops).
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Reports a successful bind.
    #[inline]
    pub fn bind(&mut self, e: &BindEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_bind(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a failed bind.
    #[inline]
    pub fn bind_failed(&mut self, layer: LayerId, error: &InitError) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_bind_failed(layer, error);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (layer, error);
        }
    }

    /// Reports a mount or release.
    #[inline]
    pub fn lifecycle(&mut self, e: &LifecycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_lifecycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a display toggle.
    #[inline]
    pub fn display(&mut self, e: &DisplayEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_display(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a transform or opacity write.
    #[inline]
    pub fn style(&mut self, e: &StyleEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_style(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports the totals of an update pass.
    #[inline]
    pub fn frame(&mut self, report: &FrameReport) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame(report);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = report;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame(&FrameReport::default());
    }

    #[test]
    fn none_tracer_is_silent() {
        let mut tracer = Tracer::none();
        tracer.display(&DisplayEvent {
            layer: crate::layer::LayerStore::new().create_layer(),
            display: Display::Block,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            displays: Vec<Display>,
        }
        impl TraceSink for RecordingSink {
            fn on_display(&mut self, e: &DisplayEvent) {
                self.displays.push(e.display);
            }
        }

        let layer = crate::layer::LayerStore::new().create_layer();
        let mut sink = RecordingSink {
            displays: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.display(&DisplayEvent {
            layer,
            display: Display::None,
        });
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.displays, &[Display::None]);
    }
}
