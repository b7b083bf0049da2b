// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Layers are
//! printed by slot index.

use std::io::Write;

use tether_core::error::InitError;
use tether_core::layer::LayerId;
use tether_core::stage::FrameReport;
use tether_core::trace::{
    BindEvent, DisplayEvent, LifecycleEvent, LifecycleKind, StyleEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    frames: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            frames: 0,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, frames: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn slot(layer: LayerId) -> u32 {
    layer.index()
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_bind(&mut self, e: &BindEvent) {
        let exact = if e.exact { "px" } else { "FALLBACK" };
        let _ = writeln!(
            self.writer,
            "[bind] layer={} bounds={}x{} measure={exact}",
            slot(e.layer),
            e.bounds.width,
            e.bounds.height,
        );
    }

    fn on_bind_failed(&mut self, layer: LayerId, error: &InitError) {
        let _ = writeln!(self.writer, "[bind:failed] layer={} {error}", slot(layer));
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        let what = match e.kind {
            LifecycleKind::Mounted => "mount",
            LifecycleKind::Released => "release",
        };
        let _ = writeln!(self.writer, "[{what}] layer={}", slot(e.layer));
    }

    fn on_display(&mut self, e: &DisplayEvent) {
        let _ = writeln!(
            self.writer,
            "[display] layer={} {}",
            slot(e.layer),
            e.display.as_css(),
        );
    }

    fn on_style(&mut self, e: &StyleEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[style] layer={} {}: {}",
            slot(e.layer),
            e.property,
            e.value,
        );
    }

    fn on_frame(&mut self, report: &FrameReport) {
        self.frames += 1;
        let _ = writeln!(
            self.writer,
            "[frame] n={} synced={} hidden={} unbound={} unmounted={} \
             transforms={} opacities={}",
            self.frames,
            report.synced,
            report.hidden,
            report.unbound,
            report.unmounted,
            report.transforms,
            report.opacities,
        );
    }
}
