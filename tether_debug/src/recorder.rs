// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event as an
//! owned [`RecordedEvent`], in arrival order.

use kurbo::Size;
use tether_core::error::InitError;
use tether_core::host::Display;
use tether_core::layer::LayerId;
use tether_core::stage::FrameReport;
use tether_core::trace::{
    BindEvent, DisplayEvent, LifecycleEvent, LifecycleKind, StyleEvent, TraceSink,
};

/// One recorded event.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_bind`].
    Bind {
        /// The proxy's layer.
        layer: LayerId,
        /// Measured bounds.
        bounds: Size,
        /// Whether both dimensions were pixel lengths.
        exact: bool,
    },
    /// See [`TraceSink::on_bind_failed`].
    BindFailed {
        /// The proxy's layer.
        layer: LayerId,
        /// Why binding failed.
        error: InitError,
    },
    /// See [`TraceSink::on_lifecycle`].
    Lifecycle {
        /// The proxy's layer.
        layer: LayerId,
        /// Mounted or released.
        kind: LifecycleKind,
    },
    /// See [`TraceSink::on_display`].
    Display {
        /// The proxy's layer.
        layer: LayerId,
        /// New display state.
        display: Display,
    },
    /// See [`TraceSink::on_style`].
    Style {
        /// The proxy's layer.
        layer: LayerId,
        /// CSS property name.
        property: String,
        /// Written value.
        value: String,
    },
    /// See [`TraceSink::on_frame`].
    Frame(FrameReport),
}

/// A [`TraceSink`] that stores events in a `Vec`.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Forgets all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Iterates over the style writes made to `layer`, as
    /// `(property, value)` pairs.
    pub fn styles_for(&self, layer: LayerId) -> impl Iterator<Item = (&str, &str)> {
        self.events.iter().filter_map(move |e| match e {
            RecordedEvent::Style {
                layer: l,
                property,
                value,
            } if *l == layer => Some((property.as_str(), value.as_str())),
            _ => None,
        })
    }
}

impl TraceSink for RecorderSink {
    fn on_bind(&mut self, e: &BindEvent) {
        self.events.push(RecordedEvent::Bind {
            layer: e.layer,
            bounds: e.bounds,
            exact: e.exact,
        });
    }

    fn on_bind_failed(&mut self, layer: LayerId, error: &InitError) {
        self.events.push(RecordedEvent::BindFailed {
            layer,
            error: error.clone(),
        });
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.events.push(RecordedEvent::Lifecycle {
            layer: e.layer,
            kind: e.kind,
        });
    }

    fn on_display(&mut self, e: &DisplayEvent) {
        self.events.push(RecordedEvent::Display {
            layer: e.layer,
            display: e.display,
        });
    }

    fn on_style(&mut self, e: &StyleEvent<'_>) {
        self.events.push(RecordedEvent::Style {
            layer: e.layer,
            property: e.property.to_owned(),
            value: e.value.to_owned(),
        });
    }

    fn on_frame(&mut self, report: &FrameReport) {
        self.events.push(RecordedEvent::Frame(*report));
    }
}

#[cfg(test)]
mod tests {
    use tether_core::config::{SyncConfig, SyncContext};
    use tether_core::host::ElementHost;
    use tether_core::stage::Stage;
    use tether_core::trace::Tracer;

    use super::*;

    /// Every element is 8px square; nothing has a parent.
    #[derive(Default)]
    struct SquareHost {
        display: Vec<(u32, String)>,
    }

    impl ElementHost for SquareHost {
        type Element = u32;

        fn element_by_id(&self, id: &str) -> Option<u32> {
            id.strip_prefix('e')?.parse().ok()
        }

        fn style(&self, element: &u32, property: &str) -> Option<String> {
            match property {
                "width" | "height" => Some("8px".into()),
                "display" => self
                    .display
                    .iter()
                    .rev()
                    .find(|(el, _)| el == element)
                    .map(|(_, v)| v.clone()),
                _ => None,
            }
        }

        fn computed_style(&self, _element: &u32, _property: &str) -> Option<String> {
            None
        }

        fn set_style(&mut self, element: &u32, property: &str, value: &str) {
            if property == "display" {
                self.display.push((*element, value.into()));
            }
        }

        fn insert_first_child(&mut self, _container: &u32, _element: &u32) {}

        fn remove_from_parent(&mut self, _element: &u32) -> bool {
            false
        }
    }

    #[test]
    fn records_a_stage_session_in_order() {
        let mut host = SquareHost::default();
        let config = SyncConfig::default().with_vendor_prefix(false);
        let mut recorder = RecorderSink::new();
        let mut stage = Stage::new(0_u32);
        let layer = stage.create_layer();
        let root = stage.root();
        {
            let mut cx = SyncContext::with_tracer(&mut host, &config, Tracer::new(&mut recorder));
            stage
                .init_proxy(&mut cx, layer, tether_core::source::ElementSource::Id("e7"))
                .unwrap();
            stage.add_child(&mut cx, root, layer);
            stage.update(&mut cx, true);
            let _ = stage.init_proxy(&mut cx, layer, tether_core::source::ElementSource::Id("x"));
        }

        let events = recorder.events();
        assert_eq!(
            events[0],
            RecordedEvent::Bind {
                layer,
                bounds: Size::new(8.0, 8.0),
                exact: true,
            }
        );
        assert_eq!(
            events[1],
            RecordedEvent::Lifecycle {
                layer,
                kind: LifecycleKind::Mounted,
            }
        );
        assert_eq!(
            events[2],
            RecordedEvent::Display {
                layer,
                display: Display::Block,
            }
        );
        let styles: Vec<_> = recorder.styles_for(layer).collect();
        assert_eq!(
            styles,
            [
                ("transform", "matrix(1.0000,0.0000,0.0000,1.0000,0.0000,0.0000)"),
                ("opacity", "1"),
            ]
        );
        assert!(
            events
                .iter()
                .any(|e| matches!(e, RecordedEvent::Frame(r) if r.synced == 1)),
            "missing frame report: {events:?}"
        );
        assert!(
            matches!(events.last(), Some(RecordedEvent::BindFailed { .. })),
            "re-init with a bad id should end the log: {events:?}"
        );
    }
}
