// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The foreign-element proxy node.
//!
//! A [`ForeignProxy`] rides on one layer of the scene graph and owns at most
//! one foreign element. It keeps that element's position, scale, rotation,
//! opacity and visibility in lockstep with the layer's computed state:
//!
//! - **Binding** — [`init`](ForeignProxy::init) resolves an
//!   [`ElementSource`], pins the element's styles, and measures its pixel
//!   size into the layer's bounds. [`release`](ForeignProxy::release) undoes
//!   all of it.
//! - **Lifecycle** — [`on_added_to_stage`](ForeignProxy::on_added_to_stage)
//!   inserts the element into the stage's mount container the first time it
//!   joins a live tree, and only then. Later joins and leaves just toggle
//!   `display`.
//! - **Per tick** — [`update`](ForeignProxy::update) folds the visibility of
//!   the layer and all its ancestors into a `display` toggle, then writes
//!   the transform and opacity the layer flagged as changed.
//!
//! Nothing here aborts the caller. Misconfiguration degrades to an unbound
//! or hidden element, and is reported through return values and the
//! [`Tracer`](crate::trace::Tracer).

use core::fmt;
use core::iter;

use kurbo::Size;

use crate::config::{AncestorVisibility, SyncContext};
use crate::css;
use crate::error::InitError;
use crate::host::{Display, ElementHost};
use crate::layer::{LayerId, LayerStore};
use crate::measure::{Measurement, measure};
use crate::source::ElementSource;
use crate::trace::{BindEvent, DisplayEvent, LifecycleEvent, LifecycleKind, StyleEvent};

/// Exclusive ownership of one foreign element.
#[derive(Clone, Debug)]
pub struct ForeignElementHandle<E> {
    element: E,
    mounted: bool,
}

impl<E> ForeignElementHandle<E> {
    /// The wrapped element.
    #[inline]
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// Whether this handle inserted its element into a mount container.
    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// What [`ForeignProxy::init`] measured.
#[derive(Clone, Debug, PartialEq)]
pub struct InitReport {
    /// Result of reading `width`.
    pub width: Measurement,
    /// Result of reading `height`.
    pub height: Measurement,
}

impl InitReport {
    /// The bounds stored on the layer.
    #[must_use]
    pub fn bounds(&self) -> Size {
        Size::new(self.width.pixels(), self.height.pixels())
    }

    /// Returns `true` if both dimensions were pixel lengths.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.width.is_pixels() && self.height.is_pixels()
    }
}

/// Outcome of one [`ForeignProxy::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// No element is bound.
    Unbound,
    /// An element is bound but has never joined a live stage.
    Unmounted,
    /// The layer or one of its ancestors is invisible. Pending changes stay
    /// flagged for the next visible tick.
    Hidden,
    /// The element is shown and current.
    Synced {
        /// Whether a transform was written.
        transform: bool,
        /// Whether an opacity was written.
        opacity: bool,
    },
}

impl SyncStatus {
    /// Returns `true` for [`SyncStatus::Synced`].
    #[inline]
    #[must_use]
    pub const fn is_synced(self) -> bool {
        matches!(self, Self::Synced { .. })
    }
}

/// A scene-graph node that mirrors its layer onto a foreign element.
pub struct ForeignProxy<E> {
    layer: LayerId,
    handle: Option<ForeignElementHandle<E>>,
}

impl<E: fmt::Debug> fmt::Debug for ForeignProxy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignProxy")
            .field("layer", &self.layer)
            .field("handle", &self.handle)
            .finish()
    }
}

impl<E: Clone + fmt::Debug> ForeignProxy<E> {
    /// Creates an unbound proxy riding on `layer`.
    #[must_use]
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            handle: None,
        }
    }

    /// The layer this proxy mirrors.
    #[inline]
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// The current handle, if bound.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Option<&ForeignElementHandle<E>> {
        self.handle.as_ref()
    }

    /// The bound element, if any.
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&E> {
        self.handle.as_ref().map(ForeignElementHandle::element)
    }

    /// Returns `true` if an element is bound.
    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns `true` if the bound element has been mounted.
    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.mounted)
    }

    /// Binds the proxy to the element named by `source`.
    ///
    /// Any previously bound element is released first. The new element is
    /// positioned absolutely, hidden until its first visible tick, and its
    /// transform origin is pinned to the top-left corner. Its `width` and
    /// `height` are measured and stored as the layer's bounds; non-pixel
    /// values count as 0 (see [`InitReport::is_exact`]).
    ///
    /// The element is not inserted anywhere yet. That happens when the layer
    /// joins a live stage.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::UnresolvedId`] if an identifier matches nothing.
    /// The proxy is then unbound with zero bounds, and every later operation
    /// on it is a no-op.
    pub fn init<H>(
        &mut self,
        store: &mut LayerStore,
        cx: &mut SyncContext<'_, H>,
        source: ElementSource<'_, E>,
    ) -> Result<InitReport, InitError>
    where
        H: ElementHost<Element = E>,
    {
        self.release(store, cx);

        let element = match source.resolve(&*cx.host) {
            Ok(element) => element,
            Err(err) => {
                store.set_bounds(self.layer, Size::ZERO);
                cx.tracer.bind_failed(self.layer, &err);
                return Err(err);
            }
        };

        let host = &mut *cx.host;
        host.set_style(&element, css::POSITION, "absolute");
        host.set_style(&element, css::DISPLAY, Display::None.as_css());
        host.set_style(&element, css::TRANSFORM_ORIGIN, css::TOP_LEFT_ORIGIN);
        if cx.config.vendor_prefix {
            host.set_style(&element, css::WEBKIT_TRANSFORM_ORIGIN, css::TOP_LEFT_ORIGIN);
        }

        let report = InitReport {
            width: measure(&*cx.host, &element, "width"),
            height: measure(&*cx.host, &element, "height"),
        };
        let bounds = report.bounds();
        store.set_bounds(self.layer, bounds);
        cx.tracer.bind(&BindEvent {
            layer: self.layer,
            bounds,
            exact: report.is_exact(),
        });

        self.handle = Some(ForeignElementHandle {
            element,
            mounted: false,
        });
        Ok(report)
    }

    /// Unbinds the element: hides it, detaches it from its parent, and
    /// returns the proxy to its pre-[`init`](Self::init) state.
    ///
    /// Returns `false` (and touches nothing) if no element was bound.
    pub fn release<H>(&mut self, store: &mut LayerStore, cx: &mut SyncContext<'_, H>) -> bool
    where
        H: ElementHost<Element = E>,
    {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        cx.host
            .set_style(&handle.element, css::DISPLAY, Display::None.as_css());
        cx.host.remove_from_parent(&handle.element);
        store.set_bounds(self.layer, Size::ZERO);
        cx.tracer.lifecycle(&LifecycleEvent {
            layer: self.layer,
            kind: LifecycleKind::Released,
        });
        true
    }

    /// Handles the layer leaving the live tree.
    ///
    /// Hides the element but keeps it mounted, so a quick detach/reattach
    /// costs no DOM insertion.
    pub fn on_removed_from_stage<H>(&mut self, cx: &mut SyncContext<'_, H>)
    where
        H: ElementHost<Element = E>,
    {
        if let Some(handle) = &self.handle {
            set_display(cx, self.layer, &handle.element, Display::None);
        }
    }

    /// Handles the layer joining the live tree.
    ///
    /// The first join inserts the element as the first child of `mount`.
    /// Later joins only show it again, and only if the layer itself is
    /// visible.
    pub fn on_added_to_stage<H>(
        &mut self,
        store: &LayerStore,
        cx: &mut SyncContext<'_, H>,
        mount: &E,
    ) where
        H: ElementHost<Element = E>,
    {
        let layer = self.layer;
        let Some(handle) = &mut self.handle else {
            return;
        };
        if !handle.mounted {
            cx.host.insert_first_child(mount, &handle.element);
            handle.mounted = true;
            cx.tracer.lifecycle(&LifecycleEvent {
                layer,
                kind: LifecycleKind::Mounted,
            });
        } else if store.is_visible(layer) {
            set_display(cx, layer, &handle.element, Display::Block);
        }
    }

    /// Mirrors the layer's state onto the element for one tick.
    ///
    /// `render_driven` is forwarded to
    /// [`LayerStore::update_layer`]; pass `false` for a forced refresh that
    /// must not rely on [`LayerStore::evaluate`] having run.
    ///
    /// `display` is only written when it changes. While shown, the transform
    /// (divided by the device pixel ratio) and opacity are written if the
    /// layer flagged them, or unconditionally on the tick the element
    /// reappears. Update flags are cleared only when the element is shown.
    pub fn update<H>(
        &self,
        store: &mut LayerStore,
        cx: &mut SyncContext<'_, H>,
        render_driven: bool,
    ) -> SyncStatus
    where
        H: ElementHost<Element = E>,
    {
        let Some(handle) = &self.handle else {
            return SyncStatus::Unbound;
        };
        if !handle.mounted {
            return SyncStatus::Unmounted;
        }
        let layer = self.layer;
        let element = &handle.element;

        let visible = effective_visibility(store, layer, cx.config.ancestor_visibility);
        let display = Display::from_visible(visible);
        let current = cx.host.style(element, css::DISPLAY);
        let reappeared = visible && current.as_deref() != Some(Display::Block.as_css());
        if current.as_deref() != Some(display.as_css()) {
            set_display(cx, layer, element, display);
        }
        if !visible {
            return SyncStatus::Hidden;
        }

        store.update_layer(layer, render_driven);
        let flags = store.update_flags(layer);

        let transform = flags.matrix || reappeared;
        if transform {
            let value = css::matrix_css(
                store.world_transform(layer),
                cx.config.effective_device_pixel_ratio(),
                cx.config.precision,
            );
            write_style(cx, layer, element, css::TRANSFORM, &value);
            if cx.config.vendor_prefix {
                write_style(cx, layer, element, css::WEBKIT_TRANSFORM, &value);
            }
        }

        let opacity = flags.alpha || reappeared;
        if opacity {
            let value = css::opacity_css(store.effective_opacity(layer));
            write_style(cx, layer, element, css::OPACITY, &value);
        }

        store.clear_update_flags(layer);
        SyncStatus::Synced { transform, opacity }
    }
}

/// Returns `true` if `layer` and every one of its ancestors are visible.
///
/// [`AncestorVisibility::Walk`] checks the parent chain, stopping at the
/// first invisible layer. [`AncestorVisibility::Cached`] reads the store's
/// effective-hidden state, which is only current after
/// [`LayerStore::evaluate`].
#[must_use]
pub fn effective_visibility(store: &LayerStore, layer: LayerId, mode: AncestorVisibility) -> bool {
    match mode {
        AncestorVisibility::Walk => {
            iter::successors(Some(layer), |&id| store.parent(id)).all(|id| store.is_visible(id))
        }
        AncestorVisibility::Cached => !store.effective_hidden(layer),
    }
}

fn set_display<H: ElementHost>(
    cx: &mut SyncContext<'_, H>,
    layer: LayerId,
    element: &H::Element,
    display: Display,
) {
    cx.host.set_style(element, css::DISPLAY, display.as_css());
    cx.tracer.display(&DisplayEvent { layer, display });
}

fn write_style<H: ElementHost>(
    cx: &mut SyncContext<'_, H>,
    layer: LayerId,
    element: &H::Element,
    property: &str,
    value: &str,
) {
    cx.host.set_style(element, property, value);
    cx.tracer.style(&StyleEvent {
        layer,
        property,
        value,
    });
}
