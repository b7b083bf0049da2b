// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live tree: layer store, mount container and proxy table.
//!
//! A [`Stage`] owns everything a set of [`ForeignProxy`] nodes shares: the
//! [`LayerStore`], the stage root layer, and the single host element all
//! proxied elements are mounted into. Topology changes made through the
//! stage dispatch the resulting membership events to the affected proxies
//! before returning; [`Stage::update`] is the per-tick entry point.
//!
//! Proxies are stored by layer slot, so attaching, looking up and detaching
//! a proxy are all O(1).

use alloc::vec::Vec;

use crate::config::SyncContext;
use crate::error::InitError;
use crate::host::ElementHost;
use crate::layer::{LayerId, LayerStore, StageEventKind};
use crate::proxy::{ForeignProxy, InitReport, SyncStatus};
use crate::source::ElementSource;

/// Totals for one [`Stage::update`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Proxies that were shown and brought up to date.
    pub synced: u32,
    /// Proxies hidden by their own or an ancestor's visibility.
    pub hidden: u32,
    /// Proxies with no element bound.
    pub unbound: u32,
    /// Proxies whose element is not mounted yet.
    pub unmounted: u32,
    /// Proxies that wrote a transform.
    pub transforms: u32,
    /// Proxies that wrote an opacity.
    pub opacities: u32,
}

impl FrameReport {
    fn record(&mut self, status: SyncStatus) {
        match status {
            SyncStatus::Unbound => self.unbound += 1,
            SyncStatus::Unmounted => self.unmounted += 1,
            SyncStatus::Hidden => self.hidden += 1,
            SyncStatus::Synced { transform, opacity } => {
                self.synced += 1;
                self.transforms += u32::from(transform);
                self.opacities += u32::from(opacity);
            }
        }
    }
}

/// A layer tree with a mount container for foreign elements.
#[derive(Debug)]
pub struct Stage<E> {
    store: LayerStore,
    root: LayerId,
    mount: E,
    /// Indexed by layer slot.
    proxies: Vec<Option<ForeignProxy<E>>>,
}

impl<E: Clone + core::fmt::Debug> Stage<E> {
    /// Creates a stage whose proxies mount into `mount`.
    ///
    /// The stage starts with a single root layer.
    #[must_use]
    pub fn new(mount: E) -> Self {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_stage_root(Some(root));
        Self {
            store,
            root,
            mount,
            proxies: Vec::new(),
        }
    }

    /// The layer tree.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Mutable access to the layer tree.
    ///
    /// Topology changes made here are dispatched on the next
    /// [`dispatch`](Self::dispatch) or [`update`](Self::update).
    #[inline]
    pub fn store_mut(&mut self) -> &mut LayerStore {
        &mut self.store
    }

    /// The stage root layer.
    #[inline]
    #[must_use]
    pub fn root(&self) -> LayerId {
        self.root
    }

    /// The mount container.
    #[inline]
    #[must_use]
    pub fn mount(&self) -> &E {
        &self.mount
    }

    /// Creates a detached layer.
    pub fn create_layer(&mut self) -> LayerId {
        self.store.create_layer()
    }

    // -- Topology (dispatching) --

    /// Appends `child` to `parent`, then dispatches membership events.
    pub fn add_child<H>(&mut self, cx: &mut SyncContext<'_, H>, parent: LayerId, child: LayerId)
    where
        H: ElementHost<Element = E>,
    {
        self.store.add_child(parent, child);
        self.dispatch(cx);
    }

    /// Detaches `child` from its parent, then dispatches membership events.
    pub fn remove_from_parent<H>(&mut self, cx: &mut SyncContext<'_, H>, child: LayerId)
    where
        H: ElementHost<Element = E>,
    {
        self.store.remove_from_parent(child);
        self.dispatch(cx);
    }

    /// Moves `child` under `new_parent`, then dispatches membership events.
    pub fn reparent<H>(
        &mut self,
        cx: &mut SyncContext<'_, H>,
        child: LayerId,
        new_parent: LayerId,
    ) where
        H: ElementHost<Element = E>,
    {
        self.store.reparent(child, new_parent);
        self.dispatch(cx);
    }

    /// Inserts `child` before `sibling`, then dispatches membership events.
    pub fn insert_before<H>(
        &mut self,
        cx: &mut SyncContext<'_, H>,
        child: LayerId,
        sibling: LayerId,
    ) where
        H: ElementHost<Element = E>,
    {
        self.store.insert_before(child, sibling);
        self.dispatch(cx);
    }

    /// Destroys a layer, releasing its proxy's element first.
    ///
    /// # Panics
    ///
    /// Panics if the layer has children or the handle is stale.
    pub fn destroy_layer<H>(&mut self, cx: &mut SyncContext<'_, H>, layer: LayerId)
    where
        H: ElementHost<Element = E>,
    {
        assert!(self.store.is_alive(layer), "stale LayerId: {layer:?}");
        assert!(
            self.store.children(layer).next().is_none(),
            "cannot destroy layer with children"
        );
        self.remove_proxy(cx, layer);
        self.store.destroy_layer(layer);
        self.dispatch(cx);
    }

    // -- Proxies --

    /// Attaches an unbound proxy to `layer`, or returns the one already
    /// attached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn attach_proxy(&mut self, layer: LayerId) -> &mut ForeignProxy<E> {
        assert!(self.store.is_alive(layer), "stale LayerId: {layer:?}");
        slot_proxy(&mut self.proxies, layer)
    }

    /// The proxy attached to `layer`, if any.
    #[must_use]
    pub fn proxy(&self, layer: LayerId) -> Option<&ForeignProxy<E>> {
        self.proxies
            .get(layer.index() as usize)?
            .as_ref()
            .filter(|p| p.layer() == layer)
    }

    /// Mutable access to the proxy attached to `layer`, if any.
    pub fn proxy_mut(&mut self, layer: LayerId) -> Option<&mut ForeignProxy<E>> {
        self.proxies
            .get_mut(layer.index() as usize)?
            .as_mut()
            .filter(|p| p.layer() == layer)
    }

    /// Binds `layer`'s proxy (attaching one if needed) to an element.
    ///
    /// If the layer is already on stage the element is mounted right away,
    /// since the join event has already been delivered.
    ///
    /// # Errors
    ///
    /// Propagates [`ForeignProxy::init`] errors.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn init_proxy<H>(
        &mut self,
        cx: &mut SyncContext<'_, H>,
        layer: LayerId,
        source: ElementSource<'_, E>,
    ) -> Result<InitReport, InitError>
    where
        H: ElementHost<Element = E>,
    {
        assert!(self.store.is_alive(layer), "stale LayerId: {layer:?}");
        let Self {
            store,
            mount,
            proxies,
            ..
        } = self;
        let proxy = slot_proxy(proxies, layer);
        let report = proxy.init(store, cx, source)?;
        if store.is_on_stage(layer) {
            proxy.on_added_to_stage(store, cx, mount);
        }
        Ok(report)
    }

    /// Releases and drops the proxy attached to `layer`.
    ///
    /// Returns `false` if there was none.
    pub fn remove_proxy<H>(&mut self, cx: &mut SyncContext<'_, H>, layer: LayerId) -> bool
    where
        H: ElementHost<Element = E>,
    {
        let Some(slot) = self.proxies.get_mut(layer.index() as usize) else {
            return false;
        };
        match slot.take_if(|p| p.layer() == layer) {
            Some(mut proxy) => {
                proxy.release(&mut self.store, cx);
                true
            }
            None => false,
        }
    }

    // -- Per tick --

    /// Delivers queued membership events to their proxies.
    pub fn dispatch<H>(&mut self, cx: &mut SyncContext<'_, H>)
    where
        H: ElementHost<Element = E>,
    {
        if !self.store.has_pending_stage_events() {
            return;
        }
        for event in self.store.take_stage_events() {
            let Some(proxy) = self
                .proxies
                .get_mut(event.layer.index() as usize)
                .and_then(Option::as_mut)
                .filter(|p| p.layer() == event.layer)
            else {
                continue;
            };
            match event.kind {
                StageEventKind::Added => proxy.on_added_to_stage(&self.store, cx, &self.mount),
                StageEventKind::Removed => proxy.on_removed_from_stage(cx),
            }
        }
    }

    /// Runs one tick: dispatches pending events, evaluates the tree, and
    /// updates every proxy on stage in pre-order.
    pub fn update<H>(&mut self, cx: &mut SyncContext<'_, H>, render_driven: bool) -> FrameReport
    where
        H: ElementHost<Element = E>,
    {
        self.dispatch(cx);
        let _ = self.store.evaluate();

        let mut report = FrameReport::default();
        let Some(root) = self.store.stage_root() else {
            cx.tracer.frame(&report);
            return report;
        };
        for layer in self.store.subtree(root) {
            let Some(Some(proxy)) = self.proxies.get(layer.index() as usize) else {
                continue;
            };
            if proxy.layer() != layer {
                continue;
            }
            report.record(proxy.update(&mut self.store, cx, render_driven));
        }
        cx.tracer.frame(&report);
        report
    }
}

/// Returns the proxy in `layer`'s slot, creating it if the slot is empty or
/// holds the proxy of a destroyed layer.
fn slot_proxy<E: Clone + core::fmt::Debug>(
    proxies: &mut Vec<Option<ForeignProxy<E>>>,
    layer: LayerId,
) -> &mut ForeignProxy<E> {
    let slot = layer.index() as usize;
    if proxies.len() <= slot {
        proxies.resize_with(slot + 1, || None);
    }
    let entry = &mut proxies[slot];
    if entry.as_ref().is_some_and(|p| p.layer() != layer) {
        *entry = None;
    }
    entry.get_or_insert_with(|| ForeignProxy::new(layer))
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Size};

    use super::*;
    use crate::config::SyncConfig;
    use crate::host::testing::{MemoryElement, MemoryHost};

    fn stage() -> (Stage<MemoryElement>, MemoryHost) {
        let mut host = MemoryHost::new();
        let mount = host.create_element();
        (Stage::new(mount), host)
    }

    #[test]
    fn new_stage_has_root_on_stage() {
        let (stage, _host) = stage();
        assert!(stage.store().is_on_stage(stage.root()));
        assert_eq!(stage.store().stage_root(), Some(stage.root()));
    }

    #[test]
    fn proxy_mounts_when_layer_joins() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("10px", "20px");
        let mut cx = SyncContext::new(&mut host, &config);

        let layer = stage.create_layer();
        stage
            .init_proxy(&mut cx, layer, el.into())
            .expect("direct elements always resolve");
        assert!(!stage.proxy(layer).is_some_and(ForeignProxy::is_mounted));

        let root = stage.root();
        stage.add_child(&mut cx, root, layer);
        assert!(stage.proxy(layer).is_some_and(ForeignProxy::is_mounted));
        assert_eq!(stage.store().bounds(layer), Size::new(10.0, 20.0));
        assert_eq!(host.parent_of(el), Some(*stage.mount()));
    }

    #[test]
    fn init_on_stage_mounts_immediately() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);

        let layer = stage.create_layer();
        let root = stage.root();
        stage.add_child(&mut cx, root, layer);
        stage
            .init_proxy(&mut cx, layer, el.into())
            .expect("direct elements always resolve");

        assert!(stage.proxy(layer).is_some_and(ForeignProxy::is_mounted));
        assert_eq!(host.insertions, 1);
    }

    #[test]
    fn detaching_a_subtree_hides_descendants() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);

        let group = stage.create_layer();
        let leaf = stage.create_layer();
        stage.add_child(&mut cx, group, leaf);
        stage
            .init_proxy(&mut cx, leaf, el.into())
            .expect("direct elements always resolve");
        let root = stage.root();
        stage.add_child(&mut cx, root, group);
        stage.update(&mut cx, true);

        stage.remove_from_parent(&mut cx, group);
        assert_eq!(host_display(&cx, el), Some("none"));

        stage.add_child(&mut cx, root, group);
        assert_eq!(host_display(&cx, el), Some("block"));
        drop(cx);
        assert_eq!(host.insertions, 1);
    }

    fn host_display<'a>(cx: &'a SyncContext<'_, MemoryHost>, el: MemoryElement) -> Option<&'a str> {
        cx.host.inline(el, "display")
    }

    #[test]
    fn update_reports_each_proxy_on_stage() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let shown = host.sized_element("1px", "1px");
        let hidden = host.sized_element("1px", "1px");
        let offstage = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);
        let root = stage.root();

        let a = stage.create_layer();
        let b = stage.create_layer();
        let c = stage.create_layer();
        let d = stage.create_layer();
        for layer in [a, b, c] {
            stage.add_child(&mut cx, root, layer);
        }
        stage.init_proxy(&mut cx, a, shown.into()).expect("resolves");
        stage.init_proxy(&mut cx, b, hidden.into()).expect("resolves");
        stage.attach_proxy(c);
        stage.init_proxy(&mut cx, d, offstage.into()).expect("resolves");
        stage.store_mut().set_visible(b, false);

        let report = stage.update(&mut cx, true);
        assert_eq!(
            report,
            FrameReport {
                synced: 1,
                hidden: 1,
                unbound: 1,
                unmounted: 0,
                transforms: 1,
                opacities: 1,
            }
        );
        drop(cx);
        assert_eq!(host.write_count(offstage, "transform"), 0);
    }

    #[test]
    fn store_mutations_dispatch_on_next_update() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);

        let layer = stage.create_layer();
        stage
            .init_proxy(&mut cx, layer, el.into())
            .expect("direct elements always resolve");
        let root = stage.root();
        stage.store_mut().add_child(root, layer);
        assert!(!stage.proxy(layer).is_some_and(ForeignProxy::is_mounted));

        let report = stage.update(&mut cx, true);
        assert_eq!(report.synced, 1);
        assert!(stage.proxy(layer).is_some_and(ForeignProxy::is_mounted));
    }

    #[test]
    fn update_scales_by_configured_ratio() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default().with_device_pixel_ratio(2.0);
        let el = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);
        let root = stage.root();

        let layer = stage.create_layer();
        stage.add_child(&mut cx, root, layer);
        stage.init_proxy(&mut cx, layer, el.into()).expect("resolves");
        stage.store_mut().set_transform(root, Affine::translate((10.0, 0.0)));
        stage.store_mut().set_transform(layer, Affine::translate((0.0, 40.0)));
        stage.update(&mut cx, true);
        drop(cx);

        assert_eq!(
            host.inline(el, "transform"),
            Some("matrix(0.5000,0.0000,0.0000,0.5000,5.0000,20.0000)")
        );
    }

    #[test]
    fn destroying_a_layer_releases_its_element() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);
        let root = stage.root();

        let layer = stage.create_layer();
        stage.add_child(&mut cx, root, layer);
        stage.init_proxy(&mut cx, layer, el.into()).expect("resolves");
        stage.remove_from_parent(&mut cx, layer);
        stage.destroy_layer(&mut cx, layer);
        drop(cx);

        assert!(!stage.store().is_alive(layer));
        assert!(stage.proxy(layer).is_none());
        assert_eq!(host.parent_of(el), None);
        assert_eq!(host.inline(el, "display"), Some("none"));
    }

    #[test]
    fn recycled_slot_does_not_inherit_proxy() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let mut cx = SyncContext::new(&mut host, &config);

        let old = stage.create_layer();
        stage.attach_proxy(old);
        stage.destroy_layer(&mut cx, old);
        let new = stage.create_layer();
        assert_eq!(new.index(), old.index());
        assert!(stage.proxy(new).is_none());
    }

    #[test]
    fn refused_destroy_keeps_the_proxy_mounted() {
        extern crate std;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("1px", "1px");
        let root = stage.root();
        let group = stage.create_layer();
        {
            let mut cx = SyncContext::new(&mut host, &config);
            let leaf = stage.create_layer();
            stage.add_child(&mut cx, root, group);
            stage.add_child(&mut cx, group, leaf);
            stage.init_proxy(&mut cx, group, el.into()).expect("resolves");

            let refused = catch_unwind(AssertUnwindSafe(|| stage.destroy_layer(&mut cx, group)));
            assert!(refused.is_err(), "a layer with children must not be destroyed");
        }

        assert!(stage.store().is_alive(group));
        assert!(stage.proxy(group).is_some_and(ForeignProxy::is_mounted));
        assert_eq!(host.parent_of(el), Some(*stage.mount()));
        assert_eq!(host.removals, 0);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn reparenting_under_a_descendant_panics() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let mut cx = SyncContext::new(&mut host, &config);
        let root = stage.root();

        let group = stage.create_layer();
        let leaf = stage.create_layer();
        stage.add_child(&mut cx, root, group);
        stage.add_child(&mut cx, group, leaf);
        stage.reparent(&mut cx, group, leaf);
    }

    #[test]
    fn remove_proxy_releases_and_forgets() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let el = host.sized_element("1px", "1px");
        let mut cx = SyncContext::new(&mut host, &config);
        let root = stage.root();

        let layer = stage.create_layer();
        stage.add_child(&mut cx, root, layer);
        stage.init_proxy(&mut cx, layer, el.into()).expect("resolves");

        assert!(stage.remove_proxy(&mut cx, layer));
        assert!(!stage.remove_proxy(&mut cx, layer));
        assert!(stage.proxy(layer).is_none());
        assert_eq!(stage.update(&mut cx, true), FrameReport::default());
        drop(cx);
        assert_eq!(host.parent_of(el), None);
    }

    #[test]
    fn unresolved_id_is_reported_and_harmless() {
        let (mut stage, mut host) = stage();
        let config = SyncConfig::default();
        let mut cx = SyncContext::new(&mut host, &config);
        let root = stage.root();

        let layer = stage.create_layer();
        stage.add_child(&mut cx, root, layer);
        let result = stage.init_proxy(&mut cx, layer, ElementSource::Id("gone"));
        assert!(result.is_err());

        let report = stage.update(&mut cx, true);
        assert_eq!(report.unbound, 1);
        drop(cx);
        assert!(host.writes.is_empty());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_sees_the_whole_lifecycle() {
        use crate::trace::{LifecycleEvent, LifecycleKind, StyleEvent, TraceSink, Tracer};

        #[derive(Default)]
        struct Recorder {
            lifecycle: Vec<LifecycleKind>,
            styles: Vec<alloc::string::String>,
            frames: u32,
        }
        impl TraceSink for Recorder {
            fn on_lifecycle(&mut self, e: &LifecycleEvent) {
                self.lifecycle.push(e.kind);
            }
            fn on_style(&mut self, e: &StyleEvent<'_>) {
                self.styles.push(e.property.into());
            }
            fn on_frame(&mut self, _report: &FrameReport) {
                self.frames += 1;
            }
        }

        let (mut stage, mut host) = stage();
        let config = SyncConfig::default().with_vendor_prefix(false);
        let el = host.sized_element("1px", "1px");
        let mut recorder = Recorder::default();
        let mut cx = SyncContext::with_tracer(&mut host, &config, Tracer::new(&mut recorder));
        let root = stage.root();

        let layer = stage.create_layer();
        stage.init_proxy(&mut cx, layer, el.into()).expect("resolves");
        stage.add_child(&mut cx, root, layer);
        stage.update(&mut cx, true);
        stage.remove_proxy(&mut cx, layer);
        drop(cx);

        assert_eq!(
            recorder.lifecycle,
            [LifecycleKind::Mounted, LifecycleKind::Released]
        );
        assert_eq!(recorder.styles, ["transform", "opacity"]);
        assert_eq!(recorder.frames, 1);
    }
}
