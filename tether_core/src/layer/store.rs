// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, topology, and property management.

use alloc::vec::Vec;

use kurbo::{Affine, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, LayerId};
use super::membership::StageEvent;
use super::traverse::Children;
use crate::dirty;

/// Per-layer boolean flags.
///
/// Setting [`hidden`](Self::hidden) suppresses the layer and its entire
/// subtree. Properties can still be mutated while hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LayerFlags {
    /// Whether the layer (and its subtree) is hidden.
    pub hidden: bool,
}

/// Per-layer change tracking for computed properties.
///
/// [`LayerStore::evaluate`] raises `matrix` when a layer's world transform
/// changes and `alpha` when it recomputes its effective opacity;
/// either one also raises `redraw`. Flags stay raised until the consumer
/// clears them, so a consumer that skips a frame still sees the change on
/// the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UpdateFlags {
    /// Something about the layer needs redrawing.
    pub redraw: bool,
    /// The world transform changed.
    pub matrix: bool,
    /// The effective opacity changed.
    pub alpha: bool,
}

impl UpdateFlags {
    /// No pending changes.
    pub const NONE: Self = Self {
        redraw: false,
        matrix: false,
        alpha: false,
    };

    /// Everything pending, as for a freshly created layer.
    pub const ALL: Self = Self {
        redraw: true,
        matrix: true,
        alpha: true,
    };

    /// Returns `true` if any flag is raised.
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.redraw || self.matrix || self.alpha
    }
}

/// Struct-of-arrays storage for all layers.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer occupies
/// a slot in parallel arrays. Destroyed layers are recycled via a free list,
/// and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct LayerStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local_transform: Vec<Affine>,
    pub(crate) local_opacity: Vec<f32>,
    pub(crate) flags: Vec<LayerFlags>,
    pub(crate) bounds: Vec<Size>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_opacity: Vec<f32>,
    pub(crate) effective_hidden: Vec<bool>,
    pub(crate) update_flags: Vec<UpdateFlags>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Stage membership --
    pub(crate) stage_root: u32,
    pub(crate) stage_events: Vec<StageEvent>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty layer store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            local_opacity: Vec::new(),
            flags: Vec::new(),
            bounds: Vec::new(),
            world_transform: Vec::new(),
            effective_opacity: Vec::new(),
            effective_hidden: Vec::new(),
            update_flags: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            stage_root: INVALID,
            stage_events: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new layer and returns its handle.
    ///
    /// The layer starts with an identity transform, full opacity, zero
    /// bounds, no parent, and all [`UpdateFlags`] raised.
    pub fn create_layer(&mut self) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let slot = idx as usize;
            self.generation[slot] += 1;
            self.parent[slot] = INVALID;
            self.first_child[slot] = INVALID;
            self.next_sibling[slot] = INVALID;
            self.prev_sibling[slot] = INVALID;
            self.local_transform[slot] = Affine::IDENTITY;
            self.local_opacity[slot] = 1.0;
            self.flags[slot] = LayerFlags::default();
            self.bounds[slot] = Size::ZERO;
            self.world_transform[slot] = Affine::IDENTITY;
            self.effective_opacity[slot] = 1.0;
            self.effective_hidden[slot] = false;
            self.update_flags[slot] = UpdateFlags::ALL;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Affine::IDENTITY);
            self.local_opacity.push(1.0);
            self.flags.push(LayerFlags::default());
            self.bounds.push(Size::ZERO);
            self.world_transform.push(Affine::IDENTITY);
            self.effective_opacity.push(1.0);
            self.effective_hidden.push(false);
            self.update_flags.push(UpdateFlags::ALL);
            self.generation.push(0);
            idx
        };

        self.mark_subtree_inherited_dirty(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        self.id_at(idx)
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// If the layer was on stage, a [`Removed`](super::StageEventKind::Removed)
    /// event is queued for it. Destroying the stage root clears the stage.
    ///
    /// # Panics
    ///
    /// Panics if the layer has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy layer with children"
        );
        let was_on_stage = self.on_stage_at(idx);

        // Remove from parent's child list if attached.
        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }
        if self.stage_root == idx {
            self.stage_root = INVALID;
        }
        if was_on_stage {
            self.stage_events.push(StageEvent::removed(id));
        }

        // Remove dirty tracking dependencies.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks inherited channels for `child`'s subtree so world transform,
    /// effective opacity, and effective hidden state are recomputed under the
    /// new ancestry, and queues stage events if `child` joins the stage.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent` is `child` or one of its descendants.
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.assert_outside_subtree(p, c);
        let was_on_stage = self.on_stage_at(c);

        self.append_child(p, c);

        self.mark_subtree_inherited_dirty(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.queue_membership_change(c, was_on_stage);
    }

    /// Removes `child` from its current parent.
    ///
    /// Marks inherited channels for `child`'s subtree so world transform,
    /// effective opacity, and effective hidden state are recomputed after
    /// detaching from the old ancestry, and queues stage events if `child`
    /// leaves the stage.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer has no parent.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "layer has no parent");
        let was_on_stage = self.on_stage_at(c);

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        // Remove dirty dependency edges.
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.queue_membership_change(c, was_on_stage);
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is removed first. Stage events are
    /// only queued when membership actually changes, so moving a layer
    /// between two on-stage parents produces none.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `new_parent` is `child` or
    /// one of its descendants.
    pub fn reparent(&mut self, child: LayerId, new_parent: LayerId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        self.assert_outside_subtree(new_parent.idx, c);
        let was_on_stage = self.on_stage_at(c);

        if self.parent[c as usize] != INVALID {
            let old_p = self.parent[c as usize];
            self.unlink_from_parent(c);
            self.dirty.remove_dependency(c, old_p, dirty::TRANSFORM);
            self.dirty.remove_dependency(c, old_p, dirty::OPACITY);
            self.dirty.mark(old_p, dirty::TOPOLOGY);
        }

        let p = new_parent.idx;
        self.append_child(p, c);

        self.mark_subtree_inherited_dirty(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.queue_membership_change(c, was_on_stage);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` must not already have a parent. `sibling` must have a parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, `sibling`
    /// has no parent, or `sibling`'s parent lies inside `child`'s subtree.
    pub fn insert_before(&mut self, child: LayerId, sibling: LayerId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.assert_outside_subtree(p, c);
        let was_on_stage = self.on_stage_at(c);

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.dirty.mark(p, dirty::TOPOLOGY);
        self.queue_membership_change(c, was_on_stage);
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(self.id_at(p))
        }
    }

    /// Returns an iterator over the direct children of a layer.
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the live layers that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<LayerId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(self.id_at(idx));
            }
        }
        roots
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform of a layer.
    #[must_use]
    pub fn local_transform(&self, id: LayerId) -> Affine {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the local opacity of a layer.
    #[must_use]
    pub fn local_opacity(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.local_opacity[id.idx as usize]
    }

    /// Returns the flags of a layer.
    #[must_use]
    pub fn flags(&self, id: LayerId) -> LayerFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the layer's own visibility flag, ignoring ancestors.
    #[must_use]
    pub fn is_visible(&self, id: LayerId) -> bool {
        !self.flags(id).hidden
    }

    /// Returns the bounding box size of a layer.
    #[must_use]
    pub fn bounds(&self, id: LayerId) -> Size {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    /// Returns the computed world transform of a layer.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called, or
    /// after a forced [`update_layer`](Self::update_layer).
    #[must_use]
    pub fn world_transform(&self, id: LayerId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the computed effective opacity of a layer.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called, or
    /// after a forced [`update_layer`](Self::update_layer).
    #[must_use]
    pub fn effective_opacity(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    /// Returns whether the layer is effectively hidden (including by an
    /// ancestor's hidden flag).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_hidden(&self, id: LayerId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    /// Returns the pending update flags of a layer.
    #[must_use]
    pub fn update_flags(&self, id: LayerId) -> UpdateFlags {
        self.validate(id);
        self.update_flags[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local transform of a layer.
    ///
    /// Marks the TRANSFORM channel dirty with eager propagation to descendants.
    pub fn set_transform(&mut self, id: LayerId, transform: Affine) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the local opacity of a layer.
    ///
    /// Marks the OPACITY channel dirty with eager propagation to descendants.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        self.validate(id);
        self.local_opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets the flags of a layer.
    pub fn set_flags(&mut self, id: LayerId, flags: LayerFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        // Hidden state is inherited, so it rides the TRANSFORM channel.
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the layer's own visibility flag.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        self.set_flags(id, LayerFlags { hidden: !visible });
    }

    /// Sets the bounding box size of a layer.
    ///
    /// Bounds are local-only and do not mark any channel.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Size) {
        self.validate(id);
        self.bounds[id.idx as usize] = bounds;
    }

    /// Clears all pending [`UpdateFlags`] of a layer.
    pub fn clear_update_flags(&mut self, id: LayerId) {
        self.validate(id);
        self.update_flags[id.idx as usize] = UpdateFlags::NONE;
    }

    /// Per-layer update bookkeeping, called by whoever drives the layer.
    ///
    /// Clears the `redraw` flag. A forced refresh (`render_driven == false`)
    /// first recomputes the world transform and effective opacity from the
    /// ancestor chain, so the values are current even if
    /// [`evaluate`](Self::evaluate) has not run since the last mutation, and
    /// raises `matrix` / `alpha` for whichever of them changed.
    pub fn update_layer(&mut self, id: LayerId, render_driven: bool) {
        self.validate(id);
        let slot = id.idx as usize;
        if !render_driven {
            let (world, opacity) = self.compose_from_ancestors(id.idx);
            if world != self.world_transform[slot] {
                self.world_transform[slot] = world;
                self.update_flags[slot].matrix = true;
            }
            if opacity != self.effective_opacity[slot] {
                self.effective_opacity[slot] = opacity;
                self.update_flags[slot].alpha = true;
            }
        }
        self.update_flags[slot].redraw = false;
    }

    // -- Internal helpers --

    /// Builds the current handle for raw slot `idx`.
    pub(crate) fn id_at(&self, idx: u32) -> LayerId {
        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Panics if `p` is `c` or one of `c`'s descendants.
    ///
    /// Linking `c` under such a `p` would close a parent cycle, and the
    /// upward walks in membership and visibility would never terminate.
    fn assert_outside_subtree(&self, p: u32, c: u32) {
        let mut a = p;
        while a != INVALID {
            assert!(a != c, "would create a cycle");
            a = self.parent[a as usize];
        }
    }

    /// Links `c` as the last child of `p` and adds the inherited dependency edges.
    fn append_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Child depends on parent for TRANSFORM and OPACITY.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    ///
    /// `TRANSFORM` also carries effective hidden propagation.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Composes local transforms and opacities from the root down to `idx`.
    fn compose_from_ancestors(&self, idx: u32) -> (Affine, f32) {
        let mut world = self.local_transform[idx as usize];
        let mut opacity = self.local_opacity[idx as usize];
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            world = self.local_transform[p as usize] * world;
            opacity *= self.local_opacity[p as usize];
            p = self.parent[p as usize];
        }
        (world, opacity)
    }
}
