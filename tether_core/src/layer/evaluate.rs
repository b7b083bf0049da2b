// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM** — Drain dirty indices, recompute each layer's
//!    `world_transform` as `parent_world * local_transform` and
//!    `effective_hidden` as `parent_effective_hidden || flags.hidden`.
//!    Raises the layer's `matrix` update flag only if the world transform
//!    actually changed.
//! 2. **OPACITY** — Drain dirty indices, recompute each layer's
//!    `effective_opacity` as `parent_effective * local_opacity`. Raises the
//!    layer's `alpha` update flag.
//! 3. **TOPOLOGY** — Drain and report whether anything structural changed.
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) rather than [`LayerId`]
//! handles.
//!
//! [`LayerId`]: super::LayerId

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::INVALID;
use super::store::LayerStore;
use crate::dirty;

/// The set of changes produced by a single [`LayerStore::evaluate`] call.
///
/// Each field contains the raw slot indices of layers that changed in the
/// corresponding category.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Layers whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Layers whose effective opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Layers that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Layers that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Whether the tree topology changed.
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.opacities.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.topology_changed = false;
    }
}

impl LayerStore {
    /// Evaluates the layer tree, recomputing dirty properties and returning
    /// the set of changes.
    ///
    /// Drains each dirty channel and recomputes world transforms and
    /// effective opacities in parent-before-child order.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        // Drain TRANSFORM channel — collect dirty indices, then recompute.
        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let slot = idx as usize;
            let parent_idx = self.parent[slot];
            let (parent_world, parent_hidden) = if parent_idx != INVALID {
                (
                    self.world_transform[parent_idx as usize],
                    self.effective_hidden[parent_idx as usize],
                )
            } else {
                (Affine::IDENTITY, false)
            };
            let world = parent_world * self.local_transform[slot];
            // Hidden-flag changes ride this channel without moving anything.
            if world != self.world_transform[slot] {
                self.world_transform[slot] = world;
                self.update_flags[slot].matrix = true;
                self.update_flags[slot].redraw = true;
            }

            let new_hidden = parent_hidden || self.flags[slot].hidden;
            if new_hidden != self.effective_hidden[slot] {
                if new_hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[slot] = new_hidden;
            }
        }
        changes.transforms = dirty_transforms;

        // Drain OPACITY channel.
        let dirty_opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_opacities {
            let slot = idx as usize;
            let parent_opacity = if self.parent[slot] != INVALID {
                self.effective_opacity[self.parent[slot] as usize]
            } else {
                1.0
            };
            self.effective_opacity[slot] = parent_opacity * self.local_opacity[slot];
            self.update_flags[slot].alpha = true;
            self.update_flags[slot].redraw = true;
        }
        changes.opacities = dirty_opacities;

        // Drain TOPOLOGY channel (structural only, nothing to recompute).
        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = !topology.is_empty();
    }
}
