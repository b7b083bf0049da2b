// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage membership tracking.
//!
//! Membership is derived from topology: a layer is on stage iff the stage
//! root is the layer itself or one of its ancestors. The store compares
//! membership before and after each topology mutation and queues one
//! [`StageEvent`] per layer of the moved subtree when it flips.

use alloc::vec::Vec;

use super::id::{INVALID, LayerId};
use super::store::LayerStore;

/// Whether a layer joined or left the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageEventKind {
    /// The layer became part of the live tree.
    Added,
    /// The layer is no longer part of the live tree.
    Removed,
}

/// A stage membership notification for one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StageEvent {
    /// The layer whose membership changed.
    pub layer: LayerId,
    /// Which way it changed.
    pub kind: StageEventKind,
}

impl StageEvent {
    /// An [`Added`](StageEventKind::Added) event for `layer`.
    #[inline]
    #[must_use]
    pub const fn added(layer: LayerId) -> Self {
        Self {
            layer,
            kind: StageEventKind::Added,
        }
    }

    /// A [`Removed`](StageEventKind::Removed) event for `layer`.
    #[inline]
    #[must_use]
    pub const fn removed(layer: LayerId) -> Self {
        Self {
            layer,
            kind: StageEventKind::Removed,
        }
    }
}

impl LayerStore {
    /// Designates `root` as the stage root, or clears the stage with `None`.
    ///
    /// Layers that leave the stage get a `Removed` event, layers that join it
    /// an `Added` event. Layers on both the old and the new stage get none.
    ///
    /// # Panics
    ///
    /// Panics if `root` is a stale handle.
    pub fn set_stage_root(&mut self, root: Option<LayerId>) {
        let new_root = match root {
            Some(id) => {
                self.validate(id);
                id.idx
            }
            None => INVALID,
        };
        if new_root == self.stage_root {
            return;
        }

        let mut before = Vec::new();
        if self.stage_root != INVALID {
            self.collect_subtree(self.stage_root, &mut before);
        }
        self.stage_root = new_root;
        let mut after = Vec::new();
        if new_root != INVALID {
            self.collect_subtree(new_root, &mut after);
        }

        for &idx in &before {
            if !after.contains(&idx) {
                self.stage_events.push(StageEvent::removed(self.id_at(idx)));
            }
        }
        for &idx in &after {
            if !before.contains(&idx) {
                self.stage_events.push(StageEvent::added(self.id_at(idx)));
            }
        }
    }

    /// Returns the current stage root, if any.
    #[must_use]
    pub fn stage_root(&self) -> Option<LayerId> {
        (self.stage_root != INVALID).then(|| self.id_at(self.stage_root))
    }

    /// Returns whether the layer is part of the live (staged) tree.
    #[must_use]
    pub fn is_on_stage(&self, id: LayerId) -> bool {
        self.validate(id);
        self.on_stage_at(id.idx)
    }

    /// Takes all queued stage events, oldest first.
    #[must_use]
    pub fn take_stage_events(&mut self) -> Vec<StageEvent> {
        core::mem::take(&mut self.stage_events)
    }

    /// Returns `true` if stage events are waiting to be dispatched.
    #[must_use]
    pub fn has_pending_stage_events(&self) -> bool {
        !self.stage_events.is_empty()
    }

    /// Membership test on a raw slot index. O(depth).
    pub(crate) fn on_stage_at(&self, idx: u32) -> bool {
        if self.stage_root == INVALID {
            return false;
        }
        let mut cur = idx;
        loop {
            if cur == self.stage_root {
                return true;
            }
            let p = self.parent[cur as usize];
            if p == INVALID {
                return false;
            }
            cur = p;
        }
    }

    /// Queues events for `idx`'s subtree if its membership differs from
    /// `was_on_stage`.
    pub(crate) fn queue_membership_change(&mut self, idx: u32, was_on_stage: bool) {
        let now_on_stage = self.on_stage_at(idx);
        if now_on_stage == was_on_stage {
            return;
        }
        let mut subtree = Vec::new();
        self.collect_subtree(idx, &mut subtree);
        for slot in subtree {
            let layer = self.id_at(slot);
            self.stage_events.push(if now_on_stage {
                StageEvent::added(layer)
            } else {
                StageEvent::removed(layer)
            });
        }
    }
}
