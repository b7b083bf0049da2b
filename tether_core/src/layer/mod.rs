// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-graph data model.
//!
//! A *layer* is a node of the scene graph. Each layer has:
//!
//! - An identity ([`LayerId`]), a generational handle that becomes stale when
//!   the layer is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Local properties** set by the caller: [`transform`](LayerStore::set_transform),
//!   [`opacity`](LayerStore::set_opacity), [`flags`](LayerStore::set_flags)
//!   and [`bounds`](LayerStore::set_bounds).
//! - **Computed properties** produced by [`evaluate`](LayerStore::evaluate):
//!   `world_transform` (product of ancestor local transforms),
//!   `effective_opacity` (product of ancestor local opacities) and
//!   `effective_hidden` (self or any ancestor hidden).
//! - **Update flags** ([`UpdateFlags`]) raised whenever a computed property
//!   is recomputed and cleared by whoever consumes them.
//!
//! # Stage membership
//!
//! One layer may be designated the stage root. A layer is *on stage* when
//! the stage root is among its ancestors (or is the layer itself). Every
//! mutation that changes membership queues a [`StageEvent`] per affected
//! layer; [`take_stage_events`](LayerStore::take_stage_events) hands them to
//! the dispatcher.

mod evaluate;
mod id;
mod membership;
mod store;
mod traverse;

pub use evaluate::FrameChanges;
pub use id::{INVALID, LayerId};
pub use membership::{StageEvent, StageEventKind};
pub use store::{LayerFlags, LayerStore, UpdateFlags};
pub use traverse::Children;
