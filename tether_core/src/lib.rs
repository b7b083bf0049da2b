// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-graph proxy nodes for foreign UI elements.
//!
//! `tether_core` keeps elements that a scene-graph renderer cannot draw
//! itself (text inputs, video players, iframes) positioned, scaled, rotated,
//! faded and shown/hidden in lockstep with a node of the scene graph. It is
//! `no_std` compatible (with `alloc`) and talks to the host environment only
//! through the [`ElementHost`](host::ElementHost) trait, so it runs the same
//! against a live DOM and against an in-memory test double.
//!
//! # Architecture
//!
//! ```text
//!   tree mutation ──► LayerStore ──► StageEvent queue
//!                                        │
//!                 ┌──────────────────────┘
//!                 ▼
//!   Stage::dispatch ──► ForeignProxy::on_added_to_stage / on_removed_from_stage
//!                                        │  (one DOM insertion per handle)
//!                                        ▼
//!   render tick ──► Stage::update ──► LayerStore::evaluate
//!                                        │
//!                 ┌──────────────────────┘
//!                 ▼
//!   ForeignProxy::update ──► ElementHost style writes
//! ```
//!
//! **[`layer`]** — Struct-of-arrays scene graph with generational handles.
//! Computes world transforms and effective opacities, raises per-layer
//! update flags, and queues stage membership events.
//!
//! **[`proxy`]** — [`ForeignProxy`](proxy::ForeignProxy): the node that owns
//! one foreign element and mirrors its layer's computed state onto it.
//!
//! **[`stage`]** — [`Stage`](stage::Stage): owns the tree, the mount
//! container and the proxies; dispatches lifecycle events and drives
//! per-tick synchronization.
//!
//! **[`host`]** — The host-environment boundary.
//!
//! **[`source`]** — The ways an element can be handed to a proxy.
//!
//! **[`measure`]** — Pixel measurement of an element's resolved style.
//!
//! **[`css`]** — CSS transform serialization.
//!
//! **[`config`]** — Per-tick synchronization settings and context.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod css;
pub mod dirty;
pub mod error;
pub mod host;
pub mod layer;
pub mod measure;
pub mod proxy;
pub mod source;
pub mod stage;
pub mod trace;
