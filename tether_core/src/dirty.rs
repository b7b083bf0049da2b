// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The layer tree uses multi-channel dirty tracking (via [`understory_dirty`])
//! to propagate invalidation to descendants. Each channel represents an
//! independent category of change.
//!
//! - **Propagating** — [`TRANSFORM`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent, because world transforms, effective
//!   opacities and effective hidden state are inherited. Hidden-flag changes
//!   are routed through [`TRANSFORM`].
//!
//! - **Structural** — [`TOPOLOGY`] is marked on topology mutations and
//!   triggers a traversal-order rebuild during evaluation.
//!
//! Channels are internal bookkeeping. What consumers observe is the
//! per-layer [`UpdateFlags`](crate::layer::UpdateFlags) raised by
//! [`LayerStore::evaluate`](crate::layer::LayerStore::evaluate).

use understory_dirty::Channel;

/// Transform or hidden flag changed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Opacity changed.
pub const OPACITY: Channel = Channel::new(1);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(2);
