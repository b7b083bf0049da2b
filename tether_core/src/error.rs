// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Nothing in this crate aborts a tree traversal. Errors are returned as
//! values so callers can tell a misconfigured proxy apart from one that is
//! merely hidden, and are free to ignore them.

use alloc::string::String;

/// Why [`ForeignProxy::init`](crate::proxy::ForeignProxy::init) left the
/// proxy unbound.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    /// No element with this identifier exists in the host.
    #[error("no element with id `{id}`")]
    UnresolvedId {
        /// The identifier that was looked up.
        id: String,
    },
}
