// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for tether.
//!
//! This crate provides the browser side of the host boundary:
//!
//! - [`DomHost`]: [`ElementHost`](tether_core::host::ElementHost) over the
//!   live DOM via `web-sys`, plus the window's device pixel ratio.
//! - [`Video`]: a `<video>` wrapper that proxies resolve to its media element.
//!
//! There is no tick source here; call
//! [`Stage::update`](tether_core::stage::Stage::update) from whatever drives
//! the renderer's frames.

#![no_std]

extern crate alloc;

mod dom;
mod video;

pub use dom::DomHost;
pub use video::Video;
