// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-environment contract.
//!
//! Foreign elements live in a host environment (in practice the browser DOM)
//! that the scene-graph renderer cannot draw into. [`ElementHost`] is the
//! narrow set of operations a [`ForeignProxy`](crate::proxy::ForeignProxy)
//! needs from that environment:
//!
//! - **Lookup** — resolve an element by identifier.
//! - **Style reads** — inline style and resolved (computed) style.
//! - **Style writes** — set one property at a time.
//! - **Tree** — insert as first child of a container, detach from parent.
//!
//! Style properties are always addressed by their hyphenated CSS names
//! (`transform-origin`, `-webkit-transform`), see [`css`](crate::css).
//!
//! Writes are infallible from the caller's point of view. Implementations
//! swallow host-side failures so that one misbehaving element never stops a
//! tree traversal.

use alloc::string::String;
use core::fmt;

/// Operations a proxy needs from the environment hosting foreign elements.
///
/// Both the web backend's `DomHost` and in-memory test doubles implement
/// this trait.
pub trait ElementHost {
    /// A reference to one foreign element. Cloning must not clone the
    /// element itself, only the reference.
    type Element: Clone + fmt::Debug;

    /// Looks up an element by identifier.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Returns the element's inline style value for `property`, or `None`
    /// when it is unset or empty.
    fn style(&self, element: &Self::Element, property: &str) -> Option<String>;

    /// Returns the element's resolved style value for `property`, or `None`
    /// when the host cannot resolve styles.
    fn computed_style(&self, element: &Self::Element, property: &str) -> Option<String>;

    /// Sets an inline style property.
    fn set_style(&mut self, element: &Self::Element, property: &str, value: &str);

    /// Inserts `element` as the first child of `container`.
    fn insert_first_child(&mut self, container: &Self::Element, element: &Self::Element);

    /// Detaches `element` from its parent. Returns `false` if it had none.
    fn remove_from_parent(&mut self, element: &Self::Element) -> bool;
}

/// The two `display` states a proxy toggles between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Display {
    /// Shown, as a block box.
    Block,
    /// Not rendered at all.
    None,
}

impl Display {
    /// Maps effective visibility to a display state.
    #[inline]
    #[must_use]
    pub const fn from_visible(visible: bool) -> Self {
        if visible { Self::Block } else { Self::None }
    }

    /// Returns the CSS keyword.
    #[inline]
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::None => "none",
        }
    }

    /// Returns `true` for [`Display::Block`].
    #[inline]
    #[must_use]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Block)
    }
}
