// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ways to hand a foreign element to a proxy.

use alloc::borrow::ToOwned as _;
use core::fmt;

use crate::error::InitError;
use crate::host::ElementHost;

/// Something that wraps a lower-level media element, such as a video player
/// object that owns a `<video>` tag.
///
/// A proxy initialized from a media handle mirrors the wrapped element, not
/// the wrapper. Unwrapping happens exactly one level deep.
pub trait MediaHandle<E> {
    /// Returns the wrapped media element.
    fn media_element(&self) -> E;
}

/// Where the element for [`ForeignProxy::init`](crate::proxy::ForeignProxy::init)
/// comes from.
///
/// Resolved exactly once, at initialization.
pub enum ElementSource<'a, E> {
    /// A direct element reference.
    Element(E),
    /// An identifier resolved through [`ElementHost::element_by_id`].
    Id(&'a str),
    /// A media wrapper whose underlying element is used.
    Media(&'a dyn MediaHandle<E>),
}

impl<E: fmt::Debug> fmt::Debug for ElementSource<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(el) => f.debug_tuple("Element").field(el).finish(),
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Media(_) => f.write_str("Media(..)"),
        }
    }
}

impl<'a, E> ElementSource<'a, E> {
    /// Resolves the source to an element reference.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::UnresolvedId`] when an identifier matches no
    /// element in `host`.
    pub fn resolve<H>(self, host: &H) -> Result<E, InitError>
    where
        H: ElementHost<Element = E>,
    {
        match self {
            Self::Element(el) => Ok(el),
            Self::Id(id) => host
                .element_by_id(id)
                .ok_or_else(|| InitError::UnresolvedId { id: id.to_owned() }),
            Self::Media(media) => Ok(media.media_element()),
        }
    }
}

impl<E> From<E> for ElementSource<'_, E> {
    fn from(element: E) -> Self {
        Self::Element(element)
    }
}
