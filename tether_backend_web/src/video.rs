// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Video player wrapper.

use alloc::format;
use alloc::string::String;

use tether_core::source::MediaHandle;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{HtmlElement, HtmlVideoElement};

use crate::DomHost;

/// A `<video>` element owned by application code.
///
/// Handing a `Video` to a proxy through
/// [`ElementSource::Media`](tether_core::source::ElementSource::Media) binds
/// the proxy to the underlying `<video>` tag.
#[derive(Clone, Debug)]
pub struct Video {
    media: HtmlVideoElement,
}

impl Video {
    /// Wraps an existing video element.
    #[must_use]
    pub fn new(media: HtmlVideoElement) -> Self {
        Self { media }
    }

    /// Creates a detached `<video>` playing `src`, sized in CSS pixels.
    ///
    /// The size is written as inline `px` styles so a proxy can measure it.
    ///
    /// # Errors
    ///
    /// Returns the browser's exception if the element cannot be created or
    /// styled.
    pub fn create(host: &DomHost, src: &str, width: u32, height: u32) -> Result<Self, JsValue> {
        let media: HtmlVideoElement = host.document().create_element("video")?.unchecked_into();
        media.set_src(src);
        let s = media.style();
        s.set_property("width", &px(width))?;
        s.set_property("height", &px(height))?;
        Ok(Self { media })
    }

    /// The wrapped element.
    #[must_use]
    pub fn media(&self) -> &HtmlVideoElement {
        &self.media
    }
}

impl MediaHandle<HtmlElement> for Video {
    fn media_element(&self) -> HtmlElement {
        self.media.clone().unchecked_into()
    }
}

/// A CSS pixel length that a proxy measures back as exactly `n`.
fn px(n: u32) -> String {
    format!("{n}px")
}
