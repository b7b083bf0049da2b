// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM element host.
//!
//! Style failures reported by the browser are dropped, so one misbehaving
//! element never stops a tree traversal.

use alloc::string::String;

use tether_core::config::SyncConfig;
use tether_core::host::ElementHost;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, HtmlElement, Window};

/// [`ElementHost`] backed by a browser document.
pub struct DomHost {
    window: Window,
    document: Document,
}

impl core::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHost")
            .field("window", &"Window")
            .field("document", &"Document")
            .finish()
    }
}

impl DomHost {
    /// Creates a host for the global window's document.
    ///
    /// Returns `None` outside a browser main thread.
    #[must_use]
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    /// Creates a host for an explicit window and document.
    #[must_use]
    pub fn from_parts(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// The hosted document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The window's current `devicePixelRatio`.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    /// Default settings with the window's current device pixel ratio.
    #[must_use]
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default().with_device_pixel_ratio(self.device_pixel_ratio())
    }

    /// Creates the `<div>` foreign elements are mounted into and appends it
    /// to `parent`.
    ///
    /// The container is the positioning context for the absolutely
    /// positioned proxied elements, and sits at the top-left corner of
    /// `parent` so that it lines up with a canvas placed there.
    ///
    /// # Errors
    ///
    /// Returns the browser's exception if the element cannot be created or
    /// appended.
    pub fn create_mount_container(&self, parent: &HtmlElement) -> Result<HtmlElement, JsValue> {
        let el: HtmlElement = self.document.create_element("div")?.unchecked_into();
        let s = el.style();
        s.set_property("position", "absolute")?;
        s.set_property("left", "0")?;
        s.set_property("top", "0")?;
        s.set_property("overflow", "visible")?;
        parent.append_child(&el)?;
        Ok(el)
    }
}

impl ElementHost for DomHost {
    type Element = HtmlElement;

    fn element_by_id(&self, id: &str) -> Option<HtmlElement> {
        self.document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn style(&self, element: &HtmlElement, property: &str) -> Option<String> {
        element
            .style()
            .get_property_value(property)
            .ok()
            .and_then(inline_value)
    }

    fn computed_style(&self, element: &HtmlElement, property: &str) -> Option<String> {
        self.window
            .get_computed_style(element)
            .ok()
            .flatten()?
            .get_property_value(property)
            .ok()
    }

    fn set_style(&mut self, element: &HtmlElement, property: &str, value: &str) {
        let _ = element.style().set_property(property, value);
    }

    fn insert_first_child(&mut self, container: &HtmlElement, element: &HtmlElement) {
        let first = container.first_child();
        let _ = container.insert_before(element, first.as_ref());
    }

    fn remove_from_parent(&mut self, element: &HtmlElement) -> bool {
        match element.parent_node() {
            Some(parent) => parent.remove_child(element).is_ok(),
            None => false,
        }
    }
}

/// `getPropertyValue` reports an unset inline property as `""`.
fn inline_value(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
