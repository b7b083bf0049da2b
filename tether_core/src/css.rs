// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS property names and value serialization.

use alloc::string::String;
use core::fmt::Write as _;

use kurbo::Affine;

/// `position`
pub const POSITION: &str = "position";
/// `display`
pub const DISPLAY: &str = "display";
/// `transform`
pub const TRANSFORM: &str = "transform";
/// `-webkit-transform`
pub const WEBKIT_TRANSFORM: &str = "-webkit-transform";
/// `transform-origin`
pub const TRANSFORM_ORIGIN: &str = "transform-origin";
/// `-webkit-transform-origin`
pub const WEBKIT_TRANSFORM_ORIGIN: &str = "-webkit-transform-origin";
/// `opacity`
pub const OPACITY: &str = "opacity";

/// Transform origin pinned to the element's top-left corner, so a written
/// matrix maps the element's own coordinate frame without offset correction.
pub const TOP_LEFT_ORIGIN: &str = "0 0 0";

/// Serializes `matrix` as a CSS `matrix(a,b,c,d,tx,ty)` value.
///
/// All six coefficients are divided by `device_pixel_ratio`, converting from
/// the renderer's physical pixels to the host's CSS pixels, and printed with
/// exactly `precision` decimals. Negative zero prints as plain zero.
#[must_use]
pub fn matrix_css(matrix: Affine, device_pixel_ratio: f64, precision: usize) -> String {
    let mut css = String::with_capacity(64);
    css.push_str("matrix(");
    for (i, coeff) in matrix.as_coeffs().into_iter().enumerate() {
        if i > 0 {
            css.push(',');
        }
        let value = coeff / device_pixel_ratio;
        // `-0.0` formats with a sign; CSS consumers expect `0`.
        let value = if value == 0.0 { 0.0 } else { value };
        let _ = write!(css, "{value:.precision$}");
    }
    css.push(')');
    css
}

/// Serializes an opacity for the `opacity` property.
#[must_use]
pub fn opacity_css(opacity: f32) -> String {
    let mut css = String::new();
    let _ = write!(css, "{opacity}");
    css
}
