// Copyright 2026 the Tether Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel measurement of an element's style.
//!
//! Only the two size properties are ever read, and only pixel values count:
//! anything else (percentages, `auto`, `em`) measures as zero. The inline
//! style wins when set; otherwise the host's resolved style is consulted.

use alloc::borrow::ToOwned as _;
use alloc::string::String;

use crate::host::ElementHost;

/// The outcome of reading one size property.
#[derive(Clone, Debug, PartialEq)]
pub enum Measurement {
    /// A pixel value, truncated toward zero.
    Pixels(f64),
    /// A value was present but was not a pixel length.
    NonPixel(String),
    /// Neither the inline nor the resolved style had a value.
    Missing,
}

impl Measurement {
    /// Returns the measured pixels, or 0 for anything that is not a pixel
    /// length.
    #[must_use]
    pub fn pixels(&self) -> f64 {
        match self {
            Self::Pixels(px) => *px,
            Self::NonPixel(_) | Self::Missing => 0.0,
        }
    }

    /// Returns `true` if a pixel length was read.
    #[must_use]
    pub fn is_pixels(&self) -> bool {
        matches!(self, Self::Pixels(_))
    }
}

/// Converts a camel-cased style name to its hyphenated CSS form.
///
/// Every uppercase ASCII letter becomes `-` plus its lowercase, so vendor
/// prefixed names gain a leading dash: `WebkitTransform` becomes
/// `-webkit-transform`, `transformOrigin` becomes `transform-origin`.
/// Names that are already hyphenated pass through unchanged.
#[must_use]
pub fn css_property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Parses a CSS length, accepting only `px` values.
///
/// The numeric part is truncated toward zero, so `10.9px` measures as 10.
#[must_use]
pub fn parse_px(value: &str) -> Measurement {
    let value = value.trim();
    if value.is_empty() {
        return Measurement::Missing;
    }
    let Some(number) = value.strip_suffix("px") else {
        return Measurement::NonPixel(value.to_owned());
    };
    match number.parse::<f64>() {
        Ok(px) if px.is_finite() => Measurement::Pixels(truncate(px)),
        _ => Measurement::NonPixel(value.to_owned()),
    }
}

/// Reads `name` (camel-cased or hyphenated) from `element`'s inline style,
/// falling back to its resolved style, and parses it as a pixel length.
pub fn measure<H: ElementHost>(host: &H, element: &H::Element, name: &str) -> Measurement {
    let property = css_property_name(name);
    let value = host
        .style(element, &property)
        .or_else(|| host.computed_style(element, &property));
    match value {
        Some(value) => parse_px(&value),
        None => Measurement::Missing,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "truncation toward zero is the point; lengths are far below i64 range"
)]
fn truncate(px: f64) -> f64 {
    (px as i64) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::MemoryHost;

    #[test]
    fn camel_case_becomes_hyphenated() {
        assert_eq!(css_property_name("width"), "width");
        assert_eq!(css_property_name("transformOrigin"), "transform-origin");
        assert_eq!(css_property_name("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property_name("MozTransformOrigin"), "-moz-transform-origin");
        assert_eq!(css_property_name("transform-origin"), "transform-origin");
    }

    #[test]
    fn pixel_values_parse() {
        assert_eq!(parse_px("10px"), Measurement::Pixels(10.0));
        assert_eq!(parse_px(" 20px "), Measurement::Pixels(20.0));
        assert_eq!(parse_px("0px"), Measurement::Pixels(0.0));
    }

    #[test]
    fn fractional_pixels_truncate() {
        assert_eq!(parse_px("10.9px"), Measurement::Pixels(10.0));
        assert_eq!(parse_px("-3.5px"), Measurement::Pixels(-3.0));
    }

    #[test]
    fn non_pixel_values_measure_zero() {
        for value in ["50%", "auto", "2em", "px", "abcpx", "10 px", "infpx"] {
            let m = parse_px(value);
            assert!(!m.is_pixels(), "{value} should not be pixels, got {m:?}");
            assert_eq!(m.pixels(), 0.0, "{value}");
        }
        assert_eq!(parse_px("50%"), Measurement::NonPixel("50%".into()));
        assert_eq!(parse_px(""), Measurement::Missing);
    }

    #[test]
    fn inline_style_wins_over_computed() {
        let mut host = MemoryHost::new();
        let el = host.sized_element("10px", "20px");
        host.put_computed(el, "width", "99px");

        assert_eq!(measure(&host, &el, "width"), Measurement::Pixels(10.0));
        assert_eq!(measure(&host, &el, "height"), Measurement::Pixels(20.0));
    }

    #[test]
    fn computed_style_is_the_fallback() {
        let mut host = MemoryHost::new();
        let el = host.create_element();
        host.put_computed(el, "width", "120px");
        host.put_computed(el, "height", "auto");

        assert_eq!(measure(&host, &el, "width"), Measurement::Pixels(120.0));
        assert_eq!(
            measure(&host, &el, "height"),
            Measurement::NonPixel("auto".into())
        );
    }

    #[test]
    fn camel_names_are_looked_up_hyphenated() {
        let mut host = MemoryHost::new();
        let el = host.create_element();
        host.put_computed(el, "max-width", "64px");
        assert_eq!(measure(&host, &el, "maxWidth"), Measurement::Pixels(64.0));
    }

    #[test]
    fn nothing_anywhere_is_missing() {
        let mut host = MemoryHost::new();
        let el = host.create_element();
        assert_eq!(measure(&host, &el, "width"), Measurement::Missing);
    }
}
