//! Strict attribute readers. Malformed geometry fails the pass instead of being guessed at.

use crate::element::SvgElement;
use crate::error::{Error, Result};
use crate::geom::ViewBox;

/// Reads a required finite number.
pub fn numeric_attribute(el: &(impl SvgElement + ?Sized), name: &str) -> Result<f64> {
    let raw = el.attribute(name);
    let invalid = || Error::InvalidNumericAttribute {
        element: el.tag_name().to_string(),
        attribute: name.to_string(),
        raw: raw.map(str::to_string),
    };
    let value = raw
        .ok_or_else(invalid)?
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Reads an optional text attribute; absent attributes read as `""`.
pub fn text_attribute<'a>(el: &'a (impl SvgElement + ?Sized), name: &str) -> &'a str {
    el.attribute(name).unwrap_or_default()
}

/// Parses `"x y w h"`.
pub fn parse_view_box(raw: &str) -> Result<ViewBox> {
    let invalid = || Error::InvalidViewBox {
        raw: raw.to_string(),
    };
    let parts = raw
        .split_whitespace()
        .map(|t| t.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;
    match parts.as_slice() {
        &[left, top, width, height] => Ok(ViewBox {
            left,
            top,
            width,
            height,
        }),
        _ => Err(invalid()),
    }
}
