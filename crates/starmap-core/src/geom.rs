//! Plain geometry and color values shared by the ingestion and highlight layers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

/// The rectangular drawing window a document declares on its root element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 1024.0,
            height: 1024.0,
        }
    }
}

impl ViewBox {
    pub fn from_array([left, top, width, height]: [f64; 4]) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Flips an SVG `y` (down-positive) into map space (up-positive).
    pub fn transform_y(&self, y: f64) -> f64 {
        self.height + self.top - y
    }

    pub fn center(&self) -> Point {
        point(
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }
}

/// A packed `0xRRGGBBAA` color; alpha lives in the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xffff_ff00) | a as u32)
    }

    pub fn to_css_hex(self) -> String {
        format!("#{:08x}", self.0)
    }
}

impl From<u32> for Rgba {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_flip_maps_edges_of_view_box() {
        let vb = ViewBox {
            left: 0.0,
            top: 0.0,
            width: 1000.0,
            height: 1000.0,
        };
        assert_eq!(vb.transform_y(0.0), 1000.0);
        assert_eq!(vb.transform_y(1000.0), 0.0);
    }

    #[test]
    fn vertical_flip_honors_top_offset() {
        let vb = ViewBox::from_array([0.0, -50.0, 100.0, 200.0]);
        assert_eq!(vb.transform_y(-50.0), 200.0);
        assert_eq!(vb.transform_y(150.0), 0.0);
    }

    #[test]
    fn rgba_channels_are_big_endian_with_alpha_low() {
        let c = Rgba::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x12, 0x34, 0x56, 0x78));
        assert_eq!(c.with_alpha(0xaa).0, 0x1234_56aa);
        assert_eq!(c.to_css_hex(), "#12345678");
    }
}
