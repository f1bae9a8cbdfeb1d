//! Complementary cluster colors.
//!
//! Secondary highlight links inside a cluster are drawn with a color derived from the cluster's
//! border fill: light fills are darkened and dark fills are lightened in HSL space, then the
//! result is repacked with a fixed translucent alpha.

use crate::geom::Rgba;

pub const COMPLEMENTARY_ALPHA: u8 = 0xaa;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgb01 {
    r: f64,
    g: f64,
    b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hsl {
    /// Hue in `[0, 1)`.
    h: f64,
    s: f64,
    l: f64,
}

fn rgba_to_rgb01(c: Rgba) -> Rgb01 {
    Rgb01 {
        r: c.r() as f64 / 255.0,
        g: c.g() as f64 / 255.0,
        b: c.b() as f64 / 255.0,
    }
}

fn rgb01_to_rgba(rgb: Rgb01, alpha: u8) -> Rgba {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba::new(channel(rgb.r), channel(rgb.g), channel(rgb.b), alpha)
}

fn rgb01_to_hsl(rgb: Rgb01) -> Hsl {
    let Rgb01 { r, g, b } = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h / 6.0, s, l }
}

fn hsl_to_rgb01(hsl: Hsl) -> Rgb01 {
    let Hsl { h, s, l } = hsl;
    if s == 0.0 {
        return Rgb01 { r: l, g: l, b: l };
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgb01 {
        r: hue_to_rgb(p, q, h + 1.0 / 3.0),
        g: hue_to_rgb(p, q, h),
        b: hue_to_rgb(p, q, h - 1.0 / 3.0),
    }
}

/// Derives the complementary highlight color for a cluster fill, with the default alpha.
pub fn complementary(base: Rgba) -> Rgba {
    complementary_with_alpha(base, COMPLEMENTARY_ALPHA)
}

/// Like [`complementary`], with an explicit output alpha. The input alpha is ignored.
pub fn complementary_with_alpha(base: Rgba, alpha: u8) -> Rgba {
    let mut hsl = rgb01_to_hsl(rgba_to_rgb01(base));
    let factor = if hsl.l > 0.5 { 0.8 } else { 1.4 };
    hsl.l = (hsl.l * factor).min(1.0);
    rgb01_to_rgba(hsl_to_rgb01(hsl), alpha)
}
