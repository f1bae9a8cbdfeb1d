//! Geometry and fill extraction for border paths and node circles.

use std::str::FromStr;

use svgtypes::{PathParser, PathSegment};

use crate::element::SvgElement;
use crate::error::{Error, Result};
use crate::geom::{Point, Rgba, point};

/// Turns element shape data into points and colors, in raw SVG coordinates.
pub trait ShapeExtractor {
    /// The polygon outline of a border element.
    fn border_points(&self, el: &dyn SvgElement) -> Result<Vec<Point>>;

    /// The element's fill, falling back to its parent's; `None` when unset or `none`.
    fn fill_color(&self, el: &dyn SvgElement) -> Result<Option<Rgba>>;
}

/// Reads `d` and `fill` attributes with `svgtypes`.
#[derive(Debug, Clone, Copy)]
pub struct SvgShapeExtractor {
    /// Intermediate samples per curve segment; end points are always emitted.
    pub curve_samples: usize,
}

impl Default for SvgShapeExtractor {
    fn default() -> Self {
        Self { curve_samples: 4 }
    }
}

impl ShapeExtractor for SvgShapeExtractor {
    fn border_points(&self, el: &dyn SvgElement) -> Result<Vec<Point>> {
        let d = el.attribute("d").unwrap_or_default();
        flatten_path(d, self.curve_samples).map_err(|message| Error::InvalidPathData {
            id: el.attribute("id").unwrap_or_default().to_string(),
            message,
        })
    }

    fn fill_color(&self, el: &dyn SvgElement) -> Result<Option<Rgba>> {
        let Some(raw) = el.attribute("fill").or_else(|| el.parent_attribute("fill")) else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() || raw == "none" {
            return Ok(None);
        }
        let color = svgtypes::Color::from_str(raw).map_err(|_| Error::InvalidFillColor {
            element: el.tag_name().to_string(),
            id: el.attribute("id").unwrap_or_default().to_string(),
            raw: raw.to_string(),
        })?;
        Ok(Some(Rgba::new(
            color.red,
            color.green,
            color.blue,
            color.alpha,
        )))
    }
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    point(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

fn quadratic(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    point(
        mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    )
}

/// Flattens path data into an ordered point list.
///
/// Lines contribute their end points. Bezier curves contribute `samples` interior points plus
/// their end point; arcs contribute only their end point. `Z` does not repeat the start point.
pub fn flatten_path(d: &str, samples: usize) -> std::result::Result<Vec<Point>, String> {
    let mut out: Vec<Point> = Vec::new();
    let mut cur = point(0.0, 0.0);
    let mut subpath_start = cur;
    // Reflection sources for smooth curve commands.
    let mut last_cubic_ctrl: Option<Point> = None;
    let mut last_quad_ctrl: Option<Point> = None;

    let resolve = |abs: bool, cur: Point, x: f64, y: f64| {
        if abs {
            point(x, y)
        } else {
            point(cur.x + x, cur.y + y)
        }
    };
    let reflect = |ctrl: Option<Point>, cur: Point| match ctrl {
        Some(c) => point(2.0 * cur.x - c.x, 2.0 * cur.y - c.y),
        None => cur,
    };
    let steps = samples + 1;

    for segment in PathParser::from(d) {
        let segment = segment.map_err(|e| e.to_string())?;
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;
        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                cur = resolve(abs, cur, x, y);
                subpath_start = cur;
                out.push(cur);
            }
            PathSegment::LineTo { abs, x, y } => {
                cur = resolve(abs, cur, x, y);
                out.push(cur);
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                cur = point(if abs { x } else { cur.x + x }, cur.y);
                out.push(cur);
            }
            PathSegment::VerticalLineTo { abs, y } => {
                cur = point(cur.x, if abs { y } else { cur.y + y });
                out.push(cur);
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let c1 = resolve(abs, cur, x1, y1);
                let c2 = resolve(abs, cur, x2, y2);
                let end = resolve(abs, cur, x, y);
                for i in 1..=steps {
                    out.push(cubic(cur, c1, c2, end, i as f64 / steps as f64));
                }
                cubic_ctrl = Some(c2);
                cur = end;
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let c1 = reflect(last_cubic_ctrl, cur);
                let c2 = resolve(abs, cur, x2, y2);
                let end = resolve(abs, cur, x, y);
                for i in 1..=steps {
                    out.push(cubic(cur, c1, c2, end, i as f64 / steps as f64));
                }
                cubic_ctrl = Some(c2);
                cur = end;
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let c = resolve(abs, cur, x1, y1);
                let end = resolve(abs, cur, x, y);
                for i in 1..=steps {
                    out.push(quadratic(cur, c, end, i as f64 / steps as f64));
                }
                quad_ctrl = Some(c);
                cur = end;
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let c = reflect(last_quad_ctrl, cur);
                let end = resolve(abs, cur, x, y);
                for i in 1..=steps {
                    out.push(quadratic(cur, c, end, i as f64 / steps as f64));
                }
                quad_ctrl = Some(c);
                cur = end;
            }
            PathSegment::EllipticalArc { abs, x, y, .. } => {
                cur = resolve(abs, cur, x, y);
                out.push(cur);
            }
            PathSegment::ClosePath { .. } => {
                cur = subpath_start;
            }
        }
        last_cubic_ctrl = cubic_ctrl;
        last_quad_ctrl = quad_ctrl;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use std::rc::Rc;

    #[test]
    fn polygon_paths_flatten_to_vertices() {
        let pts = flatten_path("M0,0 L10,0 L10,10 Z", 4).unwrap();
        assert_eq!(pts, vec![point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)]);
    }

    #[test]
    fn relative_and_axis_commands_track_current_point() {
        let pts = flatten_path("m5 5 h10 v10 l-10 0 z m1 1 H3 V4", 0).unwrap();
        assert_eq!(
            pts,
            vec![
                point(5.0, 5.0),
                point(15.0, 5.0),
                point(15.0, 15.0),
                point(5.0, 15.0),
                point(6.0, 6.0),
                point(3.0, 6.0),
                point(3.0, 4.0),
            ]
        );
    }

    #[test]
    fn curves_are_sampled_and_end_on_the_target() {
        let pts = flatten_path("M0 0 C0 10 10 10 10 0", 3).unwrap();
        assert_eq!(pts.len(), 1 + 4);
        assert_eq!(pts[4], point(10.0, 0.0));
        // Midpoint of a symmetric cubic.
        assert!((pts[2].x - 5.0).abs() < 1e-9);
        assert!((pts[2].y - 7.5).abs() < 1e-9);
    }

    #[test]
    fn garbage_path_data_is_an_error() {
        assert!(flatten_path("M0 0 L", 2).is_err());
    }

    #[test]
    fn fill_falls_back_to_parent() {
        let parent = Rc::new(Element::new("g").with_attr("fill", "#102030"));
        let el = Element::new("path").with_parent(parent);
        let fill = SvgShapeExtractor::default().fill_color(&el).unwrap();
        assert_eq!(fill, Some(Rgba::new(0x10, 0x20, 0x30, 0xff)));
    }

    #[test]
    fn fill_none_and_invalid() {
        let x = SvgShapeExtractor::default();
        let none = Element::new("path").with_attr("fill", "none");
        assert_eq!(x.fill_color(&none).unwrap(), None);

        let bad = Element::new("path")
            .with_attr("id", "c1")
            .with_attr("fill", "not-a-color");
        assert!(matches!(
            x.fill_color(&bad),
            Err(Error::InvalidFillColor { .. })
        ));
    }
}
