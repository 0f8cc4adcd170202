use crate::geom::{BBox2, BBox3, Point3D};
use crate::model::Primitive;
use serde::{Deserialize, Serialize};

/// Width and height of the axis-aligned box around a set of primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

/// Size of a 3D box: `width` along X, `depth` along Y, `height` along Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent3 {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

/// Returns `None` when no primitive contributed a coordinate.
///
/// Arcs are measured by their full circle, not the swept segment. `Unsupported` entries and
/// empty polylines/splines contribute nothing.
pub fn compute_extent<'a, I>(primitives: I) -> Option<Extent>
where
    I: IntoIterator<Item = &'a Primitive>,
{
    let mut acc = ExtentAccumulator::default();
    for p in primitives {
        acc.add(p);
    }
    acc.finish()
}

/// Returns `None` for an empty point set.
pub fn compute_extent_3d<I>(points: I) -> Option<Extent3>
where
    I: IntoIterator<Item = Point3D>,
{
    let mut bbox = BBox3::empty();
    let mut any = false;
    for p in points {
        bbox.include_point(p);
        any = true;
    }
    if !any {
        return None;
    }
    Some(Extent3 {
        width: bbox.size_x(),
        depth: bbox.size_y(),
        height: bbox.size_z(),
    })
}

/// Running min/max over the X and Y contributions of each primitive.
///
/// X and Y are always pushed in pairs, so a single counter covers both axes.
#[derive(Debug, Clone)]
pub struct ExtentAccumulator {
    bbox: BBox2,
    contributions: usize,
}

impl Default for ExtentAccumulator {
    fn default() -> Self {
        Self {
            bbox: BBox2::empty(),
            contributions: 0,
        }
    }
}

impl ExtentAccumulator {
    pub fn add(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Line { start, end } => {
                self.push(start.x, start.y);
                self.push(end.x, end.y);
            }
            Primitive::Circle { center, radius } | Primitive::Arc { center, radius, .. } => {
                self.push(center.x - radius, center.y - radius);
                self.push(center.x + radius, center.y + radius);
            }
            Primitive::Polyline { vertices } => {
                for v in vertices {
                    self.push(v.x, v.y);
                }
            }
            Primitive::Spline { control_points } => {
                for p in control_points {
                    self.push(p.x, p.y);
                }
            }
            Primitive::Unsupported { .. } => {}
        }
    }

    /// Number of (x, y) pairs seen so far.
    pub fn contributions(&self) -> usize {
        self.contributions
    }

    pub fn finish(&self) -> Option<Extent> {
        if self.contributions == 0 {
            return None;
        }
        Some(Extent {
            width: self.bbox.width(),
            height: self.bbox.height(),
        })
    }

    fn push(&mut self, x: f64, y: f64) {
        self.bbox.include_x(x);
        self.bbox.include_y(y);
        self.contributions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point2D;

    #[test]
    fn negative_radius_is_not_special_cased() {
        let c = Primitive::Circle {
            center: Point2D::new(0.0, 0.0),
            radius: -2.0,
        };
        // center - r = 2, center + r = -2: the box still spans 4.
        let e = compute_extent([&c]).unwrap();
        assert_eq!(4.0, e.width);
        assert_eq!(4.0, e.height);
    }

    #[test]
    fn nan_contribution_is_ignored() {
        let l = Primitive::Line {
            start: Point2D::new(f64::NAN, 0.0),
            end: Point2D::new(3.0, 2.0),
        };
        let p = Primitive::Polyline {
            vertices: vec![Point2D::new(1.0, 1.0)],
        };
        let e = compute_extent([&l, &p]).unwrap();
        assert_eq!(2.0, e.width);
        assert_eq!(2.0, e.height);
    }

    #[test]
    fn counts_contributions() {
        let mut acc = ExtentAccumulator::default();
        acc.add(&Primitive::Polyline {
            vertices: vec![Point2D::new(0.0, 0.0); 3],
        });
        acc.add(&Primitive::unsupported("TEXT"));
        assert_eq!(3, acc.contributions());
    }
}
