use crate::geom::Point2D;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Unknown,
    Inches,
    Feet,
    Millimeters,
    Centimeters,
    Meters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Line,
    Circle,
    Arc,
    Polyline,
    Spline,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    #[error("{kind}: {field} is not a finite number")]
    NonFinite {
        kind: PrimitiveKind,
        field: &'static str,
    },
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrimitiveKind::Line => "line",
            PrimitiveKind::Circle => "circle",
            PrimitiveKind::Arc => "arc",
            PrimitiveKind::Polyline => "polyline",
            PrimitiveKind::Spline => "spline",
            PrimitiveKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// A drawing entity reduced to the geometry that determines its extent.
///
/// `Unsupported` keeps the source entity kind (e.g. `"TEXT"`) so callers can report what was
/// skipped; it never contributes coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        start: Point2D,
        end: Point2D,
    },
    Circle {
        center: Point2D,
        radius: f64,
    },
    Arc {
        center: Point2D,
        radius: f64,
        start_angle_deg: f64,
        end_angle_deg: f64,
    },
    Polyline {
        vertices: Vec<Point2D>,
    },
    Spline {
        control_points: Vec<Point2D>,
    },
    Unsupported {
        kind: String,
    },
}

impl Primitive {
    pub fn line(start: Point2D, end: Point2D) -> Result<Self, PrimitiveError> {
        check_point(PrimitiveKind::Line, "start", start)?;
        check_point(PrimitiveKind::Line, "end", end)?;
        Ok(Primitive::Line { start, end })
    }

    /// Negative radii are accepted as-is.
    pub fn circle(center: Point2D, radius: f64) -> Result<Self, PrimitiveError> {
        check_point(PrimitiveKind::Circle, "center", center)?;
        check_value(PrimitiveKind::Circle, "radius", radius)?;
        Ok(Primitive::Circle { center, radius })
    }

    pub fn arc(
        center: Point2D,
        radius: f64,
        start_angle_deg: f64,
        end_angle_deg: f64,
    ) -> Result<Self, PrimitiveError> {
        check_point(PrimitiveKind::Arc, "center", center)?;
        check_value(PrimitiveKind::Arc, "radius", radius)?;
        check_value(PrimitiveKind::Arc, "start angle", start_angle_deg)?;
        check_value(PrimitiveKind::Arc, "end angle", end_angle_deg)?;
        Ok(Primitive::Arc {
            center,
            radius,
            start_angle_deg,
            end_angle_deg,
        })
    }

    pub fn polyline(vertices: Vec<Point2D>) -> Result<Self, PrimitiveError> {
        for v in &vertices {
            check_point(PrimitiveKind::Polyline, "vertex", *v)?;
        }
        Ok(Primitive::Polyline { vertices })
    }

    pub fn spline(control_points: Vec<Point2D>) -> Result<Self, PrimitiveError> {
        for p in &control_points {
            check_point(PrimitiveKind::Spline, "control point", *p)?;
        }
        Ok(Primitive::Spline { control_points })
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        Primitive::Unsupported { kind: kind.into() }
    }

    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Line { .. } => PrimitiveKind::Line,
            Primitive::Circle { .. } => PrimitiveKind::Circle,
            Primitive::Arc { .. } => PrimitiveKind::Arc,
            Primitive::Polyline { .. } => PrimitiveKind::Polyline,
            Primitive::Spline { .. } => PrimitiveKind::Spline,
            Primitive::Unsupported { .. } => PrimitiveKind::Unsupported,
        }
    }
}

fn check_value(kind: PrimitiveKind, field: &'static str, v: f64) -> Result<(), PrimitiveError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(PrimitiveError::NonFinite { kind, field })
    }
}

fn check_point(kind: PrimitiveKind, field: &'static str, p: Point2D) -> Result<(), PrimitiveError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(PrimitiveError::NonFinite { kind, field })
    }
}

/// Output of a format adapter: every model-space entity, in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub units: Units,
    pub primitives: Vec<Primitive>,
}

impl Drawing {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            primitives: Vec::new(),
        }
    }

    pub fn unsupported_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| p.kind() == PrimitiveKind::Unsupported)
            .count()
    }
}
