use anyhow::{Context, Result};
use drawdims_core::geom::Point2D;
use drawdims_core::model::{Drawing, Primitive, PrimitiveError, Units};
use dxf::entities::EntityType;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Flatten block references (INSERT) into their member entities.
    pub expand_inserts: bool,
    pub max_insert_depth: usize,
    /// Upper bound on block placements across the whole drawing, counting every
    /// row/column cell of array inserts at every nesting level.
    pub max_insert_cells: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            expand_inserts: false,
            max_insert_depth: 8,
            max_insert_cells: 100_000,
        }
    }
}

pub fn import_dxf(path: &Path, cfg: &ImportConfig) -> Result<Drawing> {
    let drawing = dxf::Drawing::load_file(path).with_context(|| format!("load DXF: {path:?}"))?;
    Ok(convert(&drawing, cfg))
}

/// Same as [`import_dxf`] for an in-memory upload or any other byte stream.
pub fn import_dxf_reader<R: Read>(reader: &mut R, cfg: &ImportConfig) -> Result<Drawing> {
    let drawing = dxf::Drawing::load(reader).context("load DXF from reader")?;
    Ok(convert(&drawing, cfg))
}

fn convert(drawing: &dxf::Drawing, cfg: &ImportConfig) -> Drawing {
    let mut importer = DxfImporter::new(drawing, cfg);
    importer.import_all();
    debug!(
        primitives = importer.primitives.len(),
        rejected = importer.rejected,
        "converted DXF entities"
    );
    Drawing {
        units: map_units(drawing.header.default_drawing_units),
        primitives: importer.primitives,
    }
}

fn map_units(units: dxf::enums::Units) -> Units {
    match units {
        dxf::enums::Units::Inches => Units::Inches,
        dxf::enums::Units::Feet => Units::Feet,
        dxf::enums::Units::Millimeters => Units::Millimeters,
        dxf::enums::Units::Centimeters => Units::Centimeters,
        dxf::enums::Units::Meters => Units::Meters,
        _ => Units::Unknown,
    }
}

struct DxfImporter<'a> {
    drawing: &'a dxf::Drawing,
    cfg: &'a ImportConfig,
    blocks: HashMap<String, &'a dxf::Block>,
    primitives: Vec<Primitive>,
    rejected: usize,
    insert_cells: usize,
}

impl<'a> DxfImporter<'a> {
    fn new(drawing: &'a dxf::Drawing, cfg: &'a ImportConfig) -> Self {
        let mut blocks = HashMap::new();
        if cfg.expand_inserts {
            for block in drawing.blocks() {
                blocks.insert(block.name.to_ascii_lowercase(), block);
            }
        }
        Self {
            drawing,
            cfg,
            blocks,
            primitives: Vec::new(),
            rejected: 0,
            insert_cells: 0,
        }
    }

    fn import_all(&mut self) {
        let tx = Transform2D::identity();
        let mut stack = Vec::new();
        let drawing = self.drawing;
        for ent in drawing.entities() {
            self.import_entity(ent, &tx, &mut stack, 0);
        }
    }

    fn import_entity(
        &mut self,
        ent: &dxf::entities::Entity,
        tx: &Transform2D,
        stack: &mut Vec<String>,
        depth: usize,
    ) {
        let converted = match &ent.specific {
            EntityType::Insert(insert) if self.cfg.expand_inserts => {
                self.import_insert(insert, tx, stack, depth + 1);
                return;
            }
            EntityType::Line(line) => Primitive::line(
                tx.apply_point(Point2D::new(line.p1.x, line.p1.y)),
                tx.apply_point(Point2D::new(line.p2.x, line.p2.y)),
            ),
            EntityType::Circle(circle) => {
                let center = Point2D::new(circle.center.x, circle.center.y);
                match tx.uniform_scale_rotation() {
                    Some((scale, _)) => {
                        Primitive::circle(tx.apply_point(center), circle.radius * scale)
                    }
                    None => Primitive::polyline(
                        circle_points(center, circle.radius, 64)
                            .into_iter()
                            .map(|p| tx.apply_point(p))
                            .collect(),
                    ),
                }
            }
            EntityType::Arc(arc) => {
                let center = Point2D::new(arc.center.x, arc.center.y);
                match tx.uniform_scale_rotation() {
                    Some((scale, rot)) => {
                        let rot_deg = rot.to_degrees();
                        Primitive::arc(
                            tx.apply_point(center),
                            arc.radius * scale,
                            arc.start_angle + rot_deg,
                            arc.end_angle + rot_deg,
                        )
                    }
                    // Sampled on the whole circle so the result matches the arc rule above.
                    None => Primitive::polyline(
                        circle_points(center, arc.radius, 64)
                            .into_iter()
                            .map(|p| tx.apply_point(p))
                            .collect(),
                    ),
                }
            }
            EntityType::LwPolyline(poly) => Primitive::polyline(
                poly.vertices
                    .iter()
                    .map(|v| tx.apply_point(Point2D::new(v.x, v.y)))
                    .collect(),
            ),
            EntityType::Polyline(poly) => Primitive::polyline(
                poly.vertices()
                    .map(|v| tx.apply_point(Point2D::new(v.location.x, v.location.y)))
                    .collect(),
            ),
            EntityType::Spline(spline) => Primitive::spline(
                spline
                    .control_points
                    .iter()
                    .map(|p| tx.apply_point(Point2D::new(p.x, p.y)))
                    .collect(),
            ),
            other => Ok(Primitive::unsupported(entity_type_name(other))),
        };
        self.push(converted, ent);
    }

    fn push(&mut self, converted: Result<Primitive, PrimitiveError>, ent: &dxf::entities::Entity) {
        match converted {
            Ok(p) => self.primitives.push(p),
            Err(err) => {
                warn!(handle = ?ent.common.handle, error = %err, "skipping entity");
                self.rejected += 1;
            }
        }
    }

    fn import_insert(
        &mut self,
        insert: &dxf::entities::Insert,
        parent_tx: &Transform2D,
        stack: &mut Vec<String>,
        depth: usize,
    ) {
        if depth > self.cfg.max_insert_depth {
            warn!(block = %insert.name, depth, "block nesting too deep, skipping");
            return;
        }
        let name = insert.name.to_ascii_lowercase();
        if stack.iter().any(|n| n == &name) {
            warn!(block = %insert.name, "recursive block reference, skipping");
            return;
        }
        let block: &'a dxf::Block = match self.blocks.get(&name) {
            Some(block) => *block,
            None => {
                warn!(block = %insert.name, "reference to undefined block");
                return;
            }
        };
        let col_count = insert.column_count.max(1) as usize;
        let row_count = insert.row_count.max(1) as usize;
        let cells = col_count * row_count;
        if self.insert_cells + cells > self.cfg.max_insert_cells {
            warn!(
                block = %insert.name,
                cells,
                limit = self.cfg.max_insert_cells,
                "block placement limit reached, skipping insert"
            );
            return;
        }
        self.insert_cells += cells;
        stack.push(name);
        let base = Point2D::new(block.base_point.x, block.base_point.y);
        let loc = Point2D::new(insert.location.x, insert.location.y);
        let scale = Point2D::new(insert.x_scale_factor, insert.y_scale_factor);

        for row in 0..row_count {
            for col in 0..col_count {
                let offset = Point2D::new(
                    col as f64 * insert.column_spacing,
                    row as f64 * insert.row_spacing,
                );
                let local_tx = Transform2D::from_insert(base, loc, scale, insert.rotation, offset);
                let combined = parent_tx.compose(&local_tx);
                for ent in &block.entities {
                    self.import_entity(ent, &combined, stack, depth);
                }
            }
        }

        stack.pop();
    }
}

fn entity_type_name(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Insert(_) => "INSERT",
        EntityType::Text(_) => "TEXT",
        EntityType::MText(_) => "MTEXT",
        EntityType::Ellipse(_) => "ELLIPSE",
        EntityType::ModelPoint(_) => "POINT",
        EntityType::Solid(_) => "SOLID",
        EntityType::Face3D(_) => "3DFACE",
        EntityType::Leader(_) => "LEADER",
        EntityType::Ray(_) => "RAY",
        EntityType::XLine(_) => "XLINE",
        EntityType::Attribute(_) => "ATTRIB",
        EntityType::AttributeDefinition(_) => "ATTDEF",
        EntityType::RotatedDimension(_)
        | EntityType::RadialDimension(_)
        | EntityType::DiameterDimension(_)
        | EntityType::AngularThreePointDimension(_)
        | EntityType::OrdinateDimension(_) => "DIMENSION",
        _ => "OTHER",
    }
}

#[derive(Debug, Clone, Copy)]
struct Transform2D {
    m11: f64,
    m12: f64,
    m21: f64,
    m22: f64,
    tx: f64,
    ty: f64,
}

impl Transform2D {
    fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Block-to-world transform: move `base` to the origin, scale, rotate, then place at
    /// `location` shifted by the array `offset`, which rotates with the block but is not scaled.
    fn from_insert(
        base: Point2D,
        location: Point2D,
        scale: Point2D,
        rotation_deg: f64,
        offset: Point2D,
    ) -> Self {
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let m11 = cos * scale.x;
        let m12 = -sin * scale.y;
        let m21 = sin * scale.x;
        let m22 = cos * scale.y;

        let off_x = cos * offset.x - sin * offset.y;
        let off_y = sin * offset.x + cos * offset.y;
        Self {
            m11,
            m12,
            m21,
            m22,
            tx: location.x + off_x - (m11 * base.x + m12 * base.y),
            ty: location.y + off_y - (m21 * base.x + m22 * base.y),
        }
    }

    fn compose(&self, other: &Transform2D) -> Self {
        Self {
            m11: self.m11 * other.m11 + self.m12 * other.m21,
            m12: self.m11 * other.m12 + self.m12 * other.m22,
            m21: self.m21 * other.m11 + self.m22 * other.m21,
            m22: self.m21 * other.m12 + self.m22 * other.m22,
            tx: self.m11 * other.tx + self.m12 * other.ty + self.tx,
            ty: self.m21 * other.tx + self.m22 * other.ty + self.ty,
        }
    }

    fn apply_point(&self, p: Point2D) -> Point2D {
        Point2D::new(
            self.m11 * p.x + self.m12 * p.y + self.tx,
            self.m21 * p.x + self.m22 * p.y + self.ty,
        )
    }

    /// `(scale, rotation_rad)` when the transform maps circles to circles.
    fn uniform_scale_rotation(&self) -> Option<(f64, f64)> {
        const EPS: f64 = 1e-6;
        let sx = (self.m11 * self.m11 + self.m21 * self.m21).sqrt();
        let sy = (self.m12 * self.m12 + self.m22 * self.m22).sqrt();
        if !sx.is_finite() || !sy.is_finite() || (sx - sy).abs() > EPS {
            return None;
        }
        let dot = self.m11 * self.m12 + self.m21 * self.m22;
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        if dot.abs() > EPS || det < 0.0 {
            return None;
        }
        Some((sx, self.m21.atan2(self.m11)))
    }
}

fn circle_points(center: Point2D, radius: f64, segments: usize) -> Vec<Point2D> {
    (0..segments)
        .map(|i| {
            let a = i as f64 / segments as f64 * std::f64::consts::TAU;
            Point2D::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_transform_moves_base_point_to_location() {
        let tx = Transform2D::from_insert(
            Point2D::new(1.0, 1.0),
            Point2D::new(10.0, 20.0),
            Point2D::new(2.0, 2.0),
            0.0,
            Point2D::new(0.0, 0.0),
        );
        let p = tx.apply_point(Point2D::new(1.0, 1.0));
        assert!((p.x - 10.0).abs() < 1e-9 && (p.y - 20.0).abs() < 1e-9);
        let q = tx.apply_point(Point2D::new(2.0, 1.0));
        assert!((q.x - 12.0).abs() < 1e-9);
        assert_eq!(Some(2.0), tx.uniform_scale_rotation().map(|(s, _)| s));
    }

    #[test]
    fn mirrored_or_stretched_transform_is_not_uniform() {
        let stretched = Transform2D::from_insert(
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 1.0),
            30.0,
            Point2D::new(0.0, 0.0),
        );
        assert!(stretched.uniform_scale_rotation().is_none());
        let mirrored = Transform2D::from_insert(
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(-1.0, 1.0),
            0.0,
            Point2D::new(0.0, 0.0),
        );
        assert!(mirrored.uniform_scale_rotation().is_none());
    }

    #[test]
    fn circle_samples_hit_the_axis_extremes() {
        let pts = circle_points(Point2D::new(0.0, 0.0), 2.0, 64);
        let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert!((max_x - 2.0).abs() < 1e-9);
        assert!((min_y + 2.0).abs() < 1e-9);
    }
}
