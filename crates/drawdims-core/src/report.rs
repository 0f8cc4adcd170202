use crate::extent::{compute_extent, Extent, Extent3};
use crate::model::{Drawing, PrimitiveKind, Units};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNDETERMINED: &str = "Unable to determine dimensions.";

pub fn format_extent(extent: Option<&Extent>) -> String {
    match extent {
        Some(e) => format!("Width: {:.2} units, Height: {:.2} units", e.width, e.height),
        None => UNDETERMINED.to_string(),
    }
}

pub fn format_extent_3d(extent: Option<&Extent3>) -> String {
    match extent {
        Some(e) => format!(
            "Width (X): {:.2} units, Depth (Y): {:.2} units, Height (Z): {:.2} units",
            e.width, e.depth, e.height
        ),
        None => UNDETERMINED.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measured {
    // Listed first so a three-axis record is not read back as planar.
    Solid(Extent3),
    Planar(Extent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionsReport {
    pub input_format: String,
    pub units: Units,
    /// Primitive counts by kind; for mesh input this holds only the vertex total.
    pub counts: BTreeMap<String, usize>,
    pub skipped: usize,
    pub extent: Option<Measured>,
    pub text: String,
}

impl DimensionsReport {
    pub fn for_drawing(input_format: &str, drawing: &Drawing) -> Self {
        let mut counts = BTreeMap::new();
        for p in &drawing.primitives {
            let kind = p.kind();
            if kind != PrimitiveKind::Unsupported {
                *counts.entry(kind.to_string()).or_insert(0) += 1;
            }
        }
        let extent = compute_extent(&drawing.primitives);
        Self {
            input_format: input_format.to_string(),
            units: drawing.units,
            counts,
            skipped: drawing.unsupported_count(),
            text: format_extent(extent.as_ref()),
            extent: extent.map(Measured::Planar),
        }
    }

    pub fn for_mesh(input_format: &str, vertex_count: usize, extent: Option<Extent3>) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert("vertices".to_string(), vertex_count);
        Self {
            input_format: input_format.to_string(),
            units: Units::Unknown,
            counts,
            skipped: 0,
            text: format_extent_3d(extent.as_ref()),
            extent: extent.map(Measured::Solid),
        }
    }
}
