//! STEP (ISO 10303-21) models measured through the truck CAD kernel.
//!
//! Each shell is converted to a B-rep and tessellated; the mesh positions are what
//! [`drawdims_core::extent::compute_extent_3d`] measures.

use drawdims_core::geom::Point3D;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use truck_meshalgo::prelude::*;
use truck_polymesh::PolygonMesh;
use truck_stepio::r#in::Table;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse STEP file: {0}")]
    Parse(String),

    #[error("STEP file contains no geometry or tessellation failed")]
    NoGeometry,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn load_step_vertices(path: &Path) -> Result<Vec<Point3D>, StepError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StepError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StepError::Io(e)
        }
    })?;
    step_vertices(&text)
}

pub fn step_vertices(text: &str) -> Result<Vec<Point3D>, StepError> {
    let exchange = truck_stepio::r#in::ruststep::parser::parse(text)
        .map_err(|e| StepError::Parse(e.to_string()))?;
    let Some(data) = exchange.data.first() else {
        return Err(StepError::Parse("no DATA section".to_string()));
    };
    let table = Table::from_data_section(data);

    let mut vertices = Vec::new();
    for shell_holder in table.shell.values() {
        let Ok(shell) = table.to_compressed_shell(shell_holder) else {
            warn!("skipping shell that failed to convert");
            continue;
        };
        // Coarse pass sizes the tolerance for the final tessellation.
        let coarse = shell.robust_triangulation(0.01).to_polygon();
        let tolerance = (coarse.bounding_box().diameter() * 0.001).max(1e-6);
        let mesh = shell.robust_triangulation(tolerance).to_polygon();
        append_positions(&mesh, &mut vertices);
    }

    if vertices.is_empty() {
        return Err(StepError::NoGeometry);
    }
    debug!(vertices = vertices.len(), "tessellated STEP model");
    Ok(vertices)
}

fn append_positions(mesh: &PolygonMesh, out: &mut Vec<Point3D>) {
    out.extend(mesh.positions().iter().map(|p| Point3D::new(p.x, p.y, p.z)));
}
