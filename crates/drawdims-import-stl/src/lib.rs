//! Vertex reader for STL meshes, ASCII or binary.
//!
//! Only the triangle corners are kept; `stl_io` already merges corners shared between faces.

use drawdims_core::geom::Point3D;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StlError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("invalid STL: {0}")]
    Parse(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn load_stl_vertices(path: &Path) -> Result<Vec<Point3D>, StlError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlError::Io(e)
        }
    })?;
    read_stl_vertices(&mut BufReader::new(file))
}

pub fn read_stl_vertices<R: Read + Seek>(reader: &mut R) -> Result<Vec<Point3D>, StlError> {
    let mesh = stl_io::read_stl(reader).map_err(StlError::Parse)?;
    debug!(
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "read STL mesh"
    );
    Ok(mesh
        .vertices
        .iter()
        .map(|v| {
            let [x, y, z] = v.0;
            Point3D::new(f64::from(x), f64::from(y), f64::from(z))
        })
        .collect())
}
