//! Drawing extent computation for parsed CAD primitives.
//!
//! Format readers live in the `drawdims-import-*` crates; they produce a [`model::Drawing`]
//! which is measured here with [`extent::compute_extent`] and rendered with [`report`].

pub mod extent;
pub mod geom;
pub mod model;
pub mod report;
