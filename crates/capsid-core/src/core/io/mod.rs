//! Provides input/output for the pipeline's tabular artifacts.
//!
//! Catalogs (raw and annotated) and similarity matrices are exchanged as CSV
//! through the [`traits::TabularFile`] interface. Reading is lenient at the
//! cell level: malformed vocabulary or length cells are logged and replaced by
//! the conservative default, while structural problems (missing id column,
//! inconsistent matrix shape) are errors.

pub mod catalog;
pub mod matrix;
pub mod traits;

use crate::core::similarity::SimilarityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("Malformed table on line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("Invalid matrix: {0}")]
    Matrix(#[from] SimilarityError),
}
