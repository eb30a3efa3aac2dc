//! Error types for the folio document structure library.

use crate::model::objects::PDFObjRef;
use thiserror::Error;

/// Primary error type for catalog and page tree operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("PDF object not found: {0}")]
    ObjectNotFound(PDFObjRef),

    #[error("PDF syntax error: {0}")]
    SyntaxError(String),

    #[error("circular reference detected for obj {0}")]
    CircularReference(PDFObjRef),

    #[error("{what} is wrong type (expected {expected}, got {got})")]
    StructuralType {
        what: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("cyclic page tree at {0}")]
    CyclicPageTree(PDFObjRef),

    #[error("page tree nested deeper than {0} levels")]
    PageTreeTooDeep(usize),

    #[error("page tree holds more than {0} pages")]
    TooManyPages(usize),

    #[error("page {page} is invalid: {reason}")]
    InvalidPage { page: usize, reason: String },

    #[error("invalid destination: {0}")]
    InvalidDestination(String),
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
