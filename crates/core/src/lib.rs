//! folio - PDF document structure: catalog, page tree and named destinations.
//!
//! Object parsing and cross-reference resolution live behind the
//! [`Resolver`] trait; this crate builds the logical structure on top of it.

pub mod diagnostics;
pub mod document;
pub mod error;
pub mod model;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use document::{
    CachedResolver, Catalog, CatalogOptions, DestKind, DestTarget, LinkDest, NameTree,
    ObjectStore, Page, PageAttrs, PageMode, Resolver,
};
pub use error::{PdfError, Result};
pub use model::objects::{PDFObjRef, PDFObject, PDFStream};
