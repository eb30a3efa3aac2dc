//! Document structure - catalog, page tree and named destinations.
//!
//! This module contains:
//! - `resolver` - object resolution seam, in-memory store and cache
//! - `attrs` - inheritable page attributes (PageAttrs)
//! - `page` - one flattened page tree leaf (Page)
//! - `name_tree` - flattened name tree index (NameTree)
//! - `dest` - link destinations (LinkDest)
//! - `catalog` - catalog validation, page tree flattening, lookups (Catalog)

pub mod attrs;
pub mod catalog;
pub mod dest;
pub mod name_tree;
pub mod page;
pub mod resolver;

// Re-export main types for convenience
pub use attrs::{DEFAULT_MEDIA_BOX, PageAttrs};
pub use catalog::{Catalog, CatalogOptions, PageMode};
pub use dest::{DestKind, DestTarget, LinkDest};
pub use name_tree::{NameTree, NameTreeEntry};
pub use page::Page;
pub use resolver::{CachedResolver, DEFAULT_CACHE_CAPACITY, ObjectStore, Resolver};
