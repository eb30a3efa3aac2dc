//! Document catalog - the root of a document's logical structure.
//!
//! Handles:
//! - Catalog and top-level Pages validation
//! - Page tree flattening with attribute inheritance
//! - Named destinations (Dests dict and Names/Dests name tree)
//! - Base URI, page mode, metadata and other top-level entries

use super::attrs::PageAttrs;
use super::dest::{DestTarget, LinkDest};
use super::name_tree::NameTree;
use super::page::Page;
use super::resolver::Resolver;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObjRef, PDFObject};
use rustc_hash::FxHashSet;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_PAGE_CHUNK: usize = 32;
pub const DEFAULT_CAPACITY_HINT_LIMIT: usize = 4096;
pub const DEFAULT_MAX_DEPTH: usize = 256;
pub const DEFAULT_MAX_PAGES: usize = 1 << 20;

static NULL: PDFObject = PDFObject::Null;

/// Knobs for building a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Slots added to page storage whenever it fills up.
    pub page_chunk: usize,
    /// Upper bound on the up-front allocation taken from `/Count`.
    pub capacity_hint_limit: usize,
    /// Deepest page tree nesting accepted.
    pub max_depth: usize,
    /// Most leaves accepted. Shared subtrees are expanded at every
    /// occurrence, so a few objects can describe an exponential page count.
    /// Kid entries visited are capped at four times this value.
    pub max_pages: usize,
    /// When set, any structural error inside the page tree fails the whole
    /// build. When cleared, the offending subtree or leaf is skipped and
    /// numbering continues with its siblings.
    pub strict_page_tree: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            page_chunk: DEFAULT_PAGE_CHUNK,
            capacity_hint_limit: DEFAULT_CAPACITY_HINT_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            strict_page_tree: true,
        }
    }
}

impl CatalogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_chunk(mut self, chunk: usize) -> Self {
        self.page_chunk = chunk.max(1);
        self
    }

    pub fn capacity_hint_limit(mut self, limit: usize) -> Self {
        self.capacity_hint_limit = limit;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn strict_page_tree(mut self, strict: bool) -> Self {
        self.strict_page_tree = strict;
        self
    }
}

/// How the document asks to be displayed when opened (`/PageMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageMode {
    #[default]
    UseNone,
    UseOutlines,
    UseThumbs,
    FullScreen,
    UseOC,
}

impl PageMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UseNone" => Some(Self::UseNone),
            "UseOutlines" => Some(Self::UseOutlines),
            "UseThumbs" => Some(Self::UseThumbs),
            "FullScreen" => Some(Self::FullScreen),
            "UseOC" => Some(Self::UseOC),
            _ => None,
        }
    }
}

/// The document catalog with its flattened page sequence and destination
/// index.
pub struct Catalog<R> {
    resolver: R,
    options: CatalogOptions,
    ok: bool,
    pages: Vec<Page>,
    declared_count: Option<usize>,
    dests: PDFObject,
    name_tree: NameTree,
    base_uri: Option<String>,
    page_mode: PageMode,
    metadata: PDFObject,
    struct_tree_root: PDFObject,
    outline: PDFObject,
    acro_form: PDFObject,
    diagnostics: Diagnostics,
}

impl<R: Resolver> Catalog<R> {
    /// Build the catalog of the document behind `resolver`.
    pub fn new(resolver: R) -> Self {
        Self::with_options(resolver, CatalogOptions::default())
    }

    pub fn with_options(resolver: R, options: CatalogOptions) -> Self {
        let mut catalog = Self {
            resolver,
            options,
            ok: true,
            pages: Vec::new(),
            declared_count: None,
            dests: PDFObject::Null,
            name_tree: NameTree::new(),
            base_uri: None,
            page_mode: PageMode::UseNone,
            metadata: PDFObject::Null,
            struct_tree_root: PDFObject::Null,
            outline: PDFObject::Null,
            acro_form: PDFObject::Null,
            diagnostics: Diagnostics::new(),
        };
        catalog.load();
        catalog
    }

    fn load(&mut self) {
        let root = match self.resolver.root() {
            Ok(root) => self.resolver.resolve_or_null(&root),
            Err(e) => {
                tracing::debug!("no root catalog: {e}");
                Arc::new(PDFObject::Null)
            }
        };
        let Ok(cat_dict) = root.as_dict() else {
            self.fail(format!(
                "Catalog object is wrong type ({})",
                root.type_name()
            ));
            return;
        };

        // read page tree
        // The top-level node is only required to be a dict: some files omit
        // its /Type entry.
        let pages_raw = cat_dict.get("Pages").unwrap_or(&NULL);
        let pages_obj = self.resolver.resolve_or_null(pages_raw);
        let Ok(pages_dict) = pages_obj.as_dict() else {
            self.fail(format!(
                "Top-level pages object is wrong type ({})",
                pages_obj.type_name()
            ));
            return;
        };
        let count_obj = pages_dict
            .get("Count")
            .map(|c| self.resolver.resolve_or_null(c))
            .unwrap_or_else(|| Arc::new(PDFObject::Null));
        // /Count 9.0 shows up in real files
        let Ok(count) = count_obj.as_num() else {
            self.fail(format!(
                "Page count in top-level pages object is wrong type ({})",
                count_obj.type_name()
            ));
            return;
        };
        let declared = if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        };
        self.declared_count = Some(declared);

        let pages_ref = match pages_raw {
            PDFObject::Ref(r) => Some(*r),
            _ => None,
        };
        let mut builder = PageTreeBuilder::new(
            &self.resolver,
            &self.options,
            &mut self.diagnostics,
            declared
                .min(self.options.capacity_hint_limit)
                .min(self.options.max_pages),
        );
        let flattened = builder.run(pages_dict, pages_ref);
        let pages = builder.pages;
        match flattened {
            Ok(num_pages) => {
                self.pages = pages;
                tracing::debug!(pages = num_pages, "page tree flattened");
                if num_pages != declared {
                    self.diagnostics.warn(
                        DiagnosticKind::CountMismatch,
                        format!(
                            "Page count in top-level pages object is incorrect (declared {declared}, found {num_pages})"
                        ),
                    );
                }
            }
            Err(e) => {
                tracing::debug!("page tree build failed: {e}");
                self.ok = false;
                self.pages = Vec::new();
            }
        }

        self.read_auxiliary(cat_dict);
    }

    /// Record a fatal validation failure ahead of the page tree.
    fn fail(&mut self, message: String) {
        self.diagnostics
            .error(DiagnosticKind::StructuralType, message);
        self.dests = PDFObject::Null;
        self.ok = false;
    }

    fn read_auxiliary(&mut self, cat_dict: &HashMap<String, PDFObject>) {
        let resolver = &self.resolver;
        let lookup = |key: &str| -> Arc<PDFObject> {
            match cat_dict.get(key) {
                Some(obj) => resolver.resolve_or_null(obj),
                None => Arc::new(PDFObject::Null),
            }
        };

        // read named destination dictionary
        self.dests = (*lookup("Dests")).clone();

        // read root of named destination tree
        if let Ok(names) = lookup("Names").as_dict()
            && let Some(tree) = names.get("Dests")
        {
            self.name_tree = NameTree::build(tree, resolver, &mut self.diagnostics);
        }

        // read base URI
        if let Ok(uri) = lookup("URI").as_dict()
            && let Some(base) = uri.get("Base")
            && let Ok(base) = resolver.resolve_or_null(base).as_string()
        {
            self.base_uri = Some(String::from_utf8_lossy(base).into_owned());
        }

        self.page_mode = match lookup("PageMode").as_name() {
            Ok(name) => PageMode::from_name(name).unwrap_or_else(|| {
                tracing::debug!("unknown page mode /{name}, using UseNone");
                PageMode::UseNone
            }),
            Err(_) => PageMode::UseNone,
        };

        let raw = |key: &str| cat_dict.get(key).cloned().unwrap_or(PDFObject::Null);
        self.metadata = raw("Metadata");
        self.struct_tree_root = raw("StructTreeRoot");
        self.outline = raw("Outlines");
        self.acro_form = raw("AcroForm");
    }

    /// Whether the catalog and its page tree were read successfully.
    pub const fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// `/Count` of the top-level pages node, if it got that far.
    pub const fn declared_page_count(&self) -> Option<usize> {
        self.declared_count
    }

    /// Page at 0-based `index`.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Reference backing the page at 0-based `index`, if it was reached
    /// through one.
    pub fn page_ref(&self, index: usize) -> Option<PDFObjRef> {
        self.pages.get(index).and_then(Page::reference)
    }

    /// 1-based number of the page stored as object `num genno R`, or 0.
    pub fn find_page(&self, num: u32, genno: u32) -> usize {
        let target = PDFObjRef::new(num, genno);
        self.pages
            .iter()
            .position(|page| page.reference() == Some(target))
            .map_or(0, |i| i + 1)
    }

    /// Look up a named destination, preferring the `/Dests` dictionary over
    /// the name tree.
    pub fn find_dest(&self, name: &[u8]) -> Option<LinkDest> {
        let mut found = None;
        // dict keys are text; a name that is not UTF-8 can only be in the tree
        if let PDFObject::Dict(dests) = &self.dests
            && let Ok(key) = std::str::from_utf8(name)
            && let Some(value) = dests.get(key)
        {
            let value = self.resolver.resolve_or_null(value);
            if !value.is_null() {
                found = Some(value);
            }
        }
        let found = match found {
            Some(value) => value,
            None => self.name_tree.lookup(name, &self.resolver)?,
        };

        let arr = match &*found {
            PDFObject::Array(_) => Arc::clone(&found),
            PDFObject::Dict(dict) => {
                let d = dict
                    .get("D")
                    .map(|d| self.resolver.resolve_or_null(d))
                    .unwrap_or_else(|| Arc::new(PDFObject::Null));
                if d.as_array().is_err() {
                    tracing::error!("Bad named destination value");
                    return None;
                }
                d
            }
            _ => {
                tracing::error!("Bad named destination value");
                return None;
            }
        };
        let arr = arr.as_array().ok()?;

        match LinkDest::from_array(arr, &self.resolver) {
            Ok(dest) => Some(dest),
            Err(e) => {
                tracing::warn!("discarding named destination: {e}");
                None
            }
        }
    }

    /// 1-based page number a destination lands on, or 0 if its page is not
    /// part of this document.
    pub fn dest_page_number(&self, dest: &LinkDest) -> usize {
        match dest.target {
            DestTarget::Ref(r) => self.find_page(r.objid, r.genno),
            DestTarget::Number(n) if n <= self.num_pages() => n,
            DestTarget::Number(_) => 0,
        }
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    pub const fn page_mode(&self) -> PageMode {
        self.page_mode
    }

    /// Text of the XMP metadata stream, if the catalog has one.
    pub fn metadata_xml(&self) -> Option<String> {
        let metadata = self.resolver.resolve_or_null(&self.metadata);
        let stream = metadata.as_stream().ok()?;
        let subtype = stream
            .get("Subtype")
            .map(|s| self.resolver.resolve_or_null(s))
            .unwrap_or_else(|| Arc::new(PDFObject::Null));
        if subtype.as_name().ok() != Some("XML") {
            tracing::warn!(
                "Unknown Metadata type: '{}'",
                subtype.as_name().unwrap_or("???")
            );
        }
        match self.resolver.stream_data(stream) {
            Ok(data) => Some(String::from_utf8_lossy(&data).into_owned()),
            Err(e) => {
                tracing::warn!("failed to read metadata stream: {e}");
                None
            }
        }
    }

    pub fn outline(&self) -> Option<&PDFObject> {
        non_null(&self.outline)
    }

    pub fn struct_tree_root(&self) -> Option<&PDFObject> {
        non_null(&self.struct_tree_root)
    }

    pub fn acro_form(&self) -> Option<&PDFObject> {
        non_null(&self.acro_form)
    }

    pub fn metadata(&self) -> Option<&PDFObject> {
        non_null(&self.metadata)
    }

    /// The `/Dests` dictionary, resolved.
    pub fn dests(&self) -> Option<&PDFObject> {
        non_null(&self.dests)
    }

    pub const fn name_tree(&self) -> &NameTree {
        &self.name_tree
    }

    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub const fn options(&self) -> &CatalogOptions {
        &self.options
    }

    pub const fn resolver(&self) -> &R {
        &self.resolver
    }
}

fn non_null(obj: &PDFObject) -> Option<&PDFObject> {
    if obj.is_null() { None } else { Some(obj) }
}

/// Depth-first, left-to-right flattening of the page tree.
struct PageTreeBuilder<'a, R> {
    resolver: &'a R,
    options: &'a CatalogOptions,
    diagnostics: &'a mut Diagnostics,
    pages: Vec<Page>,
    /// References of the Pages nodes between the root and the current node.
    path: FxHashSet<PDFObjRef>,
    /// Kid entries visited so far, of any kind.
    visits: usize,
    /// Set once a limit is hit; the rest of the tree is not visited.
    truncated: bool,
}

impl<'a, R: Resolver> PageTreeBuilder<'a, R> {
    fn new(
        resolver: &'a R,
        options: &'a CatalogOptions,
        diagnostics: &'a mut Diagnostics,
        capacity: usize,
    ) -> Self {
        Self {
            resolver,
            options,
            diagnostics,
            pages: Vec::with_capacity(capacity),
            path: FxHashSet::default(),
            visits: 0,
            truncated: false,
        }
    }

    fn run(
        &mut self,
        root: &HashMap<String, PDFObject>,
        root_ref: Option<PDFObjRef>,
    ) -> Result<usize> {
        if let Some(r) = root_ref {
            self.path.insert(r);
        }
        self.flatten(root, None, 0, 0)
    }

    /// Report a page tree error. In strict mode it is returned so the whole
    /// build unwinds; otherwise the caller skips the offending node.
    fn structural(&mut self, err: PdfError) -> Result<()> {
        let kind = match &err {
            PdfError::CyclicPageTree(_) => DiagnosticKind::CyclicPageTree,
            PdfError::PageTreeTooDeep(_) => DiagnosticKind::PageTreeTooDeep,
            PdfError::InvalidPage { .. } => DiagnosticKind::InvalidPage,
            PdfError::TooManyPages(_) => DiagnosticKind::TooManyPages,
            _ => DiagnosticKind::StructuralType,
        };
        self.diagnostics.error(kind, err.to_string());
        if self.options.strict_page_tree {
            Err(err)
        } else {
            Ok(())
        }
    }

    fn too_many_pages(&mut self) -> Result<()> {
        self.truncated = true;
        self.structural(PdfError::TooManyPages(self.options.max_pages))
    }

    fn push(&mut self, page: Page) {
        if self.pages.len() == self.pages.capacity() {
            self.pages.reserve_exact(self.options.page_chunk.max(1));
        }
        self.pages.push(page);
    }

    fn flatten(
        &mut self,
        node: &HashMap<String, PDFObject>,
        inherited: Option<Arc<PageAttrs>>,
        start: usize,
        depth: usize,
    ) -> Result<usize> {
        if depth > self.options.max_depth {
            self.structural(PdfError::PageTreeTooDeep(self.options.max_depth))?;
            return Ok(start);
        }

        let attrs = PageAttrs::new(inherited, node);
        let kids = node
            .get("Kids")
            .map(|k| self.resolver.resolve_or_null(k))
            .unwrap_or_else(|| Arc::new(PDFObject::Null));
        let Ok(kids) = kids.as_array() else {
            self.structural(PdfError::StructuralType {
                what: format!("Kids object (page {})", start + 1),
                expected: "array",
                got: kids.type_name(),
            })?;
            return Ok(start);
        };

        let mut next = start;
        for kid_raw in kids {
            if self.truncated {
                break;
            }
            self.visits += 1;
            if self.visits > self.options.max_pages.saturating_mul(4) {
                self.too_many_pages()?;
                break;
            }
            let kid_ref = match kid_raw {
                PDFObject::Ref(r) => Some(*r),
                _ => None,
            };
            let kid = self.resolver.resolve_or_null(kid_raw);
            let PDFObject::Dict(kid_dict) = &*kid else {
                self.diagnostics.warn(
                    DiagnosticKind::StructuralType,
                    format!(
                        "Kid object (page {}) is wrong type ({})",
                        next + 1,
                        kid.type_name()
                    ),
                );
                continue;
            };

            if kid.is_dict_of_type("Page") {
                if self.pages.len() >= self.options.max_pages {
                    self.too_many_pages()?;
                    break;
                }
                let leaf_attrs = PageAttrs::new(Some(Arc::clone(&attrs)), kid_dict);
                match Page::new(next + 1, kid_ref, kid_dict, &leaf_attrs, self.resolver) {
                    Ok(page) => {
                        self.push(page);
                        next += 1;
                    }
                    Err(e) => self.structural(e)?,
                }
                continue;
            }

            // Any other dict is treated as an intermediate node, typed or not:
            // files with a missing /Type on Pages nodes are common.
            if let Some(r) = kid_ref
                && !self.path.insert(r)
            {
                self.structural(PdfError::CyclicPageTree(r))?;
                continue;
            }
            let result = self.flatten(kid_dict, Some(Arc::clone(&attrs)), next, depth + 1);
            if let Some(r) = kid_ref {
                self.path.remove(&r);
            }
            next = result?;
        }

        Ok(next)
    }
}
