//! Object graph builders shared by the integration tests.

#![allow(dead_code)]

use folio_core::{ObjectStore, PDFObjRef, PDFObject, PDFStream};
use std::collections::HashMap;

pub fn dict(entries: Vec<(&str, PDFObject)>) -> PDFObject {
    PDFObject::Dict(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

pub fn name(s: &str) -> PDFObject {
    PDFObject::Name(s.to_string())
}

pub fn string(s: &str) -> PDFObject {
    PDFObject::String(s.as_bytes().to_vec())
}

pub fn rect(v: [f64; 4]) -> PDFObject {
    PDFObject::Array(v.iter().map(|n| PDFObject::Real(*n)).collect())
}

pub fn stream(entries: Vec<(&str, PDFObject)>, data: &[u8]) -> PDFObject {
    let attrs: HashMap<String, PDFObject> = entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    PDFObject::Stream(Box::new(PDFStream::new(attrs, data.to_vec())))
}

/// Shape of a page tree to build.
pub enum Node {
    /// A `/Type /Page` leaf carrying extra entries.
    Leaf(Vec<(&'static str, PDFObject)>),
    /// A `/Type /Pages` node carrying extra entries.
    Pages(Vec<(&'static str, PDFObject)>, Vec<Node>),
}

impl Node {
    pub fn leaf() -> Self {
        Node::Leaf(Vec::new())
    }

    pub fn pages(kids: Vec<Node>) -> Self {
        Node::Pages(Vec::new(), kids)
    }

    fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Pages(_, kids) => kids.iter().map(Node::leaf_count).sum(),
        }
    }
}

/// Store `node` (and everything below it) as indirect objects. Leaf
/// references are appended to `leaves` in reading order, and every leaf gets
/// a `/Seq` entry holding its position.
pub fn add_node(store: &mut ObjectStore, node: &Node, leaves: &mut Vec<PDFObjRef>) -> PDFObjRef {
    match node {
        Node::Leaf(extra) => {
            let mut entries = vec![
                ("Type", name("Page")),
                ("Seq", PDFObject::Int(leaves.len() as i64)),
            ];
            entries.extend(extra.iter().cloned());
            let r = store.add(dict(entries));
            leaves.push(r);
            r
        }
        Node::Pages(extra, kids) => {
            let kid_refs: Vec<PDFObject> = kids
                .iter()
                .map(|kid| PDFObject::Ref(add_node(store, kid, leaves)))
                .collect();
            let mut entries = vec![
                ("Type", name("Pages")),
                ("Kids", PDFObject::Array(kid_refs)),
                ("Count", PDFObject::Int(node.leaf_count() as i64)),
            ];
            entries.extend(extra.iter().cloned());
            store.add(dict(entries))
        }
    }
}

/// A document whose catalog points at `tree`, plus extra catalog entries.
/// Returns the store and the leaf references in reading order.
pub fn document(tree: &Node, catalog_extra: Vec<(&str, PDFObject)>) -> (ObjectStore, Vec<PDFObjRef>) {
    let mut store = ObjectStore::new();
    let mut leaves = Vec::new();
    let pages = add_node(&mut store, tree, &mut leaves);
    let mut entries = vec![("Type", name("Catalog")), ("Pages", PDFObject::Ref(pages))];
    entries.extend(catalog_extra);
    let cat = store.add(dict(entries));
    store.set_root(PDFObject::Ref(cat));
    (store, leaves)
}

/// Catalog with a hand-built top-level Pages dictionary.
pub fn document_with_pages(store: &mut ObjectStore, pages: PDFObject) {
    let pages_ref = store.add(pages);
    let cat = store.add(dict(vec![
        ("Type", name("Catalog")),
        ("Pages", PDFObject::Ref(pages_ref)),
    ]));
    store.set_root(PDFObject::Ref(cat));
}

/// `/Seq` values of the pages, in page order.
pub fn sequence(catalog: &folio_core::Catalog<&ObjectStore>) -> Vec<i64> {
    catalog
        .pages()
        .map(|p| p.attrs.get("Seq").and_then(|s| s.as_int().ok()).unwrap_or(-1))
        .collect()
}
