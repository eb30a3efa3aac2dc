//! Name tree index.
//!
//! The hierarchical tree is flattened once, in pre-order, into a single
//! sequence of `(name, value)` entries. Lookups binary-search that sequence
//! and so rely on the document having stored its names in ascending order,
//! as the format requires. Out-of-order trees are not re-sorted: lookups on
//! them can miss entries that are present.

use super::resolver::Resolver;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::objects::PDFObject;
use rustc_hash::FxHashSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct NameTreeEntry {
    pub name: Vec<u8>,
    /// Value as stored in the tree; references are resolved on lookup.
    pub value: PDFObject,
}

#[derive(Debug, Clone, Default)]
pub struct NameTree {
    entries: Vec<NameTreeEntry>,
}

impl NameTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten the tree rooted at `root` (a dict or a reference to one).
    pub fn build<R: Resolver + ?Sized>(
        root: &PDFObject,
        resolver: &R,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut tree = Self::new();
        let mut visited = FxHashSet::default();
        tree.parse(root, resolver, diagnostics, &mut visited);
        tree
    }

    /// Build directly from entries that are already in document order.
    pub fn from_entries(entries: impl IntoIterator<Item = (Vec<u8>, PDFObject)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, value)| NameTreeEntry { name, value })
                .collect(),
        }
    }

    fn parse<R: Resolver + ?Sized>(
        &mut self,
        node: &PDFObject,
        resolver: &R,
        diagnostics: &mut Diagnostics,
        visited: &mut FxHashSet<crate::model::objects::PDFObjRef>,
    ) {
        if let PDFObject::Ref(r) = node
            && !visited.insert(*r)
        {
            diagnostics.warn(
                DiagnosticKind::NameTree,
                format!("name tree node {r} visited twice, skipping"),
            );
            return;
        }
        let resolved = resolver.resolve_or_null(node);
        let Ok(dict) = resolved.as_dict() else {
            return;
        };

        // leaf node
        if let Some(names) = dict.get("Names") {
            let names = resolver.resolve_or_null(names);
            if let Ok(arr) = names.as_array() {
                self.add_pairs(arr, resolver, diagnostics);
            }
        }

        // root or intermediate node
        if let Some(kids) = dict.get("Kids") {
            let kids = resolver.resolve_or_null(kids);
            if let Ok(kids) = kids.as_array() {
                for kid in kids {
                    self.parse(kid, resolver, diagnostics, visited);
                }
            }
        }
    }

    fn add_pairs<R: Resolver + ?Sized>(
        &mut self,
        arr: &[PDFObject],
        resolver: &R,
        diagnostics: &mut Diagnostics,
    ) {
        for pair in arr.chunks(2) {
            let [key, value] = pair else {
                diagnostics.warn(
                    DiagnosticKind::NameTree,
                    "invalid name tree: odd number of elements in Names array",
                );
                continue;
            };
            let key = resolver.resolve_or_null(key);
            match key.as_string() {
                Ok(name) => self.entries.push(NameTreeEntry {
                    name: name.to_vec(),
                    value: value.clone(),
                }),
                Err(_) => diagnostics.warn(
                    DiagnosticKind::NameTree,
                    format!("invalid name tree: key is {}", key.type_name()),
                ),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameTreeEntry> {
        self.entries.iter()
    }

    /// Raw stored value for `name`, without resolving it.
    pub fn get_raw(&self, name: &[u8]) -> Option<&PDFObject> {
        self.entries
            .binary_search_by(|entry| entry.name.as_slice().cmp(name))
            .ok()
            .map(|idx| &self.entries[idx].value)
    }

    /// Look `name` up and resolve its value.
    pub fn lookup<R: Resolver + ?Sized>(&self, name: &[u8], resolver: &R) -> Option<Arc<PDFObject>> {
        match self.get_raw(name) {
            Some(value) => Some(resolver.resolve_or_null(value)),
            None => {
                tracing::error!("failed to look up {}", String::from_utf8_lossy(name));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::resolver::ObjectStore;
    use std::collections::HashMap;

    fn s(v: &str) -> PDFObject {
        PDFObject::String(v.as_bytes().to_vec())
    }

    fn node(entries: Vec<(&str, PDFObject)>) -> PDFObject {
        PDFObject::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn test_sorted_lookup() {
        let store = ObjectStore::new();
        let tree = NameTree::from_entries([
            (b"alpha".to_vec(), PDFObject::Int(1)),
            (b"beta".to_vec(), PDFObject::Int(2)),
            (b"gamma".to_vec(), PDFObject::Int(3)),
        ]);
        assert_eq!(tree.lookup(b"beta", &store).as_deref(), Some(&PDFObject::Int(2)));
        assert!(tree.lookup(b"missing", &store).is_none());
    }

    #[test]
    fn test_build_flattens_kids_in_preorder() {
        let mut store = ObjectStore::new();
        let leaf1 = store.add(node(vec![(
            "Names",
            PDFObject::Array(vec![s("a"), PDFObject::Int(1), s("b"), PDFObject::Int(2)]),
        )]));
        let leaf2 = store.add(node(vec![(
            "Names",
            PDFObject::Array(vec![s("c"), PDFObject::Int(3)]),
        )]));
        let root = node(vec![(
            "Kids",
            PDFObject::Array(vec![PDFObject::Ref(leaf1), PDFObject::Ref(leaf2)]),
        )]);

        let mut diags = Diagnostics::new();
        let tree = NameTree::build(&root, &store, &mut diags);
        let names: Vec<&[u8]> = tree.iter().map(|e| e.name.as_slice()).collect();
        assert_eq!(names, vec![&b"a"[..], b"b", b"c"]);
        assert!(diags.is_empty());
        assert_eq!(tree.lookup(b"c", &store).as_deref(), Some(&PDFObject::Int(3)));
    }

    #[test]
    fn test_values_resolve_lazily() {
        let mut store = ObjectStore::new();
        let target = store.add(PDFObject::Name("resolved".into()));
        let tree = NameTree::from_entries([(b"x".to_vec(), PDFObject::Ref(target))]);
        assert_eq!(tree.get_raw(b"x"), Some(&PDFObject::Ref(target)));
        assert_eq!(
            tree.lookup(b"x", &store).as_deref(),
            Some(&PDFObject::Name("resolved".into()))
        );
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let store = ObjectStore::new();
        let root = node(vec![(
            "Names",
            PDFObject::Array(vec![
                PDFObject::Int(9),
                PDFObject::Int(1),
                s("ok"),
                PDFObject::Int(2),
                s("dangling"),
            ]),
        )]);
        let mut diags = Diagnostics::new();
        let tree = NameTree::build(&root, &store, &mut diags);
        assert_eq!(tree.len(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_cyclic_kids_terminate() {
        let mut store = ObjectStore::new();
        let me = store.reserve();
        store.insert(
            me,
            node(vec![
                ("Names", PDFObject::Array(vec![s("k"), PDFObject::Null])),
                ("Kids", PDFObject::Array(vec![PDFObject::Ref(me)])),
            ]),
        );
        let mut diags = Diagnostics::new();
        let tree = NameTree::build(&PDFObject::Ref(me), &store, &mut diags);
        assert_eq!(tree.len(), 1);
        assert!(diags.has(DiagnosticKind::NameTree));
    }

    #[test]
    fn test_unsorted_input_is_not_resorted() {
        let tree = NameTree::from_entries([
            (b"zulu".to_vec(), PDFObject::Int(1)),
            (b"alpha".to_vec(), PDFObject::Int(2)),
        ]);
        let names: Vec<&[u8]> = tree.iter().map(|e| e.name.as_slice()).collect();
        assert_eq!(names, vec![&b"zulu"[..], b"alpha"]);
    }
}
