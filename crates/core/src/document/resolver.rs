//! Object resolution seam.
//!
//! The catalog never parses bytes itself. It asks a [`Resolver`] for the
//! root catalog and for the targets of indirect references. [`ObjectStore`]
//! is an in-memory arena of already-decoded objects; [`CachedResolver`]
//! memoizes any other resolver behind a bounded LRU keyed by reference.

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObjRef, PDFObject, PDFStream};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex};

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Typed access to a document's object graph.
pub trait Resolver {
    /// Fetch the object stored under `objref`.
    fn fetch(&self, objref: &PDFObjRef) -> Result<Arc<PDFObject>>;

    /// The document catalog (trailer `/Root`), possibly still a reference.
    fn root(&self) -> Result<Arc<PDFObject>>;

    /// Decoded bytes of a stream. Filters are the object layer's concern.
    fn stream_data(&self, stream: &PDFStream) -> Result<Vec<u8>> {
        Ok(stream.get_data().to_vec())
    }

    /// Follow references until a direct object is reached.
    fn resolve(&self, obj: &PDFObject) -> Result<Arc<PDFObject>> {
        let mut seen = FxHashSet::default();
        let mut current = match obj {
            PDFObject::Ref(r) => {
                seen.insert(*r);
                self.fetch(r)?
            }
            _ => return Ok(Arc::new(obj.clone())),
        };
        loop {
            match &*current {
                PDFObject::Ref(r) => {
                    if !seen.insert(*r) {
                        return Err(PdfError::CircularReference(*r));
                    }
                    current = self.fetch(r)?;
                }
                _ => return Ok(current),
            }
        }
    }

    /// Like [`Resolver::resolve`], but a dangling or looping reference reads
    /// as `null`, which is how PDF readers treat missing objects.
    fn resolve_or_null(&self, obj: &PDFObject) -> Arc<PDFObject> {
        match self.resolve(obj) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("treating unresolvable object as null: {e}");
                Arc::new(PDFObject::Null)
            }
        }
    }
}

impl<T: Resolver + ?Sized> Resolver for &T {
    fn fetch(&self, objref: &PDFObjRef) -> Result<Arc<PDFObject>> {
        (**self).fetch(objref)
    }

    fn root(&self) -> Result<Arc<PDFObject>> {
        (**self).root()
    }

    fn stream_data(&self, stream: &PDFStream) -> Result<Vec<u8>> {
        (**self).stream_data(stream)
    }
}

impl<T: Resolver + ?Sized> Resolver for Arc<T> {
    fn fetch(&self, objref: &PDFObjRef) -> Result<Arc<PDFObject>> {
        (**self).fetch(objref)
    }

    fn root(&self) -> Result<Arc<PDFObject>> {
        (**self).root()
    }

    fn stream_data(&self, stream: &PDFStream) -> Result<Vec<u8>> {
        (**self).stream_data(stream)
    }
}

/// In-memory arena of decoded objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: IndexMap<PDFObjRef, Arc<PDFObject>>,
    root: Option<PDFObject>,
    next_objid: u32,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self {
            objects: IndexMap::new(),
            root: None,
            next_objid: 1,
        }
    }

    /// Store `obj` under an explicit reference, replacing any previous value.
    pub fn insert(&mut self, objref: PDFObjRef, obj: PDFObject) {
        self.next_objid = self.next_objid.max(objref.objid.saturating_add(1));
        self.objects.insert(objref, Arc::new(obj));
    }

    /// Store `obj` under the next free object number (generation 0).
    pub fn add(&mut self, obj: PDFObject) -> PDFObjRef {
        let objref = PDFObjRef::new(self.next_objid.max(1), 0);
        self.insert(objref, obj);
        objref
    }

    /// Reserve a reference now and fill it later, for graphs with back edges.
    pub fn reserve(&mut self) -> PDFObjRef {
        let objref = PDFObjRef::new(self.next_objid.max(1), 0);
        self.next_objid = objref.objid.saturating_add(1);
        objref
    }

    pub fn set_root(&mut self, root: PDFObject) {
        self.root = Some(root);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn refs(&self) -> impl Iterator<Item = &PDFObjRef> {
        self.objects.keys()
    }
}

impl Resolver for ObjectStore {
    fn fetch(&self, objref: &PDFObjRef) -> Result<Arc<PDFObject>> {
        self.objects
            .get(objref)
            .cloned()
            .ok_or(PdfError::ObjectNotFound(*objref))
    }

    fn root(&self) -> Result<Arc<PDFObject>> {
        match &self.root {
            Some(root) => Ok(Arc::new(root.clone())),
            None => Err(PdfError::SyntaxError("no root catalog set".into())),
        }
    }
}

struct ObjectCache {
    capacity: usize,
    map: IndexMap<PDFObjRef, Arc<PDFObject>>,
}

impl ObjectCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: IndexMap::new(),
        }
    }

    fn get(&mut self, objref: &PDFObjRef) -> Option<Arc<PDFObject>> {
        if self.capacity == 0 {
            return None;
        }
        let index = self.map.get_index_of(objref)?;
        let value = Arc::clone(self.map.get_index(index)?.1);
        if index + 1 != self.map.len() {
            self.map.move_index(index, self.map.len() - 1);
        }
        Some(value)
    }

    fn insert(&mut self, objref: PDFObjRef, value: Arc<PDFObject>) {
        if self.capacity == 0 {
            return;
        }
        if self.map.contains_key(&objref) {
            self.map.shift_remove(&objref);
        }
        self.map.insert(objref, value);
        if self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
    }
}

/// Memoizes fetches of an inner resolver so shared subgraphs are read once.
pub struct CachedResolver<R> {
    inner: R,
    cache: Mutex<ObjectCache>,
}

impl<R: Resolver> CachedResolver<R> {
    pub fn new(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(ObjectCache::new(capacity)),
        }
    }

    pub fn with_default_capacity(inner: R) -> Self {
        Self::new(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: Resolver> Resolver for CachedResolver<R> {
    fn fetch(&self, objref: &PDFObjRef) -> Result<Arc<PDFObject>> {
        if let Ok(mut cache) = self.cache.lock()
            && let Some(hit) = cache.get(objref)
        {
            return Ok(hit);
        }
        let obj = self.inner.fetch(objref)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(*objref, Arc::clone(&obj));
        }
        Ok(obj)
    }

    fn root(&self) -> Result<Arc<PDFObject>> {
        self.inner.root()
    }

    fn stream_data(&self, stream: &PDFStream) -> Result<Vec<u8>> {
        self.inner.stream_data(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        store: ObjectStore,
        fetches: AtomicUsize,
    }

    impl Resolver for CountingStore {
        fn fetch(&self, objref: &PDFObjRef) -> Result<Arc<PDFObject>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.store.fetch(objref)
        }

        fn root(&self) -> Result<Arc<PDFObject>> {
            self.store.root()
        }
    }

    #[test]
    fn test_resolve_follows_reference_chain() {
        let mut store = ObjectStore::new();
        let target = store.add(PDFObject::Int(7));
        let hop = store.add(PDFObject::Ref(target));
        let resolved = store.resolve(&PDFObject::Ref(hop)).unwrap();
        assert_eq!(*resolved, PDFObject::Int(7));
    }

    #[test]
    fn test_resolve_detects_reference_loop() {
        let mut store = ObjectStore::new();
        let a = store.reserve();
        let b = store.add(PDFObject::Ref(a));
        store.insert(a, PDFObject::Ref(b));
        let err = store.resolve(&PDFObject::Ref(a)).unwrap_err();
        assert!(matches!(err, PdfError::CircularReference(_)));
        assert!(store.resolve_or_null(&PDFObject::Ref(a)).is_null());
    }

    #[test]
    fn test_missing_object_reads_as_null() {
        let store = ObjectStore::new();
        let missing = PDFObject::Ref(PDFObjRef::new(99, 0));
        assert!(store.resolve(&missing).is_err());
        assert!(store.resolve_or_null(&missing).is_null());
    }

    #[test]
    fn test_add_after_insert_does_not_collide() {
        let mut store = ObjectStore::new();
        store.insert(PDFObjRef::new(10, 0), PDFObject::Null);
        let next = store.add(PDFObject::Bool(true));
        assert_eq!(next, PDFObjRef::new(11, 0));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_cached_resolver_fetches_once() {
        let mut store = ObjectStore::new();
        let obj = store.add(PDFObject::Int(1));
        let counting = CountingStore {
            store,
            fetches: AtomicUsize::new(0),
        };
        let cached = CachedResolver::new(&counting, 8);
        for _ in 0..5 {
            assert_eq!(*cached.fetch(&obj).unwrap(), PDFObject::Int(1));
        }
        assert_eq!(counting.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_object_cache_lru_evicts_oldest() {
        let mut cache = ObjectCache::new(2);
        let (a, b, c) = (
            PDFObjRef::new(1, 0),
            PDFObjRef::new(2, 0),
            PDFObjRef::new(3, 0),
        );
        cache.insert(a, Arc::new(PDFObject::Int(1)));
        cache.insert(b, Arc::new(PDFObject::Int(2)));
        assert!(cache.get(&a).is_some());
        cache.insert(c, Arc::new(PDFObject::Int(3)));
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_zero_capacity_cache_passes_through() {
        let mut store = ObjectStore::new();
        let obj = store.add(PDFObject::Int(1));
        let counting = CountingStore {
            store,
            fetches: AtomicUsize::new(0),
        };
        let cached = CachedResolver::new(&counting, 0);
        cached.fetch(&obj).unwrap();
        cached.fetch(&obj).unwrap();
        assert_eq!(counting.fetches.load(Ordering::SeqCst), 2);
    }
}
