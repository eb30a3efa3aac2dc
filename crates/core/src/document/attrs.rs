//! Inheritable page attributes.
//!
//! Each page tree node gets a [`PageAttrs`] overlay holding only its own
//! MediaBox, CropBox, Resources and Rotate entries plus a shared pointer to
//! its parent's overlay. Effective values are looked up through the chain on
//! demand, so creating a node never copies its ancestors.

use super::resolver::Resolver;
use crate::model::objects::PDFObject;
use std::collections::HashMap;
use std::sync::Arc;

/// US Letter, the box used when no node in the chain sets a MediaBox.
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Keys a page inherits from its ancestors.
pub const INHERITABLE_KEYS: [&str; 4] = ["MediaBox", "CropBox", "Resources", "Rotate"];

#[derive(Debug, Default)]
pub struct PageAttrs {
    parent: Option<Arc<PageAttrs>>,
    resources: Option<PDFObject>,
    mediabox: Option<PDFObject>,
    cropbox: Option<PDFObject>,
    rotate: Option<PDFObject>,
}

impl PageAttrs {
    /// Overlay `dict`'s inheritable entries on `parent`.
    pub fn new(parent: Option<Arc<PageAttrs>>, dict: &HashMap<String, PDFObject>) -> Arc<Self> {
        Arc::new(Self {
            parent,
            resources: dict.get("Resources").cloned(),
            mediabox: dict.get("MediaBox").cloned(),
            cropbox: dict.get("CropBox").cloned(),
            rotate: dict.get("Rotate").cloned(),
        })
    }

    pub fn parent(&self) -> Option<&Arc<PageAttrs>> {
        self.parent.as_ref()
    }

    fn own(&self, key: &str) -> Option<&PDFObject> {
        match key {
            "Resources" => self.resources.as_ref(),
            "MediaBox" => self.mediabox.as_ref(),
            "CropBox" => self.cropbox.as_ref(),
            "Rotate" => self.rotate.as_ref(),
            _ => None,
        }
    }

    fn chain(&self) -> impl Iterator<Item = &PageAttrs> {
        std::iter::successors(Some(self), |node| node.parent.as_deref())
    }

    /// Nearest raw value for an inheritable key, unresolved.
    pub fn lookup(&self, key: &str) -> Option<&PDFObject> {
        self.chain().find_map(|node| node.own(key))
    }

    /// Nearest value for `key` that `parse` accepts. Malformed entries are
    /// skipped so an ancestor's value still applies.
    fn find_parsed<T>(&self, key: &str, mut parse: impl FnMut(&PDFObject) -> Option<T>) -> Option<T> {
        self.chain()
            .filter_map(|node| node.own(key))
            .find_map(|obj| parse(obj))
    }

    pub fn media_box<R: Resolver + ?Sized>(&self, resolver: &R) -> [f64; 4] {
        self.find_parsed("MediaBox", |obj| parse_box(obj, resolver))
            .unwrap_or(DEFAULT_MEDIA_BOX)
    }

    /// CropBox clipped to the MediaBox; the MediaBox itself when unset.
    pub fn crop_box<R: Resolver + ?Sized>(&self, resolver: &R) -> [f64; 4] {
        let media = self.media_box(resolver);
        match self.find_parsed("CropBox", |obj| parse_box(obj, resolver)) {
            Some(crop) => clip_box(crop, media),
            None => media,
        }
    }

    /// Rotation in degrees, normalized into `0..360`.
    pub fn rotate<R: Resolver + ?Sized>(&self, resolver: &R) -> i64 {
        self.find_parsed("Rotate", |obj| {
            let resolved = resolver.resolve_or_null(obj);
            match &*resolved {
                PDFObject::Int(n) => Some(*n),
                PDFObject::Real(n) if n.is_finite() => Some(*n as i64),
                _ => None,
            }
        })
        .map(|r| r.rem_euclid(360))
        .unwrap_or(0)
    }

    pub fn resources<R: Resolver + ?Sized>(&self, resolver: &R) -> Option<HashMap<String, PDFObject>> {
        self.find_parsed("Resources", |obj| {
            resolver.resolve_or_null(obj).as_dict().ok().cloned()
        })
    }

    /// Fill inheritable keys missing from `dest` with their nearest values.
    pub fn apply_to(&self, dest: &mut HashMap<String, PDFObject>) {
        for key in INHERITABLE_KEYS {
            if !dest.contains_key(key)
                && let Some(val) = self.lookup(key)
            {
                dest.insert(key.to_string(), val.clone());
            }
        }
    }
}

/// Parse a 4-number rectangle, normalizing corner order.
pub fn parse_box<R: Resolver + ?Sized>(obj: &PDFObject, resolver: &R) -> Option<[f64; 4]> {
    let resolved = resolver.resolve_or_null(obj);
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut nums = [0.0; 4];
    for (slot, item) in nums.iter_mut().zip(arr) {
        *slot = resolver.resolve_or_null(item).as_num().ok()?;
    }
    let [x1, y1, x2, y2] = nums;
    Some([x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)])
}

pub(crate) fn clip_box(rect: [f64; 4], bounds: [f64; 4]) -> [f64; 4] {
    [
        rect[0].max(bounds[0]),
        rect[1].max(bounds[1]),
        rect[2].min(bounds[2]),
        rect[3].min(bounds[3]),
    ]
}
