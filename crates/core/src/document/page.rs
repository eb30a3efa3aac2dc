//! PDF Page - one leaf of the page tree.

use super::attrs::{PageAttrs, clip_box, parse_box};
use super::resolver::Resolver;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObjRef, PDFObject};
use std::collections::HashMap;

/// A PDF page object.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number
    pub num: usize,
    /// Reference the page was reached through, if its kid entry was indirect
    reference: Option<PDFObjRef>,
    /// Own dictionary with inherited attributes filled in
    pub attrs: HashMap<String, PDFObject>,
    /// Media box (physical page size)
    pub mediabox: [f64; 4],
    /// Crop box, clipped to the media box
    pub cropbox: [f64; 4],
    /// Bleed box (printing bleed area)
    pub bleedbox: [f64; 4],
    /// Trim box (finished page size after trimming)
    pub trimbox: [f64; 4],
    /// Art box (meaningful content area)
    pub artbox: [f64; 4],
    /// Page rotation in degrees
    pub rotate: i64,
    /// Page resources
    pub resources: Option<HashMap<String, PDFObject>>,
    /// Page annotations, unresolved
    pub annots: Option<PDFObject>,
    /// Page content stream(s), unresolved
    pub contents: Option<PDFObject>,
}

impl Page {
    /// Build page `num` from its dictionary and the effective attribute
    /// overlay at its position in the tree.
    pub fn new<R: Resolver + ?Sized>(
        num: usize,
        reference: Option<PDFObjRef>,
        dict: &HashMap<String, PDFObject>,
        inherited: &PageAttrs,
        resolver: &R,
    ) -> Result<Self> {
        let annots = Self::checked_entry(num, dict, "Annots", |obj| {
            matches!(obj, PDFObject::Ref(_) | PDFObject::Array(_))
        })?;
        let contents = Self::checked_entry(num, dict, "Contents", |obj| {
            matches!(
                obj,
                PDFObject::Ref(_) | PDFObject::Array(_) | PDFObject::Stream(_)
            )
        })?;

        let mediabox = inherited.media_box(resolver);
        let cropbox = inherited.crop_box(resolver);
        let own_box = |key: &str| {
            dict.get(key)
                .and_then(|obj| parse_box(obj, resolver))
                .map(|b| clip_box(b, mediabox))
                .unwrap_or(cropbox)
        };
        let bleedbox = own_box("BleedBox");
        let trimbox = own_box("TrimBox");
        let artbox = own_box("ArtBox");

        let mut attrs = dict.clone();
        inherited.apply_to(&mut attrs);

        Ok(Self {
            num,
            reference,
            attrs,
            mediabox,
            cropbox,
            bleedbox,
            trimbox,
            artbox,
            rotate: inherited.rotate(resolver),
            resources: inherited.resources(resolver),
            annots,
            contents,
        })
    }

    /// Raw entry `key`, which must be absent, null, or accepted by `valid`.
    fn checked_entry(
        num: usize,
        dict: &HashMap<String, PDFObject>,
        key: &str,
        valid: impl Fn(&PDFObject) -> bool,
    ) -> Result<Option<PDFObject>> {
        match dict.get(key) {
            None | Some(PDFObject::Null) => Ok(None),
            Some(obj) if valid(obj) => Ok(Some(obj.clone())),
            Some(obj) => Err(PdfError::InvalidPage {
                page: num,
                reason: format!("{key} object is wrong type ({})", obj.type_name()),
            }),
        }
    }

    pub const fn reference(&self) -> Option<PDFObjRef> {
        self.reference
    }

    pub fn media_width(&self) -> f64 {
        self.mediabox[2] - self.mediabox[0]
    }

    pub fn media_height(&self) -> f64 {
        self.mediabox[3] - self.mediabox[1]
    }

    /// Crop box size as displayed, i.e. with width and height swapped for
    /// quarter turns.
    pub fn display_size(&self) -> (f64, f64) {
        let w = self.cropbox[2] - self.cropbox[0];
        let h = self.cropbox[3] - self.cropbox[1];
        if self.rotate % 180 == 90 { (h, w) } else { (w, h) }
    }
}
