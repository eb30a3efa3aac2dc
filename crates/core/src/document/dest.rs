//! Link destinations.
//!
//! A destination array is `[page /Kind params...]`. Only arrays that parse
//! completely become a [`LinkDest`]; anything else is rejected.

use super::resolver::Resolver;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObjRef, PDFObject};

/// Page a destination points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestTarget {
    /// Indirect reference to a page object
    Ref(PDFObjRef),
    /// 1-based page number (remote destinations store 0-based integers)
    Number(usize),
}

/// How the view is positioned on the target page. `None` coordinates mean
/// "leave unchanged".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DestKind {
    XYZ {
        left: Option<f64>,
        top: Option<f64>,
        zoom: Option<f64>,
    },
    Fit,
    FitH {
        top: Option<f64>,
    },
    FitV {
        left: f64,
    },
    FitR {
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    },
    FitB,
    FitBH {
        top: Option<f64>,
    },
    FitBV {
        left: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDest {
    pub target: DestTarget,
    pub kind: DestKind,
}

impl LinkDest {
    /// Parse a destination array. Elements may be indirect.
    pub fn from_array<R: Resolver + ?Sized>(arr: &[PDFObject], resolver: &R) -> Result<Self> {
        let target = match arr.first() {
            Some(PDFObject::Ref(r)) => DestTarget::Ref(*r),
            Some(PDFObject::Int(n)) if *n >= 0 => DestTarget::Number(*n as usize + 1),
            Some(other) => {
                return Err(invalid(format!(
                    "bad page in destination ({})",
                    other.type_name()
                )));
            }
            None => return Err(invalid("empty destination array")),
        };

        let kind_obj = arr
            .get(1)
            .map(|o| resolver.resolve_or_null(o))
            .ok_or_else(|| invalid("destination missing kind"))?;
        let kind_name = kind_obj
            .as_name()
            .map_err(|_| invalid(format!("bad destination kind ({})", kind_obj.type_name())))?;

        let num = |i: usize| -> Option<PDFObject> {
            arr.get(i).map(|o| (*resolver.resolve_or_null(o)).clone())
        };
        // Missing or null means "unchanged"; any other non-number is malformed.
        let optional = |i: usize, what: &str| -> Result<Option<f64>> {
            match num(i) {
                None | Some(PDFObject::Null) => Ok(None),
                Some(obj) => obj
                    .as_num()
                    .map(Some)
                    .map_err(|_| invalid(format!("bad {what} in {kind_name} destination"))),
            }
        };
        let required = |i: usize, what: &str| -> Result<f64> {
            num(i)
                .and_then(|obj| obj.as_num().ok())
                .ok_or_else(|| invalid(format!("bad {what} in {kind_name} destination")))
        };

        let kind = match kind_name {
            "XYZ" => DestKind::XYZ {
                left: optional(2, "left")?,
                top: optional(3, "top")?,
                zoom: optional(4, "zoom")?.filter(|z| *z != 0.0),
            },
            "Fit" => DestKind::Fit,
            "FitH" => DestKind::FitH {
                top: optional(2, "top")?,
            },
            "FitV" => DestKind::FitV {
                left: required(2, "left")?,
            },
            "FitR" => DestKind::FitR {
                left: required(2, "left")?,
                bottom: required(3, "bottom")?,
                right: required(4, "right")?,
                top: required(5, "top")?,
            },
            "FitB" => DestKind::FitB,
            "FitBH" => DestKind::FitBH {
                top: optional(2, "top")?,
            },
            "FitBV" => DestKind::FitBV {
                left: required(2, "left")?,
            },
            other => return Err(invalid(format!("unknown destination type {other}"))),
        };

        Ok(Self { target, kind })
    }

    /// Page number the destination addresses directly, if it is not a
    /// reference.
    pub const fn page_number(&self) -> Option<usize> {
        match self.target {
            DestTarget::Number(n) => Some(n),
            DestTarget::Ref(_) => None,
        }
    }

    pub const fn page_ref(&self) -> Option<PDFObjRef> {
        match self.target {
            DestTarget::Ref(r) => Some(r),
            DestTarget::Number(_) => None,
        }
    }
}

fn invalid(msg: impl Into<String>) -> PdfError {
    PdfError::InvalidDestination(msg.into())
}
