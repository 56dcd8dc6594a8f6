//! Field data model

use serde::{Deserialize, Serialize};

/// The tool a field was created from, which decides its visual mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Signature,
    Date,
    Image,
    Radio,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Signature => write!(f, "signature"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Image => write!(f, "image"),
            FieldKind::Radio => write!(f, "radio"),
        }
    }
}

/// A user-placed annotation descriptor.
///
/// Position and size are percentages of the page's rendered width/height,
/// origin top-left. `page` is 1-based. `content` carries base64 image data
/// (optionally a `data:` URI) for signature/image fields, or literal text
/// for text fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Field {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the field lies entirely within its page.
    pub fn in_bounds(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= 100.0 && self.bottom() <= 100.0
    }
}

/// Check whether two fields overlap.
///
/// Fields on different pages never overlap; touching edges do not count.
pub fn fields_overlap(a: &Field, b: &Field) -> bool {
    if a.page != b.page {
        return false;
    }
    !(a.right() <= b.x || b.right() <= a.x || a.bottom() <= b.y || b.bottom() <= a.y)
}

/// Return every overlapping pair in the list, as index pairs.
pub fn find_overlaps(fields: &[Field]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..fields.len() {
        for j in (i + 1)..fields.len() {
            if fields_overlap(&fields[i], &fields[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
