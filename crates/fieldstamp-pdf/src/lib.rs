//! PDF stamping
//!
//! Takes a PDF and a list of fields in normalized coordinates (percentages
//! of the page, origin top-left) and draws the corresponding mark for each
//! field in PDF point-space (origin bottom-left) on the correct page:
//! outlines for empty signature/image/text fields, translucent fills for
//! date and radio fields, embedded PNG/JPEG images for filled
//! signature/image fields. The modified document is re-serialized and both
//! byte streams are hashed for integrity reporting.

pub mod coords;
pub mod document;
pub mod error;
pub mod image;
pub mod integrity;
pub mod stamper;

pub use coords::{MediaBox, PointRect};
pub use document::PdfDocument;
pub use error::PdfError;
pub use integrity::sha256_hex;
pub use stamper::{annotate, Stamper};
