//! Field placement core
//!
//! This crate owns the field data model used on both sides of the wire:
//! a field is a typed box positioned on a page in normalized coordinates
//! (percentages of the page's rendered size, origin top-left). The
//! [`PlacementModel`] tracks the fields of one editing session and keeps
//! every field inside its page by clamping, never by rejecting.

pub mod field;
pub mod placement;

pub use field::{fields_overlap, find_overlaps, Field, FieldKind};
pub use placement::PlacementModel;
