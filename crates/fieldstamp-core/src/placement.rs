//! Placement model for one editing session
//!
//! All operations are pure clamps over already-valid input: out-of-range
//! requests are silently clamped rather than rejected, so the model never
//! returns an error.

use uuid::Uuid;

use crate::field::{Field, FieldKind};

/// Default size for a freshly dropped field, in percent of the page.
const DEFAULT_WIDTH: f64 = 20.0;
const DEFAULT_HEIGHT: f64 = 5.0;

/// Minimum field size, in percent of the page.
const MIN_WIDTH: f64 = 5.0;
const MIN_HEIGHT: f64 = 2.0;

/// Pre-drag snapshot used to revert an aborted drag.
#[derive(Debug, Clone)]
struct DragSnapshot {
    field: Field,
}

/// Tracks the fields of one client session.
///
/// The list lives only in memory for the session and is serialized
/// wholesale at sign time.
#[derive(Debug, Default)]
pub struct PlacementModel {
    fields: Vec<Field>,
    drag: Option<DragSnapshot>,
}

fn clamp(value: f64, max: f64) -> f64 {
    value.clamp(0.0, max.max(0.0))
}

impl PlacementModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Create a field of `kind` at the drop point, with the default size.
    ///
    /// The position is clamped so the field stays within `[0, 100 - size]`
    /// on both axes.
    pub fn place(&mut self, kind: FieldKind, page: u32, x_pct: f64, y_pct: f64) -> &Field {
        let field = Field {
            id: Uuid::new_v4().to_string(),
            kind,
            x: clamp(x_pct, 100.0 - DEFAULT_WIDTH),
            y: clamp(y_pct, 100.0 - DEFAULT_HEIGHT),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            page,
            content: None,
        };
        self.fields.push(field);
        self.fields.last().expect("just pushed")
    }

    /// Move a field, possibly onto another page (cross-page drag).
    ///
    /// The position is clamped against the field's current size. Unknown
    /// ids are ignored.
    pub fn move_field(&mut self, id: &str, x_pct: f64, y_pct: f64, page: u32) {
        if let Some(field) = self.get_mut(id) {
            field.x = clamp(x_pct, 100.0 - field.width);
            field.y = clamp(y_pct, 100.0 - field.height);
            field.page = page;
        }
    }

    /// Resize a field keeping its top-left corner fixed.
    ///
    /// The size is clamped to the minimum (5% x 2%) and so the bottom-right
    /// corner stays within the page.
    pub fn resize(&mut self, id: &str, width_pct: f64, height_pct: f64) {
        if let Some(field) = self.get_mut(id) {
            field.width = width_pct.clamp(MIN_WIDTH, 100.0 - field.x);
            field.height = height_pct.clamp(MIN_HEIGHT, 100.0 - field.y);
        }
    }

    /// Set or clear a field's content (image data or text).
    pub fn set_content(&mut self, id: &str, content: Option<String>) {
        if let Some(field) = self.get_mut(id) {
            field.content = content;
        }
    }

    /// Remove a field unconditionally. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) {
        self.fields.retain(|f| f.id != id);
    }

    /// Snapshot a field before a drag so the drag can be aborted.
    ///
    /// Starting a new drag discards any previous snapshot.
    pub fn begin_drag(&mut self, id: &str) {
        self.drag = self.get(id).cloned().map(|field| DragSnapshot { field });
    }

    /// Revert the dragged field to its pre-drag state.
    pub fn cancel_drag(&mut self) {
        if let Some(snapshot) = self.drag.take() {
            if let Some(field) = self.get_mut(&snapshot.field.id) {
                *field = snapshot.field;
            }
        }
    }

    /// Keep the drag's result and drop the snapshot.
    pub fn commit_drag(&mut self) {
        self.drag = None;
    }
}
