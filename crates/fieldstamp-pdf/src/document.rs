//! Document wrapper over lopdf

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::coords::MediaBox;
use crate::error::PdfError;

/// A loaded PDF, ready for stamping.
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Load a PDF from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes)?;
        Ok(Self { doc })
    }

    /// A fresh one-page US Letter document, used when no source PDF was
    /// supplied.
    pub fn blank() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        Self { doc }
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Object id for a 1-based page number.
    pub fn page_id(&self, page_num: u32) -> Option<ObjectId> {
        self.doc.get_pages().get(&page_num).copied()
    }

    /// A page's MediaBox, walking up the page tree if the page itself
    /// carries none and defaulting to US Letter.
    pub fn media_box(&self, page_num: u32) -> Result<MediaBox, PdfError> {
        let page_id = self
            .page_id(page_num)
            .ok_or(PdfError::PageNotFound(page_num))?;
        let page = self
            .doc
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::MalformedPage("page is not a dictionary"))?;
        Ok(self.media_box_from(page, 10))
    }

    fn media_box_from(&self, dict: &lopdf::Dictionary, depth: usize) -> MediaBox {
        if depth == 0 {
            return MediaBox::letter();
        }
        if let Ok(obj) = dict.get(b"MediaBox") {
            if let Some(rect) = self.parse_rect(obj) {
                return rect;
            }
        }
        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            if let Ok(parent) = self.doc.get_object(*parent_id) {
                if let Ok(parent_dict) = parent.as_dict() {
                    return self.media_box_from(parent_dict, depth - 1);
                }
            }
        }
        MediaBox::letter()
    }

    /// Parse a `[x1 y1 x2 y2]` rectangle into origin-plus-size form.
    fn parse_rect(&self, obj: &Object) -> Option<MediaBox> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_array().ok()?,
            _ => return None,
        };
        if arr.len() != 4 {
            return None;
        }
        let mut values = [0.0f64; 4];
        for (value, obj) in values.iter_mut().zip(arr) {
            *value = self.number(obj)?;
        }
        Some(MediaBox {
            x: values[0],
            y: values[1],
            width: values[2] - values[0],
            height: values[3] - values[1],
        })
    }

    fn number(&self, obj: &Object) -> Option<f64> {
        match obj {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(f64::from(*r)),
            Object::Reference(id) => self.number(self.doc.get_object(*id).ok()?),
            _ => None,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Serialize the document.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_document_has_one_letter_page() {
        let doc = PdfDocument::blank();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.media_box(1).unwrap(), MediaBox::letter());
    }

    #[test]
    fn blank_document_round_trips_through_save() {
        let bytes = PdfDocument::blank().save_to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let reloaded = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.page_count(), 1);
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(PdfDocument::from_bytes(&[0u8; 64]).is_err());
        assert!(PdfDocument::from_bytes(b"<!DOCTYPE html><html></html>").is_err());
        assert!(PdfDocument::from_bytes(&[]).is_err());
    }

    #[test]
    fn missing_page_reports_not_found() {
        let doc = PdfDocument::blank();
        assert!(matches!(doc.media_box(2), Err(PdfError::PageNotFound(2))));
        assert!(doc.page_id(99).is_none());
    }

    #[test]
    fn media_box_parses_integer_rect() {
        let doc = PdfDocument::blank();
        let rect = doc
            .parse_rect(&Object::Array(vec![
                0.into(),
                0.into(),
                600.into(),
                800.into(),
            ]))
            .unwrap();
        assert_eq!(rect.width, 600.0);
        assert_eq!(rect.height, 800.0);
    }
}
