//! Field mark rendering
//!
//! Draws one mark per field into the target page by appending a content
//! stream and merging the resources the marks need (font, image XObjects,
//! translucency graphics state) into the page's `Resources`.

use std::collections::BTreeMap;
use std::fmt::Write;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tracing::debug;

use fieldstamp_core::{Field, FieldKind};

use crate::coords::{self, PointRect};
use crate::document::PdfDocument;
use crate::error::PdfError;
use crate::image;

/// Accent color used for outlines and fills (RGB, 0..1).
const ACCENT: [f64; 3] = [0.23, 0.51, 0.96];

/// Fill opacity for date and radio marks.
const FILL_ALPHA: f64 = 0.35;

/// Fixed size for text field labels, in points.
const TEXT_SIZE: f64 = 10.0;
const TEXT_INSET: f64 = 2.0;

/// Cubic Bezier control-point factor for approximating a quarter circle.
const CIRCLE_K: f64 = 0.552_284_749_831;

/// Resource names added to stamped pages.
const FONT_NAME: &str = "FsF0";
const GSTATE_NAME: &str = "FsGs";

/// Escape special characters for PDF string literals.
fn escape_pdf_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            _ if c.is_ascii() => c.to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

/// Format a coordinate for a content stream.
fn num(v: f64) -> String {
    format!("{v:.2}")
}

/// Stamp a PDF with the marks for a list of fields and re-serialize it.
///
/// Fields referencing pages past the end of the document are skipped.
pub fn annotate(pdf_bytes: &[u8], fields: &[Field]) -> Result<Vec<u8>, PdfError> {
    let mut doc = PdfDocument::from_bytes(pdf_bytes)?;
    Stamper::default().apply(&mut doc, fields)?;
    doc.save_to_bytes()
}

/// Renders field marks into a document.
#[derive(Debug, Clone)]
pub struct Stamper {
    pub accent: [f64; 3],
    pub fill_alpha: f64,
}

impl Default for Stamper {
    fn default() -> Self {
        Self {
            accent: ACCENT,
            fill_alpha: FILL_ALPHA,
        }
    }
}

impl Stamper {
    /// Draw the mark for every field onto its page.
    pub fn apply(&self, doc: &mut PdfDocument, fields: &[Field]) -> Result<(), PdfError> {
        let page_count = doc.page_count() as u32;
        let mut by_page: BTreeMap<u32, Vec<&Field>> = BTreeMap::new();
        for field in fields {
            if field.page == 0 || field.page > page_count {
                debug!(
                    field = %field.id,
                    page = field.page,
                    page_count,
                    "field references a missing page, skipping"
                );
                continue;
            }
            by_page.entry(field.page).or_default().push(field);
        }
        // Image names must stay unique across pages: pages can share one
        // Resources dictionary, where per-page names would collide.
        let mut image_seq = 0usize;
        for (page, page_fields) in by_page {
            self.stamp_page(doc, page, &page_fields, &mut image_seq)?;
        }
        Ok(())
    }

    fn stamp_page(
        &self,
        doc: &mut PdfDocument,
        page: u32,
        fields: &[&Field],
        image_seq: &mut usize,
    ) -> Result<(), PdfError> {
        let media = doc.media_box(page)?;
        let page_id = doc.page_id(page).ok_or(PdfError::PageNotFound(page))?;

        let mut ops = String::new();
        let mut images: Vec<(String, image::EmbeddedImage)> = Vec::new();
        let mut needs_font = false;
        let mut needs_alpha = false;

        for field in fields {
            let rect = coords::field_rect(field.x, field.y, field.width, field.height, &media);
            match field.kind {
                FieldKind::Text => {
                    self.outline(&mut ops, &rect);
                    if let Some(text) = &field.content {
                        needs_font = true;
                        self.label(&mut ops, &rect, text);
                    }
                }
                FieldKind::Date => {
                    needs_alpha = true;
                    self.fill_rect(&mut ops, &rect);
                }
                FieldKind::Radio => {
                    needs_alpha = true;
                    self.fill_circle(&mut ops, &rect);
                }
                FieldKind::Signature | FieldKind::Image => match &field.content {
                    Some(content) => {
                        let embedded = image::decode_content(content)
                            .and_then(|bytes| image::build_xobject(&bytes));
                        match embedded {
                            Some(img) => {
                                let name = format!("FsIm{image_seq}");
                                *image_seq += 1;
                                let placed = image::fit_rect(img.width, img.height, &rect);
                                self.draw_image(&mut ops, &name, &placed);
                                images.push((name, img));
                            }
                            // Unsupported or undecodable image: no mark at all
                            None => debug!(field = %field.id, "image content not embeddable, skipping mark"),
                        }
                    }
                    None => self.outline(&mut ops, &rect),
                },
            }
        }

        if ops.is_empty() {
            return Ok(());
        }

        let image_ids: Vec<(String, ObjectId)> = images
            .into_iter()
            .map(|(name, img)| (name, doc.doc_mut().add_object(img.stream)))
            .collect();
        self.merge_resources(doc.doc_mut(), page_id, &image_ids, needs_font, needs_alpha)?;
        doc.doc_mut().add_page_contents(page_id, ops.into_bytes())?;
        Ok(())
    }

    fn outline(&self, ops: &mut String, rect: &PointRect) {
        let [r, g, b] = self.accent;
        let _ = writeln!(
            ops,
            "q\n{} {} {} RG\n1 w\n{} {} {} {} re\nS\nQ",
            num(r),
            num(g),
            num(b),
            num(rect.left),
            num(rect.bottom),
            num(rect.width),
            num(rect.height),
        );
    }

    fn fill_rect(&self, ops: &mut String, rect: &PointRect) {
        let [r, g, b] = self.accent;
        let _ = writeln!(
            ops,
            "q\n/{GSTATE_NAME} gs\n{} {} {} rg\n{} {} {} {} re\nf\nQ",
            num(r),
            num(g),
            num(b),
            num(rect.left),
            num(rect.bottom),
            num(rect.width),
            num(rect.height),
        );
    }

    /// A filled circle inscribed in the box, radius half the smaller
    /// dimension, drawn as four cubic Bezier quarter-arcs.
    fn fill_circle(&self, ops: &mut String, rect: &PointRect) {
        let [r, g, b] = self.accent;
        let cx = rect.left + rect.width / 2.0;
        let cy = rect.bottom + rect.height / 2.0;
        let radius = rect.width.min(rect.height) / 2.0;
        let k = CIRCLE_K * radius;

        let _ = writeln!(ops, "q\n/{GSTATE_NAME} gs\n{} {} {} rg", num(r), num(g), num(b));
        let _ = writeln!(ops, "{} {} m", num(cx + radius), num(cy));
        let _ = writeln!(
            ops,
            "{} {} {} {} {} {} c",
            num(cx + radius),
            num(cy + k),
            num(cx + k),
            num(cy + radius),
            num(cx),
            num(cy + radius),
        );
        let _ = writeln!(
            ops,
            "{} {} {} {} {} {} c",
            num(cx - k),
            num(cy + radius),
            num(cx - radius),
            num(cy + k),
            num(cx - radius),
            num(cy),
        );
        let _ = writeln!(
            ops,
            "{} {} {} {} {} {} c",
            num(cx - radius),
            num(cy - k),
            num(cx - k),
            num(cy - radius),
            num(cx),
            num(cy - radius),
        );
        let _ = writeln!(
            ops,
            "{} {} {} {} {} {} c",
            num(cx + k),
            num(cy - radius),
            num(cx + radius),
            num(cy - k),
            num(cx + radius),
            num(cy),
        );
        let _ = writeln!(ops, "f\nQ");
    }

    /// Text near the top-left of the box at a fixed size.
    fn label(&self, ops: &mut String, rect: &PointRect, text: &str) {
        let _ = writeln!(
            ops,
            "q\n0 0 0 rg\nBT\n/{FONT_NAME} {} Tf\n{} {} Td\n({}) Tj\nET\nQ",
            num(TEXT_SIZE),
            num(rect.left + TEXT_INSET),
            num(rect.top() - TEXT_SIZE - TEXT_INSET),
            escape_pdf_string(text),
        );
    }

    fn draw_image(&self, ops: &mut String, name: &str, placed: &PointRect) {
        let _ = writeln!(
            ops,
            "q\n{} 0 0 {} {} {} cm\n/{name} Do\nQ",
            num(placed.width),
            num(placed.height),
            num(placed.left),
            num(placed.bottom),
        );
    }

    /// Merge the stamped marks' resources into the page's `Resources`,
    /// whether it is inline, referenced, or absent.
    fn merge_resources(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        images: &[(String, ObjectId)],
        needs_font: bool,
        needs_alpha: bool,
    ) -> Result<(), PdfError> {
        if images.is_empty() && !needs_font && !needs_alpha {
            return Ok(());
        }

        let resources_obj = {
            let page_dict = doc
                .get_object_mut(page_id)?
                .as_dict_mut()
                .map_err(|_| PdfError::MalformedPage("page is not a dictionary"))?;
            page_dict
                .remove(b"Resources")
                .unwrap_or_else(|| Object::Dictionary(Dictionary::new()))
        };

        let restored = match resources_obj {
            // Shared indirect Resources: merge into the referenced object so
            // every page using it sees the additions, keep the reference.
            Object::Reference(id) => {
                let mut dict = doc
                    .get_object(id)?
                    .as_dict()
                    .map_err(|_| PdfError::MalformedPage("resources is not a dictionary"))?
                    .clone();
                self.insert_resources(doc, &mut dict, images, needs_font, needs_alpha)?;
                *doc.get_object_mut(id)? = Object::Dictionary(dict);
                Object::Reference(id)
            }
            Object::Dictionary(mut dict) => {
                self.insert_resources(doc, &mut dict, images, needs_font, needs_alpha)?;
                Object::Dictionary(dict)
            }
            _ => {
                let mut dict = Dictionary::new();
                self.insert_resources(doc, &mut dict, images, needs_font, needs_alpha)?;
                Object::Dictionary(dict)
            }
        };

        let page_dict = doc
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::MalformedPage("page is not a dictionary"))?;
        page_dict.set("Resources", restored);
        Ok(())
    }

    fn insert_resources(
        &self,
        doc: &Document,
        resources: &mut Dictionary,
        images: &[(String, ObjectId)],
        needs_font: bool,
        needs_alpha: bool,
    ) -> Result<(), PdfError> {
        if needs_font {
            let fonts = ensure_subdict(doc, resources, b"Font")?;
            fonts.set(
                FONT_NAME,
                Object::Dictionary(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                }),
            );
        }
        if needs_alpha {
            let gstates = ensure_subdict(doc, resources, b"ExtGState")?;
            let mut gs = Dictionary::new();
            gs.set("Type", Object::Name(b"ExtGState".to_vec()));
            gs.set("ca", Object::Real(self.fill_alpha as f32));
            gstates.set(GSTATE_NAME, Object::Dictionary(gs));
        }
        if !images.is_empty() {
            let xobjects = ensure_subdict(doc, resources, b"XObject")?;
            for (name, id) in images {
                xobjects.set(name.as_bytes().to_vec(), Object::Reference(*id));
            }
        }
        Ok(())
    }
}

/// Get or create a direct sub-dictionary of a resources dictionary.
///
/// An indirect sub-dictionary is inlined as a copy of its target, so the
/// entries the page's existing content streams reference survive the merge.
fn ensure_subdict<'a>(
    doc: &Document,
    resources: &'a mut Dictionary,
    key: &[u8],
) -> Result<&'a mut Dictionary, PdfError> {
    let owned = resources
        .remove(key)
        .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));
    let direct = match owned {
        Object::Dictionary(dict) => dict,
        Object::Reference(id) => doc
            .get_object(id)
            .ok()
            .and_then(|obj| obj.as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new),
        _ => Dictionary::new(),
    };
    resources.set(key.to_vec(), Object::Dictionary(direct));
    match resources.get_mut(key) {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        _ => Err(PdfError::MalformedPage("resources entry is not a dictionary")),
    }
}
