//! The character producer: reads a PDF with lopdf and populates a
//! document with positioned characters, figures and shapes.
//!
//! The producer walks each page's content stream with a small graphics
//! state machine (text matrix, transformation matrix stack, current
//! font and fill color) and emits one character per decoded glyph.
//! Glyph widths are estimated from the font size rather than measured
//! from the font program; the downstream tokenizers only rely on
//! relative geometry.

use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{
    Character, Document, Figure, Font, FontFace, Line, Page, Position, Rectangle, Shape,
};
use crate::observe::{Diagnostic, PipelineObserver, Stage};

/// Approximate descender depth as a fraction of the font size.
const DESCENT: f32 = 0.2;

/// Approximate ascender height as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// Approximate glyph advance as a fraction of the font size.
const ADVANCE: f32 = 0.5;

/// Reads PDFs into documents.
pub struct CharacterProducer {
    doc: LopdfDocument,
}

impl CharacterProducer {
    /// Load a PDF from bytes.
    ///
    /// Fails with [`Error::Parse`] on malformed input and
    /// [`Error::UnsupportedFeature`] on encrypted documents.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::unsupported("encrypted document"));
        }
        Ok(Self { doc })
    }

    /// Produce a document with characters, figures, shapes and the
    /// font and color registries populated. Pages that fail to decode
    /// are emitted empty with a diagnostic.
    pub fn produce(&self, observer: &dyn PipelineObserver) -> Result<Document> {
        let mut document = Document::new();

        for (number, page_id) in self.doc.get_pages() {
            let (width, height) = self.page_dimensions(page_id);
            let mut page = Page::new(number, width, height);

            match self.read_page(number, page_id, &mut document, &mut page) {
                Ok(()) => {}
                Err(err) => {
                    observer.diagnostic(&Diagnostic::new(
                        Stage::Producer,
                        Some(number),
                        format!("failed to read page content: {}", err),
                    ));
                }
            }

            document.add_page(page);
        }

        Ok(document)
    }

    /// The media box of the page, following the Parent chain for
    /// inherited values; falls back to Letter size.
    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        let mut current = Some(page_id);
        for _ in 0..8 {
            let Some(id) = current else { break };
            let Ok(dict) = self.doc.get_dictionary(id) else { break };
            if let Ok(media_box) = dict.get(b"MediaBox") {
                let resolved = match media_box {
                    Object::Reference(r) => self.doc.get_object(*r).ok(),
                    other => Some(other),
                };
                if let Some(Object::Array(values)) = resolved {
                    let nums: Vec<f32> = values.iter().filter_map(get_number).collect();
                    if nums.len() == 4 {
                        return ((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs());
                    }
                }
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|o| o.as_reference().ok());
        }
        (612.0, 792.0)
    }

    /// Decode one page's content stream into the page's characters,
    /// figures and shapes.
    fn read_page(
        &self,
        number: u32,
        page_id: ObjectId,
        document: &mut Document,
        page: &mut Page,
    ) -> Result<()> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::parse(e.to_string()))?;

        let content = self.page_content(page_id)?;
        let content =
            lopdf::content::Content::decode(&content).map_err(|e| Error::parse(e.to_string()))?;

        let mut state = GraphicsState::new(number);

        for op in content.operations {
            match op.operator.as_str() {
                "q" => state.push(),
                "Q" => state.pop(),
                "cm" => {
                    if let Some(m) = matrix_operands(&op.operands) {
                        state.ctm = state.ctm.multiply(&m);
                    }
                }
                "BT" => {
                    state.in_text = true;
                    state.text_matrix = Matrix::identity();
                    state.line_matrix = Matrix::identity();
                }
                "ET" => state.in_text = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            state.font_resource = name.clone();
                        }
                        state.font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        state.next_line_offset(tx, ty);
                    }
                }
                "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        state.leading = -ty;
                        state.next_line_offset(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_operands(&op.operands) {
                        state.text_matrix = m;
                        state.line_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show_text(bytes, &fonts, &mut state, document, page);
                    }
                }
                "'" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        self.show_text(bytes, &fonts, &mut state, document, page);
                    }
                }
                "\"" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                        self.show_text(bytes, &fonts, &mut state, document, page);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show_text(bytes, &fonts, &mut state, document, page);
                                }
                                Object::Integer(n) => state.adjust(*n as f32),
                                Object::Real(n) => state.adjust(*n),
                                _ => {}
                            }
                        }
                    }
                }
                "rg" => state.fill_color = rgb_operands(&op.operands),
                "g" => {
                    if let Some(gray) = op.operands.first().and_then(get_number) {
                        let level = to_component(gray);
                        state.fill_color = [level, level, level];
                    }
                }
                "k" => {
                    if op.operands.len() >= 4 {
                        let c: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                        if c.len() == 4 {
                            state.fill_color = [
                                to_component((1.0 - c[0]) * (1.0 - c[3])),
                                to_component((1.0 - c[1]) * (1.0 - c[3])),
                                to_component((1.0 - c[2]) * (1.0 - c[3])),
                            ];
                        }
                    }
                }
                "sc" | "scn" => {
                    let c: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                    if c.len() == 3 {
                        state.fill_color =
                            [to_component(c[0]), to_component(c[1]), to_component(c[2])];
                    } else if c.len() == 1 {
                        let level = to_component(c[0]);
                        state.fill_color = [level, level, level];
                    }
                }
                "Do" => {
                    // An XObject invocation paints into the unit
                    // square under the current transform.
                    let rect = state.ctm.unit_square_bounds();
                    if rect.is_valid() {
                        page.figures.push(Figure {
                            position: Position::new(number, rect),
                        });
                    }
                }
                "m" | "l" => {
                    if op.operands.len() >= 2 {
                        let x = get_number(&op.operands[0]).unwrap_or(0.0);
                        let y = get_number(&op.operands[1]).unwrap_or(0.0);
                        state.extend_path(x, y);
                    }
                }
                "c" | "v" | "y" => {
                    let nums: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                    for pair in nums.chunks(2) {
                        if pair.len() == 2 {
                            state.extend_path(pair[0], pair[1]);
                        }
                    }
                }
                "re" => {
                    let nums: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                    if nums.len() == 4 {
                        state.extend_path(nums[0], nums[1]);
                        state.extend_path(nums[0] + nums[2], nums[1] + nums[3]);
                    }
                }
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    if let Some(rect) = state.take_path() {
                        page.shapes.push(Shape {
                            position: Position::new(number, rect),
                        });
                    }
                }
                "n" => {
                    state.take_path();
                }
                _ => {}
            }
        }

        // Characters stay in content-stream order; the line tokenizer
        // re-sorts within baselines.

        Ok(())
    }

    /// Emit one character per glyph of a shown string.
    fn show_text(
        &self,
        bytes: &[u8],
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        state: &mut GraphicsState,
        document: &mut Document,
        page: &mut Page,
    ) {
        if !state.in_text {
            return;
        }

        let font_dict = fonts.get(&state.font_resource);
        let text = self.decode_text(bytes, font_dict);
        if text.is_empty() {
            return;
        }

        let font = self.register_font(document, font_dict, &state.font_resource);
        let color = document.register_color(state.fill_color);
        let rotation = state.rotation();

        for glyph in text.chars() {
            let (x, y) = state.glyph_origin();
            let size = state.effective_font_size();
            let advance = size * ADVANCE;

            if !glyph.is_whitespace() {
                page.characters.push(Character {
                    glyph: glyph.to_string(),
                    position: Position::new(
                        state.page_number,
                        Rectangle::new(x, y - size * DESCENT, x + advance, y + size * ASCENT),
                    ),
                    font_face: FontFace::new(font.clone(), size),
                    color: color.clone(),
                    baseline: Line::horizontal(x, x + advance, y),
                    rotation,
                });
            }
            state.advance_text(advance);
        }
    }

    /// Decode a PDF string with the font's encoding, falling back to
    /// UTF-16BE or Latin-1 when no encoding is available.
    fn decode_text(&self, bytes: &[u8], font: Option<&&lopdf::Dictionary>) -> String {
        if let Some(font) = font {
            if let Ok(encoding) = font.get_font_encoding(&self.doc) {
                if let Ok(decoded) = LopdfDocument::decode_text(&encoding, bytes) {
                    return decoded;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Intern the font of the current resource name in the document
    /// registry.
    fn register_font(
        &self,
        document: &mut Document,
        font_dict: Option<&&lopdf::Dictionary>,
        resource: &[u8],
    ) -> std::sync::Arc<Font> {
        let base_name = font_dict
            .and_then(|f| f.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
        let is_type3 = font_dict
            .and_then(|f| f.get(b"Subtype").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| n == b"Type3")
            .unwrap_or(false);

        if let Some(existing) = document
            .fonts
            .iter()
            .find(|f| f.base_name == base_name && f.is_type3 == is_type3)
        {
            return existing.clone();
        }

        let id = format!("font-{}", document.fonts.len());
        let mut font = Font::from_base_name(id, base_name);
        if is_type3 {
            font = font.type3();
        }
        document.register_font(font)
    }

    /// Concatenated, decompressed content streams of the page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::parse(e.to_string()))?;
        let contents = page_dict
            .get(b"Contents")
            .map_err(|e| Error::parse(e.to_string()))?;

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return s
                        .decompressed_content()
                        .map_err(|e| Error::parse(e.to_string()));
                }
                Err(Error::parse("invalid content stream"))
            }
            Object::Array(refs) => {
                let mut content = Vec::new();
                for obj in refs {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::parse("invalid content stream")),
        }
    }
}

/// Parse a PDF from bytes into a document, per the producer contract.
pub fn produce(data: &[u8], observer: &dyn PipelineObserver) -> Result<Document> {
    CharacterProducer::from_bytes(data)?.produce(observer)
}

/// A 2D affine transform in PDF order `[a b c d e f]`.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self * other` in PDF convention (`other` applied first).
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: other.a * self.a + other.b * self.c,
            b: other.a * self.b + other.b * self.d,
            c: other.c * self.a + other.d * self.c,
            d: other.c * self.b + other.d * self.d,
            e: other.e * self.a + other.f * self.c + self.e,
            f: other.e * self.b + other.f * self.d + self.f,
        }
    }

    fn transform(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Bounding box of the transformed unit square.
    fn unit_square_bounds(&self) -> Rectangle {
        let corners = [
            self.transform(0.0, 0.0),
            self.transform(1.0, 0.0),
            self.transform(0.0, 1.0),
            self.transform(1.0, 1.0),
        ];
        let min_x = corners.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        Rectangle::new(min_x, min_y, max_x, max_y)
    }

    /// Vertical scale factor, for the effective font size.
    fn vertical_scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

/// The subset of graphics state the producer tracks.
struct GraphicsState {
    page_number: u32,
    ctm: Matrix,
    stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text: bool,
    font_resource: Vec<u8>,
    font_size: f32,
    leading: f32,
    fill_color: [u8; 3],
    path: Option<Rectangle>,
}

impl GraphicsState {
    fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ctm: Matrix::identity(),
            stack: Vec::new(),
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
            in_text: false,
            font_resource: Vec::new(),
            font_size: 12.0,
            leading: 12.0,
            fill_color: [0, 0, 0],
            path: None,
        }
    }

    fn push(&mut self) {
        self.stack.push(self.ctm);
    }

    fn pop(&mut self) {
        if let Some(m) = self.stack.pop() {
            self.ctm = m;
        }
    }

    /// Move to the next line, offset from the current line start.
    fn next_line_offset(&mut self, tx: f32, ty: f32) {
        let offset = Matrix {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        };
        self.line_matrix = self.line_matrix.multiply(&offset);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.next_line_offset(0.0, -leading);
    }

    /// The device-space origin of the next glyph.
    fn glyph_origin(&self) -> (f32, f32) {
        let m = self.ctm.multiply(&self.text_matrix);
        (m.e, m.f)
    }

    fn effective_font_size(&self) -> f32 {
        self.font_size * self.ctm.multiply(&self.text_matrix).vertical_scale()
    }

    /// Advance the text position by a device-space width.
    fn advance_text(&mut self, advance: f32) {
        let scale = self.ctm.multiply(&self.text_matrix).vertical_scale();
        let tx = if scale > 0.0 { advance / scale } else { advance };
        let offset = Matrix {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: 0.0,
        };
        self.text_matrix = self.text_matrix.multiply(&offset);
    }

    /// Apply a TJ positioning adjustment, in thousandths of text
    /// space.
    fn adjust(&mut self, amount: f32) {
        self.advance_text(-amount / 1000.0 * self.effective_font_size());
    }

    /// The rotation quadrant of the current text direction.
    fn rotation(&self) -> u16 {
        let m = self.ctm.multiply(&self.text_matrix);
        if m.a.abs() >= m.b.abs() {
            if m.a >= 0.0 {
                0
            } else {
                180
            }
        } else if m.b > 0.0 {
            90
        } else {
            270
        }
    }

    fn extend_path(&mut self, x: f32, y: f32) {
        let (x, y) = self.ctm.transform(x, y);
        let point = Rectangle::new(x, y, x, y);
        self.path = Some(match self.path {
            Some(rect) => rect.union(&point),
            None => point,
        });
    }

    fn take_path(&mut self) -> Option<Rectangle> {
        self.path.take().filter(|r| r.is_valid())
    }
}

/// Extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Read six numeric operands as a matrix.
fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    let nums: Vec<f32> = operands.iter().filter_map(get_number).collect();
    if nums.len() < 6 {
        return None;
    }
    Some(Matrix {
        a: nums[0],
        b: nums[1],
        c: nums[2],
        d: nums[3],
        e: nums[4],
        f: nums[5],
    })
}

/// Read three 0..=1 color operands as an RGB triple.
fn rgb_operands(operands: &[Object]) -> [u8; 3] {
    let nums: Vec<f32> = operands.iter().filter_map(get_number).collect();
    if nums.len() == 3 {
        [
            to_component(nums[0]),
            to_component(nums[1]),
            to_component(nums[2]),
        ]
    } else {
        [0, 0, 0]
    }
}

fn to_component(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Decoding fallback when no font encoding is available: UTF-16BE
/// with BOM, then UTF-8, then Latin-1.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter(|c| c.len() == 2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::NullObserver;
    use lopdf::dictionary;

    #[test]
    fn test_invalid_bytes_fail_with_parse_error() {
        let result = CharacterProducer::from_bytes(b"not a pdf");
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_matrix_multiply_identity() {
        let m = Matrix {
            a: 2.0,
            b: 0.0,
            c: 0.0,
            d: 2.0,
            e: 5.0,
            f: 7.0,
        };
        let r = Matrix::identity().multiply(&m);
        assert_eq!((r.a, r.d, r.e, r.f), (2.0, 2.0, 5.0, 7.0));
    }

    #[test]
    fn test_unit_square_bounds() {
        let m = Matrix {
            a: 100.0,
            b: 0.0,
            c: 0.0,
            d: 50.0,
            e: 10.0,
            f: 20.0,
        };
        let rect = m.unit_square_bounds();
        assert_eq!(rect, Rectangle::new(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn test_rotation_quadrants() {
        let mut state = GraphicsState::new(1);
        assert_eq!(state.rotation(), 0);
        state.text_matrix = Matrix {
            a: 0.0,
            b: 1.0,
            c: -1.0,
            d: 0.0,
            e: 0.0,
            f: 0.0,
        };
        assert_eq!(state.rotation(), 90);
    }

    #[test]
    fn test_decode_text_simple_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_text_simple(&bytes), "AB");
    }

    #[test]
    fn test_minimal_pdf_produces_characters() {
        let pdf = build_minimal_pdf("BT /F1 12 Tf 72 700 Td (Hi) Tj ET");
        let doc = produce(&pdf, &NullObserver).unwrap();
        assert_eq!(doc.page_count(), 1);
        let chars: Vec<&str> = doc.pages[0]
            .characters
            .iter()
            .map(|c| c.glyph.as_str())
            .collect();
        assert_eq!(chars, vec!["H", "i"]);
        assert_eq!(doc.fonts.len(), 1);
        assert_eq!(doc.colors.len(), 1);
    }

    #[test]
    fn test_shape_from_rectangle_op() {
        let pdf = build_minimal_pdf("100 100 200 50 re S");
        let doc = produce(&pdf, &NullObserver).unwrap();
        assert_eq!(doc.pages[0].shapes.len(), 1);
        let rect = doc.pages[0].shapes[0].position.rectangle;
        assert_eq!(rect, Rectangle::new(100.0, 100.0, 300.0, 150.0));
    }

    /// A single-page PDF with the given content stream and one
    /// Helvetica font resource.
    fn build_minimal_pdf(content: &str) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.4");
        let font_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(lopdf::dictionary! {
            "Font" => lopdf::dictionary! { "F1" => font_id },
        });
        let content_id = doc.add_object(Object::Stream(lopdf::Stream::new(
            lopdf::dictionary! {},
            content.as_bytes().to_vec(),
        )));
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
