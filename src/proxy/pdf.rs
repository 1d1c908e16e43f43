//! Minimal PDF 1.4 writer for proxy sheets.
//!
//! Supports exactly what a sheet needs: JPEG image XObjects placed at fixed
//! rectangles, filled/stroked rectangles and Helvetica text.

use std::fmt::Write as _;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::Result;
use crate::proxy::layout::{mm_to_pt, Rect};

const JPEG_QUALITY: u8 = 90;

#[derive(Debug)]
struct PdfImage {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
}

// ---------------------------------------------------------------------------
// PdfPage
// ---------------------------------------------------------------------------

/// Drawing operations for one page. Rectangles are in millimetres from the
/// top-left corner and converted to PDF user space on write.
#[derive(Debug, Clone)]
pub struct PdfPage {
    height_mm: f64,
    content: String,
    images: Vec<usize>,
}

impl PdfPage {
    fn new(height_mm: f64) -> Self {
        Self {
            height_mm,
            content: String::new(),
            images: Vec::new(),
        }
    }

    /// (x, y, w, h) in points with a bottom-left origin.
    fn to_user_space(&self, rect: Rect) -> (f64, f64, f64, f64) {
        (
            mm_to_pt(rect.x),
            mm_to_pt(self.height_mm - rect.y - rect.height),
            mm_to_pt(rect.width),
            mm_to_pt(rect.height),
        )
    }

    pub fn draw_image(&mut self, image: usize, rect: Rect) {
        let (x, y, w, h) = self.to_user_space(rect);
        let _ = writeln!(
            self.content,
            "q {w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm /Im{image} Do Q"
        );
        if !self.images.contains(&image) {
            self.images.push(image);
        }
    }

    /// Light grey box with a thin black border.
    pub fn draw_frame(&mut self, rect: Rect) {
        let (x, y, w, h) = self.to_user_space(rect);
        let _ = writeln!(self.content, "q 0.93 g {x:.2} {y:.2} {w:.2} {h:.2} re f Q");
        let _ = writeln!(
            self.content,
            "q 0 G 0.5 w {x:.2} {y:.2} {w:.2} {h:.2} re S Q"
        );
    }

    /// Single line of text whose baseline starts at (`x_mm`, `y_mm`).
    pub fn draw_text(&mut self, x_mm: f64, y_mm: f64, size: f64, text: &str) {
        let x = mm_to_pt(x_mm);
        let y = mm_to_pt(self.height_mm - y_mm);
        let _ = writeln!(
            self.content,
            "BT 0 g /F1 {size:.1} Tf {x:.2} {y:.2} Td ({}) Tj ET",
            escape_text(text)
        );
    }
}

/// Escape a string for a PDF literal. Characters outside printable ASCII are
/// replaced, since the built-in Helvetica uses a single-byte encoding.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// PdfDocument
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PdfDocument {
    width_mm: f64,
    height_mm: f64,
    images: Vec<PdfImage>,
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            images: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Encode an image as JPEG and register it; returns its id for
    /// [`PdfPage::draw_image`].
    pub fn add_image(&mut self, img: &RgbImage) -> Result<usize> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), JPEG_QUALITY).encode_image(img)?;
        self.images.push(PdfImage {
            width: img.width(),
            height: img.height(),
            jpeg,
        });
        Ok(self.images.len() - 1)
    }

    pub fn new_page(&self) -> PdfPage {
        PdfPage::new(self.height_mm)
    }

    pub fn push_page(&mut self, page: PdfPage) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Serialize the document.
    ///
    /// Object layout: 1 catalog, 2 page tree, 3 font, then one object per
    /// image, then a page object and a content stream per page.
    pub fn to_bytes(&self) -> Vec<u8> {
        let first_image = 4;
        let first_page = first_image + self.images.len();
        let page_obj = |i: usize| first_page + i * 2;

        let mut objects: Vec<Vec<u8>> = Vec::new();

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", page_obj(i)))
            .collect();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            )
            .into_bytes(),
        );

        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        for img in &self.images {
            let mut body = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                img.width,
                img.height,
                img.jpeg.len()
            )
            .into_bytes();
            body.extend_from_slice(&img.jpeg);
            body.extend_from_slice(b"\nendstream");
            objects.push(body);
        }

        let (width_pt, height_pt) = (mm_to_pt(self.width_mm), mm_to_pt(self.height_mm));
        for (i, page) in self.pages.iter().enumerate() {
            let xobjects: String = page
                .images
                .iter()
                .map(|id| format!("/Im{} {} 0 R", id, first_image + id))
                .collect::<Vec<_>>()
                .join(" ");
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width_pt:.2} {height_pt:.2}] \
                     /Resources << /Font << /F1 3 0 R >> /XObject << {xobjects} >> >> \
                     /Contents {} 0 R >>",
                    page_obj(i) + 1
                )
                .into_bytes(),
            );

            let mut stream =
                format!("<< /Length {} >>\nstream\n", page.content.len()).into_bytes();
            stream.extend_from_slice(page.content.as_bytes());
            stream.extend_from_slice(b"\nendstream");
            objects.push(stream);
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        );
        out.extend_from_slice(xref.as_bytes());
        out
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}
