//! PDF text and image extraction using lopdf and pdf-extract.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::panic;
use tracing::{debug, trace, warn};

use super::{
    target_width, PdfProcessor, PdfText, Result, MAX_RENDER_DIMENSION, PRIMARY_TEXT_LIBRARY,
    SECONDARY_TEXT_LIBRARY,
};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF in one step.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document()?
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Text through `pdf-extract`. The library panics on some malformed
    /// fonts; a panic is reported as an extraction failure.
    fn extract_text_pdf_extract(&self) -> Result<String> {
        let data = self.raw_data.as_slice();
        match panic::catch_unwind(move || pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => Err(PdfError::TextExtraction(
                "pdf-extract panicked".to_string(),
            )),
        }
    }

    /// Text through lopdf's own content stream reader.
    fn extract_text_lopdf(&self) -> Result<String> {
        let doc = self.document()?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        image_from_raw(data, width, height, color_space)
    }

    /// Look up a page attribute, following `Parent` links for inherited
    /// entries such as `Resources` and `MediaBox`.
    fn inherited_attribute<'a>(
        &self,
        doc: &'a Document,
        node_id: ObjectId,
        key: &[u8],
    ) -> Option<&'a Object> {
        let mut current = node_id;
        // Page trees are shallow; the bound guards against cyclic Parent links.
        for _ in 0..32 {
            let dict = doc.get_dictionary(current).ok()?;
            if let Ok(value) = dict.get(key) {
                return doc.dereference(value).ok().map(|(_, obj)| obj);
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    /// Rasterize a scanned page from its largest embedded image, upscaled
    /// to `zoom` when the scan is smaller than the page.
    fn render_embedded(&self, page: u32, zoom: f32) -> Result<DynamicImage> {
        let doc = self.document()?;
        let page_id = self.page_id(page)?;

        // Scanned receipts are a page-sized raster; the largest one is the scan.
        let image = self
            .extract_images(page)?
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| {
                PdfError::Rasterize(format!("no embedded raster image on page {}", page))
            })?;

        let Some(page_width) = self.page_width(doc, page_id) else {
            return Ok(image);
        };
        let target_width = target_width(page_width, zoom);
        if image.width() >= target_width || image.width() == 0 {
            return Ok(image);
        }

        let scale = target_width as f64 / image.width() as f64;
        let target_height =
            ((image.height() as f64 * scale) as u32).clamp(1, MAX_RENDER_DIMENSION);
        debug!(
            "Rendering page {} at {}x{} (zoom {})",
            page, target_width, target_height, zoom
        );
        Ok(image.resize_exact(target_width, target_height, FilterType::Lanczos3))
    }

    fn page_resources<'a>(&self, doc: &'a Document, page_id: ObjectId) -> Option<&'a Dictionary> {
        self.inherited_attribute(doc, page_id, b"Resources")?
            .as_dict()
            .ok()
    }

    /// Page width in points from the (possibly inherited) MediaBox.
    fn page_width(&self, doc: &Document, page_id: ObjectId) -> Option<f32> {
        let media_box = self
            .inherited_attribute(doc, page_id, b"MediaBox")?
            .as_array()
            .ok()?;
        if media_box.len() != 4 {
            return None;
        }
        let x0 = media_box[0].as_float().ok()?;
        let x1 = media_box[2].as_float().ok()?;
        Some((x1 - x0).abs())
    }
}

fn image_from_raw(data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = width as usize * height as usize;

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            let mut data = data;
            data.truncate(pixels * 3);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            let mut data = data;
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            None
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the raw bytes, so hand it the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<PdfText> {
        match self.extract_text_pdf_extract() {
            Ok(text) => {
                return Ok(PdfText {
                    text,
                    library: PRIMARY_TEXT_LIBRARY,
                });
            }
            Err(e) => warn!("{} failed, trying {}: {}", PRIMARY_TEXT_LIBRARY, SECONDARY_TEXT_LIBRARY, e),
        }

        let text = self.extract_text_lopdf()?;
        Ok(PdfText {
            text,
            library: SECONDARY_TEXT_LIBRARY,
        })
    }

    fn render_page(&self, page: u32, zoom: f32) -> Result<DynamicImage> {
        #[cfg(feature = "pdfium")]
        match super::pdfium::render(&self.raw_data, page, zoom) {
            Ok(image) => return Ok(image),
            Err(e) => debug!("PDFium render of page {} failed, using embedded image: {}", page, e),
        }

        self.render_embedded(page, zoom)
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = self.page_id(page)?;

        let mut images = Vec::new();

        if let Some(xobjects) = self
            .page_resources(doc, page_id)
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| doc.dereference(obj).ok())
            .and_then(|(_, obj)| obj.as_dict().ok())
        {
            for (_name, obj_ref) in xobjects.iter() {
                if let Ok((_, obj)) = doc.dereference(obj_ref) {
                    if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                        images.push(img);
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{scanned_pdf, text_pdf};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.extract_images(1).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            PdfExtractor::from_bytes(b"%PDF-1.4 not really"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_extract_text_layer() {
        let pdf = text_pdf(&["POSTO IPIRANGA CENTRO", "Qtde.: 29,24", "Vl. Unit.: 6,84"]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let text = extractor.extract_text().unwrap();
        assert!(text.text.contains("POSTO IPIRANGA CENTRO"));
        assert!(text.text.contains("29,24"));
        assert!(text.meaningful_len() > 30);
    }

    #[test]
    fn test_lopdf_text() {
        let pdf = text_pdf(&["NFC-e: 000893951"]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();
        assert!(extractor.extract_text_lopdf().unwrap().contains("000893951"));
    }

    #[test]
    fn test_scanned_page_has_no_text() {
        let pdf = scanned_pdf(200, 100, 150);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();
        assert_eq!(extractor.extract_text().unwrap().meaningful_len(), 0);
    }

    #[test]
    fn test_extract_images() {
        let pdf = scanned_pdf(200, 100, 150);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        let images = extractor.extract_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (100, 150));
        assert!(matches!(
            extractor.extract_images(2),
            Err(PdfError::InvalidPage(2))
        ));
    }

    #[test]
    fn test_render_page_upscales_to_zoom() {
        let pdf = scanned_pdf(200, 100, 150);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        let page = extractor.render_page(1, 2.0).unwrap();
        assert_eq!(page.width(), 400);

        let page = extractor.render_embedded(1, 2.0).unwrap();
        assert_eq!((page.width(), page.height()), (400, 600));
    }

    #[test]
    fn test_render_embedded_keeps_large_scans() {
        let pdf = scanned_pdf(100, 300, 300);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        let page = extractor.render_embedded(1, 2.0).unwrap();
        assert_eq!(page.width(), 300);
    }

    #[test]
    fn test_render_embedded_caps_absurd_zoom() {
        let pdf = scanned_pdf(200, 100, 5);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();

        let page = extractor.render_embedded(1, 1.0e6).unwrap();
        assert_eq!((page.width(), page.height()), (MAX_RENDER_DIMENSION, 500));
    }

    #[test]
    fn test_render_embedded_needs_an_image() {
        let pdf = text_pdf(&["no images here"]);
        let extractor = PdfExtractor::from_bytes(&pdf).unwrap();
        assert!(matches!(
            extractor.render_embedded(1, 2.0),
            Err(PdfError::Rasterize(_))
        ));
    }
}
