//! PDF text and page-image extraction using lopdf.

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};
use image::imageops::FilterType;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageRenderer, Result, TextLayerParser};
use crate::error::PdfError;

/// Page width assumed when a page has no readable MediaBox (US Letter).
const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// lopdf-backed text parser and fallback page renderer.
///
/// Rendering does not rasterize vector content: it extracts the largest
/// embedded image of each page and scales it to the requested DPI. Scanned
/// identity documents carry one full-page raster per page, so this covers
/// them when PDFium is not installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Load a document, decrypting it when it only has an empty user password.
    pub fn open(data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok(doc)
    }

    /// Largest image embedded on a page, if any.
    fn page_image(doc: &Document, page_id: ObjectId) -> Option<DynamicImage> {
        let resources = page_resources(doc, page_id)?;
        let xobjects = resources.get(b"XObject").ok()?;
        let (_, xobjects) = doc.dereference(xobjects).ok()?;
        let xobjects = xobjects.as_dict().ok()?;

        xobjects
            .iter()
            .filter_map(|(_, obj)| doc.dereference(obj).ok())
            .filter_map(|(_, obj)| decode_image(doc, obj))
            .max_by_key(|img| img.width() as u64 * img.height() as u64)
    }
}

impl TextLayerParser for PdfExtractor {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        let doc = Self::open(data)?;
        let pages = doc.get_pages();

        let mut texts = Vec::with_capacity(pages.len());
        for &number in pages.keys() {
            match doc.extract_text(&[number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    trace!("lopdf could not extract text from page {}: {}", number, e);
                    texts.push(String::new());
                }
            }
        }

        debug!("lopdf extracted text from {} pages", texts.len());
        Ok(texts)
    }
}

impl PageRenderer for PdfExtractor {
    fn name(&self) -> &'static str {
        "lopdf images"
    }

    fn render_pages(&self, data: &[u8], max_pages: u32, dpi: u32) -> Result<Vec<(u32, DynamicImage)>> {
        let doc = Self::open(data)?;
        let mut rendered = Vec::new();

        for (&number, &page_id) in doc.get_pages().iter().take(max_pages as usize) {
            let Some(image) = Self::page_image(&doc, page_id) else {
                debug!("No raster image found on page {}", number);
                continue;
            };

            let target_width = (page_width_pt(&doc, page_id) * dpi as f32 / 72.0).round() as u32;
            let image = scale_to_width(image, target_width);
            debug!(
                "Rendered page {} at {} DPI: {}x{}",
                number,
                dpi,
                image.width(),
                image.height()
            );
            rendered.push((number, image));
        }

        Ok(rendered)
    }
}

fn scale_to_width(image: DynamicImage, target_width: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if target_width == 0 || width == 0 || width.abs_diff(target_width) <= 1 {
        return image;
    }

    let target_height = ((height as f64) * target_width as f64 / width as f64).round().max(1.0) as u32;
    image.resize_exact(target_width, target_height, FilterType::Lanczos3)
}

/// Page width in points from the (possibly inherited) MediaBox.
fn page_width_pt(doc: &Document, page_id: ObjectId) -> f32 {
    inherited_entry(doc, page_id, b"MediaBox")
        .and_then(|obj| match obj {
            Object::Array(values) if values.len() == 4 => {
                let x0 = values[0].as_float().ok()?;
                let x1 = values[2].as_float().ok()?;
                Some((x1 - x0).abs())
            }
            _ => None,
        })
        .filter(|w| *w > 0.0)
        .unwrap_or(DEFAULT_PAGE_WIDTH_PT)
}

fn page_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    match inherited_entry(doc, page_id, b"Resources")? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inherited values.
fn inherited_entry(doc: &Document, node_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = node_id;
    // Page trees are shallow; the bound guards against reference cycles.
    for _ in 0..32 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return doc.dereference(value).ok().map(|(_, obj)| obj.clone());
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn decode_image(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let Some(channels) = color_channels(doc, dict.get(b"ColorSpace").ok()) else {
        trace!("Unsupported color space");
        return None;
    };

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    raw_to_rgba(&data, width, height, channels)
}

/// Components per pixel of an image color space. A missing color space is
/// treated as RGB.
fn color_channels(doc: &Document, color_space: Option<&Object>) -> Option<usize> {
    let Some(color_space) = color_space else {
        return Some(3);
    };

    match doc.dereference(color_space).ok()?.1 {
        Object::Name(name) => family_channels(name),
        Object::Array(parts) => {
            let family = parts.first()?.as_name().ok()?;
            if family != b"ICCBased" {
                return family_channels(family);
            }
            // ICC profiles declare their component count as /N.
            let (_, profile) = doc.dereference(parts.get(1)?).ok()?;
            let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
            matches!(n, 1 | 3 | 4).then_some(n as usize)
        }
        _ => None,
    }
}

fn family_channels(family: &[u8]) -> Option<usize> {
    match family {
        b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(3),
        b"DeviceGray" | b"G" | b"CalGray" => Some(1),
        b"DeviceCMYK" | b"CMYK" => Some(4),
        _ => None,
    }
}

fn raw_to_rgba(data: &[u8], width: u32, height: u32, channels: usize) -> Option<DynamicImage> {
    let pixels = width as usize * height as usize;

    if data.len() < pixels * channels {
        trace!(
            "Image data too short: {} bytes for {}x{}x{}",
            data.len(),
            width,
            height,
            channels
        );
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for px in data[..pixels * channels].chunks_exact(channels) {
        match px {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            [c, m, y, k] => {
                let ink = |v: u8| ((255 - v as u16) * (255 - *k as u16) / 255) as u8;
                rgba.extend_from_slice(&[ink(*c), ink(*m), ink(*y), 255]);
            }
            _ => return None,
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

/// One US Letter page with a filled rectangle, or with `image` drawn on it.
#[cfg(test)]
pub(crate) fn single_page_pdf(image: impl FnOnce(&mut Document) -> Option<lopdf::Stream>) -> Vec<u8> {
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut resources = Dictionary::new();
    let content = match image(&mut doc) {
        Some(stream) => {
            let image_id = doc.add_object(stream);
            resources.set("XObject", dictionary! { "Im0" => image_id });
            b"q 200 0 0 200 72 400 cm /Im0 Do Q".to_vec()
        }
        None => b"0 0 0 rg 72 600 200 20 re f".to_vec(),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    #[test]
    fn test_open_rejects_garbage() {
        assert!(matches!(PdfExtractor::open(b"not a pdf"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_page_texts_rejects_garbage() {
        assert!(PdfExtractor::new().page_texts(b"%PDF-garbage").is_err());
    }

    #[test]
    fn test_raw_gray_to_rgba() {
        let img = raw_to_rgba(&[0, 128, 255, 64], 2, 2, 1).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.to_rgba8().get_pixel(1, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_raw_rgb_too_short() {
        assert!(raw_to_rgba(&[1, 2, 3], 2, 1, 3).is_none());
    }

    #[test]
    fn test_raw_cmyk_to_rgba() {
        let img = raw_to_rgba(&[0, 0, 0, 0, 0, 0, 0, 255], 2, 1, 4).unwrap();
        assert_eq!(img.to_rgba8().get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.to_rgba8().get_pixel(1, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_iccbased_scan_is_extracted() {
        let pdf = single_page_pdf(|doc| {
            let profile = doc.add_object(Stream::new(dictionary! { "N" => 1 }, Vec::new()));
            Some(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 2,
                    "Height" => 2,
                    "BitsPerComponent" => 8,
                    "ColorSpace" => vec![Object::Name(b"ICCBased".to_vec()), profile.into()],
                },
                vec![0, 64, 128, 255],
            ))
        });

        let pages = PdfExtractor::new().render_pages(&pdf, 3, 72).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].0, 1);
        assert_eq!(pages[0].1.width(), 612);
    }

    #[test]
    fn test_vector_page_has_no_embedded_image() {
        let pdf = single_page_pdf(|_| None);
        assert!(PdfExtractor::new().render_pages(&pdf, 3, 72).unwrap().is_empty());
    }

    #[test]
    fn test_scale_to_width_keeps_aspect() {
        let img = DynamicImage::new_rgb8(100, 50);
        let scaled = scale_to_width(img, 300);
        assert_eq!(scaled.dimensions(), (300, 150));
    }
}
