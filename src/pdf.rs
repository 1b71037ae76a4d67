//! In-process PDF work done with `lopdf`: wrapping an image into a page and
//! pulling text out of a document.

use anyhow::{anyhow, Context, Result};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;
use tracing::debug;

/// Resolution images are placed at when wrapped into a PDF page.
pub const IMAGE_PDF_DPI: f32 = 100.0;

/// Writes a single-page PDF whose page is exactly the image at
/// [`IMAGE_PDF_DPI`].
pub fn image_to_pdf(input: &Path, output: &Path) -> Result<()> {
    let img = image::open(input).with_context(|| format!("decode image: {}", input.display()))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(anyhow!("image has no pixels: {}", input.display()));
    }
    let rgb = img.to_rgb8().into_raw();

    let page_w = width as f32 * 72.0 / IMAGE_PDF_DPI;
    let page_h = height as f32 * 72.0 / IMAGE_PDF_DPI;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb,
    ));

    let ops = format!("q\n{page_w:.4} 0 0 {page_h:.4} 0 0 cm\n/Im1 Do\nQ\n");
    let content_id = doc.add_object(Stream::new(dictionary! {}, ops.into_bytes()));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im1" => image_id },
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
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
    doc.compress();

    doc.save(output)
        .with_context(|| format!("write pdf: {}", output.display()))?;
    debug!("img2pdf {}x{} page={page_w:.1}x{page_h:.1}pt", width, height);
    Ok(())
}

/// Text of every page, in page order, joined with `\n`.
pub fn extract_text(input: &Path) -> Result<String> {
    let doc = Document::load(input).with_context(|| format!("load pdf: {}", input.display()))?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut texts = Vec::with_capacity(pages.len());
    for page in pages {
        let text = doc
            .extract_text(&[page])
            .with_context(|| format!("extract text from page {page}"))?;
        texts.push(text);
    }
    Ok(texts.join("\n"))
}

/// Pixel dimensions of every image XObject in the document.
pub fn embedded_image_sizes(input: &Path) -> Result<Vec<(u32, u32)>> {
    let doc = Document::load(input).with_context(|| format!("load pdf: {}", input.display()))?;
    let mut sizes = Vec::new();
    for obj in doc.objects.values() {
        let Object::Stream(stream) = obj else {
            continue;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .and_then(|s| s.as_name())
            .map(|n| n == b"Image")
            .unwrap_or(false);
        if !is_image {
            continue;
        }
        let w = stream.dict.get(b"Width").and_then(|v| v.as_i64())?;
        let h = stream.dict.get(b"Height").and_then(|v| v.as_i64())?;
        let w = u32::try_from(w).map_err(|_| anyhow!("image width out of range: {w}"))?;
        let h = u32::try_from(h).map_err(|_| anyhow!("image height out of range: {h}"))?;
        sizes.push((w, h));
    }
    Ok(sizes)
}
