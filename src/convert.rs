//! One handler per conversion kind. Each takes the request's paths and
//! options, drives the backend or an in-process helper, and returns the
//! files it produced.

use crate::{
    config::Config,
    kind::ImageFormat,
    ooxml, pdf,
    request::{
        ConversionRequest, DEFAULT_CAD_FORMAT, DEFAULT_IMG_DPI, DEFAULT_IMG_FORMAT,
        DEFAULT_PPT_DPI,
    },
    tool::Backend,
    util::ensure_dir,
};
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub type Handler<B> = fn(&B, &Config, &ConversionRequest) -> Result<Vec<PathBuf>>;

pub fn pdf_to_word<B: Backend>(
    backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    backend.pdf_to_docx(&req.input, &req.output)?;
    ensure_produced(&req.output)
}

pub fn pdf_to_excel<B: Backend>(
    backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    let page = req.options.page + 1;
    let csv = backend.extract_tables_csv(&req.input, page)?;
    let rows = parse_table_csv(&csv)?;
    if rows.is_empty() {
        bail!("no tables found on page {page}");
    }
    debug!("pdf2excel page={page} rows={}", rows.len());
    ooxml::write_workbook(&req.output, "Sheet1", &rows)?;
    Ok(vec![req.output.clone()])
}

pub fn pdf_to_ppt<B: Backend>(
    backend: &B,
    cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    let dpi = req.dpi_or(DEFAULT_PPT_DPI);
    // Dropping the guard removes the page images on every early return.
    let scratch = scratch_dir(cfg, "pdf2ppt")?;
    backend.rasterize_pdf(&req.input, &scratch.path().join("page"), dpi, ImageFormat::Png)?;

    let pages = collect_pages(scratch.path(), "page", ImageFormat::Png)?;
    if pages.is_empty() {
        bail!("rasterizer produced no pages");
    }
    debug!("pdf2ppt dpi={dpi} pages={}", pages.len());
    ooxml::write_image_deck(&req.output, &pages)?;

    scratch
        .close()
        .with_context(|| "removing pdf2ppt scratch dir")?;
    Ok(vec![req.output.clone()])
}

pub fn pdf_to_images<B: Backend>(
    backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    let format: ImageFormat = req.format_or(DEFAULT_IMG_FORMAT).parse()?;
    let dpi = req.dpi_or(DEFAULT_IMG_DPI);
    let stem = req
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");

    // Rasterize next to the destination so stale pages from an earlier run
    // never count as output, then move this run's pages into place.
    let scratch = tempfile::Builder::new()
        .prefix(".docshift-pdf2img-")
        .tempdir_in(&req.output)
        .with_context(|| format!("create scratch dir in {}", req.output.display()))?;
    backend.rasterize_pdf(&req.input, &scratch.path().join(stem), dpi, format)?;

    let pages = collect_pages(scratch.path(), stem, format)?;
    if pages.is_empty() {
        bail!("rasterizer produced no pages in {}", req.output.display());
    }
    let mut outputs = Vec::with_capacity(pages.len());
    for page in pages {
        let Some(name) = page.file_name() else {
            continue;
        };
        let dest = req.output.join(name);
        std::fs::rename(&page, &dest)
            .with_context(|| format!("move page to {}", dest.display()))?;
        outputs.push(dest);
    }
    scratch
        .close()
        .with_context(|| "removing pdf2img scratch dir")?;
    Ok(outputs)
}

pub fn pdf_to_text<B: Backend>(
    _backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    let text = pdf::extract_text(&req.input)?;
    write_text(&req.output, &text)
}

pub fn pdf_to_cad<B: Backend>(
    backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    let format = req.format_or(DEFAULT_CAD_FORMAT);
    backend.export_vector(&req.input, &req.output, format)?;
    ensure_produced(&req.output)
}

pub fn image_to_pdf<B: Backend>(
    _backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    pdf::image_to_pdf(&req.input, &req.output)?;
    Ok(vec![req.output.clone()])
}

pub fn image_to_text<B: Backend>(
    backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    let text = backend.ocr_image(&req.input)?;
    write_text(&req.output, &text)
}

pub fn cad_to_pdf<B: Backend>(
    backend: &B,
    _cfg: &Config,
    req: &ConversionRequest,
) -> Result<Vec<PathBuf>> {
    backend.export_cad_pdf(&req.input, &req.output)?;
    ensure_produced(&req.output)
}

fn write_text(output: &Path, text: &str) -> Result<Vec<PathBuf>> {
    std::fs::write(output, text)
        .with_context(|| format!("write text: {}", output.display()))?;
    Ok(vec![output.to_path_buf()])
}

/// Tools can exit 0 without writing anything; treat that as a failure.
fn ensure_produced(output: &Path) -> Result<Vec<PathBuf>> {
    match std::fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => Ok(vec![output.to_path_buf()]),
        _ => Err(anyhow!("tool produced no output: {}", output.display())),
    }
}

fn scratch_dir(cfg: &Config, label: &str) -> Result<TempDir> {
    let root = cfg.work_dir();
    ensure_dir(&root)?;
    tempfile::Builder::new()
        .prefix(&format!(".docshift-{label}-"))
        .tempdir_in(&root)
        .with_context(|| format!("create scratch dir in {}", root.display()))
}

/// Rows of the extractor's CSV, skipping blank lines. Rows may differ in
/// length.
pub fn parse_table_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.with_context(|| "parsing table CSV")?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Page files named `{stem}-{n}.{ext}` in `dir`, ordered by page number.
/// The rasterizer zero-pads `n` for long documents, so ordering is numeric.
pub fn collect_pages(dir: &Path, stem: &str, format: ImageFormat) -> Result<Vec<PathBuf>> {
    let prefix = format!("{stem}-");
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        let path = entry?.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !format.extensions().contains(&ext.to_ascii_lowercase().as_str()) {
            continue;
        }
        let Some(number) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(&prefix))
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        pages.push((number, path));
    }
    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}
