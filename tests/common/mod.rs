#![allow(dead_code)]

use anyhow::{bail, Result};
use docshift::{config::Config, Backend, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// How [`FakeBackend`] behaves when asked to run a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ok,
    /// Writes some output, then reports failure.
    FailAfterWriting,
    /// Reports success without writing anything.
    Silent,
}

/// Stands in for the external programs.
pub struct FakeBackend {
    pub mode: Mode,
    pub page_image: PathBuf,
    pub pages: u32,
    pub csv: Vec<u8>,
    pub ocr_text: String,
}

impl FakeBackend {
    pub fn new(page_image: &Path) -> Self {
        Self {
            mode: Mode::Ok,
            page_image: page_image.to_path_buf(),
            pages: 3,
            csv: b"name,qty\napple,3\npear,4.5\n".to_vec(),
            ocr_text: "recognized text".into(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    fn produce(&self, output: &Path, bytes: &[u8]) -> Result<()> {
        match self.mode {
            Mode::Ok => {
                std::fs::write(output, bytes)?;
                Ok(())
            }
            Mode::FailAfterWriting => {
                std::fs::write(output, bytes)?;
                bail!("fake tool crashed")
            }
            Mode::Silent => Ok(()),
        }
    }
}

impl Backend for FakeBackend {
    fn pdf_to_docx(&self, _input: &Path, output: &Path) -> Result<()> {
        self.produce(output, b"PK\x03\x04 fake docx")
    }

    fn extract_tables_csv(&self, _input: &Path, _page: u32) -> Result<Vec<u8>> {
        if self.mode == Mode::FailAfterWriting {
            bail!("fake extractor crashed");
        }
        Ok(self.csv.clone())
    }

    fn rasterize_pdf(
        &self,
        _input: &Path,
        out_prefix: &Path,
        _dpi: u32,
        format: ImageFormat,
    ) -> Result<()> {
        if self.mode == Mode::Silent {
            return Ok(());
        }
        let ext = format.extensions()[0];
        for n in 1..=self.pages {
            let target = PathBuf::from(format!("{}-{n}.{ext}", out_prefix.display()));
            std::fs::copy(&self.page_image, target)?;
        }
        if self.mode == Mode::FailAfterWriting {
            bail!("fake rasterizer crashed");
        }
        Ok(())
    }

    fn ocr_image(&self, _input: &Path) -> Result<String> {
        if self.mode == Mode::FailAfterWriting {
            bail!("fake ocr crashed");
        }
        Ok(self.ocr_text.clone())
    }

    fn export_vector(&self, _input: &Path, output: &Path, format: &str) -> Result<()> {
        self.produce(output, format!("0\nSECTION\n2\n{format}\n").as_bytes())
    }

    fn export_cad_pdf(&self, _input: &Path, output: &Path) -> Result<()> {
        self.produce(output, b"%PDF-1.4 fake")
    }
}

/// Config whose scratch directories land in `work_dir`.
pub fn config_with_work_dir(work_dir: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.paths.work_dir = work_dir.display().to_string();
    cfg
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// A one-page PDF with `text` drawn in Courier.
pub fn write_text_pdf(path: &Path, text: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
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
    doc.save(path).unwrap();
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    archive.file_names().map(str::to_string).collect()
}
