//! Minimal Office Open XML package writers.
//!
//! Only what the converters need: an image-per-slide presentation and a
//! single-sheet workbook.

pub mod pptx;
pub mod xlsx;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use pptx::write_image_deck;
pub use xlsx::write_workbook;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub(crate) struct Package {
    zip: ZipWriter<File>,
    options: SimpleFileOptions,
}

impl Package {
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("create package: {}", path.display()))?;
        Ok(Self {
            zip: ZipWriter::new(file),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        })
    }

    pub(crate) fn part(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.zip
            .start_file(name, self.options)
            .with_context(|| format!("start part {name}"))?;
        self.zip
            .write_all(bytes)
            .with_context(|| format!("write part {name}"))?;
        Ok(())
    }

    pub(crate) fn xml(&mut self, name: &str, body: &str) -> Result<()> {
        let doc = format!("{XML_DECL}\n{body}");
        self.part(name, doc.as_bytes())
    }

    pub(crate) fn finish(self) -> Result<()> {
        let mut file = self.zip.finish().with_context(|| "finish package")?;
        file.flush()?;
        Ok(())
    }
}

/// One `<Relationship>` entry.
pub(crate) struct Rel<'a> {
    pub id: String,
    pub rel_type: &'a str,
    pub target: String,
}

pub(crate) fn relationships(rels: &[Rel<'_>]) -> String {
    let mut out = format!(r#"<Relationships xmlns="{NS_PKG_REL}">"#);
    for r in rels {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            r.id, NS_REL, r.rel_type, r.target
        ));
    }
    out.push_str("</Relationships>");
    out
}

pub(crate) fn content_types(defaults: &[(&str, &str)], overrides: &[(String, &str)]) -> String {
    let mut out = format!(r#"<Types xmlns="{NS_CONTENT_TYPES}">"#);
    for (ext, ct) in defaults {
        out.push_str(&format!(r#"<Default Extension="{ext}" ContentType="{ct}"/>"#));
    }
    for (part, ct) in overrides {
        out.push_str(&format!(r#"<Override PartName="{part}" ContentType="{ct}"/>"#));
    }
    out.push_str("</Types>");
    out
}

pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids most C0 controls.
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}
