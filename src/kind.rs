use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Image,
    Text,
    Cad,
}

/// A source/target format pair the registry knows how to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionKind {
    Pdf2Word,
    Pdf2Excel,
    Pdf2Ppt,
    Pdf2Img,
    Pdf2Txt,
    Pdf2Cad,
    Img2Pdf,
    Img2Txt,
    Cad2Pdf,
}

impl ConversionKind {
    pub const ALL: [ConversionKind; 9] = [
        ConversionKind::Pdf2Word,
        ConversionKind::Pdf2Excel,
        ConversionKind::Pdf2Ppt,
        ConversionKind::Pdf2Img,
        ConversionKind::Pdf2Txt,
        ConversionKind::Pdf2Cad,
        ConversionKind::Img2Pdf,
        ConversionKind::Img2Txt,
        ConversionKind::Cad2Pdf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConversionKind::Pdf2Word => "pdf2word",
            ConversionKind::Pdf2Excel => "pdf2excel",
            ConversionKind::Pdf2Ppt => "pdf2ppt",
            ConversionKind::Pdf2Img => "pdf2img",
            ConversionKind::Pdf2Txt => "pdf2txt",
            ConversionKind::Pdf2Cad => "pdf2cad",
            ConversionKind::Img2Pdf => "img2pdf",
            ConversionKind::Img2Txt => "img2txt",
            ConversionKind::Cad2Pdf => "cad2pdf",
        }
    }

    pub fn source(self) -> Format {
        match self {
            ConversionKind::Pdf2Word
            | ConversionKind::Pdf2Excel
            | ConversionKind::Pdf2Ppt
            | ConversionKind::Pdf2Img
            | ConversionKind::Pdf2Txt
            | ConversionKind::Pdf2Cad => Format::Pdf,
            ConversionKind::Img2Pdf | ConversionKind::Img2Txt => Format::Image,
            ConversionKind::Cad2Pdf => Format::Cad,
        }
    }

    pub fn target(self) -> Format {
        match self {
            ConversionKind::Pdf2Word => Format::Word,
            ConversionKind::Pdf2Excel => Format::Excel,
            ConversionKind::Pdf2Ppt => Format::PowerPoint,
            ConversionKind::Pdf2Img => Format::Image,
            ConversionKind::Pdf2Txt | ConversionKind::Img2Txt => Format::Text,
            ConversionKind::Pdf2Cad => Format::Cad,
            ConversionKind::Img2Pdf | ConversionKind::Cad2Pdf => Format::Pdf,
        }
    }

    /// Extension of the produced file. `None` for kinds that write a directory.
    pub fn output_extension(self) -> Option<&'static str> {
        match self {
            ConversionKind::Pdf2Word => Some("docx"),
            ConversionKind::Pdf2Excel => Some("xlsx"),
            ConversionKind::Pdf2Ppt => Some("pptx"),
            ConversionKind::Pdf2Img => None,
            ConversionKind::Pdf2Txt | ConversionKind::Img2Txt => Some("txt"),
            ConversionKind::Pdf2Cad => Some("dxf"),
            ConversionKind::Img2Pdf | ConversionKind::Cad2Pdf => Some("pdf"),
        }
    }

    pub fn writes_directory(self) -> bool {
        self.output_extension().is_none()
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConversionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        ConversionKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| anyhow!("unknown conversion kind: {s}"))
    }
}

/// Raster formats the PDF rasterizer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Tiff,
}

impl ImageFormat {
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Tiff => "tiff",
        }
    }

    /// Extensions the rasterizer gives its page files.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Tiff => &["tif", "tiff"],
        }
    }
}

impl FromStr for ImageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            other => Err(anyhow!("unsupported image format: {other}")),
        }
    }
}
