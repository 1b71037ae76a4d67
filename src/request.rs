use crate::kind::ConversionKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PPT_DPI: u32 = 200;
pub const DEFAULT_IMG_DPI: u32 = 300;
pub const DEFAULT_IMG_FORMAT: &str = "png";
pub const DEFAULT_CAD_FORMAT: &str = "dxf";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Zero-based page index (pdf2excel).
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub dpi: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub kind: ConversionKind,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(kind: ConversionKind, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            input: input.into(),
            output: output.into(),
            options: ConversionOptions::default(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.options.page = page;
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = Some(dpi);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.options.format = Some(format.into());
        self
    }

    pub fn dpi_or(&self, default: u32) -> u32 {
        self.options.dpi.unwrap_or(default)
    }

    pub fn format_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.options.format.as_deref().unwrap_or(default)
    }
}

/// Outcome of one conversion as reported to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub outputs: Vec<PathBuf>,
}

impl ConversionResult {
    pub fn success(outputs: Vec<PathBuf>) -> Self {
        Self {
            ok: true,
            error: None,
            outputs,
        }
    }

    pub fn failure(err: &anyhow::Error) -> Self {
        Self {
            ok: false,
            error: Some(format!("{err:#}")),
            outputs: Vec::new(),
        }
    }

    pub fn primary_output(&self) -> Option<&Path> {
        self.outputs.first().map(PathBuf::as_path)
    }
}

impl From<anyhow::Result<Vec<PathBuf>>> for ConversionResult {
    fn from(res: anyhow::Result<Vec<PathBuf>>) -> Self {
        match res {
            Ok(outputs) => ConversionResult::success(outputs),
            Err(err) => ConversionResult::failure(&err),
        }
    }
}
