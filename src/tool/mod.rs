pub mod process;

use crate::kind::ImageFormat;
use anyhow::Result;
use std::path::Path;

pub use process::ToolBackend;

/// The external collaborators a conversion can delegate to.
///
/// Every method either leaves its product where asked or returns an error.
pub trait Backend: Send + Sync {
    fn pdf_to_docx(&self, input: &Path, output: &Path) -> Result<()>;
    /// CSV text of the tables found on `page` (1-based).
    fn extract_tables_csv(&self, input: &Path, page: u32) -> Result<Vec<u8>>;
    /// Writes one file per page named `{out_prefix}-{n}.{ext}`.
    fn rasterize_pdf(
        &self,
        input: &Path,
        out_prefix: &Path,
        dpi: u32,
        format: ImageFormat,
    ) -> Result<()>;
    fn ocr_image(&self, input: &Path) -> Result<String>;
    fn export_vector(&self, input: &Path, output: &Path, format: &str) -> Result<()>;
    fn export_cad_pdf(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Values substituted into a tool's argument templates.
#[derive(Debug, Clone, Default)]
pub struct ToolVars {
    pub input: String,
    pub output: String,
    pub page: String,
    pub dpi: String,
    pub format: String,
}

impl ToolVars {
    pub fn new(input: &Path, output: &Path) -> Self {
        Self {
            input: input.display().to_string(),
            output: output.display().to_string(),
            ..Default::default()
        }
    }
}

/// Replaces `{input}`, `{output}`, `{page}`, `{dpi}` and `{format}` in each
/// template argument.
pub fn expand_args(templates: &[String], vars: &ToolVars) -> Vec<String> {
    templates
        .iter()
        .map(|t| {
            t.replace("{input}", &vars.input)
                .replace("{output}", &vars.output)
                .replace("{page}", &vars.page)
                .replace("{dpi}", &vars.dpi)
                .replace("{format}", &vars.format)
        })
        .collect()
}
