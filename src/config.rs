use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
    #[serde(default)]
    pub tools: Tools,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Directory that holds per-request scratch directories.
    pub fn work_dir(&self) -> PathBuf {
        if self.paths.work_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.paths.work_dir)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Empty means the system temp directory.
    pub work_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            work_dir: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub locale: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            locale: "en".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
            write_to_file: false,
            file_path: "docshift.log".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Debug {
    pub keep_tool_stderr: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            keep_tool_stderr: true,
        }
    }
}

/// One external program invocation. `args` are templates; see
/// [`crate::tool::expand_args`] for the placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Zero disables the timeout.
    pub timeout_seconds: u64,
    pub env: BTreeMap<String, String>,
}

impl ToolSpec {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout_seconds: 0,
            env: BTreeMap::new(),
        }
    }
}

/// A `[tools.<name>]` table as written in the file. Every key is optional and
/// falls back to that tool's built-in invocation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolOverride {
    program: Option<String>,
    args: Option<Vec<String>>,
    timeout_seconds: Option<u64>,
    env: BTreeMap<String, String>,
}

impl ToolOverride {
    fn over(self, mut base: ToolSpec) -> ToolSpec {
        if let Some(program) = self.program {
            base.program = program;
        }
        if let Some(args) = self.args {
            base.args = args;
        }
        if let Some(secs) = self.timeout_seconds {
            base.timeout_seconds = secs;
        }
        base.env.extend(self.env);
        base
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToolsFile {
    pdf2docx: ToolOverride,
    tabula: ToolOverride,
    pdftoppm: ToolOverride,
    tesseract: ToolOverride,
    inkscape: ToolOverride,
    librecad: ToolOverride,
}

impl From<ToolsFile> for Tools {
    fn from(file: ToolsFile) -> Self {
        let base = Tools::default();
        Self {
            pdf2docx: file.pdf2docx.over(base.pdf2docx),
            tabula: file.tabula.over(base.tabula),
            pdftoppm: file.pdftoppm.over(base.pdftoppm),
            tesseract: file.tesseract.over(base.tesseract),
            inkscape: file.inkscape.over(base.inkscape),
            librecad: file.librecad.over(base.librecad),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ToolsFile")]
pub struct Tools {
    pub pdf2docx: ToolSpec,
    pub tabula: ToolSpec,
    pub pdftoppm: ToolSpec,
    pub tesseract: ToolSpec,
    pub inkscape: ToolSpec,
    pub librecad: ToolSpec,
}
impl Default for Tools {
    fn default() -> Self {
        Self {
            pdf2docx: ToolSpec::new("pdf2docx", &["convert", "{input}", "{output}"]),
            tabula: ToolSpec::new(
                "tabula",
                &["--pages", "{page}", "--format", "CSV", "--silent", "{input}"],
            ),
            pdftoppm: ToolSpec::new(
                "pdftoppm",
                &["-r", "{dpi}", "-{format}", "{input}", "{output}"],
            ),
            tesseract: ToolSpec::new("tesseract", &["{input}", "stdout"]),
            inkscape: ToolSpec::new(
                "inkscape",
                &[
                    "{input}",
                    "--export-filename={output}",
                    "--export-type={format}",
                ],
            ),
            librecad: ToolSpec::new("librecad", &["dxf2pdf", "-o", "{output}", "{input}"]),
        }
    }
}

impl Tools {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ToolSpec)> {
        [
            ("pdf2docx", &self.pdf2docx),
            ("tabula", &self.tabula),
            ("pdftoppm", &self.pdftoppm),
            ("tesseract", &self.tesseract),
            ("inkscape", &self.inkscape),
            ("librecad", &self.librecad),
        ]
        .into_iter()
    }
}
