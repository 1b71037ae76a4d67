use crate::{
    config::Config,
    i18n::Locale,
    kind::ConversionKind,
    registry::Registry,
    request::{
        ConversionRequest, DEFAULT_CAD_FORMAT, DEFAULT_IMG_DPI, DEFAULT_IMG_FORMAT,
        DEFAULT_PPT_DPI,
    },
    tool::process::resolve_program,
    util::{ensure_dir, parent_dir},
};
use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_CONFIG_FILE: &str = "docshift.toml";

#[derive(Parser, Debug)]
#[command(name = "docshift")]
#[command(about = "Convert between PDF, Office, image, text and CAD formats")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./docshift.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct Io {
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report which external tools are installed.
    Doctor {},
    /// PDF to Word (.docx).
    Pdf2word {
        #[command(flatten)]
        io: Io,
    },
    /// Tables on one PDF page to Excel (.xlsx).
    Pdf2excel {
        #[command(flatten)]
        io: Io,
        /// Zero-based page index.
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    /// PDF to PowerPoint (.pptx), one slide image per page.
    Pdf2ppt {
        #[command(flatten)]
        io: Io,
        #[arg(short, long, default_value_t = DEFAULT_PPT_DPI)]
        dpi: u32,
    },
    /// PDF pages to images in the output directory.
    Pdf2img {
        #[command(flatten)]
        io: Io,
        #[arg(short, long, default_value = DEFAULT_IMG_FORMAT)]
        format: String,
        #[arg(short, long, default_value_t = DEFAULT_IMG_DPI)]
        dpi: u32,
    },
    /// PDF to plain text.
    Pdf2txt {
        #[command(flatten)]
        io: Io,
    },
    /// PDF to a CAD/vector format.
    Pdf2cad {
        #[command(flatten)]
        io: Io,
        #[arg(short, long, default_value = DEFAULT_CAD_FORMAT)]
        format: String,
    },
    /// Image to a single-page PDF.
    Img2pdf {
        #[command(flatten)]
        io: Io,
    },
    /// Image text via OCR.
    Img2txt {
        #[command(flatten)]
        io: Io,
    },
    /// CAD drawing to PDF.
    Cad2pdf {
        #[command(flatten)]
        io: Io,
    },
}

impl Command {
    /// The conversion this subcommand asks for, or `None` for `doctor`.
    pub fn to_request(&self) -> Option<ConversionRequest> {
        let req = |kind: ConversionKind, io: &Io| {
            ConversionRequest::new(kind, io.input.clone(), io.output.clone())
        };
        let r = match self {
            Command::Doctor {} => return None,
            Command::Pdf2word { io } => req(ConversionKind::Pdf2Word, io),
            Command::Pdf2excel { io, page } => req(ConversionKind::Pdf2Excel, io).with_page(*page),
            Command::Pdf2ppt { io, dpi } => req(ConversionKind::Pdf2Ppt, io).with_dpi(*dpi),
            Command::Pdf2img { io, format, dpi } => req(ConversionKind::Pdf2Img, io)
                .with_format(format.clone())
                .with_dpi(*dpi),
            Command::Pdf2txt { io } => req(ConversionKind::Pdf2Txt, io),
            Command::Pdf2cad { io, format } => {
                req(ConversionKind::Pdf2Cad, io).with_format(format.clone())
            }
            Command::Img2pdf { io } => req(ConversionKind::Img2Pdf, io),
            Command::Img2txt { io } => req(ConversionKind::Img2Txt, io),
            Command::Cad2pdf { io } => req(ConversionKind::Cad2Pdf, io),
        };
        Some(r)
    }
}

/// Loads config and logging, then runs the subcommand. Returns the locale
/// alongside the outcome so the caller can word its final message.
pub fn dispatch(args: Args) -> (Locale, Result<()>) {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => match Config::load(&path) {
            Ok(cfg) => cfg,
            Err(err) => return (Locale::default(), Err(err)),
        },
        None => Config::default(),
    };
    let locale: Locale = cfg.output.locale.parse().unwrap_or_default();

    let _guard = match init_logging(&args, &cfg) {
        Ok(guard) => guard,
        Err(err) => return (locale, Err(err)),
    };

    let res = match args.cmd.to_request() {
        None => doctor(&cfg),
        Some(req) => run(&cfg, &req, locale),
    };
    (locale, res)
}

fn run(cfg: &Config, req: &ConversionRequest, locale: Locale) -> Result<()> {
    let registry = Registry::from_config(cfg);
    let outputs = registry.convert(req)?;
    for out in &outputs {
        info!("wrote {}", out.display());
    }
    println!("{}", locale.success());
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    let mut tools = serde_json::Map::new();
    for (name, spec) in cfg.tools.iter() {
        let status = match resolve_program(&spec.program) {
            Ok(path) => serde_json::json!({
                "program": spec.program,
                "path": path,
                "ok": true,
            }),
            Err(err) => serde_json::json!({
                "program": spec.program,
                "ok": false,
                "error": format!("missing: {err}"),
            }),
        };
        tools.insert(name.to_string(), status);
    }
    let kinds: Vec<_> = ConversionKind::ALL.iter().map(|k| k.name()).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "kinds": kinds,
            "work_dir": cfg.work_dir(),
            "tools": tools,
        }))?
    );
    Ok(())
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the user-facing result, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = parent_dir(path) {
            ensure_dir(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pdf2img_with_short_flags() {
        let args = Args::try_parse_from([
            "docshift", "pdf2img", "-i", "a.pdf", "-o", "pages", "-f", "jpg", "-d", "150",
        ])
        .unwrap();
        let req = args.cmd.to_request().unwrap();
        assert_eq!(req.kind, ConversionKind::Pdf2Img);
        assert_eq!(req.options.format.as_deref(), Some("jpg"));
        assert_eq!(req.options.dpi, Some(150));
    }

    #[test]
    fn pdf2excel_page_defaults_to_zero() {
        let args =
            Args::try_parse_from(["docshift", "pdf2excel", "--input", "a.pdf", "--output", "t.xlsx"])
                .unwrap();
        let req = args.cmd.to_request().unwrap();
        assert_eq!(req.options.page, 0);
    }

    #[test]
    fn pdf2ppt_defaults_dpi() {
        let args =
            Args::try_parse_from(["docshift", "pdf2ppt", "-i", "a.pdf", "-o", "d.pptx"]).unwrap();
        assert_eq!(args.cmd.to_request().unwrap().options.dpi, Some(DEFAULT_PPT_DPI));
    }

    #[test]
    fn input_and_output_are_required() {
        assert!(Args::try_parse_from(["docshift", "pdf2txt", "-i", "a.pdf"]).is_err());
        assert!(Args::try_parse_from(["docshift", "img2pdf", "-o", "a.pdf"]).is_err());
    }

    #[test]
    fn doctor_has_no_request() {
        let args = Args::try_parse_from(["docshift", "doctor"]).unwrap();
        assert!(args.cmd.to_request().is_none());
    }
}
