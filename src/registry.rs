use crate::{
    config::Config,
    convert::{self, Handler},
    kind::ConversionKind,
    request::{ConversionRequest, ConversionResult},
    tool::{Backend, ToolBackend},
    util::{ensure_dir, looks_like_url, parent_dir, resolve_path},
};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Maps each [`ConversionKind`] to its handler and runs requests against a
/// [`Backend`].
pub struct Registry<B: Backend> {
    cfg: Config,
    backend: B,
}

impl Registry<ToolBackend> {
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg, ToolBackend::new(cfg))
    }
}

impl<B: Backend> Registry<B> {
    pub fn new(cfg: &Config, backend: B) -> Self {
        Self {
            cfg: cfg.clone(),
            backend,
        }
    }

    pub fn handler(kind: ConversionKind) -> Handler<B> {
        match kind {
            ConversionKind::Pdf2Word => convert::pdf_to_word::<B>,
            ConversionKind::Pdf2Excel => convert::pdf_to_excel::<B>,
            ConversionKind::Pdf2Ppt => convert::pdf_to_ppt::<B>,
            ConversionKind::Pdf2Img => convert::pdf_to_images::<B>,
            ConversionKind::Pdf2Txt => convert::pdf_to_text::<B>,
            ConversionKind::Pdf2Cad => convert::pdf_to_cad::<B>,
            ConversionKind::Img2Pdf => convert::image_to_pdf::<B>,
            ConversionKind::Img2Txt => convert::image_to_text::<B>,
            ConversionKind::Cad2Pdf => convert::cad_to_pdf::<B>,
        }
    }

    /// Runs one request and returns the paths it produced.
    ///
    /// A failed conversion leaves nothing behind at the output path unless
    /// something was already there before the call.
    pub fn convert(&self, req: &ConversionRequest) -> Result<Vec<PathBuf>> {
        let started = Instant::now();
        info!(
            "convert kind={} input={} output={}",
            req.kind,
            req.input.display(),
            req.output.display()
        );
        debug!(?req.options, "options");

        validate_input(&req.input)?;
        if resolve_path(&req.input)? == resolve_path(&req.output)? {
            return Err(anyhow!(
                "output would overwrite input: {}",
                req.output.display()
            ));
        }

        let existed = req.output.exists();
        prepare_output(req)?;

        let handler = Self::handler(req.kind);
        match handler(&self.backend, &self.cfg, req) {
            Ok(outputs) => {
                info!(
                    "{} done outputs={} elapsed_ms={}",
                    req.kind,
                    outputs.len(),
                    started.elapsed().as_millis()
                );
                Ok(outputs)
            }
            Err(err) => {
                if !existed {
                    remove_partial(req);
                }
                Err(err.context(format!("{} failed", req.kind)))
            }
        }
    }

    pub fn execute(&self, req: &ConversionRequest) -> ConversionResult {
        let res = self.convert(req);
        if let Err(err) = &res {
            warn!("{err:#}");
        }
        ConversionResult::from(res)
    }
}

fn validate_input(input: &Path) -> Result<()> {
    let input_str = input.display().to_string();
    if looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are not supported: {input_str}"));
    }
    let meta = std::fs::metadata(input)
        .with_context(|| format!("input does not exist: {}", input.display()))?;
    if !meta.is_file() {
        return Err(anyhow!("input is not a file: {}", input.display()));
    }
    Ok(())
}

fn prepare_output(req: &ConversionRequest) -> Result<()> {
    if req.kind.writes_directory() {
        if req.output.is_file() {
            return Err(anyhow!(
                "output must be a directory: {}",
                req.output.display()
            ));
        }
        return ensure_dir(&req.output);
    }
    if req.output.is_dir() {
        return Err(anyhow!(
            "output is a directory: {}",
            req.output.display()
        ));
    }
    if let Some(parent) = parent_dir(&req.output) {
        ensure_dir(parent)?;
    }
    Ok(())
}

fn remove_partial(req: &ConversionRequest) {
    let res = if req.kind.writes_directory() {
        if req.output.is_dir() {
            std::fs::remove_dir_all(&req.output)
        } else {
            Ok(())
        }
    } else if req.output.exists() {
        std::fs::remove_file(&req.output)
    } else {
        Ok(())
    };
    if let Err(e) = res {
        warn!("could not remove partial output {}: {e}", req.output.display());
    }
}
