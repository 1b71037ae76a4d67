use super::{expand_args, Backend, ToolVars};
use crate::config::{Config, ToolSpec};
use crate::kind::ImageFormat;
use anyhow::{anyhow, bail, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs the configured external programs as subprocesses.
pub struct ToolBackend {
    cfg: Config,
}

impl ToolBackend {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    fn run(&self, name: &str, spec: &ToolSpec, vars: &ToolVars) -> Result<Output> {
        let program = resolve_program(&spec.program)
            .with_context(|| format!("external tool not found: {} ({name})", spec.program))?;
        let args = expand_args(&spec.args, vars);
        debug!(
            "{name} run {} {:?} timeout={}s",
            program.display(),
            args,
            spec.timeout_seconds
        );

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &spec.env {
            cmd.env(k, v);
        }
        #[cfg(unix)]
        if spec.timeout_seconds > 0 {
            // Own process group, so a timeout can take down helpers the tool forks.
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {name}: {}", program.display()))?;

        let output = if spec.timeout_seconds > 0 {
            wait_with_timeout(name, &mut child, Duration::from_secs(spec.timeout_seconds))?
        } else {
            child
                .wait_with_output()
                .with_context(|| format!("waiting for {name}"))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "{name} failed ({}): {}",
                output.status,
                stderr.trim()
            ));
        }

        if self.cfg.debug.keep_tool_stderr && !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("{name} stderr: {}", stderr.trim());
        }

        Ok(output)
    }
}

impl Backend for ToolBackend {
    fn pdf_to_docx(&self, input: &Path, output: &Path) -> Result<()> {
        self.run("pdf2docx", &self.cfg.tools.pdf2docx, &ToolVars::new(input, output))?;
        Ok(())
    }

    fn extract_tables_csv(&self, input: &Path, page: u32) -> Result<Vec<u8>> {
        let vars = ToolVars {
            input: input.display().to_string(),
            page: page.to_string(),
            ..Default::default()
        };
        let out = self.run("tabula", &self.cfg.tools.tabula, &vars)?;
        Ok(out.stdout)
    }

    fn rasterize_pdf(
        &self,
        input: &Path,
        out_prefix: &Path,
        dpi: u32,
        format: ImageFormat,
    ) -> Result<()> {
        let vars = ToolVars {
            dpi: dpi.to_string(),
            format: format.name().to_string(),
            ..ToolVars::new(input, out_prefix)
        };
        self.run("pdftoppm", &self.cfg.tools.pdftoppm, &vars)?;
        Ok(())
    }

    fn ocr_image(&self, input: &Path) -> Result<String> {
        let vars = ToolVars {
            input: input.display().to_string(),
            ..Default::default()
        };
        let out = self.run("tesseract", &self.cfg.tools.tesseract, &vars)?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn export_vector(&self, input: &Path, output: &Path, format: &str) -> Result<()> {
        let vars = ToolVars {
            format: format.to_string(),
            ..ToolVars::new(input, output)
        };
        self.run("inkscape", &self.cfg.tools.inkscape, &vars)?;
        Ok(())
    }

    fn export_cad_pdf(&self, input: &Path, output: &Path) -> Result<()> {
        self.run("librecad", &self.cfg.tools.librecad, &ToolVars::new(input, output))?;
        Ok(())
    }
}

/// Looks a program up on `PATH` (or takes it as a path when it has a
/// separator), expanding a leading `~/`.
pub fn resolve_program(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("empty program name"));
    }
    let p = expand_tilde(raw);
    which::which(&p).map_err(|e| anyhow!("{}: {e}", p.display()))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                debug!("pipe read ended early: {e}");
            }
        }
        buf
    })
}

/// Polls `child` until it exits or `timeout` passes. The pipes are drained
/// on their own threads so a chatty tool never stalls on a full buffer.
fn wait_with_timeout(name: &str, child: &mut Child, timeout: Duration) -> Result<Output> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().with_context(|| format!("polling {name}"))? {
            let stdout = stdout.join().map_err(|_| anyhow!("{name} stdout reader panicked"))?;
            let stderr = stderr.join().map_err(|_| anyhow!("{name} stderr reader panicked"))?;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    warn!("{name} timed out after {timeout:?}, killing it");
    kill_process_group(child);
    child
        .wait()
        .with_context(|| format!("reaping {name} after kill"))?;
    // Anything that escaped the group may still hold the pipes; give the
    // readers a moment and then leave them detached.
    let stderr = join_within(stderr, Duration::from_millis(500)).unwrap_or_default();
    bail!(
        "{name} exceeded timeout ({timeout:?}); stderr: {}",
        String::from_utf8_lossy(&stderr).trim()
    )
}

fn join_within(handle: JoinHandle<Vec<u8>>, grace: Duration) -> Option<Vec<u8>> {
    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    handle.join().ok()
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: plain syscall; a negative pid addresses the group the child leads.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}
