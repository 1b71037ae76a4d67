use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

/// Parent directory of `p`, or `None` when `p` is a bare file name.
pub fn parent_dir(p: &Path) -> Option<&Path> {
    p.parent().filter(|d| !d.as_os_str().is_empty())
}

pub fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

/// Absolute form of `p` with `.`/`..` removed and symlinks followed for the
/// part of the path that exists. The rest is resolved lexically, so a path
/// that does not exist yet still compares equal to its real target.
pub fn resolve_path(p: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(p).with_context(|| format!("absolute {}", p.display()))?;
    let mut out = PathBuf::new();
    for comp in abs.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => {
                out.push(other);
                if let Ok(real) = out.canonicalize() {
                    out = real;
                }
            }
        }
    }
    Ok(out)
}
