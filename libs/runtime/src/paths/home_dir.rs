use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Platform base directory for per-user data: `%APPDATA%` on Windows, `$HOME`
/// elsewhere.
fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    match env::var_os(var) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => bail!("environment variable {var} is not set"),
    }
}

/// Expand a leading `~` against `home`.
pub fn expand_tilde(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

/// Resolve the application home directory to an absolute path.
///
/// - `Some(path)`: `~` is expanded, relative paths are anchored at the
///   current directory.
/// - `None`: `<platform base>/<default_subdir>`.
///
/// With `create`, the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => {
            let expanded = if raw.starts_with('~') {
                expand_tilde(&raw, &platform_base()?)
            } else {
                PathBuf::from(&raw)
            };
            if expanded.is_absolute() {
                expanded
            } else {
                env::current_dir()
                    .context("cannot read current directory")?
                    .join(expanded)
            }
        }
        None => platform_base()?.join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}
