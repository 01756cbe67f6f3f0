use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$HORIZONTE_HOME`, else `$HOME/.horizonte`.
pub fn horizonte_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("HORIZONTE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".horizonte"))
}

pub fn ensure_horizonte_home() -> Result<PathBuf> {
    let dir = horizonte_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Daily chat transcripts live here.
pub fn chat_dir() -> Result<PathBuf> {
    let dir = ensure_horizonte_home()?.join("chat");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
