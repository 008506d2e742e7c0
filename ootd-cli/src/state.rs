use anyhow::{Context, Result};
use ootd_core::{Garment, UserId};
use std::fs;
use std::path::{Path, PathBuf};

/// `$OOTD_HOME`, or `~/.ootd`.
pub fn ootd_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("OOTD_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ootd"))
}

pub fn ensure_ootd_home() -> Result<PathBuf> {
    let dir = ootd_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read a JSON array of garments and assign them all to `user_id`.
pub fn read_wardrobe_json(path: &Path, user_id: UserId) -> Result<Vec<Garment>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut garments: Vec<Garment> =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    for g in &mut garments {
        g.user_id = user_id;
    }
    Ok(garments)
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}
