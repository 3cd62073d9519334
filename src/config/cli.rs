use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Resolve the project root that holds `output/` and `.env`.
///
/// An explicit root wins. Otherwise the root is the directory containing the
/// executable, or its parent when the executable lives in `<root>/bin/`.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }

    let exe = std::env::current_exe()?;
    Ok(root_from_executable(&exe))
}

pub fn root_from_executable(exe: &Path) -> PathBuf {
    let exe_dir = exe.parent().unwrap_or_else(|| Path::new("."));

    match (exe_dir.file_name(), exe_dir.parent()) {
        (Some(name), Some(parent)) if name == "bin" => parent.to_path_buf(),
        _ => exe_dir.to_path_buf(),
    }
}
