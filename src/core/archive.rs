use crate::domain::model::{ArchiveJob, ArchiveReport};
use crate::utils::error::{Result, ZipMailError};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

impl ArchiveJob {
    pub fn run(&self) -> Result<ArchiveReport> {
        archive(&self.source_dir, &self.dest_path)
    }
}

/// Pack every regular file under `source_dir` into a Deflate zip at `dest_path`.
///
/// Entries are named by their path relative to `source_dir` with `/` separators.
/// An existing `dest_path` is overwritten. Empty directories produce no entries.
/// Symlinks to files store the target's bytes; symlinked directories are not
/// descended into.
pub fn archive(source_dir: &Path, dest_path: &Path) -> Result<ArchiveReport> {
    if !source_dir.is_dir() {
        return Err(ZipMailError::SourceNotFound {
            path: source_dir.to_path_buf(),
        });
    }

    if let Some(parent) = dest_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    tracing::debug!(
        "Archiving {} into {}",
        source_dir.display(),
        dest_path.display()
    );

    let file = File::create(dest_path)?;
    // 目的檔若位於來源目錄內，不能把自己打包進去
    let dest_canonical = fs::canonicalize(dest_path).ok();

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    let mut uncompressed_bytes = 0u64;

    for entry in WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        // 檔案 symlink 以目標內容打包；目錄 symlink 不展開
        let is_file = if entry.path_is_symlink() {
            fs::metadata(entry.path())?.is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        if let Some(dest) = &dest_canonical {
            if fs::canonicalize(entry.path()).ok().as_ref() == Some(dest) {
                tracing::debug!("Skipping archive itself: {}", entry.path().display());
                continue;
            }
        }

        let name = entry_name(source_dir, entry.path());
        zip.start_file(name.as_str(), options)?;

        let mut reader = File::open(entry.path())?;
        let written = io::copy(&mut reader, &mut zip)?;
        tracing::debug!("Added {} ({} bytes)", name, written);

        entries += 1;
        uncompressed_bytes += written;
    }

    let file = zip.finish()?;
    let archive_bytes = file.metadata()?.len();

    tracing::info!(
        "📦 Archived {} file(s), {} bytes -> {} bytes",
        entries,
        uncompressed_bytes,
        archive_bytes
    );

    Ok(ArchiveReport {
        path: dest_path.to_path_buf(),
        entries,
        uncompressed_bytes,
        archive_bytes,
    })
}

/// Relative path of `path` under `root`, joined with `/`.
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
