use crate::error::{ProcessingError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

pub fn is_zip_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

fn is_csv_member(name: &Path) -> bool {
    let hidden = name
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with("__MACOSX"));

    !hidden
        && name
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
}

/// Unpacks the CSV members of a zipped trip log.
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every `.csv` member of `zip_path` under `dest_dir`, keeping
    /// each member's relative path, and return the extracted paths in
    /// archive order.
    pub fn extract_csv_members(&self, zip_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(zip_path)?;
        let mut archive = ZipArchive::new(file)?;
        std::fs::create_dir_all(dest_dir)?;

        let mut extracted = Vec::new();

        for i in 0..archive.len() {
            let mut member = archive.by_index(i)?;
            if member.is_dir() {
                continue;
            }

            let member_path = match member.enclosed_name() {
                Some(p) => p.to_path_buf(),
                None => continue,
            };
            if !is_csv_member(&member_path) {
                continue;
            }

            let dest_path = dest_dir.join(&member_path);
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut writer = BufWriter::new(File::create(&dest_path)?);
            std::io::copy(&mut member, &mut writer)?;
            writer.flush()?;

            debug!(
                archive = %zip_path.display(),
                member = %member_path.display(),
                "extracted archive member"
            );
            extracted.push(dest_path);
        }

        if extracted.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "No CSV files found in archive '{}'",
                zip_path.display()
            )));
        }

        Ok(extracted)
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}
