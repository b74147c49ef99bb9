//! ZIP extraction into the download directory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use subjects_fast_shared::{Result, SubjectsFastError};
use tracing::debug;
use zip::ZipArchive;

/// Extract every file of `zip_path` into `target_dir`, overwriting existing
/// files. Returns the extracted file paths in archive order.
///
/// Entries whose names would escape `target_dir` are rejected.
pub(crate) fn extract_archive(zip_path: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(zip_path).map_err(|e| SubjectsFastError::io(zip_path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| SubjectsFastError::archive(zip_path, format!("not a readable ZIP: {e}")))?;

    let mut extracted = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| SubjectsFastError::archive(zip_path, format!("entry {index}: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(SubjectsFastError::archive(
                zip_path,
                format!("refusing unsafe entry path '{}'", entry.name()),
            ));
        };
        let out = target_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out).map_err(|e| SubjectsFastError::io(&out, e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SubjectsFastError::io(parent, e))?;
        }

        let mut dest = File::create(&out).map_err(|e| SubjectsFastError::io(&out, e))?;
        let written = std::io::copy(&mut entry, &mut dest).map_err(|e| {
            SubjectsFastError::archive(zip_path, format!("failed to extract {}: {e}", out.display()))
        })?;

        debug!(path = %out.display(), bytes = written, "extracted");
        extracted.push(out);
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "subjects-fast-extract-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_files_next_to_archive() {
        let dir = temp_dir();
        let zip_path = dir.join("FASTEvent.marcxml.zip");
        write_zip(&zip_path, &[("FASTEvent.marcxml", "<collection/>")]);

        let extracted = extract_archive(&zip_path, &dir).unwrap();
        assert_eq!(extracted, vec![dir.join("FASTEvent.marcxml")]);
        assert_eq!(
            std::fs::read_to_string(dir.join("FASTEvent.marcxml")).unwrap(),
            "<collection/>"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn overwrites_existing_files() {
        let dir = temp_dir();
        std::fs::write(dir.join("FASTTitle.marcxml"), "stale").unwrap();
        let zip_path = dir.join("FASTTitle.marcxml.zip");
        write_zip(&zip_path, &[("FASTTitle.marcxml", "fresh")]);

        extract_archive(&zip_path, &dir).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("FASTTitle.marcxml")).unwrap(), "fresh");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_path_traversal() {
        let dir = temp_dir();
        let zip_path = dir.join("evil.zip");
        write_zip(&zip_path, &[("../escape.marcxml", "x")]);

        let err = extract_archive(&zip_path, &dir).unwrap_err();
        assert!(err.to_string().contains("unsafe entry path"));
        assert!(!dir.parent().unwrap().join("escape.marcxml").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_non_zip_data() {
        let dir = temp_dir();
        let zip_path = dir.join("broken.zip");
        std::fs::write(&zip_path, b"<html>Service Unavailable</html>").unwrap();

        let err = extract_archive(&zip_path, &dir).unwrap_err();
        assert!(matches!(err, SubjectsFastError::Archive { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
