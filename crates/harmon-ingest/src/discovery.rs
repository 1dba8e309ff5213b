//! Wave file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Source format of a discovered wave file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveFormat {
    Sav,
    Csv,
}

/// A survey wave file found in a folder.
#[derive(Debug, Clone)]
pub struct WaveFile {
    pub path: PathBuf,
    /// Wave identifier derived from the file stem.
    pub wave_id: String,
    pub format: WaveFormat,
}

/// Derives a wave identifier from a path's file stem.
pub fn wave_id_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("wave")
        .to_string()
}

/// Classifies a path by extension.
pub fn classify_path(path: &Path) -> Option<WaveFormat> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    if ext.eq_ignore_ascii_case("sav") {
        Some(WaveFormat::Sav)
    } else if ext.eq_ignore_ascii_case("csv") {
        Some(WaveFormat::Csv)
    } else {
        None
    }
}

/// Lists the wave files of a folder, sorted by filename.
///
/// Only `.sav` and `.csv` files are returned; other entries are ignored.
pub fn discover_wave_files(dir: &Path) -> Result<Vec<WaveFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(format) = classify_path(&path) else {
            continue;
        };
        files.push(WaveFile {
            wave_id: wave_id_from_path(&path),
            path,
            format,
        });
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_wave_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in &[
            "ZA5913_v2-0-0.sav",
            "ZA6863_v1-0-0.sav",
            "extra_wave.csv",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"placeholder").unwrap();
        }
        dir
    }

    #[test]
    fn test_discover_wave_files() {
        let dir = create_wave_dir();
        let files = discover_wave_files(dir.path()).unwrap();

        // The .txt file is skipped, the rest sorted by filename.
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].wave_id, "ZA5913_v2-0-0");
        assert_eq!(files[0].format, WaveFormat::Sav);
        assert_eq!(files[2].wave_id, "extra_wave");
        assert_eq!(files[2].format, WaveFormat::Csv);
    }

    #[test]
    fn test_missing_directory() {
        let dir = create_wave_dir();
        let missing = dir.path().join("absent");
        assert!(matches!(
            discover_wave_files(&missing),
            Err(IngestError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_classify_path() {
        assert_eq!(classify_path(Path::new("a/b.SAV")), Some(WaveFormat::Sav));
        assert_eq!(classify_path(Path::new("a/b.csv")), Some(WaveFormat::Csv));
        assert_eq!(classify_path(Path::new("a/b.rds")), None);
        assert_eq!(classify_path(Path::new("a/b")), None);
    }
}
