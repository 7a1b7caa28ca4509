use super::types::Autosave;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Autosave file path for a given roster path:
/// `roster.json` -> `roster.autosave.json` in the same directory
pub fn autosave_path(roster_path: &Path) -> PathBuf {
    let stem = roster_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("roster");
    roster_path.with_file_name(format!("{}.autosave.json", stem))
}

/// Load an autosave snapshot if one exists.
///
/// Returns Ok(None) when no snapshot is present. A snapshot that cannot
/// be parsed is also reported as None: recovery falls back to nothing
/// rather than failing the command that tried to offer it.
pub fn load_autosave(path: &Path) -> Result<Option<Autosave>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open autosave file at {}", path.display()))?;

    match serde_json::from_reader::<_, Autosave>(file) {
        Ok(autosave) if autosave.version == 1 => Ok(Some(autosave)),
        _ => Ok(None),
    }
}

/// Write the autosave snapshot atomically
pub fn save_autosave(path: &Path, autosave: &Autosave) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer(&mut file, autosave).context("Failed to serialize autosave")?;

    file.commit().context("Failed to save autosave")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::types::{Roster, Student};
    use std::env;

    #[test]
    fn test_autosave_path_sibling_file() {
        let path = autosave_path(Path::new("/data/roster.json"));
        assert_eq!(path, PathBuf::from("/data/roster.autosave.json"));
    }

    #[test]
    fn test_load_missing_returns_none() {
        let temp_path = env::temp_dir().join("markscale_test_autosave_missing.json");
        let _ = std::fs::remove_file(&temp_path);
        assert!(load_autosave(&temp_path).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("markscale_test_autosave_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut roster = Roster::new();
        roster.add_student(Student::new("S1", "Ada"));
        let autosave = Autosave::new(roster);

        save_autosave(&temp_path, &autosave).unwrap();
        let loaded = load_autosave(&temp_path).unwrap().unwrap();

        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.roster.students.len(), 1);
        assert_eq!(loaded.roster.students[0].id, "S1");

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_load_corrupt_autosave_returns_none() {
        let temp_path = env::temp_dir().join("markscale_test_autosave_corrupt.json");
        std::fs::write(&temp_path, "{ not json").unwrap();

        assert!(load_autosave(&temp_path).unwrap().is_none());

        let _ = std::fs::remove_file(&temp_path);
    }
}
