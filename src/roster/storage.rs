use super::types::Roster;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::Path;

/// Load a roster from a JSON file
///
/// If the file doesn't exist, returns a new empty roster.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_roster(path: &Path) -> Result<Roster> {
    if !path.exists() {
        return Ok(Roster::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open roster file at {}", path.display()))?;

    let roster: Roster = serde_json::from_reader(file).context("Failed to load roster")?;

    // Version check
    if roster.version != 1 {
        anyhow::bail!("Unsupported roster version: {}", roster.version);
    }

    Ok(roster)
}

/// Save a roster to a JSON file atomically
///
/// Uses atomic-write-file to ensure the file is never left in a corrupted
/// state. Creates parent directories if they don't exist.
pub fn save_roster(path: &Path, roster: &Roster) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, roster).context("Failed to serialize roster")?;

    file.commit().context("Failed to save roster")?;

    Ok(())
}
