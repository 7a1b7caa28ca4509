pub mod init;
mod schema;

pub use schema::{validate_config, Config};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/markscale/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("markscale")
}

/// Get the default config file path (~/.config/markscale/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Get the default roster file path (~/.config/markscale/roster.json)
pub fn get_default_roster_path() -> PathBuf {
    get_config_dir().join("roster.json")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory at {}",
                config_dir.display()
            )
        })?;
    }
    Ok(())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path
///   (~/.config/markscale/config.yaml)
///
/// A missing default config file is not an error: markscale works out of
/// the box with all defaults. An explicitly passed path must exist.
///
/// # Errors
///
/// Returns an error if an explicit config file does not exist, or any
/// config file cannot be read or parsed.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_missing_explicit_config_errors() {
        let temp_path = env::temp_dir().join("markscale_test_no_config.yaml");
        let _ = std::fs::remove_file(&temp_path);
        assert!(load_config(Some(temp_path)).is_err());
    }

    #[test]
    fn test_load_explicit_config() {
        let temp_path = env::temp_dir().join("markscale_test_config.yaml");
        std::fs::write(&temp_path, "default_method: percentile\n").unwrap();

        let config = load_config(Some(temp_path.clone())).unwrap();
        assert_eq!(config.default_method.as_deref(), Some("percentile"));

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_load_invalid_yaml_errors() {
        let temp_path = env::temp_dir().join("markscale_test_bad_config.yaml");
        std::fs::write(&temp_path, "default_method: [unclosed\n").unwrap();

        let result = load_config(Some(temp_path.clone()));
        assert!(result.is_err());

        let _ = std::fs::remove_file(&temp_path);
    }
}
