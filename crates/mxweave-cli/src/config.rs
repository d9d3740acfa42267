//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use mxweave::{MxweaveError, config::AppConfig};

const LOCAL_CONFIG: &str = "mxweave/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for MxweaveError {
    fn from(err: ConfigError) -> Self {
        MxweaveError::Io(io::Error::other(err.to_string()))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (mxweave/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or holds invalid values
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, MxweaveError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "mxweave", "mxweave") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
/// - The background color is not a valid color
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, MxweaveError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<AppConfig, MxweaveError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .style()
        .background_color()
        .map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use mxweave::style::StyleClass;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r##"
            [layout]
            layer_pitch = 200.0
            char_width = 8.0

            [style]
            background_color = "#fafafa"
            styles = "styles.json"

            [style.overrides]
            er_entity = "er.entity"
            edge = "endArrow=open;"

            [output]
            hash = false
            extension = "xml"
            "##,
        )
        .unwrap();

        assert_eq!(config.layout().layer_pitch(), 200.0);
        assert_eq!(config.layout().slot_pitch(), 220.0);
        assert_eq!(config.style().styles(), Some(Path::new("styles.json")));
        assert_eq!(
            config.style().overrides().get(StyleClass::ErEntity),
            Some("er.entity")
        );
        assert!(!config.output().hash());
        assert_eq!(config.output().hash_length(), 8);
        assert_eq!(config.output().extension(), "xml");
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        let err = parse_config("[style]\nbackground_color = \"not a color\"\n").unwrap_err();
        assert!(err.to_string().contains("Validation error"));
    }

    #[test]
    fn test_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nhash_length = 12").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.output().hash_length(), 12);

        let missing = file.path().with_extension("absent");
        assert!(load_config(Some(&missing)).is_err());
    }
}
