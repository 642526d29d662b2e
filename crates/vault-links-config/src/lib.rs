use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings read from `~/.config/vault-links/config.toml`.
///
/// ```toml
/// vault_path = "~/notes"
/// preset = "convert"
///
/// [remap]
/// "Authentication System" = "02-backend/auth/Authentication System"
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Vault walked when no files are given on the command line
    #[serde(default)]
    pub vault_path: Option<PathBuf>,

    /// Preset used by the default command
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Old reference name to new vault-relative target (without `.md`)
    #[serde(default)]
    pub remap: BTreeMap<String, String>,
}

fn default_preset() -> String {
    "convert".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_path: None,
            preset: default_preset(),
            remap: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded vault path
        config.vault_path = config
            .vault_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/vault-links");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/vault-links/config.toml"));
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.vault_path, None);
        assert_eq!(config.preset, "convert");
        assert!(config.remap.is_empty());
    }

    #[test]
    fn test_parse_remap_table() {
        let config_content = r#"
preset = "migrate"

[remap]
"Authentication System" = "02-backend/auth/Authentication System"
Configuration = "05-operations/Configuration"
"#;

        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.preset, "migrate");
        assert_eq!(config.remap.len(), 2);
        assert_eq!(
            config.remap["Authentication System"],
            "02-backend/auth/Authentication System"
        );
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "vault_path = [not toml").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            r#"
vault_path = "/tmp/test-vault"
preset = "full"

[remap]
"API Design" = "02-backend/api/API Design"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.vault_path, Some(PathBuf::from("/tmp/test-vault")));
        assert_eq!(config.preset, "full");
        assert_eq!(config.remap["API Design"], "02-backend/api/API Design");
    }

    #[test]
    fn test_vault_path_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "vault_path = \"$VAULT_LINKS_ROOT/my-notes\"\n").unwrap();

        unsafe {
            env::set_var("VAULT_LINKS_ROOT", "/custom/notes");
        }

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.vault_path, Some(PathBuf::from("/custom/notes/my-notes")));

        unsafe {
            env::remove_var("VAULT_LINKS_ROOT");
        }
    }
}
