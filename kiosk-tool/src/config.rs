use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::ToolError;
use crate::store::{BackendType, data_dir, default_store_path};

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendType,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ImagesConfig {
    pub dir: Option<PathBuf>,
}

/// Effective settings after merging CLI flags, config file and defaults.
#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub backend: BackendType,
    pub store_path: PathBuf,
    pub images_dir: PathBuf,
}

impl Config {
    /// CLI values win over the config file; the file wins over defaults.
    pub fn resolve(
        self,
        cli_backend: Option<BackendType>,
        cli_store: Option<PathBuf>,
        cli_images: Option<PathBuf>,
    ) -> Settings {
        let backend = cli_backend.unwrap_or(self.store.backend);
        let store_path = cli_store
            .or(self.store.path)
            .unwrap_or_else(|| default_store_path(backend));
        let images_dir = cli_images
            .or(self.images.dir)
            .unwrap_or_else(|| data_dir().join("images"));

        Settings {
            backend,
            store_path,
            images_dir,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kiosk").join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ToolError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Loads the user's config file, falling back to defaults if it is missing
/// or invalid.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }

    load_config_from(&path).unwrap_or_else(|e| {
        warn!("ignoring config file {}: {}", path.display(), e);
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [store]
            backend = "sqlite"
            path = "/srv/kiosk/items.sqlite3"

            [images]
            dir = "/srv/kiosk/images"
            "#,
        )
        .unwrap();

        let settings = config.resolve(None, None, None);
        assert_eq!(settings.backend, BackendType::Sqlite);
        assert_eq!(settings.store_path, PathBuf::from("/srv/kiosk/items.sqlite3"));
        assert_eq!(settings.images_dir, PathBuf::from("/srv/kiosk/images"));
    }

    #[test]
    fn cli_overrides_file() {
        let config: Config = toml::from_str("[store]\nbackend = \"sqlite\"\npath = \"a.sqlite3\"").unwrap();

        let settings = config.resolve(
            Some(BackendType::Json),
            Some(PathBuf::from("b.json")),
            Some(PathBuf::from("img")),
        );
        assert_eq!(settings.backend, BackendType::Json);
        assert_eq!(settings.store_path, PathBuf::from("b.json"));
        assert_eq!(settings.images_dir, PathBuf::from("img"));
    }

    #[test]
    fn defaults_follow_backend() {
        let settings = Config::default().resolve(Some(BackendType::Sqlite), None, None);
        assert!(settings.store_path.ends_with("kiosk/items.sqlite3"));
        assert!(settings.images_dir.ends_with("kiosk/images"));

        let settings = Config::default().resolve(None, None, None);
        assert_eq!(settings.backend, BackendType::Json);
        assert!(settings.store_path.ends_with("kiosk/items.json"));
    }

    #[test]
    fn invalid_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\nbackend = \"rocks\"").unwrap();

        assert!(matches!(load_config_from(&path), Err(ToolError::Config(_))));
    }
}
