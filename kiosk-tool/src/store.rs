use std::path::{Path, PathBuf};

use kiosk_core::{Category, CategoryId, CategoryRegistry, Item, ItemId, ItemStore, NewItem, StoreError};
use kiosk_json::JsonStore;
use kiosk_sqlite::SqliteStore;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Json,
    Sqlite,
}

impl BackendType {
    fn default_file_name(self) -> &'static str {
        match self {
            BackendType::Json => "items.json",
            BackendType::Sqlite => "items.sqlite3",
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(BackendType::Json),
            "sqlite" | "sqlite3" => Ok(BackendType::Sqlite),
            _ => Err(format!("unknown backend: {}", s)),
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Json => write!(f, "json"),
            BackendType::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Backend chosen at startup.
pub enum AnyStore {
    Json(JsonStore),
    Sqlite(SqliteStore),
}

impl AnyStore {
    pub fn open(backend: BackendType, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        match backend {
            BackendType::Json => Ok(Self::Json(JsonStore::open(path)?)),
            BackendType::Sqlite => Ok(Self::Sqlite(SqliteStore::open(path)?)),
        }
    }
}

impl CategoryRegistry for AnyStore {
    fn resolve(&self, name: &str) -> Result<CategoryId, StoreError> {
        match self {
            AnyStore::Json(s) => s.resolve(name),
            AnyStore::Sqlite(s) => s.resolve(name),
        }
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        match self {
            AnyStore::Json(s) => s.categories(),
            AnyStore::Sqlite(s) => s.categories(),
        }
    }
}

impl ItemStore for AnyStore {
    fn append(&self, item: NewItem) -> Result<Item, StoreError> {
        match self {
            AnyStore::Json(s) => s.append(item),
            AnyStore::Sqlite(s) => s.append(item),
        }
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        match self {
            AnyStore::Json(s) => s.list(),
            AnyStore::Sqlite(s) => s.list(),
        }
    }

    fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        match self {
            AnyStore::Json(s) => s.get(id),
            AnyStore::Sqlite(s) => s.get(id),
        }
    }

    fn search(&self, keyword: &str) -> Result<Vec<Item>, StoreError> {
        match self {
            AnyStore::Json(s) => s.search(keyword),
            AnyStore::Sqlite(s) => s.search(keyword),
        }
    }
}

pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kiosk")
}

pub fn default_store_path(backend: BackendType) -> PathBuf {
    data_dir().join(backend.default_file_name())
}
