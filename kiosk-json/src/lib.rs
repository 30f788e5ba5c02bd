//! JSON document-backed store for Kiosk.
//!
//! The whole catalog lives in one JSON document:
//!
//! ```json
//! {
//!   "items": [
//!     { "name": "Bike", "category": "Sports" },
//!     { "name": "Guitar", "category": "Music", "image": "<sha256>.jpg" }
//!   ],
//!   "categories": ["Sports", "Music"]
//! }
//! ```
//!
//! Item identifiers are 1-based positions in `items`; category identifiers
//! are 1-based positions in `categories`. Both are stable because records are
//! only ever appended. Documents without `categories` are accepted and the
//! registry is rebuilt from the items in order of first appearance.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use indexmap::IndexSet;
use kiosk_core::{
    Category, CategoryId, CategoryRegistry, ImageName, Item, ItemId, ItemStore, NewItem,
    StoreError,
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    items: Vec<Record>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    categories: IndexSet<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    name: String,
    category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<ImageName>,
}

impl Document {
    /// Returns the category's identifier, inserting it if absent.
    fn resolve(&mut self, name: &str) -> CategoryId {
        let (index, _) = self.categories.insert_full(name.to_string());
        index as CategoryId + 1
    }

    fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.categories
            .get_index_of(name)
            .map(|index| index as CategoryId + 1)
    }

    /// Registers categories referenced by items but missing from the
    /// registry, in order of first appearance.
    fn reconcile(&mut self) {
        for record in &self.items {
            if !self.categories.contains(&record.category) {
                self.categories.insert(record.category.clone());
            }
        }
    }

    fn item(&self, index: usize) -> Option<Item> {
        self.items.get(index).map(|record| Item {
            id: index as ItemId + 1,
            name: record.name.clone(),
            category: record.category.clone(),
            image_name: record.image.clone(),
        })
    }

    fn into_items(self) -> Vec<Item> {
        self.items
            .into_iter()
            .enumerate()
            .map(|(index, record)| Item {
                id: index as ItemId + 1,
                name: record.name,
                category: record.category,
                image_name: record.image,
            })
            .collect()
    }
}

/// A persistent store holding the catalog in a single JSON file.
///
/// Writers are serialized through a lock owned by the store and replace the
/// file atomically (write to a temporary file in the same directory, sync,
/// rename), so readers never observe a partially written document. Readers
/// share the lock with each other.
///
/// The lock is per instance: open one `JsonStore` per file and share it.
pub struct JsonStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonStore {
    /// Opens a store backed by the file at `path`.
    ///
    /// The file itself is created on the first write; missing parent
    /// directories are created now.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let dir = parent_dir(&path);
        fs::create_dir_all(dir).map_err(StoreError::unavailable)?;
        Ok(Self {
            path,
            lock: RwLock::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Document, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(StoreError::unavailable(e)),
        };
        let mut document: Document = serde_json::from_slice(&bytes).map_err(StoreError::encoding)?;
        document.reconcile();
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(StoreError::encoding)?;

        let mut file = NamedTempFile::new_in(parent_dir(&self.path)).map_err(StoreError::unavailable)?;
        file.write_all(&bytes).map_err(StoreError::unavailable)?;
        file.as_file().sync_all().map_err(StoreError::unavailable)?;
        file.persist(&self.path)
            .map_err(|e| StoreError::unavailable(e.error))?;
        sync_dir(parent_dir(&self.path)).map_err(StoreError::unavailable)?;
        Ok(())
    }
}

/// Flushes a directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Directory holding `path`; the current directory for bare file names.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

impl CategoryRegistry for JsonStore {
    fn resolve(&self, name: &str) -> Result<CategoryId, StoreError> {
        if name.is_empty() {
            return Err(StoreError::invalid_input("category name is empty"));
        }

        {
            let _read = self.lock.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(id) = self.load()?.category_id(name) {
                return Ok(id);
            }
        }

        let _write = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.load()?;
        if let Some(id) = document.category_id(name) {
            return Ok(id);
        }
        let id = document.resolve(name);
        self.save(&document)?;
        Ok(id)
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let _read = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        let document = self.load()?;
        Ok(document
            .categories
            .into_iter()
            .enumerate()
            .map(|(index, name)| Category {
                id: index as CategoryId + 1,
                name,
            })
            .collect())
    }
}

impl ItemStore for JsonStore {
    fn append(&self, item: NewItem) -> Result<Item, StoreError> {
        let _write = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.load()?;

        document.resolve(item.category());
        document.items.push(Record {
            name: item.name().to_string(),
            category: item.category().to_string(),
            image: item.image_name().cloned(),
        });
        self.save(&document)?;

        Ok(item.into_item(document.items.len() as ItemId))
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        let _read = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.into_items())
    }

    /// Looks the item up by its position in the document (`items[id - 1]`).
    fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        let Some(index) = id.checked_sub(1).and_then(|i| usize::try_from(i).ok()) else {
            return Err(StoreError::NotFound(id));
        };

        let _read = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.load()?.item(index).ok_or(StoreError::NotFound(id))
    }
}
