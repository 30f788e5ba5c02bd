use tracing::instrument;

use crate::{Category, ImageName, Item, ItemId, ItemStore, NewItem, StoreError};

/// Entry point for catalog operations, layered over any `ItemStore`.
///
/// The catalog holds no state of its own: there is no cache, so every read
/// reflects what is on the storage medium at the time of the call. It is
/// `Sync` whenever the store is, and reads may run from many threads at once.
pub struct Catalog<S> {
    store: S,
}

impl<S: ItemStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Catalog { store }
    }

    /// Validates and stores a new item.
    ///
    /// When an image file name is given, the stored image name is derived
    /// from it; the caller is responsible for writing the image bytes under
    /// that name.
    #[instrument(level = "debug", skip(self))]
    pub fn add(
        &self,
        name: &str,
        category: &str,
        image_filename: Option<&str>,
    ) -> Result<Item, StoreError> {
        let image_name = image_filename.map(ImageName::derive);
        let item = NewItem::new(name, category, image_name)?;
        self.store.append(item)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.store.list()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn search(&self, keyword: &str) -> Result<Vec<Item>, StoreError> {
        self.store.search(keyword)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound(id));
        }
        self.store.get(id)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.store.categories()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
