use crate::{Category, CategoryId, Item, ItemId, NewItem, StoreError};

/// Maps category names to stable identifiers.
///
/// Categories are created on first use and never renamed or removed.
/// Resolving a name that already exists performs no writes.
pub trait CategoryRegistry {
    /// Returns the identifier for `name`, creating the category if needed.
    fn resolve(&self, name: &str) -> Result<CategoryId, StoreError>;

    /// Lists every known category, oldest first.
    fn categories(&self) -> Result<Vec<Category>, StoreError>;
}

/// Durable, append-only storage for catalog items.
///
/// Every successful `append` is on disk before it returns, and every read
/// goes back to the storage medium. All methods take `&self`; stores
/// serialize writers internally.
pub trait ItemStore: CategoryRegistry {
    /// Resolves the item's category and stores the item under the next
    /// identifier.
    fn append(&self, item: NewItem) -> Result<Item, StoreError>;

    /// Returns all items in insertion order.
    fn list(&self) -> Result<Vec<Item>, StoreError>;

    /// Returns the item with the given identifier, or `NotFound`.
    fn get(&self, id: ItemId) -> Result<Item, StoreError>;

    /// Returns the items whose name or category contains `keyword`, in
    /// insertion order.
    ///
    /// The default filters `list()`; backends that can push the filter down
    /// must keep the same case-sensitive containment semantics.
    fn search(&self, keyword: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = self.list()?;
        items.retain(|item| item.matches(keyword));
        Ok(items)
    }
}
