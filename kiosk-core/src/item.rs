use serde::Serialize;

use crate::{ImageName, StoreError};

/// Identifier of a stored item (1-based).
pub type ItemId = i64;

/// Identifier of a category.
pub type CategoryId = i64;

/// A catalog entry as returned by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub image_name: Option<ImageName>,
}

impl Item {
    /// Returns true if the name or the category contains `keyword`.
    ///
    /// Matching is case-sensitive; an empty keyword matches every item.
    pub fn matches(&self, keyword: &str) -> bool {
        self.name.contains(keyword) || self.category.contains(keyword)
    }
}

/// An item that has been validated but not yet assigned an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    name: String,
    category: String,
    image_name: Option<ImageName>,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image_name: Option<ImageName>,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        let category = category.into();
        if name.is_empty() {
            return Err(StoreError::invalid_input("item name is empty"));
        }
        if category.is_empty() {
            return Err(StoreError::invalid_input("category name is empty"));
        }
        Ok(NewItem {
            name,
            category,
            image_name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn image_name(&self) -> Option<&ImageName> {
        self.image_name.as_ref()
    }

    /// Attaches the identifier assigned by a store.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            category: self.category,
            image_name: self.image_name,
        }
    }
}

/// A distinct category name and its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
