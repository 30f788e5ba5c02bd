//! Kiosk is the persistence layer of a small item catalog.
//!
//! Core concepts:
//! - **Item**: a catalog entry with a name, a category and an optional image
//! - **ImageName**: the digest-based name under which an item's image is stored
//! - **CategoryRegistry**: resolves category names to stable identifiers
//! - **ItemStore**: durable, append-only item storage with list/search/get
//! - **Catalog**: the query layer callers use, generic over the store
//!
//! Storage backends live in their own crates (`kiosk-json`, `kiosk-sqlite`)
//! and are interchangeable behind `ItemStore`.
//!
//! # Example
//!
//! ```
//! use kiosk_core::ImageName;
//!
//! let name = ImageName::derive("bike.png");
//! assert!(name.as_str().ends_with(".jpg"));
//! assert_eq!(name, ImageName::derive("bike.jpeg"));
//! ```
//!
//! # Image names
//!
//! The base name of an upload is everything before its FIRST dot, so
//! `photo.v2.png` and `photo.png` share an image name. Callers relying on
//! distinct images per upload must give uploads distinct base names.

mod catalog;
mod error;
mod image;
mod item;
mod store;

pub use catalog::Catalog;
pub use error::{BoxError, StoreError};
pub use image::{IMAGE_EXTENSION, ImageName};
pub use item::{Category, CategoryId, Item, ItemId, NewItem};
pub use store::{CategoryRegistry, ItemStore};
