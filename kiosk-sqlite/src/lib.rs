//! SQLite-backed store for Kiosk.
//!
//! Schema:
//!
//! ```sql
//! category(id INTEGER PRIMARY KEY, name TEXT UNIQUE NOT NULL)
//! items(id INTEGER PRIMARY KEY, name TEXT NOT NULL,
//!       category_id INTEGER REFERENCES category(id), image_name TEXT)
//! ```
//!
//! `image_name` is the empty string for items without an image.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use kiosk_core::{
    Category, CategoryId, CategoryRegistry, ImageName, Item, ItemId, ItemStore, NewItem,
    StoreError,
};
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior, params};

const SCHEMA: &str = "
    PRAGMA journal_mode=WAL;
    PRAGMA foreign_keys=ON;
    PRAGMA synchronous=FULL;

    CREATE TABLE IF NOT EXISTS category (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category_id INTEGER NOT NULL REFERENCES category(id),
        image_name TEXT NOT NULL DEFAULT ''
    );
";

const SELECT_ITEMS: &str = "SELECT i.id, i.name, c.name, i.image_name
     FROM items AS i JOIN category AS c ON i.category_id = c.id";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A persistent store backed by SQLite.
///
/// Writes go through a single connection guarded by a mutex; each append
/// runs category resolution and the item insert in one immediate
/// transaction. Reads open their own read-only connection, so in WAL mode
/// they run in parallel and see the last committed state without waiting
/// for an in-flight append.
pub struct SqliteStore {
    path: PathBuf,
    writer: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens a SQLite store at the given path.
    ///
    /// Creates the database file, its parent directories and the schema if
    /// they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(StoreError::unavailable)?;
        }

        let conn = Connection::open(path).map_err(storage_error)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(storage_error)?;
        conn.execute_batch(SCHEMA).map_err(storage_error)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(conn),
        })
    }

    fn writer(&self) -> MutexGuard<'_, Connection> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reader(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(storage_error)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(storage_error)?;
        Ok(conn)
    }
}

/// Maps driver errors onto the store taxonomy.
///
/// Values that cannot be decoded are encoding failures; everything else
/// (unreachable file, corruption, locking) means the medium is unavailable.
fn storage_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::encoding(e),
        _ => StoreError::unavailable(e),
    }
}

/// Parse an Item from a row with column order (id, name, category, image_name).
fn parse_item_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let image: Option<String> = row.get(3)?;
    let image_name = match image.as_deref() {
        None | Some("") => None,
        Some(s) => Some(
            ImageName::parse(s)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        ),
    };

    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        image_name,
    })
}

fn query_items(conn: &Connection, sql: &str, keyword: Option<&str>) -> rusqlite::Result<Vec<Item>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = match keyword {
        Some(keyword) => stmt.query_map([keyword], parse_item_row)?,
        None => stmt.query_map([], parse_item_row)?,
    };
    rows.collect()
}

/// Returns the id of category `name`, inserting it if absent.
fn resolve_category(conn: &Connection, name: &str) -> rusqlite::Result<CategoryId> {
    let existing = conn
        .query_row("SELECT id FROM category WHERE name = ?1", [name], |row| row.get(0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute("INSERT INTO category (name) VALUES (?1)", [name])?;
    Ok(conn.last_insert_rowid())
}

impl CategoryRegistry for SqliteStore {
    fn resolve(&self, name: &str) -> Result<CategoryId, StoreError> {
        if name.is_empty() {
            return Err(StoreError::invalid_input("category name is empty"));
        }

        let mut conn = self.writer();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage_error)?;
        let id = resolve_category(&tx, name).map_err(storage_error)?;
        tx.commit().map_err(storage_error)?;
        Ok(id)
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.reader()?;
        let mut stmt = conn
            .prepare("SELECT id, name FROM category ORDER BY id ASC")
            .map_err(storage_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(storage_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_error)
    }
}

impl ItemStore for SqliteStore {
    fn append(&self, item: NewItem) -> Result<Item, StoreError> {
        let mut conn = self.writer();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage_error)?;

        let category_id = resolve_category(&tx, item.category()).map_err(storage_error)?;
        let image_name = item.image_name().map(ImageName::as_str).unwrap_or_default();
        tx.execute(
            "INSERT INTO items (name, category_id, image_name) VALUES (?1, ?2, ?3)",
            params![item.name(), category_id, image_name],
        )
        .map_err(storage_error)?;
        let id = tx.last_insert_rowid();

        tx.commit().map_err(storage_error)?;
        Ok(item.into_item(id))
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        let sql = format!("{SELECT_ITEMS} ORDER BY i.id ASC");
        query_items(&self.reader()?, &sql, None).map_err(storage_error)
    }

    fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        let sql = format!("{SELECT_ITEMS} WHERE i.id = ?1");
        self.reader()?
            .query_row(&sql, [id], parse_item_row)
            .optional()
            .map_err(storage_error)?
            .ok_or(StoreError::NotFound(id))
    }

    /// Case-sensitive containment via `instr`; `LIKE` would fold ASCII case.
    fn search(&self, keyword: &str) -> Result<Vec<Item>, StoreError> {
        if keyword.is_empty() {
            return self.list();
        }
        let sql = format!(
            "{SELECT_ITEMS} WHERE instr(i.name, ?1) > 0 OR instr(c.name, ?1) > 0 ORDER BY i.id ASC"
        );
        query_items(&self.reader()?, &sql, Some(keyword)).map_err(storage_error)
    }
}
