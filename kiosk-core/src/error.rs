use thiserror::Error;

use crate::ItemId;

/// Boxed source error carried by the storage-level variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type shared by every catalog backend.
///
/// The set of variants is closed so callers can branch on the kind of
/// failure (reject the request, report a missing record, retry later)
/// without inspecting messages.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A caller-supplied field was empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No item exists at the requested identifier.
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// The storage medium could not be reached, written, or is corrupted.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] BoxError),

    /// Persisted data could not be parsed or serialized.
    #[error("encoding failure: {0}")]
    EncodingFailure(#[source] BoxError),
}

impl StoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        StoreError::InvalidInput(message.into())
    }

    pub fn unavailable(source: impl Into<BoxError>) -> Self {
        StoreError::StorageUnavailable(source.into())
    }

    pub fn encoding(source: impl Into<BoxError>) -> Self {
        StoreError::EncodingFailure(source.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = StoreError::unavailable(io);
        assert_eq!(err.to_string(), "storage unavailable: read-only");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn not_found_reports_id() {
        assert_eq!(StoreError::NotFound(4).to_string(), "item not found: 4");
    }
}
