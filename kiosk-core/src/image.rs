use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::StoreError;

/// Extension appended to every derived image name.
pub const IMAGE_EXTENSION: &str = ".jpg";

const DIGEST_HEX_LEN: usize = 64;

/// Name under which an uploaded image is stored.
///
/// An image name is the lowercase hex SHA-256 of the upload's base file name
/// followed by `.jpg`. It never contains caller-controlled text, so it is
/// safe to join onto an image directory.
///
/// Image names are serialized as plain strings and validated on the way in.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageName(String);

impl ImageName {
    /// Derives the image name for an uploaded file.
    ///
    /// Everything from the first `.` onward is discarded before hashing, so
    /// `cat.png`, `cat.jpg` and `cat.tar.gz` all map to the digest of `cat`.
    /// Uploads that share a base name share an image name.
    pub fn derive(filename: &str) -> Self {
        let base = base_name(filename);
        let digest = Sha256::digest(base.as_bytes());

        let mut name = String::with_capacity(DIGEST_HEX_LEN + IMAGE_EXTENSION.len());
        for byte in digest.iter() {
            name.push_str(&format!("{:02x}", byte));
        }
        name.push_str(IMAGE_EXTENSION);
        ImageName(name)
    }

    /// Parses a previously derived image name.
    ///
    /// Accepts exactly 64 lowercase hex characters followed by `.jpg`.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let digest = s.strip_suffix(IMAGE_EXTENSION).ok_or_else(|| {
            StoreError::invalid_input(format!("image name must end with {IMAGE_EXTENSION}: {s:?}"))
        })?;

        let well_formed = digest.len() == DIGEST_HEX_LEN
            && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !well_formed {
            return Err(StoreError::invalid_input(format!("malformed image name: {s:?}")));
        }

        Ok(ImageName(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Returns the part of `filename` before its first `.`.
fn base_name(filename: &str) -> &str {
    filename.split_once('.').map_or(filename, |(base, _)| base)
}

impl fmt::Debug for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageName({})", self.0)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ImageName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ImageName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ImageName::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn derive_known_digest() {
        let name = ImageName::derive("abc.png");
        assert_eq!(name.as_str(), format!("{ABC_SHA256}.jpg"));
    }

    #[test]
    fn derive_deterministic() {
        assert_eq!(ImageName::derive("cat.png"), ImageName::derive("cat.png"));
    }

    #[test]
    fn derive_ignores_extension() {
        assert_eq!(ImageName::derive("cat.png"), ImageName::derive("cat.jpg"));
        assert_eq!(ImageName::derive("cat.png"), ImageName::derive("cat"));
    }

    #[test]
    fn derive_splits_on_first_dot() {
        assert_eq!(ImageName::derive("cat.tar.gz"), ImageName::derive("cat"));
        assert_ne!(ImageName::derive("cat.tar.gz"), ImageName::derive("cat.tar"));
    }

    #[test]
    fn derive_different_names() {
        assert_ne!(ImageName::derive("cat.jpg"), ImageName::derive("dog.jpg"));
    }

    #[test]
    fn derive_shape() {
        let name = ImageName::derive("../../etc/passwd");
        assert_eq!(name.as_str().len(), 68); // 64 hex chars + ".jpg"
        assert!(name.as_str().ends_with(".jpg"));
        assert!(!name.as_str().contains('/'));
    }

    #[test]
    fn parse_accepts_derived() {
        let name = ImageName::derive("guitar.jpeg");
        let parsed = ImageName::parse(name.as_str()).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn parse_rejects_foreign_names() {
        let bad_names = vec![
            String::new(),
            "default.jpg".to_string(),
            "../secret.jpg".to_string(),
            format!("{ABC_SHA256}.png"),
            format!("{}.jpg", ABC_SHA256.to_uppercase()),
            format!("{}.jpg", &ABC_SHA256[..63]),
        ];
        for bad in &bad_names {
            let err = ImageName::parse(bad).unwrap_err();
            assert!(matches!(err, StoreError::InvalidInput(_)), "{bad:?}");
        }
    }

    #[test]
    fn deserialize_validates() {
        let ok: ImageName = serde_json::from_str(&format!("\"{ABC_SHA256}.jpg\"")).unwrap();
        assert_eq!(ok.to_string(), format!("{ABC_SHA256}.jpg"));

        let err = serde_json::from_str::<ImageName>("\"../../etc/passwd\"");
        assert!(err.is_err());
    }
}
