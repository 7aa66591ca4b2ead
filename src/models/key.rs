//! Object keys: forward-slash separated relative paths.

use serde::{Serialize, Serializer};
use std::{fmt, path::PathBuf};
use thiserror::Error;

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Reason a raw key string was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidKey {
    #[error("key is empty")]
    Empty,
    #[error("key exceeds 1024 bytes")]
    TooLong,
    #[error("key must be relative")]
    Absolute,
    #[error("key contains an empty, `.` or `..` segment")]
    BadSegment,
    #[error("key contains a backslash or control character")]
    BadCharacter,
    #[error("key resolves outside its storage root")]
    EscapesRoot,
}

/// A validated object key.
///
/// Construction goes through [`ObjectKey::parse`], so a value of this type can
/// never name a path outside the root it is joined onto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate a raw key.
    ///
    /// Rejects keys that are empty, too long, start with `/`, contain empty,
    /// `.` or `..` segments, or contain backslashes, NUL or other ASCII control
    /// characters. Nothing is normalized: `a//b` and `a/./b` are refused rather
    /// than rewritten.
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidKey> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidKey::Empty);
        }
        if raw.len() > MAX_OBJECT_KEY_LEN {
            return Err(InvalidKey::TooLong);
        }
        if raw.starts_with('/') {
            return Err(InvalidKey::Absolute);
        }
        if raw
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(InvalidKey::BadCharacter);
        }
        if raw
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(InvalidKey::BadSegment);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Last segment of the key, used as the download filename.
    pub fn file_name(&self) -> &str {
        self.segments().last().unwrap_or(&self.0)
    }

    /// Relative filesystem path built segment by segment.
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ObjectKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
