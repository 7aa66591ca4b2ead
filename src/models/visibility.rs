//! Visibility classes for stored objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an object may be served without authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Servable by anyone at a permanent URL.
    #[serde(rename = "public", alias = "public-read")]
    PublicRead,
    /// Only reachable through a signed, expiring URL.
    #[serde(rename = "private")]
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 2] = [Visibility::PublicRead, Visibility::Private];

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::PublicRead => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
