//! Core value types shared by the storage backends and the HTTP layer.
//!
//! An object is addressed by a validated [`ObjectKey`] and lives under the
//! root selected by its [`Visibility`]. No metadata record is kept anywhere
//! else: existence and visibility come from the filesystem itself.

pub mod base_url;
pub mod key;
pub mod visibility;

pub use base_url::{BaseUrl, InvalidBaseUrl};
pub use key::{InvalidKey, ObjectKey};
pub use visibility::Visibility;
