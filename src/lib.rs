//! Local object storage with signed, expiring links for private objects.
//!
//! The [`services::storage::Storage`] trait is the capability callers depend
//! on; [`services::local_storage::LocalStorage`] implements it over a public
//! and a private directory. Links to private objects are produced by an
//! injected [`services::storage::SignedUrlBuilder`] and checked by
//! [`services::signature::SignatureVerifier`], both keyed with the same secret.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
