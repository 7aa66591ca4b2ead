pub mod signed_url;

pub use signed_url::require_signed_url;
