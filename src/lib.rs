//! Search, download and install web fonts from the Google Fonts catalog.
//!
//! The catalog is loaded through [`catalog::CatalogLoader`] (24h on-disk
//! cache, single-flight network loads), narrowed with
//! [`catalog::CatalogView`] searches, and a resolved entry's variants are
//! fetched and placed by [`app::RetrieveUseCase`].

pub mod app;
pub mod catalog;
pub mod common;
pub mod config;
pub mod infra;
pub mod observability;

// Re-export commonly used types
pub use app::RetrieveUseCase;
pub use catalog::{CatalogCache, CatalogLoader, CatalogView, FontEntry, SearchField, SingleMatch};
pub use common::{CatalogError, Destination, FontError, FontFormat, Result, RetrievalResult, TransportError};
pub use config::Config;
pub use infra::{PlatformRegistrar, ReqwestHttp};
