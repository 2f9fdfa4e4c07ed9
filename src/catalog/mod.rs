//! Font catalog: on-disk cache, loader, entry model and search.

pub mod cache;
pub mod entry;
pub mod loader;
pub mod search;

pub use cache::CatalogCache;
pub use entry::{normalize_variant_id, FontEntry, FontFileMap};
pub use loader::{CatalogLoader, LoaderState};
pub use search::{CatalogView, FilterTag, SearchField, SingleMatch};
