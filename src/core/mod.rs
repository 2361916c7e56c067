//! Core configuration types: the document, its parser and the store.

mod builder;
mod document;
mod loader;
mod store;

pub use builder::ConfigStoreBuilder;
pub use document::{ConfigDocument, HostConfig};
pub use loader::{DocumentFormat, load_document, load_document_as, parse_document};
pub use store::{ConfigStore, DEFAULT_HOST_KEY, DEFAULT_LOG_LEVEL, Snapshot};
