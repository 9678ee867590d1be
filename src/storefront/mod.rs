//! Storefront core - the client side of the shop
//!
//! Loads the catalog (cache first, remote second), searches it in memory,
//! and keeps the shopper's cart in durable local storage. Everything here
//! is constructed explicitly and passed by reference; there is no global
//! state.

pub mod cart;
pub mod loader;
pub mod search;
pub mod session;
pub mod state;
pub mod storage;

pub use cart::{CartError, CartStore, Receipt};
pub use loader::{CatalogLoader, LoadError};
pub use search::{BookSort, SearchCriteria, price_bounds, search};
pub use session::CatalogSession;
pub use state::{Catalog, CatalogEvent, LoadingState, reduce};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
