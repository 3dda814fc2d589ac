//! # formlink Store
//!
//! Adapters over the host framework's query parameters and session state.
//!
//! The host owns both the URL query map and the per-session widget values.
//! This crate defines the minimal interfaces the sync engine needs from
//! them, so the engine can be driven by any host and tested against
//! in-memory fakes.
//!
//! ## Design Principles
//!
//! - Stores are injected, never global
//! - Query writes take effect immediately in the current pass snapshot;
//!   visibility in the browser is the host's business
//! - Absence of a key is meaningful and distinct from an empty value
//!
//! ## Available Stores
//!
//! - [`InMemoryParamStore`] - Query parameters parsed from a query string
//! - [`InMemorySession`] - Widget values and initialization flags
//!
//! ## Example
//!
//! ```rust
//! use formlink_store::{InMemoryParamStore, ParamStore};
//!
//! let mut params = InMemoryParamStore::from_query_string("tags=a&tags=c");
//! assert_eq!(params.get_all("tags").unwrap(), vec!["a", "c"]);
//! params.delete("tags").unwrap();
//! assert_eq!(params.to_query_string(), "");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod params;
mod query_string;
mod session;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryParamStore, InMemorySession};
pub use params::ParamStore;
pub use query_string::{format_query, parse_query};
pub use session::SessionStore;
