//! # formlink Testkit
//!
//! Test utilities for formlink.
//!
//! This crate provides:
//! - [`FakeHost`], a scripted widget host with in-memory stores
//! - Property-based generators pairing codecs with values in their domain
//!
//! ## Usage
//!
//! ```rust
//! use formlink_sync::SyncEngine;
//! use formlink_testkit::prelude::*;
//!
//! let mut host = FakeHost::with_query("subscribe=true");
//! let engine = SyncEngine::default();
//! let subscribe = host
//!     .pass(&engine, |form| form.checkbox("subscribe", false).show())
//!     .unwrap();
//! assert!(subscribe);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
