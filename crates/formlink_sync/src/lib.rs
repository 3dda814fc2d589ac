//! # formlink Sync
//!
//! Bidirectional synchronization between form widgets and URL query
//! parameters.
//!
//! This crate provides:
//! - Widget bindings (widget key, query key, codec, default)
//! - The default policy deciding when a value is left out of the URL
//! - The sync engine: initial-value resolution and the write path
//! - Change-handler chaining so user callbacks keep firing
//! - Typed widget constructors over any [`WidgetHost`]
//! - Permalink helpers over the widgets of a form
//!
//! ## Architecture
//!
//! Every render pass, for every widget:
//! 1. Resolve the initial value (query string on the first pass only)
//! 2. Render through the host with a chained change handler
//! 3. Write the live value back, deleting the key for defaults
//!
//! The host owns all state: the query parameters and the per-session
//! widget values. The engine only holds configuration.
//!
//! ## Key Invariants
//!
//! - After a sync, a non-default value has a query entry decoding to it
//! - After a sync, a default value has no query entry
//! - A widget only ever touches its own query key
//! - Widgets sharing a query key mirror the first one bound to it
//! - A malformed URL resets one field to its default and never aborts a pass
//! - The write path runs before the user's change handler

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod binding;
mod config;
mod engine;
mod error;
mod form;
mod host;
mod native;
mod permalink;
mod policy;

pub use binding::{Binding, BindingSet};
pub use config::SyncConfig;
pub use engine::{DecodeWarning, InitialSource, Resolution, SyncEngine, WriteOutcome};
pub use error::{ConfigurationError, SyncError, SyncResult};
pub use form::{Form, Widget};
pub use host::{ChangeCallback, ChangeContext, HostStores, WidgetHost, WidgetKind, WidgetRequest};
pub use native::NativeValue;
pub use permalink::KeySelection;
pub use policy::{is_default, Decision, DefaultPolicy};
