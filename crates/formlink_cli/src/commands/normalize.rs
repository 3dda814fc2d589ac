//! Normalize command implementation.

use crate::error::CliResult;
use crate::schema::Schema;
use formlink_codec::CodecRegistry;
use formlink_store::{InMemoryParamStore, InMemorySession, ParamStore};
use formlink_sync::{SyncEngine, WriteOutcome};
use std::path::Path;
use tracing::{debug, info};

/// Rewrites `query` the way a page built from `schema` would leave it.
///
/// Every field key is re-encoded canonically and dropped when it holds the
/// default. Keys no field owns, and excluded keys, are kept as they are.
pub fn normalize(schema: &Schema, registry: &CodecRegistry, query: &str) -> CliResult<String> {
    let bindings = schema.bindings(registry)?;
    let engine = SyncEngine::new(schema.config.clone());
    let mut params = InMemoryParamStore::from_query_string(query);
    let mut session = InMemorySession::new();

    let mut resolved = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let resolution = engine.resolve_initial(binding, &params, &mut session)?;
        resolved.push((binding, resolution.value));
    }
    for (binding, value) in &resolved {
        if engine.config().is_excluded(binding.param_key()) {
            continue;
        }
        params.delete(binding.param_key())?;
        if engine.write(binding, value, &mut params)? == WriteOutcome::Written {
            debug!(param = binding.param_key(), "re-encoded");
        }
    }

    let query = params.to_query_string();
    Ok(if query.is_empty() {
        query
    } else {
        format!("?{query}")
    })
}

/// Runs the normalize command.
pub fn run(schema_path: &Path, query: &str) -> CliResult<()> {
    info!(schema = %schema_path.display(), "normalizing query string");
    let schema = Schema::load(schema_path)?;
    println!("{}", normalize(&schema, &CodecRegistry::new(), query)?);
    Ok(())
}
