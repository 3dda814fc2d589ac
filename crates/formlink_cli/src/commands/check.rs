//! Check command implementation.

use crate::error::CliResult;
use crate::schema::Schema;
use formlink_codec::CodecRegistry;
use std::path::Path;
use tracing::info;

/// Validates every field of a schema and returns the number of fields.
pub fn check(schema: &Schema, registry: &CodecRegistry) -> CliResult<usize> {
    let bindings = schema.bindings(registry)?;
    Ok(bindings.len())
}

/// Runs the check command.
pub fn run(schema_path: &Path) -> CliResult<()> {
    info!(schema = %schema_path.display(), "checking schema");
    let schema = Schema::load(schema_path)?;
    match check(&schema, &CodecRegistry::new()) {
        Ok(count) => {
            println!("✓ {count} fields OK");
            Ok(())
        }
        Err(err) => {
            println!("✗ Schema check failed");
            Err(err)
        }
    }
}
