//! Resolve command implementation.

use crate::error::{CliError, CliResult};
use crate::schema::Schema;
use formlink_codec::{CodecRegistry, Value};
use formlink_store::{InMemoryParamStore, InMemorySession};
use formlink_sync::{InitialSource, SyncEngine};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// The value one field starts with for a given URL.
#[derive(Debug, Serialize)]
pub struct ResolvedField {
    /// Widget key.
    pub key: String,
    /// Query key.
    pub param_key: String,
    /// Initial value.
    pub value: Value,
    /// `query` or `default`.
    pub source: &'static str,
}

/// Initial values of every field for a given URL.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    /// Fields in schema order.
    pub fields: Vec<ResolvedField>,
    /// Query values that were rejected.
    pub warnings: Vec<String>,
}

/// Resolves the fields of `schema` as a first visit to `query` would.
pub fn resolve(schema: &Schema, registry: &CodecRegistry, query: &str) -> CliResult<ResolveReport> {
    let bindings = schema.bindings(registry)?;
    let engine = SyncEngine::new(schema.config.clone());
    let params = InMemoryParamStore::from_query_string(query);
    let mut session = InMemorySession::new();

    let mut report = ResolveReport {
        fields: Vec::with_capacity(bindings.len()),
        warnings: Vec::new(),
    };
    for binding in &bindings {
        let resolution = engine.resolve_initial(binding, &params, &mut session)?;
        if let Some(warning) = resolution.warning {
            report.warnings.push(warning.to_string());
        }
        report.fields.push(ResolvedField {
            key: binding.widget_key().to_string(),
            param_key: binding.param_key().to_string(),
            value: resolution.value,
            source: source_name(resolution.source),
        });
    }
    Ok(report)
}

fn source_name(source: InitialSource) -> &'static str {
    match source {
        InitialSource::Session => "session",
        InitialSource::Query => "query",
        InitialSource::Default => "default",
    }
}

/// Runs the resolve command.
pub fn run(schema_path: &Path, query: &str, format: &str) -> CliResult<()> {
    info!(schema = %schema_path.display(), "resolving query string");
    let schema = Schema::load(schema_path)?;
    let report = resolve(&schema, &CodecRegistry::new(), query)?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{json}");
        }
        "text" => {
            for field in &report.fields {
                let value = serde_json::to_string(&field.value)?;
                println!("{:<20} {value} ({})", field.key, field.source);
            }
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
        }
        other => return Err(CliError::usage(format!("unknown format {other:?}"))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{"fields":[
        {"key":"name","codec":"text","default":""},
        {"key":"subscribe","codec":"bool","default":"false"},
        {"key":"tags","codec":"multi_choice","options":["a","b","c"],"default":[]},
        {"key":"day","codec":"date","default":"2024-01-01","param_key":"d"}
    ]}"#;

    #[test]
    fn resolves_query_and_defaults() {
        let schema = Schema::parse(PAGE).unwrap();
        let report = resolve(
            &schema,
            &CodecRegistry::new(),
            "?name=Hello+World&tags=c&tags=a&d=2024-03-05",
        )
        .unwrap();

        let by_key = |key: &str| report.fields.iter().find(|f| f.key == key).unwrap();
        assert_eq!(by_key("name").value, Value::from("Hello World"));
        assert_eq!(by_key("name").source, "query");
        assert_eq!(by_key("subscribe").value, Value::Bool(false));
        assert_eq!(by_key("subscribe").source, "default");
        assert_eq!(by_key("tags").value, Value::from(vec!["c", "a"]));
        assert_eq!(by_key("day").source, "query");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn malformed_values_become_warnings() {
        let schema = Schema::parse(PAGE).unwrap();
        let report = resolve(&schema, &CodecRegistry::new(), "subscribe=&d=yesterday").unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("subscribe"));
        assert!(report.fields.iter().all(|f| f.source == "default"));
    }

    #[test]
    fn report_serializes_values_natively() {
        let schema = Schema::parse(PAGE).unwrap();
        let report = resolve(&schema, &CodecRegistry::new(), "subscribe=true").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fields"][1]["value"], serde_json::json!(true));
        assert_eq!(json["fields"][3]["value"], serde_json::json!("2024-01-01"));
    }
}
