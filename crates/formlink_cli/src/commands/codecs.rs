//! Codecs command implementation.

use formlink_codec::CodecRegistry;

/// Codec tags a schema field may use.
pub fn available(registry: &CodecRegistry) -> Vec<String> {
    let mut tags: Vec<String> = registry.tags().into_iter().map(str::to_string).collect();
    tags.push("choice".to_string());
    tags.push("multi_choice".to_string());
    tags
}

/// Runs the codecs command.
pub fn run() {
    for tag in available(&CodecRegistry::new()) {
        println!("{tag}");
    }
}
