//! Inspect command implementation.

use serde::Serialize;
use shelfdb_core::DataStore;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Format the store is written in, `None` for an empty file.
    pub format: Option<String>,
    /// Number of entity types.
    pub type_count: usize,
    /// Number of records across all types.
    pub record_count: usize,
    /// Per-type statistics (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<TypeStats>>,
}

/// Statistics for a single entity type.
#[derive(Debug, Serialize)]
pub struct TypeStats {
    /// Type name.
    pub name: String,
    /// Number of records.
    pub record_count: usize,
    /// Union of attribute names seen on this type's records.
    pub attributes: Vec<String>,
}

/// Runs the inspect command.
pub fn run(path: &Path, show_types: bool, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_existing(path)?;
    let result = inspect(path, &store, show_types)?;

    match output {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

pub(crate) fn inspect(
    path: &Path,
    store: &DataStore,
    show_types: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let types = show_types.then(|| {
        store
            .records()
            .iter()
            .map(|(name, keyed)| {
                let mut attributes: Vec<String> = keyed
                    .values()
                    .flat_map(|attrs| attrs.names().map(str::to_string))
                    .collect();
                attributes.sort();
                attributes.dedup();
                TypeStats {
                    name: name.clone(),
                    record_count: keyed.len(),
                    attributes,
                }
            })
            .collect()
    });

    Ok(InspectResult {
        path: path.display().to_string(),
        file_size: bytes.len() as u64,
        format: shelfdb_codec::Format::detect(&bytes).map(|f| f.to_string()),
        type_count: store.list_types().count(),
        record_count: store.record_count(),
        types,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("ShelfDB Store Inspection");
    println!("========================");
    println!();
    println!("Path:    {}", result.path);
    println!("Size:    {}", format_size(result.file_size));
    println!(
        "Format:  {}",
        result.format.as_deref().unwrap_or("(empty)")
    );
    println!();
    println!("Records:");
    println!("  Types:   {}", result.type_count);
    println!("  Records: {}", result.record_count);

    if let Some(types) = &result.types {
        println!();
        println!("Types:");
        for stats in types {
            println!(
                "  {} - {} records [{}]",
                stats.name,
                stats.record_count,
                stats.attributes.join(", ")
            );
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
