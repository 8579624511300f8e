//! Dump command implementation.

use shelfdb_codec::Records;
use std::path::Path;

/// Runs the dump command.
pub fn run(path: &Path, type_name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_existing(path)?;
    println!("{}", render(store.records(), type_name)?);
    Ok(())
}

/// Renders `records` (or only those of `type_name`) as pretty JSON.
///
/// Whatever format the store is written in, the dump uses the JSON layout.
pub(crate) fn render(
    records: &Records,
    type_name: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = match type_name {
        Some(name) => {
            let keyed = records
                .get(name)
                .ok_or_else(|| format!("No records of type {name}"))?;
            serde_json::to_string_pretty(keyed)?
        }
        None => serde_json::to_string_pretty(records)?,
    };
    Ok(rendered)
}
