//! Verify command implementation.

use shelfdb_codec::{decode_records, Format, Records};
use shelfdb_core::ID_FIELD;
use shelfdb_storage::{FileBackend, StorageBackend};
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Format the store was decoded as.
    pub format: Option<Format>,
    /// Number of types checked.
    pub types_checked: usize,
    /// Number of records checked.
    pub records_checked: usize,
    /// List of problems found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    println!("Verifying store at {}", path.display());
    println!();

    let backend = FileBackend::open(path)?;
    let result = verify(&backend.read_all()?);
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!("✗ Store verification failed");
        Err("Verification failed".into())
    }
}

pub(crate) fn verify(data: &[u8]) -> VerifyResult {
    let mut result = VerifyResult::default();
    let Some(format) = Format::detect(data) else {
        return result;
    };
    result.format = Some(format);

    match decode_records(data, format) {
        Ok(records) => check_records(&records, &mut result),
        Err(e) => result.errors.push(format!("Store does not decode as {format}: {e}")),
    }
    result
}

fn check_records(records: &Records, result: &mut VerifyResult) {
    for (type_name, keyed) in records {
        result.types_checked += 1;
        if type_name.is_empty() {
            result.errors.push("Empty type name".to_string());
        }
        if keyed.is_empty() {
            result.errors.push(format!("Type {type_name} has no records"));
        }

        for (primary_key, attributes) in keyed {
            result.records_checked += 1;
            let at = format!("{type_name}/{primary_key}");

            if attributes.contains(ID_FIELD) {
                result
                    .errors
                    .push(format!("Record {at} persists the `{ID_FIELD}` field"));
            }
            for (name, value) in attributes {
                if !value.is_finite() {
                    result
                        .errors
                        .push(format!("Record {at} has non-finite `{name}`"));
                }
            }
        }
    }
}

fn print_result(result: &VerifyResult) {
    match result.format {
        Some(format) => println!("  Format: {format}"),
        None => println!("  Store is empty"),
    }
    println!(
        "  Types checked: {}, records checked: {}",
        result.types_checked, result.records_checked
    );
    for error in &result.errors {
        println!("    ERROR: {}", error);
    }
}
