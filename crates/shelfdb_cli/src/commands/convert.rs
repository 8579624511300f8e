//! Convert command implementation.

use shelfdb_codec::Format;
use shelfdb_core::{Config, DataStore};
use std::path::Path;
use tracing::info;

/// Runs the convert command.
///
/// Without `output` the store is rewritten in place.
pub fn run(
    path: &Path,
    to: Format,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = super::open_existing(path)?;
    let written = convert(source, to, output)?;
    println!(
        "Converted {} records to {} at {}",
        written.record_count(),
        to,
        written.location()
    );
    Ok(())
}

pub(crate) fn convert(
    mut source: DataStore,
    to: Format,
    output: Option<&Path>,
) -> Result<DataStore, Box<dyn std::error::Error>> {
    let mut target = match output {
        Some(output) => {
            if output.exists() {
                return Err(format!("Refusing to overwrite {}", output.display()).into());
            }
            let mut target = DataStore::open_with_config(output, &Config::new().format(to))?;
            for (type_name, keyed) in source.records() {
                for (primary_key, attributes) in keyed {
                    target.put(type_name, primary_key, attributes.clone());
                }
            }
            target
        }
        None => {
            source.set_format(to);
            source
        }
    };
    target.flush()?;
    info!(location = %target.location(), format = %to, "converted store");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfdb_codec::Attributes;

    fn seeded(path: &Path) -> DataStore {
        let mut store = DataStore::open(path).unwrap();
        store.put("Item", "a", Attributes::new().with("qty", 4).with("price", 2.5));
        store.flush().unwrap();
        store
    }

    #[test]
    fn convert_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let store = seeded(&path);

        convert(store, Format::Cbor, None).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(Format::detect(&bytes), Some(Format::Cbor));

        let reopened = DataStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_record("Item", "a"),
            Some(&Attributes::new().with("qty", 4).with("price", 2.5))
        );
    }

    #[test]
    fn convert_to_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let output = dir.path().join("store.cbor");
        let store = seeded(&path);

        let written = convert(store, Format::Cbor, Some(&output)).unwrap();
        assert_eq!(written.record_count(), 1);
        assert_eq!(
            Format::detect(&std::fs::read(&path).unwrap()),
            Some(Format::Json)
        );
        assert_eq!(
            Format::detect(&std::fs::read(&output).unwrap()),
            Some(Format::Cbor)
        );
    }

    #[test]
    fn refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let output = dir.path().join("other.json");
        std::fs::write(&output, "{}").unwrap();

        assert!(convert(seeded(&path), Format::Json, Some(&output)).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{}");
    }
}
