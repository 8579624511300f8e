//! Record-set encodings.
//!
//! Both formats carry the same logical document:
//!
//! ```text
//! { "<TypeName>": { "<primaryKey>": { "<field>": <value>, ... } } }
//! ```
//!
//! An empty blob is the empty record set in either format.

use crate::attributes::Records;
use crate::error::{CodecError, CodecResult};
use std::fmt;
use std::str::FromStr;

/// On-disk encoding of the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// CBOR, same document shape as JSON.
    Cbor,
}

impl Format {
    /// Guesses the format of a stored blob.
    ///
    /// Returns `None` for an empty (or whitespace-only) blob. Record sets are
    /// always maps, so JSON starts with `{` and CBOR with a map header.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace())?;
        if *first == b'{' {
            Some(Format::Json)
        } else {
            Some(Format::Cbor)
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Cbor => "cbor",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "cbor" => Ok(Format::Cbor),
            _ => Err(CodecError::UnknownFormat { name: s.to_string() }),
        }
    }
}

/// Encodes a record set.
///
/// # Errors
///
/// Fails with [`CodecError::NonFiniteFloat`] if any value is NaN or
/// infinite, or [`CodecError::EncodingFailed`] if serialization fails.
pub fn encode_records(records: &Records, format: Format) -> CodecResult<Vec<u8>> {
    check_finite(records)?;
    match format {
        Format::Json => serde_json::to_vec_pretty(records)
            .map_err(|e| CodecError::encoding_failed(e.to_string())),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(records, &mut buf)
                .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
            Ok(buf)
        }
    }
}

/// Decodes a record set. An empty blob decodes to an empty set.
///
/// # Errors
///
/// Fails with [`CodecError::DecodingFailed`] if the bytes are not a valid
/// record set in `format`.
pub fn decode_records(bytes: &[u8], format: Format) -> CodecResult<Records> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Records::new());
    }
    match format {
        Format::Json => {
            serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
        }
        Format::Cbor => {
            ciborium::from_reader(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
        }
    }
}

fn check_finite(records: &Records) -> CodecResult<()> {
    for (type_name, keyed) in records {
        for (primary_key, attrs) in keyed {
            if let Some((field, _)) = attrs.iter().find(|(_, v)| !v.is_finite()) {
                return Err(CodecError::NonFiniteFloat {
                    type_name: type_name.clone(),
                    primary_key: primary_key.clone(),
                    field: field.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, Value};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn sample() -> Records {
        let mut items = BTreeMap::new();
        items.insert(
            "abc-4589".to_string(),
            Attributes::new()
                .with("sku", "abc-4589")
                .with("quantity", 4)
                .with("price", 9.75)
                .with("discontinued", false)
                .with("note", Value::Null),
        );
        let mut records = Records::new();
        records.insert("InventoryItem".to_string(), items);
        records
    }

    #[test]
    fn json_layout_is_documented_schema() {
        let bytes = encode_records(&sample(), Format::Json).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["InventoryItem"]["abc-4589"]["quantity"], 4);
        assert_eq!(doc["InventoryItem"]["abc-4589"]["price"], 9.75);
    }

    #[test]
    fn both_formats_decode_what_they_encode() {
        for format in [Format::Json, Format::Cbor] {
            let bytes = encode_records(&sample(), format).unwrap();
            assert_eq!(Format::detect(&bytes), Some(format));
            assert_eq!(decode_records(&bytes, format).unwrap(), sample());
        }
    }

    #[test]
    fn empty_blob_is_empty_records() {
        assert!(decode_records(b"", Format::Json).unwrap().is_empty());
        assert!(decode_records(b"  \n", Format::Json).unwrap().is_empty());
        assert!(decode_records(b"", Format::Cbor).unwrap().is_empty());
        assert_eq!(Format::detect(b""), None);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = decode_records(b"{\"Item\": [1, 2", Format::Json);
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));

        let result = decode_records(&[0xff, 0x00, 0x13], Format::Cbor);
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));
    }

    #[test]
    fn wrong_shape_fails_to_decode() {
        let result = decode_records(b"{\"Item\": 3}", Format::Json);
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));
    }

    #[test]
    fn nan_is_rejected() {
        let mut records = sample();
        records
            .get_mut("InventoryItem")
            .unwrap()
            .get_mut("abc-4589")
            .unwrap()
            .insert("price", f64::NAN);

        let err = encode_records(&records, Format::Json).unwrap_err();
        assert_eq!(
            err,
            CodecError::NonFiniteFloat {
                type_name: "InventoryItem".into(),
                primary_key: "abc-4589".into(),
                field: "price".into(),
            }
        );
    }

    #[test]
    fn format_names() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("cbor".parse::<Format>().unwrap(), Format::Cbor);
        assert!("yaml".parse::<Format>().is_err());
        assert_eq!(Format::Cbor.to_string(), "cbor");
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1_000_000i32..1_000_000).prop_map(|q| Value::Float(f64::from(q) / 4.0)),
            "[a-zA-Z0-9 _-]{0,16}".prop_map(Value::Text),
        ]
    }

    proptest! {
        #[test]
        fn attribute_bags_survive_json(fields in prop::collection::btree_map("[a-z_]{1,10}", value_strategy(), 0..8)) {
            let attrs: Attributes = fields.into_iter().collect();
            let mut keyed = BTreeMap::new();
            keyed.insert("k".to_string(), attrs);
            let mut records = Records::new();
            records.insert("T".to_string(), keyed);

            let bytes = encode_records(&records, Format::Json).unwrap();
            prop_assert_eq!(decode_records(&bytes, Format::Json).unwrap(), records);
        }
    }
}
