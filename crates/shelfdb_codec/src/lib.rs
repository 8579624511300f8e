//! # ShelfDB Codec
//!
//! Attribute values and record-set encodings for ShelfDB.
//!
//! This crate defines the data that crosses the persistence boundary:
//! - [`Value`] - a single attribute value
//! - [`Attributes`] - an entity's attribute bag
//! - [`Records`] - the whole store, type name → primary key → bag
//!
//! and the two encodings of a record set, [`Format::Json`] (the default,
//! human-readable) and [`Format::Cbor`] (compact).
//!
//! ## Usage
//!
//! ```
//! use shelfdb_codec::{decode_records, encode_records, Attributes, Format, Records};
//!
//! let mut records = Records::new();
//! records
//!     .entry("InventoryItem".to_string())
//!     .or_default()
//!     .insert("abc-4589".to_string(), Attributes::new().with("quantity", 4));
//!
//! let bytes = encode_records(&records, Format::Json).unwrap();
//! assert_eq!(decode_records(&bytes, Format::Json).unwrap(), records);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod attributes;
mod error;
mod format;
mod value;

pub use attributes::{Attributes, Records};
pub use error::{CodecError, CodecResult};
pub use format::{decode_records, encode_records, Format};
pub use value::Value;
