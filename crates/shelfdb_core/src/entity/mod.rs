//! Entity types and attribute access.
//!
//! An entity is a plain Rust struct implementing [`Entity`]. Its fields are
//! reached two ways:
//! - typed code reads and writes the struct fields directly
//! - generic code (persistence, observers, `update`) goes through the
//!   declared [`Member`] table via [`DynEntity`]
//!
//! Every name used with [`DynEntity::get`] / [`DynEntity::set`] must be a
//! declared member or the non-data field [`ID_FIELD`].

mod dynamic;
pub mod member;
mod registry;

pub use dynamic::DynEntity;
pub use member::Member;
pub use registry::EntityRegistry;

use crate::types::SurrogateId;
use std::fmt;

/// Name of the non-data field carrying the surrogate ID.
///
/// It is readable and writable through `get`/`set` but never part of an
/// attribute bag.
pub const ID_FIELD: &str = "id";

/// A concrete entity type.
///
/// # Example
///
/// ```
/// use shelfdb_core::entity::member;
/// use shelfdb_core::{DynEntity, Entity, Member, SurrogateId};
/// use shelfdb_codec::Value;
///
/// #[derive(Debug, Default)]
/// struct Supplier {
///     id: Option<SurrogateId>,
///     code: String,
///     name: String,
/// }
///
/// static SUPPLIER_MEMBERS: [Member<Supplier>; 2] = [
///     Member::new(
///         "code",
///         |s| Value::from(s.code.as_str()),
///         |s, v| {
///             s.code = member::text::<Supplier>("code", v)?;
///             Ok(())
///         },
///     ),
///     Member::new(
///         "name",
///         |s| Value::from(s.name.as_str()),
///         |s, v| {
///             s.name = member::text::<Supplier>("name", v)?;
///             Ok(())
///         },
///     ),
/// ];
///
/// impl Entity for Supplier {
///     const TYPE_NAME: &'static str = "Supplier";
///     const PRIMARY_KEY: &'static str = "code";
///
///     fn members() -> &'static [Member<Self>] {
///         &SUPPLIER_MEMBERS
///     }
///
///     fn identity(&self) -> Option<SurrogateId> {
///         self.id
///     }
///
///     fn set_identity(&mut self, id: Option<SurrogateId>) {
///         self.id = id;
///     }
/// }
///
/// let mut supplier = Supplier::default();
/// supplier.set("code", Value::from("acme")).unwrap();
/// assert_eq!(supplier.primary_key(), "acme");
/// assert!(supplier.get("colour").is_err());
/// ```
pub trait Entity: Default + fmt::Debug + Send + 'static {
    /// Type name, used as the outer storage key.
    const TYPE_NAME: &'static str;

    /// Name of the member holding the primary key.
    const PRIMARY_KEY: &'static str;

    /// The declared data members.
    fn members() -> &'static [Member<Self>];

    /// The surrogate ID, if one was assigned.
    fn identity(&self) -> Option<SurrogateId>;

    /// Assigns or clears the surrogate ID.
    fn set_identity(&mut self, id: Option<SurrogateId>);

    /// Looks up a declared member by name.
    fn member(name: &str) -> Option<&'static Member<Self>> {
        Self::members().iter().find(|m| m.name == name)
    }
}
