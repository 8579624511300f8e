//! Declared members and value conversions.

use super::Entity;
use crate::error::{CoreError, CoreResult};
use shelfdb_codec::Value;

/// Getter half of a member accessor.
pub type Getter<E> = fn(&E) -> Value;

/// Setter half of a member accessor.
pub type Setter<E> = fn(&mut E, Value) -> CoreResult<()>;

/// One declared data member of an entity type.
///
/// A type's member table is the name → accessor registry that generic code
/// (attribute bags, persistence, logging) goes through. Typed code uses the
/// struct fields directly.
pub struct Member<E> {
    /// Member name, as it appears in attribute bags.
    pub name: &'static str,
    /// Reads the member as a value.
    pub get: Getter<E>,
    /// Writes the member from a value, checking its kind.
    pub set: Setter<E>,
}

impl<E> Member<E> {
    /// Creates a member accessor.
    pub const fn new(name: &'static str, get: Getter<E>, set: Setter<E>) -> Self {
        Self { name, get, set }
    }
}

/// Converts `value` to a string for member `member` of `E`.
///
/// # Errors
///
/// Fails with [`CoreError::InvalidValue`] unless the value is text.
pub fn text<E: Entity>(member: &str, value: Value) -> CoreResult<String> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(CoreError::invalid_value(
            E::TYPE_NAME,
            member,
            "text",
            other.kind(),
        )),
    }
}

/// Converts `value` to an integer for member `member` of `E`.
///
/// # Errors
///
/// Fails with [`CoreError::InvalidValue`] unless the value is an integer.
pub fn integer<E: Entity>(member: &str, value: Value) -> CoreResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| CoreError::invalid_value(E::TYPE_NAME, member, "integer", value.kind()))
}

/// Converts `value` to a float for member `member` of `E`. Integers widen.
///
/// # Errors
///
/// Fails with [`CoreError::InvalidValue`] unless the value is numeric.
pub fn float<E: Entity>(member: &str, value: Value) -> CoreResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| CoreError::invalid_value(E::TYPE_NAME, member, "float", value.kind()))
}

/// Converts `value` to a boolean for member `member` of `E`.
///
/// # Errors
///
/// Fails with [`CoreError::InvalidValue`] unless the value is a boolean.
pub fn boolean<E: Entity>(member: &str, value: Value) -> CoreResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| CoreError::invalid_value(E::TYPE_NAME, member, "bool", value.kind()))
}
