//! Object-safe, name-based access to any entity.

use super::{Entity, ID_FIELD};
use crate::error::{CoreError, CoreResult};
use crate::types::SurrogateId;
use shelfdb_codec::{Attributes, Value};
use std::any::Any;
use std::fmt;

/// Name-based view of an entity, implemented for every [`Entity`].
///
/// This is what the manager stores and what observers see.
pub trait DynEntity: fmt::Debug + Send {
    /// Type name of the concrete entity.
    fn type_name(&self) -> &'static str;

    /// Name of the primary-key member.
    fn primary_key_member(&self) -> &'static str;

    /// Declared data member names, in declaration order.
    fn declared_members(&self) -> Vec<&'static str>;

    /// The surrogate ID, if assigned.
    fn surrogate_id(&self) -> Option<SurrogateId>;

    /// Current primary key rendered as a string.
    fn primary_key(&self) -> String;

    /// Reads a member or the `id` field.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownMember`] if `name` is neither.
    fn get(&self, name: &str) -> CoreResult<Value>;

    /// Writes a member or the `id` field.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownMember`] if `name` is neither,
    /// [`CoreError::InvalidValue`] if the value has the wrong kind.
    fn set(&mut self, name: &str, value: Value) -> CoreResult<()>;

    /// Snapshot of all data members. This is the persisted state.
    fn attributes(&self) -> Attributes;

    /// Writes every attribute in `attributes`, stopping at the first failure.
    ///
    /// Every name is checked against the declared members before anything is
    /// written. `id` is not a data member and is rejected here.
    ///
    /// # Errors
    ///
    /// As for [`DynEntity::set`].
    fn apply(&mut self, attributes: &Attributes) -> CoreResult<()>;

    /// Fails with [`CoreError::IdentityNotSet`] unless a surrogate ID is set.
    ///
    /// # Errors
    ///
    /// See above.
    fn validate_ready(&self) -> CoreResult<()>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Entity> DynEntity for E {
    fn type_name(&self) -> &'static str {
        E::TYPE_NAME
    }

    fn primary_key_member(&self) -> &'static str {
        E::PRIMARY_KEY
    }

    fn declared_members(&self) -> Vec<&'static str> {
        E::members().iter().map(|m| m.name).collect()
    }

    fn surrogate_id(&self) -> Option<SurrogateId> {
        self.identity()
    }

    fn primary_key(&self) -> String {
        E::member(E::PRIMARY_KEY)
            .map(|m| (m.get)(self).to_key_string())
            .unwrap_or_default()
    }

    fn get(&self, name: &str) -> CoreResult<Value> {
        if name == ID_FIELD {
            return Ok(self
                .identity()
                .map_or(Value::Null, |id| Value::Integer(id_to_i64(id))));
        }
        E::member(name)
            .map(|m| (m.get)(self))
            .ok_or_else(|| CoreError::unknown_member(E::TYPE_NAME, name))
    }

    fn set(&mut self, name: &str, value: Value) -> CoreResult<()> {
        if name == ID_FIELD {
            let id = match value {
                Value::Null => None,
                Value::Integer(raw) if raw > 0 => Some(SurrogateId::new(raw.unsigned_abs())),
                other => {
                    return Err(CoreError::invalid_value(
                        E::TYPE_NAME,
                        ID_FIELD,
                        "positive integer",
                        other.kind(),
                    ))
                }
            };
            self.set_identity(id);
            return Ok(());
        }
        let member =
            E::member(name).ok_or_else(|| CoreError::unknown_member(E::TYPE_NAME, name))?;
        (member.set)(self, value)
    }

    fn attributes(&self) -> Attributes {
        E::members()
            .iter()
            .map(|m| (m.name, (m.get)(self)))
            .collect()
    }

    fn apply(&mut self, attributes: &Attributes) -> CoreResult<()> {
        if let Some(unknown) = attributes.names().find(|name| E::member(name).is_none()) {
            return Err(CoreError::unknown_member(E::TYPE_NAME, unknown));
        }
        for (name, value) in attributes {
            DynEntity::set(self, name, value.clone())?;
        }
        Ok(())
    }

    fn validate_ready(&self) -> CoreResult<()> {
        match self.identity() {
            Some(_) => Ok(()),
            None => Err(CoreError::identity_not_set(E::TYPE_NAME)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn id_to_i64(id: SurrogateId) -> i64 {
    i64::try_from(id.as_u64()).unwrap_or(i64::MAX)
}
