//! Type-name → constructor registry used to rebuild entities from storage.

use super::{DynEntity, Entity};
use crate::error::CoreResult;
use shelfdb_codec::Attributes;
use std::collections::BTreeMap;
use std::fmt;

type Constructor = fn(&Attributes) -> CoreResult<Box<dyn DynEntity>>;

/// Knows how to build each entity type from an attribute bag.
///
/// The manager consults it at bootstrap, where only type names are known.
#[derive(Clone, Default)]
pub struct EntityRegistry {
    constructors: BTreeMap<&'static str, Constructor>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `E`. Registering twice is harmless.
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        self.constructors.insert(E::TYPE_NAME, construct::<E>);
        self
    }

    /// Builder-style [`EntityRegistry::register`].
    #[must_use]
    pub fn with<E: Entity>(mut self) -> Self {
        self.register::<E>();
        self
    }

    /// Returns `true` if `type_name` is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// Builds an entity of `type_name` from `attributes`.
    ///
    /// Returns `None` if the type is not registered. The entity has no
    /// surrogate ID.
    pub fn construct(
        &self,
        type_name: &str,
        attributes: &Attributes,
    ) -> Option<CoreResult<Box<dyn DynEntity>>> {
        self.constructors
            .get(type_name)
            .map(|constructor| constructor(attributes))
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

fn construct<E: Entity>(attributes: &Attributes) -> CoreResult<Box<dyn DynEntity>> {
    let mut entity = E::default();
    entity.apply(attributes)?;
    Ok(Box::new(entity))
}
