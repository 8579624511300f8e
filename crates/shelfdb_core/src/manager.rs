//! Entity manager: identity cache, indexes, pending saves and commits.

use crate::config::{Config, PendingPolicy};
use crate::entity::{DynEntity, Entity, EntityRegistry, ID_FIELD};
use crate::error::{CoreError, CoreResult};
use crate::observer::{CommitObserver, ObserverSet};
use crate::store::DataStore;
use crate::types::{EntityKey, SurrogateId};
use parking_lot::Mutex;
use shelfdb_codec::{Attributes, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// A manager behind the single lock that serializes all access to it.
pub type SharedEntityManager = Arc<Mutex<EntityManager>>;

/// Orchestrates live entities on top of a [`DataStore`].
///
/// The manager owns every live entity. Each one has a surrogate ID (process
/// lifetime) and a durable key (type name plus primary key); the two
/// indexes always map onto each other.
///
/// # Pending saves
///
/// Creating an entity, handing out a mutable borrow of it, or changing it
/// through [`EntityManager::update`] puts its ID on the pending-save list.
/// [`EntityManager::commit`] writes every pending entity into the store,
/// notifies observers and flushes. What happens to the list afterwards is
/// governed by [`PendingPolicy`].
///
/// # Example
///
/// ```rust,ignore
/// let mut manager = EntityManager::open(Path::new("store.json"), registry)?;
/// let item = manager.get_or_create::<InventoryItem>(
///     Attributes::new().with("sku", "abc-4589").with("quantity", 0),
/// )?;
/// item.receive(4)?;
/// manager.commit()?;
/// ```
pub struct EntityManager {
    store: DataStore,
    registry: EntityRegistry,
    config: Config,
    /// Identity cache.
    entities: BTreeMap<SurrogateId, Box<dyn DynEntity>>,
    id_to_key: HashMap<SurrogateId, EntityKey>,
    key_to_id: HashMap<EntityKey, SurrogateId>,
    /// Ordered, duplicate-free.
    pending: Vec<SurrogateId>,
    observers: ObserverSet,
}

impl EntityManager {
    /// Opens the store at `path` and bootstraps a manager from it.
    ///
    /// # Errors
    ///
    /// Any error from [`DataStore::open`] or [`EntityManager::bootstrap`].
    pub fn open(path: &Path, registry: EntityRegistry) -> CoreResult<Self> {
        Self::open_with_config(path, registry, Config::default())
    }

    /// Opens the store at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// As for [`EntityManager::open`].
    pub fn open_with_config(
        path: &Path,
        registry: EntityRegistry,
        config: Config,
    ) -> CoreResult<Self> {
        let store = DataStore::open_with_config(path, &config)?;
        Self::bootstrap_with_config(store, registry, config)
    }

    /// Builds live entities for every stored record of a registered type.
    ///
    /// Loaded entities get fresh surrogate IDs and are not pending. Records
    /// of unregistered types stay in the store untouched.
    ///
    /// # Errors
    ///
    /// [`CoreError::StoreCorrupt`] if a stored record does not fit its
    /// registered type or is filed under a key other than its own primary
    /// key.
    pub fn bootstrap(store: DataStore, registry: EntityRegistry) -> CoreResult<Self> {
        Self::bootstrap_with_config(store, registry, Config::default())
    }

    /// [`EntityManager::bootstrap`] with custom configuration.
    ///
    /// # Errors
    ///
    /// As for [`EntityManager::bootstrap`].
    pub fn bootstrap_with_config(
        store: DataStore,
        registry: EntityRegistry,
        config: Config,
    ) -> CoreResult<Self> {
        let mut loaded = Vec::new();
        for (type_name, keyed) in store.records() {
            if !registry.contains(type_name) {
                warn!(
                    type_name = %type_name,
                    records = keyed.len(),
                    "skipping records of unregistered type"
                );
                continue;
            }
            for (primary_key, attributes) in keyed {
                let entity = match registry.construct(type_name, attributes) {
                    Some(Ok(entity)) => entity,
                    Some(Err(e)) => {
                        return Err(CoreError::store_corrupt(format!(
                            "record {type_name}/{primary_key}: {e}"
                        )))
                    }
                    None => continue,
                };
                if entity.primary_key() != *primary_key {
                    return Err(CoreError::store_corrupt(format!(
                        "record {type_name}/{primary_key} carries primary key `{}`",
                        entity.primary_key()
                    )));
                }
                loaded.push(entity);
            }
        }

        let mut manager = Self {
            store,
            registry,
            config,
            entities: BTreeMap::new(),
            id_to_key: HashMap::new(),
            key_to_id: HashMap::new(),
            pending: Vec::new(),
            observers: ObserverSet::default(),
        };
        for mut entity in loaded {
            let id = manager.store.next_auto_id();
            entity.set(ID_FIELD, id_value(id))?;
            manager.track(id, entity);
        }

        info!(
            entities = manager.entities.len(),
            location = %manager.store.location(),
            "bootstrapped entity manager"
        );
        Ok(manager)
    }

    /// Returns the entity of type `E` with the primary key found in
    /// `attributes`, creating it if none exists.
    ///
    /// An existing entity is returned as is; `attributes` is ignored. A new
    /// entity gets the next surrogate ID and goes on the pending list. Either
    /// way the returned borrow counts as a touch.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingPrimaryKey`] if `attributes` lacks the key
    /// - [`CoreError::UnknownMember`] / [`CoreError::InvalidValue`] if the
    ///   attributes don't fit `E` (nothing is created)
    pub fn get_or_create<E: Entity>(&mut self, attributes: Attributes) -> CoreResult<&mut E> {
        let primary_key = attributes
            .get(E::PRIMARY_KEY)
            .map(Value::to_key_string)
            .ok_or_else(|| CoreError::MissingPrimaryKey {
                type_name: E::TYPE_NAME.to_string(),
                member: E::PRIMARY_KEY.to_string(),
            })?;
        self.registry.register::<E>();

        let key = EntityKey::new(E::TYPE_NAME, primary_key);
        let id = match self.key_to_id.get(&key) {
            Some(&id) => id,
            None => {
                let mut entity = E::default();
                entity.apply(&attributes)?;
                let id = self.store.next_auto_id();
                entity.set_identity(Some(id));
                debug!(id = %id, key = %key, "created entity");
                self.track(id, Box::new(entity));
                id
            }
        };

        self.mark_pending(id);
        self.downcast_mut::<E>(id)
            .ok_or(CoreError::NotTracked { id })
    }

    /// Typed read access by surrogate ID.
    ///
    /// `None` if the ID is not live or holds another type.
    #[must_use]
    pub fn entity<E: Entity>(&self, id: SurrogateId) -> Option<&E> {
        self.entities.get(&id)?.as_any().downcast_ref::<E>()
    }

    /// Typed write access by surrogate ID. Marks the entity pending.
    pub fn entity_mut<E: Entity>(&mut self, id: SurrogateId) -> Option<&mut E> {
        if !self.entities.get(&id)?.as_any().is::<E>() {
            return None;
        }
        self.mark_pending(id);
        self.downcast_mut::<E>(id)
    }

    /// Name-based read access by surrogate ID.
    #[must_use]
    pub fn entity_by_id(&self, id: SurrogateId) -> Option<&dyn DynEntity> {
        self.entities.get(&id).map(|entity| entity.as_ref())
    }

    /// Name-based write access by surrogate ID. Marks the entity pending.
    ///
    /// A primary-key change made through this borrow is re-indexed at the
    /// next [`EntityManager::commit`]. Until then lookups use the old key.
    pub fn entity_by_id_mut(
        &mut self,
        id: SurrogateId,
    ) -> Option<&mut (dyn DynEntity + 'static)> {
        if !self.entities.contains_key(&id) {
            return None;
        }
        self.mark_pending(id);
        self.entities.get_mut(&id).map(|entity| entity.as_mut())
    }

    /// Finds a live entity by primary key alone, whatever its type.
    ///
    /// Keys are unique per type, not across types; if several types share
    /// `primary_key` the one with the lowest surrogate ID wins. Use
    /// [`EntityManager::find`] or [`EntityManager::find_by_key`] to be exact.
    #[must_use]
    pub fn find_by_primary(&self, primary_key: &str) -> Option<&dyn DynEntity> {
        self.key_to_id
            .iter()
            .filter(|(key, _)| key.primary_key == primary_key)
            .map(|(_, id)| *id)
            .min()
            .and_then(|id| self.entity_by_id(id))
    }

    /// Finds a live entity by type name and primary key.
    #[must_use]
    pub fn find_by_key(&self, type_name: &str, primary_key: &str) -> Option<&dyn DynEntity> {
        let id = self.id_for(type_name, primary_key)?;
        self.entity_by_id(id)
    }

    /// Finds a live entity of type `E` by primary key.
    #[must_use]
    pub fn find<E: Entity>(&self, primary_key: &str) -> Option<&E> {
        let id = self.id_for(E::TYPE_NAME, primary_key)?;
        self.entity::<E>(id)
    }

    /// Surrogate ID of the live entity at (`type_name`, `primary_key`).
    #[must_use]
    pub fn id_for(&self, type_name: &str, primary_key: &str) -> Option<SurrogateId> {
        self.key_to_id
            .get(&EntityKey::new(type_name, primary_key))
            .copied()
    }

    /// Replaces attributes of the entity `id`.
    ///
    /// Attributes not named in `new_attributes` keep their value. If every
    /// named attribute already has the given value nothing happens and the
    /// entity is not marked pending. A changed primary key moves the entity:
    /// the record under the old key is removed from the store and the
    /// indexes point at the new key.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotTracked`] if `id` is not live
    /// - [`CoreError::UnknownMember`] / [`CoreError::InvalidValue`] if the
    ///   attributes don't fit the entity's type
    /// - [`CoreError::DuplicateKey`] if another live entity of the same type
    ///   already owns the new primary key
    ///
    /// On error the entity is left unchanged.
    pub fn update(&mut self, id: SurrogateId, new_attributes: &Attributes) -> CoreResult<()> {
        let entity = self.entities.get(&id).ok_or(CoreError::NotTracked { id })?;
        let current = entity.attributes();
        if current.contains_all(new_attributes) {
            trace!(id = %id, "update is a no-op");
            return Ok(());
        }

        let type_name = entity.type_name();
        let old_key = self
            .id_to_key
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotTracked { id })?;

        // Validate the merged bag on a scratch instance so a bad value
        // cannot leave the live entity half-written.
        let mut merged = current;
        merged.extend(new_attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        let candidate = self
            .registry
            .construct(type_name, &merged)
            .ok_or(CoreError::NotTracked { id })??;

        let new_key = EntityKey::new(type_name, candidate.primary_key());
        if new_key != old_key {
            if self.key_to_id.contains_key(&new_key) {
                return Err(CoreError::DuplicateKey {
                    type_name: type_name.to_string(),
                    primary_key: new_key.primary_key,
                });
            }
            self.rekey(&[(id, old_key, new_key)]);
        }

        if let Some(entity) = self.entities.get_mut(&id) {
            entity.apply(&merged)?;
        }
        self.mark_pending(id);
        Ok(())
    }

    /// Removes the entity `id` from the manager and from the store.
    ///
    /// Any live entity can be deleted, pending or not. An entity loaded at
    /// bootstrap and never touched is deletable too.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotTracked`] if `id` is not live (including when it was
    /// already deleted).
    pub fn delete(&mut self, id: SurrogateId) -> CoreResult<()> {
        if self.entities.remove(&id).is_none() {
            return Err(CoreError::NotTracked { id });
        }
        self.pending.retain(|pending| *pending != id);
        if let Some(key) = self.id_to_key.remove(&id) {
            self.key_to_id.remove(&key);
            self.store.delete(&key.type_name, &key.primary_key);
            debug!(id = %id, key = %key, "deleted entity");
        }
        Ok(())
    }

    /// Stages every pending entity, notifies observers and flushes.
    ///
    /// Observers run before the flush unless
    /// [`Config::notify_after_flush`] is set. Returns the number of entities
    /// staged.
    ///
    /// A pending entity whose primary-key member was changed through a
    /// mutable borrow is re-keyed first: the record under its old key is
    /// removed and both indexes follow the new key.
    ///
    /// # Errors
    ///
    /// - [`CoreError::IdentityNotSet`] if a pending entity lost its surrogate
    ///   ID (nothing is staged)
    /// - [`CoreError::DuplicateKey`] if a pending entity was re-keyed onto a
    ///   key another live entity of its type owns (nothing is staged)
    /// - [`CoreError::StoreWriteFailed`] / [`CoreError::Codec`] if the flush
    ///   fails. Observers may already have run, and the pending list is kept
    ///   so a retry stages (and notifies) again.
    pub fn commit(&mut self) -> CoreResult<usize> {
        for id in &self.pending {
            if let Some(entity) = self.entities.get(id) {
                entity.validate_ready()?;
            }
        }
        let moves = self.drifted_keys()?;
        self.rekey(&moves);

        let mut staged = Vec::with_capacity(self.pending.len());
        for id in &self.pending {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            staged.push((
                entity.type_name(),
                entity.primary_key(),
                entity.attributes(),
            ));
        }
        let count = staged.len();
        for (type_name, primary_key, attributes) in staged {
            self.store.put(type_name, &primary_key, attributes);
        }
        debug!(staged = count, observers = self.observers.len(), "staged commit");

        if self.config.notify_after_flush {
            self.store.flush()?;
            self.notify();
        } else {
            self.notify();
            self.store.flush()?;
        }

        if self.config.pending_policy == PendingPolicy::ClearOnFlush {
            self.pending.clear();
        }
        Ok(count)
    }

    /// Attaches `observer`. Returns `false` if it was already attached.
    pub fn attach(&mut self, observer: Arc<dyn CommitObserver>) -> bool {
        self.observers.attach(observer)
    }

    /// Detaches `observer`. Returns `false` if it was not attached.
    pub fn detach(&mut self, observer: &Arc<dyn CommitObserver>) -> bool {
        self.observers.detach(observer)
    }

    /// Number of attached observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// IDs due to be written by the next commit, in the order they were
    /// first touched.
    #[must_use]
    pub fn pending_save_ids(&self) -> &[SurrogateId] {
        &self.pending
    }

    /// Live surrogate IDs, ascending.
    pub fn ids(&self) -> impl Iterator<Item = SurrogateId> + '_ {
        self.entities.keys().copied()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consumes the manager, returning its store. Nothing is flushed.
    #[must_use]
    pub fn into_store(self) -> DataStore {
        self.store
    }

    /// Wraps the manager in a mutex for use from several threads.
    #[must_use]
    pub fn into_shared(self) -> SharedEntityManager {
        Arc::new(Mutex::new(self))
    }

    fn track(&mut self, id: SurrogateId, entity: Box<dyn DynEntity>) {
        let key = EntityKey::new(entity.type_name(), entity.primary_key());
        trace!(id = %id, key = %key, "indexing entity");
        self.key_to_id.insert(key.clone(), id);
        self.id_to_key.insert(id, key);
        self.entities.insert(id, entity);
    }

    /// Pending entities whose primary key no longer matches the index, as
    /// (id, indexed key, current key).
    ///
    /// Fails with [`CoreError::DuplicateKey`] if a new key is owned by a live
    /// entity that stays put, or is claimed by two moving entities.
    fn drifted_keys(&self) -> CoreResult<Vec<(SurrogateId, EntityKey, EntityKey)>> {
        let mut moves = Vec::new();
        for id in &self.pending {
            let (Some(entity), Some(indexed)) = (self.entities.get(id), self.id_to_key.get(id))
            else {
                continue;
            };
            let current = EntityKey::new(entity.type_name(), entity.primary_key());
            if current != *indexed {
                moves.push((*id, indexed.clone(), current));
            }
        }

        let moving: HashSet<SurrogateId> = moves.iter().map(|(id, _, _)| *id).collect();
        let mut claimed = HashSet::new();
        for (id, _, new_key) in &moves {
            let owned_by_other = self
                .key_to_id
                .get(new_key)
                .is_some_and(|owner| owner != id && !moving.contains(owner));
            if owned_by_other || !claimed.insert(new_key) {
                return Err(CoreError::DuplicateKey {
                    type_name: new_key.type_name.clone(),
                    primary_key: new_key.primary_key.clone(),
                });
            }
        }
        Ok(moves)
    }

    /// Moves entities from their old key to their new key in the store and
    /// both indexes. All old keys are released before any new key is taken.
    fn rekey(&mut self, moves: &[(SurrogateId, EntityKey, EntityKey)]) {
        for (_, old_key, _) in moves {
            self.store.delete(&old_key.type_name, &old_key.primary_key);
            self.key_to_id.remove(old_key);
        }
        for (id, old_key, new_key) in moves {
            self.key_to_id.insert(new_key.clone(), *id);
            self.id_to_key.insert(*id, new_key.clone());
            debug!(id = %id, from = %old_key, to = %new_key, "re-keyed entity");
        }
    }

    fn mark_pending(&mut self, id: SurrogateId) {
        if !self.pending.contains(&id) {
            self.pending.push(id);
        }
    }

    fn downcast_mut<E: Entity>(&mut self, id: SurrogateId) -> Option<&mut E> {
        self.entities.get_mut(&id)?.as_any_mut().downcast_mut::<E>()
    }

    fn notify(&self) {
        for observer in self.observers.snapshot() {
            observer.on_commit(self);
        }
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("entities", &self.entities.len())
            .field("pending", &self.pending)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn id_value(id: SurrogateId) -> Value {
    Value::Integer(i64::try_from(id.as_u64()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::{Gadget, Widget};

    fn manager() -> EntityManager {
        let registry = EntityRegistry::new().with::<Widget>().with::<Gadget>();
        EntityManager::bootstrap(DataStore::open_in_memory(), registry).unwrap()
    }

    fn widget(code: &str, count: i64) -> Attributes {
        Attributes::new().with("code", code).with("count", count)
    }

    #[test]
    fn get_or_create_assigns_sequential_ids() {
        let mut manager = manager();
        let first = manager.get_or_create::<Widget>(widget("a", 1)).unwrap().id;
        let second = manager.get_or_create::<Widget>(widget("b", 2)).unwrap().id;

        assert_eq!(first, Some(SurrogateId::new(1)));
        assert_eq!(second, Some(SurrogateId::new(2)));
        assert_eq!(manager.len(), 2);
        assert_eq!(
            manager.pending_save_ids(),
            &[SurrogateId::new(1), SurrogateId::new(2)]
        );
    }

    #[test]
    fn get_or_create_returns_existing_unchanged() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();

        let again = manager.get_or_create::<Widget>(widget("a", 99)).unwrap();
        assert_eq!(again.count, 1);
        assert_eq!(again.id, Some(SurrogateId::new(1)));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.pending_save_ids().len(), 1);
    }

    #[test]
    fn same_key_different_types_are_distinct() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("x", 1)).unwrap();
        manager
            .get_or_create::<Gadget>(Attributes::new().with("code", "x"))
            .unwrap();

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.find_by_primary("x").unwrap().type_name(), "Widget");
        assert_eq!(
            manager.find_by_key("Gadget", "x").unwrap().surrogate_id(),
            Some(SurrogateId::new(2))
        );
    }

    #[test]
    fn get_or_create_without_primary_key() {
        let mut manager = manager();
        let result = manager.get_or_create::<Widget>(Attributes::new().with("count", 3));
        assert!(matches!(result, Err(CoreError::MissingPrimaryKey { .. })));
        assert!(manager.is_empty());
    }

    #[test]
    fn get_or_create_with_bad_attributes_creates_nothing() {
        let mut manager = manager();
        let result = manager.get_or_create::<Widget>(widget("a", 1).with("count", "lots"));
        assert!(matches!(result, Err(CoreError::InvalidValue { .. })));
        assert!(manager.is_empty());
        assert!(manager.pending_save_ids().is_empty());
    }

    #[test]
    fn typed_access_checks_type() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        let id = SurrogateId::new(1);

        assert!(manager.entity::<Widget>(id).is_some());
        assert!(manager.entity::<Gadget>(id).is_none());
        assert!(manager.entity_mut::<Gadget>(id).is_none());

        manager.entity_mut::<Widget>(id).unwrap().count = 5;
        assert_eq!(manager.find::<Widget>("a").unwrap().count, 5);
    }

    #[test]
    fn update_merges_and_marks_pending() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.commit().unwrap();
        let id = SurrogateId::new(1);

        manager
            .update(id, &Attributes::new().with("weight", 2.5))
            .unwrap();
        let updated = manager.entity::<Widget>(id).unwrap();
        assert_eq!(updated.count, 1);
        assert!((updated.weight - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn update_with_same_values_is_noop() {
        let store = DataStore::open_in_memory();
        let registry = EntityRegistry::new().with::<Widget>();
        let config = Config::new().pending_policy(PendingPolicy::ClearOnFlush);
        let mut manager = EntityManager::bootstrap_with_config(store, registry, config).unwrap();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.commit().unwrap();
        assert!(manager.pending_save_ids().is_empty());

        manager.update(SurrogateId::new(1), &widget("a", 1)).unwrap();
        assert!(manager.pending_save_ids().is_empty());

        manager.update(SurrogateId::new(1), &widget("a", 2)).unwrap();
        assert_eq!(manager.pending_save_ids(), &[SurrogateId::new(1)]);
    }

    #[test]
    fn update_rekeys_entity() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("old", 1)).unwrap();
        manager.commit().unwrap();
        let id = SurrogateId::new(1);

        manager
            .update(id, &Attributes::new().with("code", "new"))
            .unwrap();
        assert_eq!(manager.id_for("Widget", "new"), Some(id));
        assert_eq!(manager.id_for("Widget", "old"), None);
        assert!(manager.store().get_record("Widget", "old").is_none());

        manager.commit().unwrap();
        assert!(manager.store().get_record("Widget", "new").is_some());
    }

    #[test]
    fn update_rejects_duplicate_key() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.get_or_create::<Widget>(widget("b", 2)).unwrap();

        let result = manager.update(SurrogateId::new(2), &Attributes::new().with("code", "a"));
        assert!(matches!(result, Err(CoreError::DuplicateKey { .. })));
        assert_eq!(manager.find::<Widget>("b").unwrap().count, 2);
    }

    #[test]
    fn update_bad_value_leaves_entity_unchanged() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();

        let bad = Attributes::new().with("count", 7).with("weight", "heavy");
        assert!(manager.update(SurrogateId::new(1), &bad).is_err());
        assert_eq!(manager.find::<Widget>("a").unwrap().count, 1);
    }

    #[test]
    fn update_unknown_id() {
        let mut manager = manager();
        let result = manager.update(SurrogateId::new(4), &widget("a", 1));
        assert!(matches!(result, Err(CoreError::NotTracked { .. })));
    }

    #[test]
    fn delete_removes_everywhere() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.commit().unwrap();
        let id = SurrogateId::new(1);

        manager.delete(id).unwrap();
        assert!(manager.entity_by_id(id).is_none());
        assert!(manager.find_by_primary("a").is_none());
        assert!(manager.pending_save_ids().is_empty());
        assert_eq!(manager.store().record_count(), 0);

        assert!(matches!(
            manager.delete(id),
            Err(CoreError::NotTracked { .. })
        ));
    }

    #[test]
    fn delete_untouched_bootstrapped_entity() {
        let mut store = DataStore::open_in_memory();
        store.put("Widget", "a", widget("a", 3));
        let registry = EntityRegistry::new().with::<Widget>();
        let mut manager = EntityManager::bootstrap(store, registry).unwrap();
        assert!(manager.pending_save_ids().is_empty());

        manager.delete(SurrogateId::new(1)).unwrap();
        assert!(manager.is_empty());
        assert!(manager.store().get_record("Widget", "a").is_none());
    }

    #[test]
    fn commit_rekeys_entity_changed_in_place() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.commit().unwrap();
        let id = SurrogateId::new(1);

        manager.entity_mut::<Widget>(id).unwrap().code = "b".into();
        assert_eq!(manager.commit().unwrap(), 1);

        assert!(manager.find::<Widget>("a").is_none());
        assert_eq!(manager.id_for("Widget", "b"), Some(id));
        assert!(manager.store().get_record("Widget", "a").is_none());
        assert!(manager.store().get_record("Widget", "b").is_some());
        assert_eq!(manager.store().record_count(), 1);

        let again = manager.get_or_create::<Widget>(widget("b", 9)).unwrap();
        assert_eq!(again.id, Some(id));
        assert_eq!(again.count, 1);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn commit_rejects_in_place_key_collision() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.get_or_create::<Widget>(widget("b", 2)).unwrap();
        manager.commit().unwrap();

        manager.entity_mut::<Widget>(SurrogateId::new(1)).unwrap().count = 5;
        manager.entity_mut::<Widget>(SurrogateId::new(2)).unwrap().code = "a".into();
        let result = manager.commit();
        assert!(matches!(result, Err(CoreError::DuplicateKey { .. })));

        // Nothing was staged or re-indexed.
        assert_eq!(manager.id_for("Widget", "a"), Some(SurrogateId::new(1)));
        assert_eq!(manager.id_for("Widget", "b"), Some(SurrogateId::new(2)));
        let stored = manager.store().get_record("Widget", "a").unwrap();
        assert_eq!(stored.get("count"), Some(&Value::Integer(1)));
    }

    #[test]
    fn commit_allows_swapping_keys_in_place() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager.get_or_create::<Widget>(widget("b", 2)).unwrap();
        manager.commit().unwrap();

        manager.entity_mut::<Widget>(SurrogateId::new(1)).unwrap().code = "b".into();
        manager.entity_mut::<Widget>(SurrogateId::new(2)).unwrap().code = "a".into();
        manager.commit().unwrap();

        assert_eq!(manager.id_for("Widget", "b"), Some(SurrogateId::new(1)));
        assert_eq!(manager.id_for("Widget", "a"), Some(SurrogateId::new(2)));
        assert_eq!(manager.find::<Widget>("a").unwrap().count, 2);
        assert_eq!(manager.store().record_count(), 2);
    }

    #[test]
    fn update_after_in_place_key_change_releases_indexed_key() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        let id = SurrogateId::new(1);
        manager.entity_mut::<Widget>(id).unwrap().code = "b".into();

        manager.update(id, &widget("c", 1)).unwrap();
        assert!(manager.id_for("Widget", "a").is_none());
        assert_eq!(manager.id_for("Widget", "c"), Some(id));
        manager.commit().unwrap();
        assert_eq!(manager.store().record_count(), 1);
    }

    #[test]
    fn commit_rejects_entity_without_identity() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();
        manager
            .entity_by_id_mut(SurrogateId::new(1))
            .unwrap()
            .set(ID_FIELD, Value::Null)
            .unwrap();

        let result = manager.commit();
        assert!(matches!(result, Err(CoreError::IdentityNotSet { .. })));
        assert_eq!(manager.store().record_count(), 0);
    }

    #[test]
    fn retain_all_keeps_pending_after_commit() {
        let mut manager = manager();
        manager.get_or_create::<Widget>(widget("a", 1)).unwrap();

        assert_eq!(manager.commit().unwrap(), 1);
        assert_eq!(manager.pending_save_ids(), &[SurrogateId::new(1)]);
        assert_eq!(manager.commit().unwrap(), 1);
    }

    #[test]
    fn bootstrap_loads_without_pending() {
        let mut store = DataStore::open_in_memory();
        store.put("Widget", "a", widget("a", 3));
        store.put("Widget", "b", widget("b", 4));
        store.put("Sprocket", "s", Attributes::new().with("teeth", 12));

        let registry = EntityRegistry::new().with::<Widget>();
        let manager = EntityManager::bootstrap(store, registry).unwrap();

        assert_eq!(manager.len(), 2);
        assert!(manager.pending_save_ids().is_empty());
        assert_eq!(
            manager.ids().collect::<Vec<_>>(),
            vec![SurrogateId::new(1), SurrogateId::new(2)]
        );
        assert_eq!(manager.find::<Widget>("b").unwrap().count, 4);
        assert!(manager.store().get_record("Sprocket", "s").is_some());
    }

    #[test]
    fn bootstrap_rejects_mismatched_key() {
        let mut store = DataStore::open_in_memory();
        store.put("Widget", "a", widget("b", 3));

        let registry = EntityRegistry::new().with::<Widget>();
        let result = EntityManager::bootstrap(store, registry);
        assert!(matches!(result, Err(CoreError::StoreCorrupt { .. })));
    }

    #[test]
    fn bootstrap_rejects_undeclared_member() {
        let mut store = DataStore::open_in_memory();
        store.put("Widget", "a", widget("a", 3).with("colour", "red"));

        let registry = EntityRegistry::new().with::<Widget>();
        let result = EntityManager::bootstrap(store, registry);
        assert!(matches!(result, Err(CoreError::StoreCorrupt { .. })));
    }
}
