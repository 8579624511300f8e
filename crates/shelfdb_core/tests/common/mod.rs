//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use shelfdb_codec::{Attributes, Value};
use shelfdb_core::entity::member;
use shelfdb_core::{CommitObserver, Entity, EntityManager, EntityRegistry, Member, SurrogateId};
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Part {
    pub id: Option<SurrogateId>,
    pub number: String,
    pub label: String,
    pub stock: i64,
}

static PART_MEMBERS: [Member<Part>; 3] = [
    Member::new(
        "number",
        |p| Value::from(p.number.as_str()),
        |p, v| {
            p.number = member::text::<Part>("number", v)?;
            Ok(())
        },
    ),
    Member::new(
        "label",
        |p| Value::from(p.label.as_str()),
        |p, v| {
            p.label = member::text::<Part>("label", v)?;
            Ok(())
        },
    ),
    Member::new(
        "stock",
        |p| Value::Integer(p.stock),
        |p, v| {
            p.stock = member::integer::<Part>("stock", v)?;
            Ok(())
        },
    ),
];

impl Entity for Part {
    const TYPE_NAME: &'static str = "Part";
    const PRIMARY_KEY: &'static str = "number";

    fn members() -> &'static [Member<Self>] {
        &PART_MEMBERS
    }

    fn identity(&self) -> Option<SurrogateId> {
        self.id
    }

    fn set_identity(&mut self, id: Option<SurrogateId>) {
        self.id = id;
    }
}

pub fn registry() -> EntityRegistry {
    EntityRegistry::new().with::<Part>()
}

pub fn part(number: &str, stock: i64) -> Attributes {
    Attributes::new()
        .with("number", number)
        .with("label", format!("part {number}"))
        .with("stock", stock)
}

/// One observed commit: who saw it, what was pending, and how many records
/// the store held at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    pub observer: &'static str,
    pub pending: Vec<SurrogateId>,
    pub staged_records: usize,
}

/// Appends a [`Sighting`] to a shared journal on every commit.
pub struct Recorder {
    name: &'static str,
    journal: Arc<Mutex<Vec<Sighting>>>,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Arc<Mutex<Vec<Sighting>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: Arc::clone(journal),
        })
    }
}

impl CommitObserver for Recorder {
    fn on_commit(&self, manager: &EntityManager) {
        self.journal.lock().push(Sighting {
            observer: self.name,
            pending: manager.pending_save_ids().to_vec(),
            staged_records: manager.store().record_count(),
        });
    }
}
