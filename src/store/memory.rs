use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use crate::model::{Villa, VillaNumber};
use crate::store::traits::{check_include, Entity, Filter, KeyStrategy, Repository};
use crate::store::RepositoryError;

/// Rows of one aggregate in insertion order.
#[derive(Debug)]
pub struct Table<T> {
    rows: Vec<T>,
    next_key: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_key: 1,
        }
    }
}

/// In-process store with the same observable rules as the Postgres schema:
/// key generation, unique villa names, the villa reference on villa numbers
/// and cascading deletes.
///
/// Each table lock is held for a single repository call only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    villas: RwLock<Table<Villa>>,
    villa_numbers: RwLock<Table<VillaNumber>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-aggregate wiring for [`MemoryStore`].
pub trait MemoryEntity: Entity {
    fn table(store: &MemoryStore) -> &RwLock<Table<Self>>;

    fn check_references(&self, _store: &MemoryStore) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn load_include(_store: &MemoryStore, _rows: &mut [Self], _include: &str) {}

    fn after_remove(&self, _store: &MemoryStore) {}
}

impl MemoryEntity for Villa {
    fn table(store: &MemoryStore) -> &RwLock<Table<Self>> {
        &store.villas
    }

    fn after_remove(&self, store: &MemoryStore) {
        store
            .villa_numbers
            .write()
            .rows
            .retain(|number| number.villa_id != self.id);
    }
}

impl MemoryEntity for VillaNumber {
    fn table(store: &MemoryStore) -> &RwLock<Table<Self>> {
        &store.villa_numbers
    }

    fn check_references(&self, store: &MemoryStore) -> Result<(), RepositoryError> {
        let villas = store.villas.read();
        if villas.rows.iter().any(|villa| villa.id == self.villa_id) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidReference(format!(
                "Villa {} referenced by villa number {} does not exist",
                self.villa_id, self.villa_no
            )))
        }
    }

    fn load_include(store: &MemoryStore, rows: &mut [Self], _include: &str) {
        let villas: HashMap<i32, Villa> = store
            .villas
            .read()
            .rows
            .iter()
            .map(|villa| (villa.id, villa.clone()))
            .collect();

        for row in rows {
            row.villa = villas.get(&row.villa_id).cloned();
        }
    }
}

#[async_trait::async_trait]
impl<T: MemoryEntity> Repository<T> for MemoryStore {
    async fn get_all(
        &self,
        filter: Option<&Filter<'_, T>>,
        include: Option<&str>,
    ) -> Result<Vec<T>, RepositoryError> {
        check_include::<T>(include)?;

        let mut rows: Vec<T> = T::table(self)
            .read()
            .rows
            .iter()
            .filter(|row| filter.is_none_or(|matches| matches(row)))
            .cloned()
            .collect();

        if let Some(include) = include {
            T::load_include(self, &mut rows, include);
        }
        Ok(rows)
    }

    async fn get(
        &self,
        filter: &Filter<'_, T>,
        tracked: bool,
        include: Option<&str>,
    ) -> Result<Option<T>, RepositoryError> {
        check_include::<T>(include)?;
        log::trace!("{} lookup (tracked: {})", T::NAME, tracked);

        let found = T::table(self).read().rows.iter().find(|row| filter(row)).cloned();

        Ok(found.map(|row| {
            let mut rows = [row];
            if let Some(include) = include {
                T::load_include(self, &mut rows, include);
            }
            let [row] = rows;
            row
        }))
    }

    async fn create(&self, mut entity: T) -> Result<T, RepositoryError> {
        entity.clear_includes();
        entity.check_references(self)?;

        let now = Utc::now();
        let mut table = T::table(self).write();

        match T::KEY_STRATEGY {
            KeyStrategy::StoreAssigned => entity.set_key(table.next_key),
            KeyStrategy::CallerAssigned => {
                if table.rows.iter().any(|row| row.key() == entity.key()) {
                    return Err(RepositoryError::Conflict(format!(
                        "{} {} already exists",
                        T::NAME,
                        entity.key()
                    )));
                }
            }
        }
        if table.rows.iter().any(|row| entity.conflicts_with(row)) {
            return Err(RepositoryError::Conflict(format!(
                "{} conflicts with an existing row",
                T::NAME
            )));
        }

        if T::KEY_STRATEGY == KeyStrategy::StoreAssigned {
            table.next_key += 1;
        }
        entity.set_created_date(now);
        entity.set_updated_date(now);
        table.rows.push(entity.clone());

        Ok(entity)
    }

    async fn update(&self, mut entity: T) -> Result<T, RepositoryError> {
        entity.clear_includes();
        entity.check_references(self)?;

        let mut table = T::table(self).write();
        let position = table
            .rows
            .iter()
            .position(|row| row.key() == entity.key())
            .ok_or(RepositoryError::NotFound {
                entity: T::NAME,
                key: entity.key(),
            })?;

        if table.rows.iter().any(|row| entity.conflicts_with(row)) {
            return Err(RepositoryError::Conflict(format!(
                "{} conflicts with an existing row",
                T::NAME
            )));
        }

        entity.set_created_date(table.rows[position].created_date());
        entity.set_updated_date(Utc::now());
        table.rows[position] = entity.clone();

        Ok(entity)
    }

    async fn remove(&self, entity: T) -> Result<(), RepositoryError> {
        {
            let mut table = T::table(self).write();
            let position = table
                .rows
                .iter()
                .position(|row| row.key() == entity.key())
                .ok_or(RepositoryError::NotFound {
                    entity: T::NAME,
                    key: entity.key(),
                })?;
            table.rows.remove(position);
        }

        entity.after_remove(self);
        Ok(())
    }
}
