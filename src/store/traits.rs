use chrono::{DateTime, Utc};

use crate::model::{Villa, VillaNumber};
use crate::store::RepositoryError;

/// Predicate handed to [`Repository::get`] and [`Repository::get_all`].
pub type Filter<'a, T> = dyn Fn(&T) -> bool + Send + Sync + 'a;

/// How an aggregate obtains its identity on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The store hands out the next key; whatever the caller set is ignored.
    StoreAssigned,
    /// The caller supplies the key and the store rejects duplicates.
    CallerAssigned,
}

/// A top-level persisted aggregate.
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Human readable aggregate name, used in errors and log lines.
    const NAME: &'static str;
    const KEY_STRATEGY: KeyStrategy;
    /// Related aggregates that may be named in an `include` directive.
    const INCLUDES: &'static [&'static str] = &[];

    fn key(&self) -> i32;
    fn set_key(&mut self, key: i32);

    fn created_date(&self) -> DateTime<Utc>;
    fn set_created_date(&mut self, at: DateTime<Utc>);
    fn set_updated_date(&mut self, at: DateTime<Utc>);

    /// Drops eagerly loaded relations so they are never written back.
    fn clear_includes(&mut self) {}

    /// True when `self` and `other` may not both be stored because of a
    /// uniqueness rule other than the key itself.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

/// Rejects include names the aggregate does not know about.
pub fn check_include<T: Entity>(include: Option<&str>) -> Result<(), RepositoryError> {
    match include {
        Some(name) if !T::INCLUDES.iter().any(|known| known.eq_ignore_ascii_case(name)) => {
            Err(RepositoryError::UnknownInclude {
                entity: T::NAME,
                include: name.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Aggregate-agnostic data access.
///
/// Every call commits on its own. Predicates are evaluated against the stored
/// row before any include is loaded, and "first" always means first in store
/// order.
#[async_trait::async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All rows in store order, optionally narrowed and with one relation loaded.
    async fn get_all(
        &self,
        filter: Option<&Filter<'_, T>>,
        include: Option<&str>,
    ) -> Result<Vec<T>, RepositoryError>;

    /// First row matching `filter`.
    ///
    /// `tracked = false` asks for a detached copy. Values returned from a
    /// repository are always owned, so mutating either kind never writes
    /// through; the flag documents intent for the partial update path.
    async fn get(
        &self,
        filter: &Filter<'_, T>,
        tracked: bool,
        include: Option<&str>,
    ) -> Result<Option<T>, RepositoryError>;

    /// Row with the given key. Same answer as [`Repository::get`] with a key
    /// predicate; stores that can look a key up directly override it.
    async fn find_by_key(
        &self,
        key: i32,
        tracked: bool,
        include: Option<&str>,
    ) -> Result<Option<T>, RepositoryError> {
        self.get(&move |entity: &T| entity.key() == key, tracked, include)
            .await
    }

    /// Assigns or checks the key, stamps both timestamps and persists.
    async fn create(&self, entity: T) -> Result<T, RepositoryError>;

    /// Replaces every mutable field of an existing row and stamps
    /// `updated_date`. The stored `created_date` is kept.
    async fn update(&self, entity: T) -> Result<T, RepositoryError>;

    /// Hard delete by key.
    async fn remove(&self, entity: T) -> Result<(), RepositoryError>;
}

/// Everything the HTTP layer needs from a backing store.
pub trait VillaStore: Repository<Villa> + Repository<VillaNumber> + Send + Sync {}

impl<S> VillaStore for S where S: Repository<Villa> + Repository<VillaNumber> + Send + Sync {}

pub fn villa_repository<S: VillaStore>(store: &S) -> &dyn Repository<Villa> {
    store
}

pub fn villa_number_repository<S: VillaStore>(store: &S) -> &dyn Repository<VillaNumber> {
    store
}
