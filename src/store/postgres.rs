use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Utc;
use itertools::Itertools;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};

use crate::model::{Villa, VillaNumber};
use crate::store::traits::{check_include, Entity, Filter, Repository};
use crate::store::RepositoryError;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

type EntityQuery<'q, T> = QueryAs<'q, Postgres, T, PgArguments>;

/// Table mapping for an aggregate stored in Postgres.
#[async_trait::async_trait]
pub trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    const KEY_COLUMN: &'static str;
    const COLUMNS: &'static str;
    /// Store order used by `get` and `get_all`.
    const ORDER_BY: &'static str;

    /// `INSERT ... RETURNING *` with every column bound from `self`.
    fn insert_query(&self) -> EntityQuery<'_, Self>;

    /// `UPDATE ... WHERE key = $1 RETURNING *`. Must leave `created_date` alone.
    fn update_query(&self) -> EntityQuery<'_, Self>;

    async fn load_include(
        _pool: &PgPool,
        _rows: &mut [Self],
        _include: &str,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }
}

const VILLA_COLUMNS: &str =
    "id, name, occupancy, sqft, image_url, details, rate, amenity, created_date, updated_date";
const VILLA_NUMBER_COLUMNS: &str = "villa_no, villa_id, special_details, created_date, updated_date";

#[async_trait::async_trait]
impl PgEntity for Villa {
    const TABLE: &'static str = "villas";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static str = VILLA_COLUMNS;
    const ORDER_BY: &'static str = "id";

    fn insert_query(&self) -> EntityQuery<'_, Self> {
        sqlx::query_as::<_, Villa>(
            r#"
            INSERT INTO villas (name, occupancy, sqft, image_url, details, rate, amenity, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, occupancy, sqft, image_url, details, rate, amenity, created_date, updated_date
            "#,
        )
        .bind(&self.name)
        .bind(self.occupancy)
        .bind(self.sqft)
        .bind(&self.image_url)
        .bind(&self.details)
        .bind(self.rate)
        .bind(&self.amenity)
        .bind(self.created_date)
        .bind(self.updated_date)
    }

    fn update_query(&self) -> EntityQuery<'_, Self> {
        sqlx::query_as::<_, Villa>(
            r#"
            UPDATE villas SET
                name = $2,
                occupancy = $3,
                sqft = $4,
                image_url = $5,
                details = $6,
                rate = $7,
                amenity = $8,
                updated_date = $9
            WHERE id = $1
            RETURNING id, name, occupancy, sqft, image_url, details, rate, amenity, created_date, updated_date
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.occupancy)
        .bind(self.sqft)
        .bind(&self.image_url)
        .bind(&self.details)
        .bind(self.rate)
        .bind(&self.amenity)
        .bind(self.updated_date)
    }
}

#[async_trait::async_trait]
impl PgEntity for VillaNumber {
    const TABLE: &'static str = "villa_numbers";
    const KEY_COLUMN: &'static str = "villa_no";
    const COLUMNS: &'static str = VILLA_NUMBER_COLUMNS;
    const ORDER_BY: &'static str = "created_date, villa_no";

    fn insert_query(&self) -> EntityQuery<'_, Self> {
        sqlx::query_as::<_, VillaNumber>(
            r#"
            INSERT INTO villa_numbers (villa_no, villa_id, special_details, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING villa_no, villa_id, special_details, created_date, updated_date
            "#,
        )
        .bind(self.villa_no)
        .bind(self.villa_id)
        .bind(&self.special_details)
        .bind(self.created_date)
        .bind(self.updated_date)
    }

    fn update_query(&self) -> EntityQuery<'_, Self> {
        sqlx::query_as::<_, VillaNumber>(
            r#"
            UPDATE villa_numbers SET
                villa_id = $2,
                special_details = $3,
                updated_date = $4
            WHERE villa_no = $1
            RETURNING villa_no, villa_id, special_details, created_date, updated_date
            "#,
        )
        .bind(self.villa_no)
        .bind(self.villa_id)
        .bind(&self.special_details)
        .bind(self.updated_date)
    }

    async fn load_include(
        pool: &PgPool,
        rows: &mut [Self],
        _include: &str,
    ) -> Result<(), RepositoryError> {
        let villa_ids: Vec<i32> = rows.iter().map(|row| row.villa_id).unique().collect();
        if villa_ids.is_empty() {
            return Ok(());
        }

        let sql = format!("SELECT {} FROM villas WHERE id = ANY($1)", VILLA_COLUMNS);
        let villas: HashMap<i32, Villa> = sqlx::query_as::<_, Villa>(&sql)
            .bind(&villa_ids)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|villa| (villa.id, villa))
            .collect();

        for row in rows.iter_mut() {
            row.villa = villas.get(&row.villa_id).cloned();
        }
        Ok(())
    }
}

impl PostgresStore {
    async fn select_all<T: PgEntity>(&self) -> Result<Vec<T>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            T::COLUMNS,
            T::TABLE,
            T::ORDER_BY
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }
}

// Predicates are Rust closures, so `get` and `get_all` filter after fetching the
// table. Keyed lookups go through `find_by_key`, which the database answers.
#[async_trait::async_trait]
impl<T: PgEntity> Repository<T> for PostgresStore {
    async fn get_all(
        &self,
        filter: Option<&Filter<'_, T>>,
        include: Option<&str>,
    ) -> Result<Vec<T>, RepositoryError> {
        check_include::<T>(include)?;

        let mut rows: Vec<T> = self
            .select_all::<T>()
            .await?
            .into_iter()
            .filter(|row| filter.is_none_or(|matches| matches(row)))
            .collect();

        if let Some(include) = include {
            T::load_include(&self.pool, &mut rows, include).await?;
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

        let Some(row) = self.select_all::<T>().await?.into_iter().find(|row| filter(row)) else {
            return Ok(None);
        };

        let mut rows = [row];
        if let Some(include) = include {
            T::load_include(&self.pool, &mut rows, include).await?;
        }
        let [row] = rows;
        Ok(Some(row))
    }

    async fn find_by_key(
        &self,
        key: i32,
        tracked: bool,
        include: Option<&str>,
    ) -> Result<Option<T>, RepositoryError> {
        check_include::<T>(include)?;
        log::trace!("{} {} lookup (tracked: {})", T::NAME, key, tracked);

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            T::COLUMNS,
            T::TABLE,
            T::KEY_COLUMN
        );
        let Some(row) = sqlx::query_as::<_, T>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut rows = [row];
        if let Some(include) = include {
            T::load_include(&self.pool, &mut rows, include).await?;
        }
        let [row] = rows;
        Ok(Some(row))
    }

    async fn create(&self, mut entity: T) -> Result<T, RepositoryError> {
        entity.clear_includes();
        let now = Utc::now();
        entity.set_created_date(now);
        entity.set_updated_date(now);

        Ok(entity.insert_query().fetch_one(&self.pool).await?)
    }

    async fn update(&self, mut entity: T) -> Result<T, RepositoryError> {
        entity.clear_includes();
        entity.set_updated_date(Utc::now());

        entity
            .update_query()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound {
                entity: T::NAME,
                key: entity.key(),
            })
    }

    async fn remove(&self, entity: T) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, T::KEY_COLUMN);
        let result = sqlx::query(&sql)
            .bind(entity.key())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                entity: T::NAME,
                key: entity.key(),
            });
        }
        Ok(())
    }
}
