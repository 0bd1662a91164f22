//! Person record storage
//!
//! [`PersonStore`] is the storage seam used by the service layer;
//! [`SqlitePersonStore`] is the sqlx implementation. Every operation runs
//! under the caller's [`RequestContext`] and is abandoned once that context
//! is cancelled or its deadline passes.

use async_trait::async_trait;
use persona_common::{Error, NewPerson, PersonFilter, PersonInfo, RequestContext, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::future::Future;
use tracing::{debug, info};

/// CRUD over stored person records
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Insert a fully enriched record and return it with its new id
    async fn add(&self, ctx: &RequestContext, person: NewPerson) -> Result<PersonInfo>;

    /// Records matching every set field of `filter`, ordered by id
    async fn find(&self, ctx: &RequestContext, filter: &PersonFilter) -> Result<Vec<PersonInfo>>;

    /// Overwrite every field of the record with `info.id`
    async fn update(&self, ctx: &RequestContext, info: &PersonInfo) -> Result<()>;

    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<()>;

    /// Cheap round-trip proving the backing store answers
    async fn ping(&self, ctx: &RequestContext) -> Result<()>;
}

/// SQLite-backed [`PersonStore`]
#[derive(Clone)]
pub struct SqlitePersonStore {
    pool: SqlitePool,
}

impl SqlitePersonStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Drive `query` unless `ctx` ends first
///
/// A context that is already done never starts the query.
async fn bounded<T, F>(ctx: &RequestContext, operation: &'static str, query: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    if ctx.is_cancelled() {
        return Err(Error::Cancelled(operation.to_string()));
    }

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(Error::Cancelled(operation.to_string())),
        _ = ctx.expired() => Err(Error::Cancelled(format!("{} (deadline exceeded)", operation))),
        res = query => Ok(res?),
    }
}

#[async_trait]
impl PersonStore for SqlitePersonStore {
    async fn add(&self, ctx: &RequestContext, person: NewPerson) -> Result<PersonInfo> {
        let insert = sqlx::query(
            r#"
            INSERT INTO persons (name, surname, age, gender, country)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&person.name)
        .bind(&person.surname)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.country)
        .execute(&self.pool);
        let result = bounded(ctx, "add person", insert).await?;

        let id = result.last_insert_rowid();
        info!(id, "Added person to database");
        Ok(person.with_id(id))
    }

    async fn find(&self, ctx: &RequestContext, filter: &PersonFilter) -> Result<Vec<PersonInfo>> {
        let mut query = build_find_query(filter);
        debug!(sql = query.sql(), "Select query");

        let rows = bounded(ctx, "find persons", query.build().fetch_all(&self.pool)).await?;
        Ok(rows.iter().map(person_from_row).collect())
    }

    async fn update(&self, ctx: &RequestContext, info: &PersonInfo) -> Result<()> {
        let update = sqlx::query(
            r#"
            UPDATE persons
            SET name = ?, surname = ?, age = ?, gender = ?, country = ?
            WHERE person_id = ?
            "#,
        )
        .bind(&info.name)
        .bind(&info.surname)
        .bind(info.age)
        .bind(&info.gender)
        .bind(&info.country)
        .bind(info.id)
        .execute(&self.pool);
        let result = bounded(ctx, "update person", update).await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("person {}", info.id)));
        }

        info!(id = info.id, "Updated person in database");
        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<()> {
        let delete = sqlx::query("DELETE FROM persons WHERE person_id = ?")
            .bind(id)
            .execute(&self.pool);
        let result = bounded(ctx, "delete person", delete).await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("person {}", id)));
        }

        info!(id, "Deleted person from database");
        Ok(())
    }

    async fn ping(&self, ctx: &RequestContext) -> Result<()> {
        bounded(ctx, "ping", sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

/// Build the filtered SELECT; values are always bound, never inlined
fn build_find_query(filter: &PersonFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::new(
        "SELECT person_id, name, surname, age, gender, country FROM persons WHERE 1 = 1",
    );

    if let Some(id) = filter.id() {
        query.push(" AND person_id = ").push_bind(id);
    }
    if let Some(name) = filter.name() {
        query.push(" AND name = ").push_bind(name.to_owned());
    }
    if let Some(surname) = filter.surname() {
        query.push(" AND surname = ").push_bind(surname.to_owned());
    }
    if let Some(age) = filter.age() {
        query.push(" AND age = ").push_bind(age);
    }
    if let Some(gender) = filter.gender() {
        query.push(" AND gender = ").push_bind(gender.to_owned());
    }
    if let Some(country) = filter.country() {
        query.push(" AND country = ").push_bind(country.to_owned());
    }

    query.push(" ORDER BY person_id");

    // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
    match (filter.count(), filter.offset()) {
        (Some(count), Some(offset)) => {
            query.push(" LIMIT ").push_bind(count);
            query.push(" OFFSET ").push_bind(offset);
        }
        (Some(count), None) => {
            query.push(" LIMIT ").push_bind(count);
        }
        (None, Some(offset)) => {
            query.push(" LIMIT -1 OFFSET ").push_bind(offset);
        }
        (None, None) => {}
    }

    query
}

fn person_from_row(row: &SqliteRow) -> PersonInfo {
    PersonInfo {
        id: row.get("person_id"),
        name: row.get("name"),
        surname: row.get("surname"),
        age: row.get("age"),
        gender: row.get("gender"),
        country: row.get("country"),
    }
}
