//! One repository shape shared by every table.
//!
//! An [`Entity`] names its table, its select list and the columns a caller may
//! touch on update. [`Repository`] turns that into create / get / update /
//! delete, and [`ChildEntity`] adds listing by the owning user.

use std::marker::PhantomData;

use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySql, QueryBuilder};
use tracing::{debug, error};

use super::error::{RepoError, RepoResult};
use super::pool::ConnectionManager;

/// A value bound into an INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Id(u64),
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Id(v)
    }
}

/// Column/value pairs carried by an insert or a patch.
pub trait Record {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)>;
}

/// Keeps the columns a patch actually sets, in the order given.
pub fn present_fields<const N: usize>(
    fields: [(&'static str, Option<FieldValue>); N],
) -> Vec<(&'static str, FieldValue)> {
    fields
        .into_iter()
        .filter_map(|(col, value)| value.map(|v| (col, v)))
        .collect()
}

pub trait Entity: for<'r> FromRow<'r, MySqlRow> + Send + Unpin + 'static {
    /// Human name used in logs.
    const KIND: &'static str;
    const TABLE: &'static str;
    /// Select list, always starting with `id` and ending with `created_at`.
    const COLUMNS: &'static str;
    /// Columns a patch may write. `id` and `created_at` never appear here.
    const UPDATABLE: &'static [&'static str];

    type New: Record + Send;
    type Patch: Record + Send;
}

/// Entity owned by a user through a foreign key.
pub trait ChildEntity: Entity {
    const PARENT_KEY: &'static str;
}

pub struct Repository<E> {
    db: ConnectionManager,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(db: ConnectionManager) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub(crate) fn db(&self) -> &ConnectionManager {
        &self.db
    }

    /// Insert a row; the store assigns `id` and `created_at`.
    pub async fn create(&self, new: E::New) -> RepoResult<u64> {
        let mut qb = insert_query::<E>(new.into_fields());
        let mut conn = self.db.acquire().await?;
        let res = self.db.bounded(qb.build().execute(&mut *conn)).await;
        self.db.release(conn);

        match res {
            Ok(done) => {
                let id = done.last_insert_id();
                debug!(kind = E::KIND, id, "row created");
                Ok(id)
            }
            Err(e) => {
                error!(kind = E::KIND, error = %e, "create failed");
                Err(e)
            }
        }
    }

    /// `Ok(None)` when no row has this id.
    pub async fn get_by_id(&self, id: u64) -> RepoResult<Option<E>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", E::COLUMNS, E::TABLE);
        let mut conn = self.db.acquire().await?;
        let res = self
            .db
            .bounded(sqlx::query_as::<_, E>(&sql).bind(id).fetch_optional(&mut *conn))
            .await;
        self.db.release(conn);
        res
    }

    /// Apply a partial update. Returns whether a row with this id existed.
    pub async fn update(&self, id: u64, patch: E::Patch) -> RepoResult<bool> {
        let mut qb = update_query::<E>(id, patch.into_fields())?;
        let mut conn = self.db.acquire().await?;
        let res = self.db.bounded(qb.build().execute(&mut *conn)).await;
        self.db.release(conn);

        let changed = res?.rows_affected() > 0;
        debug!(kind = E::KIND, id, changed, "row updated");
        Ok(changed)
    }

    /// Remove a row. Returns whether it existed.
    pub async fn delete(&self, id: u64) -> RepoResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        let mut conn = self.db.acquire().await?;
        let res = self
            .db
            .bounded(sqlx::query(&sql).bind(id).execute(&mut *conn))
            .await;
        self.db.release(conn);

        let removed = res?.rows_affected() > 0;
        debug!(kind = E::KIND, id, removed, "row deleted");
        Ok(removed)
    }
}

impl<E: ChildEntity> Repository<E> {
    /// Every row owned by `parent_id`, newest first.
    pub async fn list_by_parent(&self, parent_id: u64) -> RepoResult<Vec<E>> {
        let sql = list_by_parent_sql::<E>();
        let mut conn = self.db.acquire().await?;
        let res = self
            .db
            .bounded(sqlx::query_as::<_, E>(&sql).bind(parent_id).fetch_all(&mut *conn))
            .await;
        self.db.release(conn);
        res
    }
}

fn insert_query<E: Entity>(
    fields: Vec<(&'static str, FieldValue)>,
) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", E::TABLE));
    {
        let mut cols = qb.separated(", ");
        for (col, _) in &fields {
            cols.push(*col);
        }
    }
    qb.push(") VALUES (");
    {
        let mut vals = qb.separated(", ");
        for (_, value) in fields {
            push_value(&mut vals, value);
        }
    }
    qb.push(")");
    qb
}

fn update_query<E: Entity>(
    id: u64,
    fields: Vec<(&'static str, FieldValue)>,
) -> RepoResult<QueryBuilder<'static, MySql>> {
    if fields.is_empty() {
        return Err(RepoError::EmptyPatch);
    }
    if let Some((col, _)) = fields.iter().find(|(col, _)| !E::UPDATABLE.contains(col)) {
        return Err(RepoError::InvalidField((*col).to_string()));
    }

    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
    {
        let mut sets = qb.separated(", ");
        for (col, value) in fields {
            sets.push(format!("{col} = "));
            push_value_unseparated(&mut sets, value);
        }
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    Ok(qb)
}

fn list_by_parent_sql<E: ChildEntity>() -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ? ORDER BY created_at DESC, id DESC",
        E::COLUMNS,
        E::TABLE,
        E::PARENT_KEY
    )
}

fn push_value(
    sep: &mut sqlx::query_builder::Separated<'_, 'static, MySql, &'static str>,
    value: FieldValue,
) {
    match value {
        FieldValue::Text(v) => sep.push_bind(v),
        FieldValue::Number(v) => sep.push_bind(v),
        FieldValue::Id(v) => sep.push_bind(v),
    };
}

fn push_value_unseparated(
    sep: &mut sqlx::query_builder::Separated<'_, 'static, MySql, &'static str>,
    value: FieldValue,
) {
    match value {
        FieldValue::Text(v) => sep.push_bind_unseparated(v),
        FieldValue::Number(v) => sep.push_bind_unseparated(v),
        FieldValue::Id(v) => sep.push_bind_unseparated(v),
    };
}
