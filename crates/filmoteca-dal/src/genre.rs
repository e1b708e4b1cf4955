use crate::{ChosenConnection, ChosenDB, Error, error::Result, movie_genre};
use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Pool, QueryBuilder};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateGenre {
    #[serde(rename = "nombre")]
    #[garde(length(min = 1, max = 255))]
    pub name: String,
}

impl CreateGenre {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Genre {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
}

pub(crate) async fn insert(conn: &mut ChosenConnection, payload: &CreateGenre) -> Result<Genre> {
    let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
        .bind(&payload.name)
        .execute(&mut *conn)
        .await?;
    Ok(Genre {
        id: result.last_insert_rowid(),
        name: payload.name.clone(),
    })
}

pub(crate) async fn get(conn: &mut ChosenConnection, id: i64) -> Result<Option<Genre>> {
    let record = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(record)
}

/// Returns genres for those ids that exist, ordered by id.
/// Missing ids are silently skipped, it's up to caller to compare.
pub async fn find_many(conn: &mut ChosenConnection, ids: &[i64]) -> Result<Vec<Genre>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = QueryBuilder::<ChosenDB>::new("SELECT id, name FROM genre WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");
    let records = query
        .build_query_as::<Genre>()
        .fetch_all(&mut *conn)
        .await?;
    Ok(records)
}

pub(crate) async fn list(conn: &mut ChosenConnection) -> Result<Vec<Genre>> {
    let records = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre ORDER BY id")
        .fetch(&mut *conn)
        .try_collect::<Vec<_>>()
        .await?;
    Ok(records)
}

pub(crate) async fn delete(conn: &mut ChosenConnection, id: i64) -> Result<bool> {
    let unlinked = movie_genre::unlink_genre(&mut *conn, id).await?;
    let res = sqlx::query("DELETE FROM genre WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    debug!("Deleted genre {id}, unlinked from {unlinked} movies");
    Ok(res.rows_affected() > 0)
}

pub(crate) async fn delete_all(conn: &mut ChosenConnection) -> Result<u64> {
    movie_genre::clear(&mut *conn).await?;
    let res = sqlx::query("DELETE FROM genre").execute(&mut *conn).await?;
    Ok(res.rows_affected())
}

pub type GenreRepository = GenreRepositoryImpl<Pool<ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn save(&self, payload: CreateGenre) -> Result<Genre> {
        let mut conn = self.executor.acquire().await?;
        insert(&mut conn, &payload).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Genre>> {
        let mut conn = self.executor.acquire().await?;
        get(&mut conn, id).await
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Genre {id}")))
    }

    pub async fn find_many(&self, ids: &[i64]) -> Result<Vec<Genre>> {
        let mut conn = self.executor.acquire().await?;
        find_many(&mut conn, ids).await
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let mut conn = self.executor.acquire().await?;
        list(&mut conn).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.executor.begin().await?;
        if delete(&mut tx, id).await? {
            tx.commit().await?;
            Ok(())
        } else {
            Err(Error::RecordNotFound(format!("Genre {id}")))
        }
    }

    pub async fn delete_all(&self) -> Result<()> {
        let mut tx = self.executor.begin().await?;
        let deleted = delete_all(&mut tx).await?;
        tx.commit().await?;
        debug!("Deleted all {deleted} genres");
        Ok(())
    }
}
