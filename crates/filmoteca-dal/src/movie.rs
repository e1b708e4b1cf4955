use std::str::FromStr as _;

use crate::{
    ChosenConnection, ChosenDB, ChosenRow, Error, error::Result, genre::Genre, movie_genre,
};
use garde::Validate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Pool, Row as _};
use tracing::debug;

const MOVIE_COLUMNS: &str = "id, title, director, release_year, duration_minutes, rating";

fn is_valid_rating(rating: &Decimal, _ctx: &()) -> garde::Result {
    if rating.is_sign_negative() || *rating > Decimal::TEN {
        Err(garde::Error::new("rating must be between 0 and 10"))
    } else {
        Ok(())
    }
}

/// Movie as received from API clients, genres are referenced by ids.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateMovie {
    #[serde(rename = "titulo")]
    #[garde(length(min = 1, max = 255))]
    pub title: String,
    #[garde(length(min = 1, max = 255))]
    pub director: String,
    #[serde(rename = "ano_Lanzamiento", alias = "anoLanzamiento")]
    #[garde(range(min = 1850, max = 2200))]
    pub release_year: i32,
    #[serde(rename = "duracionMinutos", default)]
    #[garde(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[serde(rename = "calificacion")]
    #[garde(custom(is_valid_rating))]
    pub rating: Decimal,
    #[serde(rename = "generoIds", default)]
    #[garde(length(max = 64))]
    pub genre_ids: Vec<i64>,
}

impl CreateMovie {
    /// Requested genre ids, sorted and without duplicates
    pub fn unique_genre_ids(&self) -> Vec<i64> {
        let mut ids = self.genre_ids.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Movie {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    pub director: String,
    #[serde(rename = "ano_Lanzamiento")]
    pub release_year: i32,
    #[serde(rename = "duracionMinutos")]
    pub duration_minutes: Option<i32>,
    #[serde(rename = "calificacion", with = "rust_decimal::serde::float")]
    #[cfg_attr(feature = "openapi", schema(value_type = f64))]
    pub rating: Decimal,
    #[serde(rename = "generos")]
    pub genres: Vec<Genre>,
}

/// Values to be stored, `id` is `None` for a new movie.
#[derive(Debug, Clone)]
pub struct MovieDraft {
    pub id: Option<i64>,
    pub title: String,
    pub director: String,
    pub release_year: i32,
    pub duration_minutes: Option<i32>,
    pub rating: Decimal,
    pub genre_ids: Vec<i64>,
}

impl MovieDraft {
    pub fn with_genres(mut self, genres: &[Genre]) -> Self {
        self.genre_ids = genres.iter().map(|g| g.id).collect();
        self
    }
}

impl From<CreateMovie> for MovieDraft {
    fn from(payload: CreateMovie) -> Self {
        let genre_ids = payload.unique_genre_ids();
        MovieDraft {
            id: None,
            title: payload.title,
            director: payload.director,
            release_year: payload.release_year,
            duration_minutes: payload.duration_minutes,
            rating: payload.rating,
            genre_ids,
        }
    }
}

struct MovieRow {
    id: i64,
    title: String,
    director: String,
    release_year: i32,
    duration_minutes: Option<i32>,
    rating: Decimal,
}

impl sqlx::FromRow<'_, ChosenRow> for MovieRow {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let rating: String = row.try_get("rating")?;
        let rating = Decimal::from_str(&rating).map_err(|e| sqlx::Error::ColumnDecode {
            index: "rating".to_string(),
            source: Box::new(e),
        })?;
        Ok(MovieRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            director: row.try_get("director")?,
            release_year: row.try_get("release_year")?,
            duration_minutes: row.try_get("duration_minutes")?,
            rating,
        })
    }
}

impl MovieRow {
    fn into_movie(self, genres: Vec<Genre>) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            director: self.director,
            release_year: self.release_year,
            duration_minutes: self.duration_minutes,
            rating: self.rating,
            genres,
        }
    }
}

/// Inserts or updates movie and rewrites its genre associations.
/// Caller is responsible for running this inside a transaction.
pub async fn save(conn: &mut ChosenConnection, draft: &MovieDraft) -> Result<Movie> {
    let id = match draft.id {
        None => {
            let result = sqlx::query(
                "INSERT INTO movie (title, director, release_year, duration_minutes, rating) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&draft.title)
            .bind(&draft.director)
            .bind(draft.release_year)
            .bind(draft.duration_minutes)
            .bind(draft.rating.to_string())
            .execute(&mut *conn)
            .await?;
            result.last_insert_rowid()
        }
        Some(id) => {
            let result = sqlx::query(
                "UPDATE movie SET title = ?, director = ?, release_year = ?, duration_minutes = ?, rating = ? WHERE id = ?",
            )
            .bind(&draft.title)
            .bind(&draft.director)
            .bind(draft.release_year)
            .bind(draft.duration_minutes)
            .bind(draft.rating.to_string())
            .bind(id)
            .execute(&mut *conn)
            .await?;
            if result.rows_affected() == 0 {
                return Err(Error::RecordNotFound(format!("Movie {id}")));
            }
            id
        }
    };

    movie_genre::replace_genres(&mut *conn, id, &draft.genre_ids).await?;
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| Error::RecordNotFound(format!("Movie {id}")))
}

pub async fn find_by_id(conn: &mut ChosenConnection, id: i64) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movie WHERE id = ?");
    let row = sqlx::query_as::<_, MovieRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => {
            let genres = movie_genre::genres_of_movie(&mut *conn, row.id).await?;
            Ok(Some(row.into_movie(genres)))
        }
        None => Ok(None),
    }
}

pub async fn find_by_title(conn: &mut ChosenConnection, title: &str) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movie WHERE title = ? ORDER BY id LIMIT 1");
    let row = sqlx::query_as::<_, MovieRow>(&sql)
        .bind(title)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        Some(row) => {
            let genres = movie_genre::genres_of_movie(&mut *conn, row.id).await?;
            Ok(Some(row.into_movie(genres)))
        }
        None => Ok(None),
    }
}

pub async fn find_all(conn: &mut ChosenConnection) -> Result<Vec<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movie ORDER BY id");
    let rows = sqlx::query_as::<_, MovieRow>(&sql)
        .fetch_all(&mut *conn)
        .await?;
    let mut genres = movie_genre::genres_by_movie(&mut *conn).await?;
    let movies = rows
        .into_iter()
        .map(|row| {
            let movie_genres = genres.remove(&row.id).unwrap_or_default();
            row.into_movie(movie_genres)
        })
        .collect();
    Ok(movies)
}

/// Returns `false` if there was no such movie.
pub async fn delete_by_id(conn: &mut ChosenConnection, id: i64) -> Result<bool> {
    movie_genre::unlink_movie(&mut *conn, id).await?;
    let res = sqlx::query("DELETE FROM movie WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all(conn: &mut ChosenConnection) -> Result<u64> {
    movie_genre::clear(&mut *conn).await?;
    let res = sqlx::query("DELETE FROM movie").execute(&mut *conn).await?;
    Ok(res.rows_affected())
}

pub type MovieRepository = MovieRepositoryImpl<Pool<ChosenDB>>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn save(&self, draft: MovieDraft) -> Result<Movie> {
        let mut tx = self.executor.begin().await?;
        let movie = save(&mut tx, &draft).await?;
        tx.commit().await?;
        debug!("Saved movie {}", movie.id);
        Ok(movie)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Movie>> {
        let mut conn = self.executor.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    pub async fn find_by_title(&self, title: &str) -> Result<Option<Movie>> {
        let mut conn = self.executor.acquire().await?;
        find_by_title(&mut conn, title).await
    }

    pub async fn find_all(&self) -> Result<Vec<Movie>> {
        let mut conn = self.executor.acquire().await?;
        find_all(&mut conn).await
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut tx = self.executor.begin().await?;
        let deleted = delete_by_id(&mut tx, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    pub async fn delete_all(&self) -> Result<()> {
        let mut tx = self.executor.begin().await?;
        let deleted = delete_all(&mut tx).await?;
        tx.commit().await?;
        debug!("Deleted all {deleted} movies");
        Ok(())
    }
}
