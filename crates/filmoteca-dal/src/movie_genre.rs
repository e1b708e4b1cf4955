//! Maintenance of `movie_genre` junction rows.
//!
//! Rows are always written and removed explicitly here, cascading foreign keys
//! in the schema are only a safety net.

use std::collections::HashMap;

use futures::TryStreamExt as _;

use crate::{ChosenConnection, error::Result, genre::Genre};

#[derive(Debug, sqlx::FromRow)]
struct LinkedGenre {
    movie_id: i64,
    id: i64,
    name: String,
}

/// Makes association rows of the movie exactly match `genre_ids`.
pub async fn replace_genres(
    conn: &mut ChosenConnection,
    movie_id: i64,
    genre_ids: &[i64],
) -> Result<()> {
    unlink_movie(&mut *conn, movie_id).await?;
    for genre_id in genre_ids {
        sqlx::query("INSERT OR IGNORE INTO movie_genre (movie_id, genre_id) VALUES (?, ?)")
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn unlink_movie(conn: &mut ChosenConnection, movie_id: i64) -> Result<u64> {
    let res = sqlx::query("DELETE FROM movie_genre WHERE movie_id = ?")
        .bind(movie_id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn unlink_genre(conn: &mut ChosenConnection, genre_id: i64) -> Result<u64> {
    let res = sqlx::query("DELETE FROM movie_genre WHERE genre_id = ?")
        .bind(genre_id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn clear(conn: &mut ChosenConnection) -> Result<u64> {
    let res = sqlx::query("DELETE FROM movie_genre")
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn genres_of_movie(conn: &mut ChosenConnection, movie_id: i64) -> Result<Vec<Genre>> {
    let records = sqlx::query_as::<_, Genre>(
        "SELECT g.id, g.name FROM genre g JOIN movie_genre mg ON mg.genre_id = g.id WHERE mg.movie_id = ? ORDER BY g.id",
    )
    .bind(movie_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(records)
}

/// Genres of all movies keyed by movie id, movies without genres are absent from the map.
pub async fn genres_by_movie(conn: &mut ChosenConnection) -> Result<HashMap<i64, Vec<Genre>>> {
    let mut rows = sqlx::query_as::<_, LinkedGenre>(
        "SELECT mg.movie_id, g.id, g.name FROM movie_genre mg JOIN genre g ON mg.genre_id = g.id ORDER BY mg.movie_id, g.id",
    )
    .fetch(&mut *conn);

    let mut genres: HashMap<i64, Vec<Genre>> = HashMap::new();
    while let Some(row) = rows.try_next().await? {
        genres.entry(row.movie_id).or_default().push(Genre {
            id: row.id,
            name: row.name,
        });
    }
    Ok(genres)
}
