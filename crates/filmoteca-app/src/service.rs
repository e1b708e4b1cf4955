//! Movie use cases, each runs as a single database transaction.

use filmoteca_dal::{
    genre::{self, Genre},
    movie::{self, CreateMovie, Movie, MovieDraft},
    ChosenConnection, Pool,
};
use garde::Validate as _;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid movie: {0}")]
    Validation(#[from] garde::Report),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Unknown genre ids: {0:?}")]
    UnknownGenres(Vec<i64>),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] filmoteca_dal::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(value: sqlx::Error) -> Self {
        ServiceError::Persistence(value.into())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

const MOVIE: &str = "Movie";

pub struct MovieService {
    pool: Pool,
}

impl MovieService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create_movie(&self, payload: CreateMovie) -> ServiceResult<Movie> {
        payload.validate()?;
        let mut tx = filmoteca_dal::begin_write(&self.pool).await?;
        let draft = MovieDraft::from(payload);
        let genres = resolve_genres(&mut tx, &draft.genre_ids).await?;
        let movie = movie::save(&mut tx, &draft.with_genres(&genres)).await?;
        tx.commit().await?;
        info!("Created movie {} ({})", movie.id, movie.title);
        Ok(movie)
    }

    pub async fn update_movie(&self, id: i64, payload: CreateMovie) -> ServiceResult<Movie> {
        payload.validate()?;
        let mut tx = filmoteca_dal::begin_write(&self.pool).await?;
        if movie::find_by_id(&mut tx, id).await?.is_none() {
            return Err(ServiceError::NotFound { entity: MOVIE, id });
        }
        let draft = MovieDraft {
            id: Some(id),
            ..MovieDraft::from(payload)
        };
        let genres = resolve_genres(&mut tx, &draft.genre_ids).await?;
        let movie = movie::save(&mut tx, &draft.with_genres(&genres)).await?;
        tx.commit().await?;
        info!("Updated movie {id}");
        Ok(movie)
    }

    pub async fn get_all_movies(&self) -> ServiceResult<Vec<Movie>> {
        let mut conn = self.pool.acquire().await?;
        let movies = movie::find_all(&mut conn).await?;
        debug!("Listed {} movies", movies.len());
        Ok(movies)
    }

    pub async fn get_movie_by_id(&self, id: i64) -> ServiceResult<Movie> {
        let mut conn = self.pool.acquire().await?;
        movie::find_by_id(&mut conn, id)
            .await?
            .ok_or(ServiceError::NotFound { entity: MOVIE, id })
    }

    pub async fn delete_movie(&self, id: i64) -> ServiceResult<()> {
        let mut tx = filmoteca_dal::begin_write(&self.pool).await?;
        if !movie::delete_by_id(&mut tx, id).await? {
            return Err(ServiceError::NotFound { entity: MOVIE, id });
        }
        tx.commit().await?;
        info!("Deleted movie {id}");
        Ok(())
    }
}

/// All ids must exist, otherwise whole request is rejected listing the missing ones.
async fn resolve_genres(conn: &mut ChosenConnection, ids: &[i64]) -> ServiceResult<Vec<Genre>> {
    let genres = genre::find_many(conn, ids).await?;
    if genres.len() == ids.len() {
        return Ok(genres);
    }
    let missing: Vec<i64> = ids
        .iter()
        .copied()
        .filter(|id| !genres.iter().any(|g| g.id == *id))
        .collect();
    debug!("Missing genres {missing:?}");
    Err(ServiceError::UnknownGenres(missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmoteca_dal::genre::{CreateGenre, GenreRepository};
    use rust_decimal::Decimal;
    use tracing_test::traced_test;

    fn request(title: &str, genre_ids: Vec<i64>) -> CreateMovie {
        CreateMovie {
            title: title.to_string(),
            director: "Wachowski".to_string(),
            release_year: 1999,
            duration_minutes: Some(120),
            rating: Decimal::new(90, 1),
            genre_ids,
        }
    }

    async fn setup() -> (MovieService, Genre) {
        let pool = filmoteca_dal::new_memory_pool().await.unwrap();
        let action = GenreRepository::new(pool.clone())
            .save(CreateGenre::new("Acción"))
            .await
            .unwrap();
        (MovieService::new(pool), action)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_create_and_get() {
        let (service, action) = setup().await;
        let created = service
            .create_movie(request("Matrix", vec![action.id, action.id]))
            .await
            .unwrap();
        assert_eq!(created.genres, vec![action.clone()]);

        let fetched = service.get_movie_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Matrix");
        assert_eq!(fetched.director, "Wachowski");
        assert_eq!(fetched.release_year, 1999);
        assert_eq!(fetched.duration_minutes, Some(120));
        assert_eq!(fetched.rating, Decimal::new(9, 0));

        let all = service.get_all_movies().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Matrix");
    }

    #[tokio::test]
    async fn test_create_with_unknown_genre() {
        let (service, action) = setup().await;
        let res = service
            .create_movie(request("Matrix", vec![action.id, 404, 500]))
            .await;
        match res {
            Err(ServiceError::UnknownGenres(missing)) => assert_eq!(missing, vec![404, 500]),
            other => panic!("Unexpected result {other:?}"),
        }
        assert!(service.get_all_movies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_invalid() {
        let (service, _) = setup().await;
        let mut payload = request("", vec![]);
        payload.rating = Decimal::new(11, 0);
        let res = service.create_movie(payload).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert!(service.get_all_movies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update() {
        let (service, action) = setup().await;
        let created = service
            .create_movie(request("Matrix", vec![action.id]))
            .await
            .unwrap();

        let updated = service
            .update_movie(created.id, request("The Matrix", vec![]))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "The Matrix");
        assert!(updated.genres.is_empty());

        let res = service.update_movie(999, request("Nope", vec![])).await;
        assert!(matches!(
            res,
            Err(ServiceError::NotFound { entity: "Movie", id: 999 })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let (service, action) = setup().await;
        let created = service
            .create_movie(request("Matrix", vec![action.id]))
            .await
            .unwrap();

        service.delete_movie(created.id).await.unwrap();
        assert!(matches!(
            service.get_movie_by_id(created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_movie(created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/filmoteca.db", dir.path().display());
        let pool = filmoteca_dal::new_pool(&url).await.unwrap();
        filmoteca_dal::migrate(&pool).await.unwrap();
        let action = GenreRepository::new(pool.clone())
            .save(CreateGenre::new("Acción"))
            .await
            .unwrap();
        let service = std::sync::Arc::new(MovieService::new(pool));

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let service = service.clone();
                let genre_id = action.id;
                tokio::spawn(async move {
                    service
                        .create_movie(request(&format!("Movie {i}"), vec![genre_id]))
                        .await
                })
            })
            .collect();
        for task in tasks {
            let movie = task.await.unwrap().unwrap();
            assert_eq!(movie.genres, vec![action.clone()]);
        }

        let all = service.get_all_movies().await.unwrap();
        assert_eq!(all.len(), 32);
    }
}
