use crate::{publish_api_docs, service::MovieService, state::AppState};
#[allow(unused_imports)]
use axum::routing::{delete, get, post, put};
use filmoteca_dal::movie::Movie;
use serde::{Deserialize, Serialize};

crate::repository_from_request!(MovieService);

publish_api_docs!(
    "Movie",
    crud_api::create,
    crud_api::list,
    crud_api::get,
    crud_api::update,
    crud_api::delete
);

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MovieList {
    #[serde(rename = "peliculas")]
    pub movies: Vec<Movie>,
}

pub(crate) mod crud_api {
    use super::*;
    use crate::{error::ApiResult, validate::Garde};
    use axum::{extract::Path, response::IntoResponse, Json};
    use filmoteca_dal::movie::CreateMovie;
    use http::StatusCode;
    use tracing::debug;

    #[cfg_attr(feature = "openapi", utoipa::path(post, path = "", tag = "Movie", operation_id = "createMovie",
        request_body = CreateMovie,
        responses((status = StatusCode::CREATED, description = "Created Movie", body = Movie),
            (status = StatusCode::BAD_REQUEST, description = "Invalid payload"),
            (status = StatusCode::NOT_FOUND, description = "Unknown genre"))))]
    pub async fn create(
        service: MovieService,
        Garde(Json(payload)): Garde<Json<CreateMovie>>,
    ) -> ApiResult<impl IntoResponse> {
        debug!("Create movie: {:?}", payload);
        let record = service.create_movie(payload).await?;

        Ok((StatusCode::CREATED, Json(record)))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(get, path = "", tag = "Movie", operation_id = "listMovie",
        responses((status = StatusCode::OK, description = "All movies", body = MovieList))))]
    pub async fn list(service: MovieService) -> ApiResult<impl IntoResponse> {
        let movies = service.get_all_movies().await?;
        Ok((StatusCode::OK, Json(MovieList { movies })))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(get, path = "/{id}", tag = "Movie", operation_id = "getMovie",
        responses((status = StatusCode::OK, description = "Get one", body = Movie),
            (status = StatusCode::NOT_FOUND, description = "No such movie"))))]
    pub async fn get(Path(id): Path<i64>, service: MovieService) -> ApiResult<impl IntoResponse> {
        let record = service.get_movie_by_id(id).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(put, path = "/{id}", tag = "Movie", operation_id = "updateMovie",
        request_body = CreateMovie,
        responses((status = StatusCode::OK, description = "Updated Movie", body = Movie),
            (status = StatusCode::NOT_FOUND, description = "No such movie or genre"))))]
    pub async fn update(
        Path(id): Path<i64>,
        service: MovieService,
        Garde(Json(payload)): Garde<Json<CreateMovie>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = service.update_movie(id, payload).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(delete, path = "/{id}", tag = "Movie", operation_id = "deleteMovie",
        responses((status = StatusCode::NO_CONTENT, description = "Deleted"),
            (status = StatusCode::NOT_FOUND, description = "No such movie"))))]
    pub async fn delete(Path(id): Path<i64>, service: MovieService) -> ApiResult<impl IntoResponse> {
        service.delete_movie(id).await?;

        Ok((StatusCode::NO_CONTENT, ()))
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(crud_api::create).get(crud_api::list))
        .route(
            "/{id}",
            get(crud_api::get)
                .put(crud_api::update)
                .delete(crud_api::delete),
        )
}
