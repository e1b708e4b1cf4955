use crate::{publish_api_docs, state::AppState};
#[allow(unused_imports)]
use axum::routing::{delete, get, post};
use filmoteca_dal::genre::{Genre, GenreRepository};
use serde::{Deserialize, Serialize};

crate::repository_from_request!(GenreRepository);

publish_api_docs!(
    "Genre",
    crud_api::create,
    crud_api::list,
    crud_api::get,
    crud_api::delete
);

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenreList {
    #[serde(rename = "generos")]
    pub genres: Vec<Genre>,
}

pub(crate) mod crud_api {
    use super::*;
    use crate::{error::ApiResult, validate::Garde};
    use axum::{extract::Path, response::IntoResponse, Json};
    use filmoteca_dal::genre::CreateGenre;
    use http::StatusCode;
    use tracing::info;

    #[cfg_attr(feature = "openapi", utoipa::path(post, path = "", tag = "Genre", operation_id = "createGenre",
        request_body = CreateGenre,
        responses((status = StatusCode::CREATED, description = "Created Genre", body = Genre))))]
    pub async fn create(
        repository: GenreRepository,
        Garde(Json(payload)): Garde<Json<CreateGenre>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.save(payload).await?;
        info!("Created genre {} ({})", record.id, record.name);

        Ok((StatusCode::CREATED, Json(record)))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(get, path = "", tag = "Genre", operation_id = "listGenre",
        responses((status = StatusCode::OK, description = "All genres", body = GenreList))))]
    pub async fn list(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
        let genres = repository.list().await?;
        Ok((StatusCode::OK, Json(GenreList { genres })))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(get, path = "/{id}", tag = "Genre", operation_id = "getGenre",
        responses((status = StatusCode::OK, description = "Get one", body = Genre))))]
    pub async fn get(
        Path(id): Path<i64>,
        repository: GenreRepository,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.get(id).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(feature = "openapi", utoipa::path(delete, path = "/{id}", tag = "Genre", operation_id = "deleteGenre",
        responses((status = StatusCode::NO_CONTENT, description = "Deleted, also removed from all movies"))))]
    pub async fn delete(
        Path(id): Path<i64>,
        repository: GenreRepository,
    ) -> ApiResult<impl IntoResponse> {
        repository.delete(id).await?;
        info!("Deleted genre {id}");

        Ok((StatusCode::NO_CONTENT, ()))
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(crud_api::create).get(crud_api::list))
        .route("/{id}", get(crud_api::get).delete(crud_api::delete))
}
