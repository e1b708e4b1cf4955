use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use filmoteca_app::rest_api::{genre, movie};
use filmoteca_app::state::{AppConfig, AppState};
use futures::FutureExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            legacy_routes: !config.no_legacy_routes,
        }
    }
}

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs(legacy_routes: bool) -> utoipa::openapi::OpenApi {
    #[derive(utoipa::OpenApi)]
    #[openapi(info(title = "Filmoteca", description = "Movie catalogue"))]
    struct OpenApi;

    use utoipa::OpenApi as _;
    let mut docs = OpenApi::openapi()
        .nest("/api/movies", movie::api_docs())
        .nest("/api/genres", genre::api_docs());
    if legacy_routes {
        docs = docs.nest("/api/peliculas", movie::api_docs());
    }
    docs
}

pub fn main_router(state: AppState) -> Router<()> {
    let legacy_routes = state.config().legacy_routes;

    let mut api = Router::new()
        .nest("/api/movies", movie::router())
        .nest("/api/genres", genre::router());
    if legacy_routes {
        debug!("Serving movies also on /api/peliculas");
        api = api.nest("/api/peliculas", movie::router());
    }

    #[allow(unused_mut)]
    let mut router = api
        .with_state(state)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs(legacy_routes);
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }
    router
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let app_config: AppConfig = config.into();

    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = filmoteca_dal::new_pool_with(&config.database_url(), config.max_connections).await?;
    filmoteca_dal::migrate(&pool).await?;
    debug!("Database {} ready", config.database_url());

    Ok(AppState::new(app_config, pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt as _;

    async fn app(legacy_routes: bool) -> Router {
        let pool = filmoteca_dal::new_memory_pool().await.unwrap();
        main_router(AppState::new(AppConfig { legacy_routes }, pool))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(true).await;
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_legacy_routes() {
        let app = app(true).await;
        let response = app
            .clone()
            .oneshot(get_request("/api/peliculas"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["peliculas"], serde_json::json!([]));

        let app = self::app(false).await;
        let response = app.oneshot(get_request("/api/peliculas")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_app_config_from_server_config() {
        use crate::config::{Parser as _, ServerConfig};
        let config =
            ServerConfig::try_parse_from(["filmoteca-server", "--no-legacy-routes"]).unwrap();
        let app_config: AppConfig = (&config).into();
        assert!(!app_config.legacy_routes);
    }
}
