#[macro_export]
macro_rules! publish_api_docs {
    ($tag:literal, $($end_point:path),+) => {
        #[cfg(feature = "openapi")]
        #[derive(utoipa::OpenApi)]
        #[openapi(paths($($end_point),+), tags((name = $tag)))]
        struct ModuleDocs;

        #[cfg(feature = "openapi")]
        pub fn api_docs() -> utoipa::openapi::OpenApi {
            use utoipa::OpenApi as _;
            ModuleDocs::openapi()
        }
    };
}
