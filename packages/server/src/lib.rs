pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Festa API",
        version = "1.0.0",
        description = "API for festival information management"
    ),
    paths(
        handlers::festival::create_festival,
        handlers::festival::list_festivals,
        handlers::festival::get_festival,
        handlers::festival::update_festival,
        handlers::festival::delete_festival,
        handlers::location::create_location,
        handlers::location::list_all_locations,
        handlers::location::list_locations,
        handlers::location::get_location,
        handlers::location::update_location,
        handlers::location::delete_location,
        handlers::news::create_news,
        handlers::news::list_all_news,
        handlers::news::list_news,
        handlers::news::get_news,
        handlers::news::update_news,
        handlers::news::delete_news,
        handlers::image::create_image,
        handlers::image::upload_image,
        handlers::image::list_all_images,
        handlers::image::list_images,
        handlers::image::get_image,
        handlers::image::update_image,
        handlers::image::delete_image,
        handlers::program::create_program,
        handlers::program::list_all_programs,
        handlers::program::list_programs,
        handlers::program::get_program,
        handlers::program::update_program,
        handlers::program::delete_program,
        handlers::media::get_media,
    ),
    tags(
        (name = "Festivals", description = "Festival aggregate CRUD"),
        (name = "Locations", description = "Festival locations"),
        (name = "News", description = "Festival news"),
        (name = "Images", description = "Festival images and uploads"),
        (name = "Programs", description = "Festival programs"),
        (name = "Media", description = "Serving uploaded files"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .nest("/media", routes::media_routes())
        .with_state(state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
