use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/festival", festival_routes())
        .nest("/location", location_routes())
        .nest("/news", news_routes())
        .nest("/image", image_routes())
        .nest("/program", program_routes())
}

pub fn media_routes() -> Router<AppState> {
    Router::new().route("/{*key}", get(handlers::media::get_media))
}

fn festival_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::festival::list_festivals).post(handlers::festival::create_festival),
        )
        .route(
            "/{id}",
            get(handlers::festival::get_festival)
                .put(handlers::festival::update_festival)
                .delete(handlers::festival::delete_festival),
        )
}

fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::location::list_all_locations).post(handlers::location::create_location),
        )
        .route("/{festival_id}", get(handlers::location::list_locations))
        .route(
            "/{festival_id}/{id}",
            get(handlers::location::get_location)
                .put(handlers::location::update_location)
                .delete(handlers::location::delete_location),
        )
}

fn news_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::news::list_all_news).post(handlers::news::create_news),
        )
        .route("/{festival_id}", get(handlers::news::list_news))
        .route(
            "/{festival_id}/{id}",
            get(handlers::news::get_news)
                .put(handlers::news::update_news)
                .delete(handlers::news::delete_news),
        )
}

fn image_routes() -> Router<AppState> {
    let crud = Router::new()
        .route(
            "/",
            get(handlers::image::list_all_images).post(handlers::image::create_image),
        )
        .route("/{festival_id}", get(handlers::image::list_images))
        .route(
            "/{festival_id}/{id}",
            get(handlers::image::get_image)
                .put(handlers::image::update_image)
                .delete(handlers::image::delete_image),
        );

    let upload = Router::new()
        .route("/upload", post(handlers::image::upload_image))
        .layer(handlers::image::image_upload_body_limit());

    crud.merge(upload)
}

fn program_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::program::list_all_programs).post(handlers::program::create_program),
        )
        .route("/{festival_id}", get(handlers::program::list_programs))
        .route(
            "/{festival_id}/{id}",
            get(handlers::program::get_program)
                .put(handlers::program::update_program)
                .delete(handlers::program::delete_program),
        )
}
