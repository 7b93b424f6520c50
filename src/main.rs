use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use sqlx::postgres::PgPoolOptions;

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod utils;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::store::postgres::PgStore;
use crate::utils::auth::TokenKeys;
use crate::utils::upload::CloudinaryUploader;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    info!("starting with {config:?}");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("connected to PostgreSQL");

    sqlx::migrate!().run(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let state = web::Data::new(AppState {
        users: store.clone(),
        products: store.clone(),
        carts: store,
        uploader: Arc::new(CloudinaryUploader::new(&config.cloudinary)),
        tokens: TokenKeys::new(&config.jwt_secret, config.token_ttl_secs),
        max_upload_bytes: config.max_upload_bytes,
    });

    let bind_addr = config.bind_addr();
    info!("HTTP server listening on {}:{}", bind_addr.0, bind_addr.1);

    let origins = config.cors_allowed_origins.clone();
    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .expose_headers([AUTHORIZATION]);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
