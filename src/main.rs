// src/main.rs

mod app_state;
mod config;
mod error;
mod issue;
mod memory_store;
mod models;
mod mongo_store;
mod store;

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;

use crate::app_state::AppState;
use crate::config::{Config, StoreBackend};
use crate::error::ApiError;
use crate::issue::{create_issue, delete_issue, list_issues, reset_project, update_issue};
use crate::memory_store::MemoryStore;
use crate::mongo_store::MongoDB;
use crate::store::CollectionStore;

/// Issue routes, with and without a project segment.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|_err, _req| ApiError::Validation("invalid query").into()),
    )
    .service(
        web::scope("/api/issues")
            .route("", web::get().to(list_issues))
            .route("", web::post().to(create_issue))
            .route("", web::put().to(update_issue))
            .route("", web::delete().to(delete_issue))
            .route("/", web::get().to(list_issues))
            .route("/", web::post().to(create_issue))
            .route("/", web::put().to(update_issue))
            .route("/", web::delete().to(delete_issue))
            // Empty project segment; answers `missing project`.
            .route("//reset", web::delete().to(reset_project))
            .route("/{project}/reset", web::delete().to(reset_project))
            .route("/{project}", web::get().to(list_issues))
            .route("/{project}", web::post().to(create_issue))
            .route("/{project}", web::put().to(update_issue))
            .route("/{project}", web::delete().to(delete_issue)),
    );
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io::Error::other)?;

    let store: Arc<dyn CollectionStore> = match &config.store_backend {
        StoreBackend::Mongo { uri } => Arc::new(
            MongoDB::init(uri, &config.database_name, config.store_timeout)
                .await
                .map_err(io::Error::other)?,
        ),
        StoreBackend::Memory => {
            info!("Using in-memory store; issues are lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let bind_addr = config.bind_addr.clone();
    info!("Server running at http://{}", bind_addr);
    info!("Allowed CORS Origin: {}", config.frontend_origin);

    let state = web::Data::new(AppState { store, config });

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&state.config.frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
