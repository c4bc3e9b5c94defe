mod config;
mod db;
mod entities;
mod error;
mod models;
mod movies;
mod routes;
mod store;

use std::sync::Arc;

use sea_orm::ConnectOptions;

use crate::{config::Config, movies::MovieService, store::SeaOrmMovieStore};

#[derive(Clone)]
pub struct AppState {
    pub movies: MovieService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_records=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.max_connections(config.database_max_connections);
    let db = db::connect_and_migrate(options).await?;

    let store = SeaOrmMovieStore::new(db);
    let state = Arc::new(AppState { movies: MovieService::new(Arc::new(store)) });

    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
