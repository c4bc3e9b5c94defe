use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Movie, MovieUpdate, NewMovie},
};

#[derive(Debug, Serialize)]
pub struct MovieEnvelope {
    pub message: &'static str,
    pub movie: Option<Movie>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/movies", get(all_movies).post(create_movie))
        .route("/movies/{key}", get(movie_by_title).post(update_movie).delete(delete_movie))
        .route("/movies/director/{director}", get(movies_by_director))
        .route("/movies/genres/{genre}", get(movies_by_genre))
        .with_state(state)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

// Any origin, with credentials. A wildcard origin cannot carry credentials, so
// the request's own origin is echoed back instead.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub async fn index() -> &'static str {
    "Hello, Axum Server."
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MovieEnvelope>)> {
    let Json(movie) = payload?;
    movie.validate()?;

    let movie = state
        .movies
        .create(movie)
        .await
        .map_err(|e| AppError::from_movie(e, "Movie not found", "Failed to add movie"))?;

    Ok((
        StatusCode::CREATED,
        Json(MovieEnvelope { message: "Movie added successfully.", movie: Some(movie) }),
    ))
}

pub async fn movie_by_title(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> AppResult<Json<Movie>> {
    let movie = state
        .movies
        .get_by_title(&title)
        .await
        .map_err(|e| AppError::from_movie(e, "Movie not found", "Failed to fetch movie."))?;
    Ok(Json(movie))
}

pub async fn all_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state
        .movies
        .get_all()
        .await
        .map_err(|e| AppError::from_movie(e, "Movies not found", "Failed to fetch movies"))?;
    non_empty(movies, "Movies not found")
}

pub async fn movies_by_director(
    State(state): State<Arc<AppState>>,
    Path(director): Path<String>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.movies.get_by_director(&director).await.map_err(|e| {
        AppError::from_movie(
            e,
            "Movies not found",
            "Failed to fetch movies from the specific director",
        )
    })?;
    non_empty(movies, "Movies not found")
}

pub async fn movies_by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre): Path<String>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state
        .movies
        .get_by_genre(&genre)
        .await
        .map_err(|e| AppError::from_movie(e, "No movies found", "Failed to fetch movies"))?;
    non_empty(movies, "No movies found")
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<MovieUpdate>, JsonRejection>,
) -> AppResult<Json<MovieEnvelope>> {
    let Json(update) = payload?;
    update.validate()?;

    let movie = state
        .movies
        .update(&id, update)
        .await
        .map_err(|e| AppError::from_movie(e, "Movie not found", "Failed to update the movie"))?;

    Ok(Json(MovieEnvelope { message: "Movie updated successfully.", movie: Some(movie) }))
}

/// Deleting an unknown id still answers 200, with a null movie.
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<MovieEnvelope>> {
    let deletion = state
        .movies
        .delete(&id)
        .await
        .map_err(|e| AppError::from_movie(e, "Movie not found", "Failed to delete movie"))?;

    Ok(Json(MovieEnvelope { message: "Movie deleted sucessfully.", movie: deletion.into_movie() }))
}

// Empty collections answer 404, same as a missing record.
fn non_empty(movies: Vec<Movie>, not_found: &'static str) -> AppResult<Json<Vec<Movie>>> {
    if movies.is_empty() {
        return Err(AppError::NotFound(not_found));
    }
    Ok(Json(movies))
}
