use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    models::{Movie, MovieUpdate, NewMovie},
    store::{MovieStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum MovieError {
    #[error("movie not found")]
    NotFound,
    #[error("store fault: {0}")]
    Store(#[from] StoreError),
}

pub type MovieResult<T> = Result<T, MovieError>;

/// Outcome of a delete. Both variants are a successful call.
#[derive(Clone, Debug, PartialEq)]
pub enum Deletion {
    Removed(Movie),
    Absent,
}

impl Deletion {
    pub fn into_movie(self) -> Option<Movie> {
        match self {
            Deletion::Removed(movie) => Some(movie),
            Deletion::Absent => None,
        }
    }
}

/// Movie operations. Each one performs exactly one store call; store faults
/// are logged here and surfaced as [`MovieError::Store`].
#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn MovieStore>,
}

impl MovieService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, movie: NewMovie) -> MovieResult<Movie> {
        let movie = self.store.insert(movie).await.map_err(|e| fault("create", e))?;
        info!(id = %movie.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    pub async fn get_by_title(&self, title: &str) -> MovieResult<Movie> {
        match self.store.find_by_title(title).await.map_err(|e| fault("get_by_title", e))? {
            Some(movie) => Ok(movie),
            None => {
                debug!(title, "no movie with title");
                Err(MovieError::NotFound)
            },
        }
    }

    pub async fn get_all(&self) -> MovieResult<Vec<Movie>> {
        let movies = self.store.find_all().await.map_err(|e| fault("get_all", e))?;
        debug!(count = movies.len(), "listed movies");
        Ok(movies)
    }

    pub async fn get_by_director(&self, director: &str) -> MovieResult<Vec<Movie>> {
        let movies =
            self.store.find_by_director(director).await.map_err(|e| fault("get_by_director", e))?;
        debug!(director, count = movies.len(), "listed movies by director");
        Ok(movies)
    }

    pub async fn get_by_genre(&self, genre: &str) -> MovieResult<Vec<Movie>> {
        let movies =
            self.store.find_by_genre(genre).await.map_err(|e| fault("get_by_genre", e))?;
        debug!(genre, count = movies.len(), "listed movies by genre");
        Ok(movies)
    }

    pub async fn update(&self, id: &str, update: MovieUpdate) -> MovieResult<Movie> {
        match self.store.update_by_id(id, update).await.map_err(|e| fault("update", e))? {
            Some(movie) => {
                info!(id, "movie updated");
                Ok(movie)
            },
            None => {
                debug!(id, "no movie to update");
                Err(MovieError::NotFound)
            },
        }
    }

    pub async fn delete(&self, id: &str) -> MovieResult<Deletion> {
        match self.store.delete_by_id(id).await.map_err(|e| fault("delete", e))? {
            Some(movie) => {
                info!(id, "movie deleted");
                Ok(Deletion::Removed(movie))
            },
            None => {
                debug!(id, "no movie to delete");
                Ok(Deletion::Absent)
            },
        }
    }
}

fn fault(operation: &'static str, err: StoreError) -> MovieError {
    error!(operation, error = %err, "store call failed");
    MovieError::Store(err)
}


#[cfg(test)]
mod tests {
    use super::{
        testing::{FailingStore, MemoryStore, movie},
        *,
    };

    fn service() -> MovieService {
        MovieService::new(Arc::new(MemoryStore::default()))
    }

    fn failing() -> MovieService {
        MovieService::new(Arc::new(FailingStore))
    }

    #[tokio::test]
    async fn created_movie_is_found_by_title() {
        let service = service();
        let created = service.create(movie("X", "D1", &["Drama"])).await.unwrap();

        let found = service.get_by_title("X").await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.director, "D1");
    }

    #[tokio::test]
    async fn unknown_title_is_not_found_not_a_fault() {
        let err = service().get_by_title("never created").await.unwrap_err();
        assert!(matches!(err, MovieError::NotFound));
    }

    #[tokio::test]
    async fn empty_collections_are_ok() {
        let service = service();
        assert!(service.get_all().await.unwrap().is_empty());
        assert!(service.get_by_director("nobody").await.unwrap().is_empty());
        assert!(service.get_by_genre("Western").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn genre_query_returns_exactly_the_members() {
        let service = service();
        let a = service.create(movie("A", "D", &["Drama", "Romance"])).await.unwrap();
        service.create(movie("B", "D", &["Comedy"])).await.unwrap();

        assert_eq!(service.get_by_genre("Drama").await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn update_overwrites_provided_fields_and_keeps_the_rest() {
        let service = service();
        let created = service
            .create(NewMovie {
                plot: Some("p".to_string()),
                language: Some("Hindi".to_string()),
                ..movie("X", "D1", &["Drama"])
            })
            .await
            .unwrap();

        let update = MovieUpdate {
            actors: Some(vec!["Shah Rukh Khan".to_string()]),
            plot: Some(None),
            trailer_url: Some(Some("https://example.com/trailer.mp4".to_string())),
            ..Default::default()
        };
        let updated = service.update(&created.id, update).await.unwrap();

        assert_eq!(updated.actors, vec!["Shah Rukh Khan"]);
        assert_eq!(updated.plot, None);
        assert_eq!(updated.trailer_url.as_deref(), Some("https://example.com/trailer.mp4"));
        assert_eq!(updated.language.as_deref(), Some("Hindi"));
        assert_eq!(updated.title, created.title);
        assert_eq!(service.get_by_title("X").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let update = MovieUpdate { release_year: Some(2002), ..Default::default() };
        let err = service().update("missing", update).await.unwrap_err();
        assert!(matches!(err, MovieError::NotFound));
    }

    #[tokio::test]
    async fn delete_distinguishes_removed_from_absent() {
        let service = service();
        let created = service.create(movie("X", "D1", &[])).await.unwrap();

        assert_eq!(service.delete(&created.id).await.unwrap(), Deletion::Removed(created.clone()));
        assert_eq!(service.delete(&created.id).await.unwrap(), Deletion::Absent);
        assert!(matches!(service.get_by_title("X").await, Err(MovieError::NotFound)));
    }

    #[tokio::test]
    async fn store_faults_propagate_from_every_operation() {
        let service = failing();
        let update = || MovieUpdate { rating: Some(5.0), ..Default::default() };

        assert!(matches!(service.create(movie("X", "D", &[])).await, Err(MovieError::Store(_))));
        assert!(matches!(service.get_by_title("X").await, Err(MovieError::Store(_))));
        assert!(matches!(service.get_all().await, Err(MovieError::Store(_))));
        assert!(matches!(service.get_by_director("D").await, Err(MovieError::Store(_))));
        assert!(matches!(service.get_by_genre("Drama").await, Err(MovieError::Store(_))));
        assert!(matches!(service.update("id", update()).await, Err(MovieError::Store(_))));
        assert!(matches!(service.delete("id").await, Err(MovieError::Store(_))));
    }
}
