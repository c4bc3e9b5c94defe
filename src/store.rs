use async_trait::async_trait;
use jiff::Timestamp;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Select, Set,
    sea_query::{Expr, Order},
};
use uuid::Uuid;

use crate::{
    entities::movie::{self, StringList},
    models::{Movie, MovieUpdate, NewMovie},
};

const GENRE_MEMBERSHIP: &str = "EXISTS (SELECT 1 FROM json_each($1) WHERE json_each.value = $2)";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("movie {id} has an invalid timestamp: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: jiff::Error,
    },
}

/// Persistence primitives the operation layer relies on. Each method maps to a
/// single atomic store call.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn insert(&self, movie: NewMovie) -> Result<Movie, StoreError>;

    /// First match in creation order.
    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Movie>, StoreError>;

    async fn find_by_director(&self, director: &str) -> Result<Vec<Movie>, StoreError>;

    /// Movies whose genre list contains `genre`.
    async fn find_by_genre(&self, genre: &str) -> Result<Vec<Movie>, StoreError>;

    /// Returns the movie after the update, or `None` when `id` is unknown.
    async fn update_by_id(&self, id: &str, update: MovieUpdate)
    -> Result<Option<Movie>, StoreError>;

    /// Returns the movie as it was right before removal.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Movie>, StoreError>;
}

#[derive(Clone)]
pub struct SeaOrmMovieStore {
    db: DatabaseConnection,
}

impl SeaOrmMovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_many(&self, select: Select<movie::Entity>) -> Result<Vec<Movie>, StoreError> {
        ordered(select).all(&self.db).await?.into_iter().map(to_movie).collect()
    }
}

#[async_trait]
impl MovieStore for SeaOrmMovieStore {
    async fn insert(&self, movie: NewMovie) -> Result<Movie, StoreError> {
        let now = now_ms();
        let model = movie::ActiveModel {
            id: Set(Uuid::new_v4().simple().to_string()),
            title: Set(movie.title),
            release_year: Set(movie.release_year),
            genre: Set(StringList(movie.genre)),
            director: Set(movie.director),
            actors: Set(StringList(movie.actors)),
            language: Set(movie.language),
            country: Set(movie.country),
            rating: Set(movie.rating),
            plot: Set(movie.plot),
            awards: Set(movie.awards),
            poster_url: Set(movie.poster_url),
            trailer_url: Set(movie.trailer_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        to_movie(model.insert(&self.db).await?)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        ordered(movie::Entity::find().filter(movie::Column::Title.eq(title)))
            .one(&self.db)
            .await?
            .map(to_movie)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Movie>, StoreError> {
        self.fetch_many(movie::Entity::find()).await
    }

    async fn find_by_director(&self, director: &str) -> Result<Vec<Movie>, StoreError> {
        self.fetch_many(movie::Entity::find().filter(movie::Column::Director.eq(director))).await
    }

    async fn find_by_genre(&self, genre: &str) -> Result<Vec<Movie>, StoreError> {
        let membership = Expr::cust_with_exprs(
            GENRE_MEMBERSHIP,
            [Expr::col((movie::Entity, movie::Column::Genre)).into(), Expr::value(genre)],
        );
        self.fetch_many(movie::Entity::find().filter(membership)).await
    }

    async fn update_by_id(
        &self,
        id: &str,
        update: MovieUpdate,
    ) -> Result<Option<Movie>, StoreError> {
        let mut query = movie::Entity::update_many();
        if let Some(title) = update.title {
            query = query.col_expr(movie::Column::Title, Expr::value(title));
        }
        if let Some(year) = update.release_year {
            query = query.col_expr(movie::Column::ReleaseYear, Expr::value(year));
        }
        if let Some(genre) = update.genre {
            query = query.col_expr(movie::Column::Genre, Expr::value(StringList(genre)));
        }
        if let Some(director) = update.director {
            query = query.col_expr(movie::Column::Director, Expr::value(director));
        }
        if let Some(actors) = update.actors {
            query = query.col_expr(movie::Column::Actors, Expr::value(StringList(actors)));
        }
        if let Some(language) = update.language {
            query = query.col_expr(movie::Column::Language, Expr::value(language));
        }
        if let Some(country) = update.country {
            query = query.col_expr(movie::Column::Country, Expr::value(country));
        }
        if let Some(rating) = update.rating {
            query = query.col_expr(movie::Column::Rating, Expr::value(rating));
        }
        if let Some(plot) = update.plot {
            query = query.col_expr(movie::Column::Plot, Expr::value(plot));
        }
        if let Some(awards) = update.awards {
            query = query.col_expr(movie::Column::Awards, Expr::value(awards));
        }
        if let Some(poster_url) = update.poster_url {
            query = query.col_expr(movie::Column::PosterUrl, Expr::value(poster_url));
        }
        if let Some(trailer_url) = update.trailer_url {
            query = query.col_expr(movie::Column::TrailerUrl, Expr::value(trailer_url));
        }

        // Single UPDATE ... RETURNING; never read-then-write.
        let updated = query
            .col_expr(movie::Column::UpdatedAt, Expr::value(now_ms()))
            .filter(movie::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await?;

        updated.into_iter().next().map(to_movie).transpose()
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let removed = movie::Entity::delete_many()
            .filter(movie::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await?;

        removed.into_iter().next().map(to_movie).transpose()
    }
}

// Insertion order, with rowid breaking ties inside the same millisecond.
fn ordered(select: Select<movie::Entity>) -> Select<movie::Entity> {
    select.order_by_asc(movie::Column::CreatedAt).order_by(Expr::cust("rowid"), Order::Asc)
}

fn to_movie(model: movie::Model) -> Result<Movie, StoreError> {
    let timestamp = |ms: i64| {
        Timestamp::from_millisecond(ms)
            .map_err(|source| StoreError::Corrupt { id: model.id.clone(), source })
    };
    let created_at = timestamp(model.created_at)?;
    let updated_at = timestamp(model.updated_at)?;

    Ok(Movie {
        id: model.id,
        title: model.title,
        release_year: model.release_year,
        genre: model.genre.0,
        director: model.director,
        actors: model.actors.0,
        language: model.language,
        country: model.country,
        rating: model.rating,
        plot: model.plot,
        awards: model.awards,
        poster_url: model.poster_url,
        trailer_url: model.trailer_url,
        created_at,
        updated_at,
    })
}

fn now_ms() -> i64 {
    Timestamp::now().as_millisecond()
}
