use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(string(Movie::Id).primary_key())
                    .col(string(Movie::Title))
                    .col(integer(Movie::ReleaseYear))
                    .col(json(Movie::Genre))
                    .col(string(Movie::Director))
                    .col(json(Movie::Actors))
                    .col(string_null(Movie::Language))
                    .col(string_null(Movie::Country))
                    .col(double(Movie::Rating))
                    .col(text_null(Movie::Plot))
                    .col(string_null(Movie::Awards))
                    .col(string_null(Movie::PosterUrl))
                    .col(string_null(Movie::TrailerUrl))
                    .col(big_integer(Movie::CreatedAt))
                    .col(big_integer(Movie::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_director")
                    .table(Movie::Table)
                    .col(Movie::Director)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_created_at")
                    .table(Movie::Table)
                    .col(Movie::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    ReleaseYear,
    Genre,
    Director,
    Actors,
    Language,
    Country,
    Rating,
    Plot,
    Awards,
    PosterUrl,
    TrailerUrl,
    CreatedAt,
    UpdatedAt,
}
