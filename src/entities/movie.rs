use sea_orm::{FromJsonQueryResult, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub release_year: i32,
    #[sea_orm(column_type = "Json")]
    pub genre: StringList,
    pub director: String,
    #[sea_orm(column_type = "Json")]
    pub actors: StringList,
    pub language: Option<String>,
    pub country: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub plot: Option<String>,
    pub awards: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Ordered list of strings persisted as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
