use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "festival")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub country: String,
    pub prefecture: String,
    pub city_town: String,
    pub representative: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub overview: Option<String>, // in Markdown
    #[sea_orm(column_type = "Text", nullable)]
    pub history: Option<String>, // in Markdown
    pub start_date: Option<DateTimeUtc>,
    pub end_date: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub locations: HasMany<super::location::Entity>,

    #[sea_orm(has_many)]
    pub news: HasMany<super::news::Entity>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::image::Entity>,

    #[sea_orm(has_many)]
    pub programs: HasMany<super::program::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
