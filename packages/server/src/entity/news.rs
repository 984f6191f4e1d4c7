use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "news")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub festival_id: i32,
    #[sea_orm(belongs_to, from = "festival_id", to = "id")]
    pub festival: HasOne<super::festival::Entity>,

    /// One of "high", "medium", "low".
    pub importance: String,
    pub posted_date: DateTimeUtc,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String, // may embed URLs, auto-linked in display
}

impl ActiveModelBehavior for ActiveModel {}
