use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub festival_id: i32,
    #[sea_orm(belongs_to, from = "festival_id", to = "id")]
    pub festival: HasOne<super::festival::Entity>,

    pub name: String,

    /// Optional venue; must belong to the same festival.
    pub location_id: Option<i32>,
    #[sea_orm(belongs_to, from = "location_id", to = "id")]
    pub location: HasOne<super::location::Entity>,

    pub start_time: DateTimeUtc,
    pub end_time: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
