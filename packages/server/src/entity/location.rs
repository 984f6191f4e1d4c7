use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub festival_id: i32,
    #[sea_orm(belongs_to, from = "festival_id", to = "id")]
    pub festival: HasOne<super::festival::Entity>,

    /// Free-form category tag ("main venue", "parking", "restroom", ...).
    /// Serialized as `type` on the wire.
    pub kind: String,
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,

    #[sea_orm(has_many)]
    pub programs: HasMany<super::program::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
