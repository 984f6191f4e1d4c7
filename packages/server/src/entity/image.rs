use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "festival_kind")]
    pub festival_id: i32,
    #[sea_orm(belongs_to, from = "festival_id", to = "id")]
    pub festival: HasOne<super::festival::Entity>,

    pub image_url: String,

    /// Slot tag ("thumbnail", "overview", "history", ...). At most one image
    /// per (festival, kind) pair; writes upsert into the slot. Serialized as
    /// `type` on the wire.
    #[sea_orm(unique_key = "festival_kind")]
    pub kind: String,
    pub description: Option<String>,
    pub uploaded_date: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
