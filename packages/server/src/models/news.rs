use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{check_importance, flexible_datetime, require_text};
use crate::entity::news;
use crate::error::FieldError;

/// News fields as supplied by clients.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct NewsItem {
    pub importance: String,
    #[serde(deserialize_with = "flexible_datetime")]
    pub posted_date: DateTime<Utc>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateNewsRequest {
    pub festival_id: i32,
    pub importance: String,
    #[serde(deserialize_with = "flexible_datetime")]
    pub posted_date: DateTime<Utc>,
    pub title: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NewsBody {
    pub id: i32,
    pub festival_id: i32,
    pub importance: String,
    pub posted_date: DateTime<Utc>,
    pub title: String,
    pub content: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NewsEnvelope {
    pub message: String,
    pub news: NewsBody,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NewsListEnvelope {
    pub message: String,
    pub news: Vec<NewsBody>,
}

impl From<news::Model> for NewsBody {
    fn from(m: news::Model) -> Self {
        Self {
            id: m.id,
            festival_id: m.festival_id,
            importance: m.importance,
            posted_date: m.posted_date,
            title: m.title,
            content: m.content,
        }
    }
}

pub fn validate_news_item(errors: &mut Vec<FieldError>, path: &str, item: &NewsItem) {
    check_importance(errors, &format!("{path}importance"), &item.importance);
    require_text(errors, &format!("{path}title"), &item.title);
    require_text(errors, &format!("{path}content"), &item.content);
}

pub fn validate_create_news(req: &CreateNewsRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_importance(&mut errors, "importance", &req.importance);
    require_text(&mut errors, "title", &req.title);
    require_text(&mut errors, "content", &req.content);
    errors
}
