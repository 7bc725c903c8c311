use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[cfg(test)]
use fake::Dummy;

/// A comment left on a report
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(test, derive(Dummy))]
pub struct Comment {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_photo_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub report_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_photo_url: Option<String>,
    pub content: String,
}
