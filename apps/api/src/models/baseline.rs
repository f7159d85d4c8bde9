use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BaselineRow {
    pub id: i64,
    pub account_id: i32,
    pub name: String,
    pub config: Value,
    pub created_at: DateTime<Utc>,
}
