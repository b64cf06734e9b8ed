use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid, // owner
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub completed: bool,
}
