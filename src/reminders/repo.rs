use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::ReminderFields, repo_types::Reminder};

pub const PAGE_SIZE: i64 = 50;

/// Reminder persistence. Every method is scoped to `owner`; a reminder owned
/// by someone else behaves exactly like one that does not exist.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Date ascending, undated first, at most `PAGE_SIZE` rows.
    async fn list_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Reminder>>;
    async fn get_for_owner(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Reminder>>;
    async fn insert(&self, owner: Uuid, fields: ReminderFields) -> anyhow::Result<Reminder>;
    async fn update_for_owner(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: ReminderFields,
    ) -> anyhow::Result<Option<Reminder>>;
    /// Returns whether a row was deleted.
    async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgReminderStore {
    db: PgPool,
}

impl PgReminderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    async fn list_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT id, user_id, title, description, date, completed
              FROM reminders
             WHERE user_id = $1
             ORDER BY date ASC NULLS FIRST, id ASC
             LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(PAGE_SIZE)
        .fetch_all(&self.db)
        .await
        .context("list reminders")?;
        Ok(rows)
    }

    async fn get_for_owner(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT id, user_id, title, description, date, completed
              FROM reminders
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("get reminder")?;
        Ok(row)
    }

    async fn insert(&self, owner: Uuid, fields: ReminderFields) -> anyhow::Result<Reminder> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (id, user_id, title, description, date, completed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, description, date, completed
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.date)
        .bind(fields.completed)
        .fetch_one(&self.db)
        .await
        .context("insert reminder")?;
        Ok(row)
    }

    async fn update_for_owner(
        &self,
        owner: Uuid,
        id: Uuid,
        fields: ReminderFields,
    ) -> anyhow::Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            UPDATE reminders
               SET title = $3, description = $4, date = $5, completed = $6
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, date, completed
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.date)
        .bind(fields.completed)
        .fetch_optional(&self.db)
        .await
        .context("update reminder")?;
        Ok(row)
    }

    async fn delete_for_owner(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM reminders
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("delete reminder")?;
        Ok(res.rows_affected() > 0)
    }
}
