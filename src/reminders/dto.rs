use serde::Deserialize;
use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

use crate::error::AppError;

/// Body of `POST /reminders` and `PATCH /reminders/:id`.
#[derive(Debug, Deserialize)]
pub struct ReminderBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Validated reminder fields with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderFields {
    pub title: String,
    pub description: String,
    pub date: Option<OffsetDateTime>,
    pub completed: bool,
}

impl ReminderBody {
    pub fn validate(self) -> Result<ReminderFields, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }
        let date = match self.date {
            None => None,
            Some(v) => coerce_date(&v)?,
        };
        Ok(ReminderFields {
            title,
            description: self.description.unwrap_or_default(),
            date,
            completed: self.completed.unwrap_or(false),
        })
    }
}

/// Accepts `null`, an RFC 3339 timestamp, a bare `YYYY-MM-DD` date (midnight
/// UTC) or epoch milliseconds.
fn coerce_date(v: &Value) -> Result<Option<OffsetDateTime>, AppError> {
    let invalid = || AppError::Validation("Invalid date".into());
    match v {
        Value::Null => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
                return Ok(Some(ts));
            }
            let day = Date::parse(s, format_description!("[year]-[month]-[day]"))
                .map_err(|_| invalid())?;
            Ok(Some(day.midnight().assume_utc()))
        }
        Value::Number(n) => {
            let millis = n.as_i64().ok_or_else(invalid)?;
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .map(Some)
                .map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}
