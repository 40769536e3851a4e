use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const EMAIL_PENDING: &str = "pending";
pub const EMAIL_SENT: &str = "sent";
pub const EMAIL_FAILED: &str = "failed";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailOutbox {
    pub id: Uuid,
    pub kind: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// Critical sends alert the admin address when they exhaust retries.
    pub critical: bool,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
