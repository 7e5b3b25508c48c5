use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Per-post view counter for one calendar day, keyed by (post, date string).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    pub post_id: Uuid,
    /// Calendar day as "YYYY-MM-DD" (UTC).
    pub date: String,
    pub views: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
