use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a view dedup marker.
pub const VIEW_DEDUP_WINDOW_SECS: i64 = 3600;

/// Short-lived marker saying "this viewer already counted for this post".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub account_id: Option<Uuid>,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
}

impl ViewRecord {
    pub fn new(post_id: Uuid, ip_address: impl Into<String>, account_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            account_id,
            ip_address: ip_address.into(),
            created_at: Utc::now(),
        }
    }

    pub fn default_window() -> TimeDelta {
        TimeDelta::seconds(VIEW_DEDUP_WINDOW_SECS)
    }

    /// Stored form of the optional account; guests share the nil UUID.
    pub fn viewer_id(&self) -> Uuid {
        self.account_id.unwrap_or_else(Uuid::nil)
    }

    /// Whether two records share the (post, IP, viewer) dedup key.
    pub fn same_key(&self, other: &ViewRecord) -> bool {
        self.post_id == other.post_id
            && self.ip_address == other.ip_address
            && self.viewer_id() == other.viewer_id()
    }

    /// Whether this marker already accounts for a view described by `incoming`.
    ///
    /// A guest view is covered by any marker for the same (post, IP), whoever
    /// left it; a member view only by that member's own marker.
    pub fn covers(&self, incoming: &ViewRecord) -> bool {
        self.post_id == incoming.post_id
            && self.ip_address == incoming.ip_address
            && (incoming.account_id.is_none() || self.viewer_id() == incoming.viewer_id())
    }

    pub fn is_expired_at(&self, window: TimeDelta, now: DateTime<Utc>) -> bool {
        self.created_at + window <= now
    }
}
