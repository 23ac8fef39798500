use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directed edge: `follower_id` follows `following_id`.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub target_user_id: Uuid,
}

/// Query-string form used by unfollow and relationship status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowTargetQuery {
    pub target_user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub target_user_id: Uuid,
    pub is_following: bool,
}
