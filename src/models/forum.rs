// src/models/forum.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Forum topic joined with its author's name and reply count.
#[derive(Debug, Serialize, FromRow)]
pub struct ForumTopic {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub course_id: i64,
    pub author_id: i64,
    pub author_name: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reply_count: i64,
}

/// Single reply joined with its author's name.
#[derive(Debug, Serialize, FromRow)]
pub struct ForumReply {
    pub id: i64,
    pub content: String,
    pub topic_id: i64,
    pub author_id: i64,
    pub author_name: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    pub course_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    pub topic_id: i64,
    #[validate(length(min = 1, max = 20000))]
    pub content: String,
}
