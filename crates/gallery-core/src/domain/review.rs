use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review entity - a comment embedded in exactly one art post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub review_date: DateTime<Utc>,
    pub reviewer_name: String,
    pub text: String,
    pub liked_post: Option<bool>,
}

impl Review {
    /// Create a new review with a generated ID, stamped at `at`.
    pub fn new(draft: ReviewDraft, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            review_date: at,
            reviewer_name: draft.reviewer_name,
            text: draft.text,
            liked_post: draft.liked_post,
        }
    }

    /// Replace the mutable fields in place. The id never changes.
    pub fn apply(&mut self, draft: &ReviewDraft, at: DateTime<Utc>) {
        self.review_date = at;
        self.reviewer_name = draft.reviewer_name.clone();
        self.text = draft.text.clone();
        self.liked_post = draft.liked_post;
    }
}

/// Raw review input as received from a caller; nothing is required yet.
#[derive(Debug, Clone, Default)]
pub struct ReviewFields {
    pub reviewer_name: Option<String>,
    pub text: Option<String>,
    pub liked_post: Option<bool>,
}

/// Review input after the validation policy has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub reviewer_name: String,
    pub text: String,
    pub liked_post: Option<bool>,
}
