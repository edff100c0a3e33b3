use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::review::{Review, ReviewDraft};

/// Denormalized counters cached on an art post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub review_count: u32,
    pub like_count: u32,
}

/// ArtPost entity - an artwork submission that owns its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtPost {
    pub id: Uuid,
    pub post_date: DateTime<Utc>,
    pub poster_name: String,
    pub image_ref: String,
    pub title: String,
    pub art_type: String,
    pub description: String,
    pub subjects: Vec<String>,
    pub statistics: Statistics,
    pub reviews: Vec<Review>,
}

impl ArtPost {
    /// Create a new post. It always starts without reviews, so the review
    /// counter starts at zero whatever the caller supplied.
    pub fn new(draft: ArtPostDraft, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_date: at,
            poster_name: draft.poster_name,
            image_ref: draft.image_ref,
            title: draft.title,
            art_type: draft.art_type,
            description: draft.description,
            subjects: draft.subjects,
            statistics: Statistics {
                review_count: 0,
                like_count: draft.like_count.unwrap_or(0),
            },
            reviews: Vec::new(),
        }
    }

    /// Full replace of the editable fields. Reviews and the review counter
    /// are left alone; `post_date` moves only when a new stamp is given and
    /// the like counter only when the draft carries one.
    pub fn apply(&mut self, draft: &ArtPostDraft, post_date: Option<DateTime<Utc>>) {
        if let Some(at) = post_date {
            self.post_date = at;
        }
        self.poster_name = draft.poster_name.clone();
        self.image_ref = draft.image_ref.clone();
        self.title = draft.title.clone();
        self.art_type = draft.art_type.clone();
        self.description = draft.description.clone();
        self.subjects = draft.subjects.clone();
        if let Some(likes) = draft.like_count {
            self.statistics.like_count = likes;
        }
    }

    /// Append a review and bump the counter together.
    pub fn push_review(&mut self, review: Review) {
        self.reviews.push(review);
        self.statistics.review_count = self.statistics.review_count.saturating_add(1);
    }

    /// Edit a review in place. Returns false when this post does not own it.
    pub fn edit_review(&mut self, review_id: Uuid, draft: &ReviewDraft, at: DateTime<Utc>) -> bool {
        match self.reviews.iter_mut().find(|r| r.id == review_id) {
            Some(review) => {
                review.apply(draft, at);
                true
            }
            None => false,
        }
    }

    /// Remove a review and decrement the counter together, clamped at zero.
    /// Returns false when this post does not own the review.
    pub fn pull_review(&mut self, review_id: Uuid) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|r| r.id != review_id);
        if self.reviews.len() == before {
            return false;
        }
        self.statistics.review_count = self.statistics.review_count.saturating_sub(1);
        true
    }

    pub fn add_like(&mut self) {
        self.statistics.like_count = self.statistics.like_count.saturating_add(1);
    }

    pub fn has_review(&self, review_id: Uuid) -> bool {
        self.reviews.iter().any(|r| r.id == review_id)
    }
}

/// Subjects as callers send them: a single tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectInput {
    One(String),
    Many(Vec<String>),
}

impl Default for SubjectInput {
    fn default() -> Self {
        SubjectInput::Many(Vec::new())
    }
}

impl SubjectInput {
    /// Normalize to a list: trimmed, blanks dropped, first occurrence kept.
    pub fn into_list(self) -> Vec<String> {
        let raw = match self {
            SubjectInput::One(subject) => vec![subject],
            SubjectInput::Many(subjects) => subjects,
        };

        let mut subjects: Vec<String> = Vec::with_capacity(raw.len());
        for subject in raw {
            let subject = subject.trim();
            if !subject.is_empty() && !subjects.iter().any(|s| s == subject) {
                subjects.push(subject.to_string());
            }
        }
        subjects
    }
}

/// Raw post input as received from a caller; nothing is required yet.
#[derive(Debug, Clone, Default)]
pub struct ArtPostFields {
    pub poster_name: Option<String>,
    pub image_ref: Option<String>,
    pub title: Option<String>,
    pub art_type: Option<String>,
    pub description: Option<String>,
    pub subjects: Option<SubjectInput>,
    pub like_count: Option<u32>,
}

/// Post input after the validation policy and subject normalization ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtPostDraft {
    pub poster_name: String,
    pub image_ref: String,
    pub title: String,
    pub art_type: String,
    pub description: String,
    pub subjects: Vec<String>,
    /// `None` keeps the stored like counter on edit; a new post starts at 0.
    pub like_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ArtPostDraft {
        ArtPostDraft {
            poster_name: "Jane Doe".into(),
            image_ref: "https://img.example/1.png".into(),
            title: "Morning".into(),
            art_type: "painting".into(),
            description: "Oil on canvas".into(),
            subjects: vec!["nature".into()],
            like_count: Some(4),
        }
    }

    fn review(name: &str) -> Review {
        Review::new(
            ReviewDraft {
                reviewer_name: name.into(),
                text: "lovely".into(),
                liked_post: Some(true),
            },
            Utc::now(),
        )
    }

    #[test]
    fn scalar_subject_becomes_a_list() {
        let subjects = SubjectInput::One("animal".into()).into_list();
        assert_eq!(subjects, vec!["animal".to_string()]);
    }

    #[test]
    fn subject_list_is_trimmed_and_deduplicated() {
        let subjects = SubjectInput::Many(vec![
            " animal ".into(),
            "".into(),
            "nature".into(),
            "animal".into(),
        ])
        .into_list();
        assert_eq!(subjects, vec!["animal".to_string(), "nature".to_string()]);
    }

    #[test]
    fn subject_input_deserializes_scalar_or_list() {
        let one: SubjectInput = serde_json::from_str(r#""animal""#).unwrap();
        let many: SubjectInput = serde_json::from_str(r#"["animal","nature"]"#).unwrap();
        assert_eq!(one, SubjectInput::One("animal".into()));
        assert_eq!(many.into_list().len(), 2);
    }

    #[test]
    fn new_post_starts_without_reviews() {
        let post = ArtPost::new(draft(), Utc::now());
        assert!(post.reviews.is_empty());
        assert_eq!(post.statistics.review_count, 0);
        assert_eq!(post.statistics.like_count, 4);
    }

    #[test]
    fn pull_review_keeps_counter_in_step() {
        let mut post = ArtPost::new(draft(), Utc::now());
        let first = review("Alice");
        let second = review("Bob");
        let first_id = first.id;
        post.push_review(first);
        post.push_review(second.clone());
        assert_eq!(post.statistics.review_count, 2);

        assert!(post.pull_review(first_id));
        assert_eq!(post.statistics.review_count, 1);
        assert_eq!(post.reviews, vec![second]);

        assert!(!post.pull_review(first_id));
        assert_eq!(post.statistics.review_count, 1);
    }

    #[test]
    fn pull_review_never_underflows() {
        let mut post = ArtPost::new(draft(), Utc::now());
        let r = review("Alice");
        let id = r.id;
        post.reviews.push(r);

        assert!(post.pull_review(id));
        assert_eq!(post.statistics.review_count, 0);
    }

    #[test]
    fn edit_review_preserves_order_and_counter() {
        let mut post = ArtPost::new(draft(), Utc::now());
        let a = review("Alice");
        let b = review("Bob");
        let a_id = a.id;
        post.push_review(a);
        post.push_review(b);

        let edited = ReviewDraft {
            reviewer_name: "Alice B.".into(),
            text: "changed my mind".into(),
            liked_post: None,
        };
        assert!(post.edit_review(a_id, &edited, Utc::now()));

        assert_eq!(post.reviews[0].id, a_id);
        assert_eq!(post.reviews[0].reviewer_name, "Alice B.");
        assert_eq!(post.reviews[0].liked_post, None);
        assert_eq!(post.statistics.review_count, 2);
        assert!(!post.edit_review(Uuid::new_v4(), &edited, Utc::now()));
    }

    #[test]
    fn apply_keeps_reviews_and_optionally_restamps() {
        let created = Utc::now() - chrono::Duration::days(1);
        let mut post = ArtPost::new(draft(), created);
        post.push_review(review("Alice"));

        let mut edit = draft();
        edit.title = "Evening".into();
        edit.like_count = Some(9);
        post.apply(&edit, None);
        assert_eq!(post.post_date, created);
        assert_eq!(post.title, "Evening");
        assert_eq!(post.statistics, Statistics { review_count: 1, like_count: 9 });

        let now = Utc::now();
        post.apply(&edit, Some(now));
        assert_eq!(post.post_date, now);
    }

    #[test]
    fn apply_without_like_count_keeps_likes() {
        let mut post = ArtPost::new(draft(), Utc::now());
        post.add_like();
        post.add_like();

        let mut edit = draft();
        edit.title = "Evening".into();
        edit.like_count = None;
        post.apply(&edit, None);

        assert_eq!(post.title, "Evening");
        assert_eq!(post.statistics.like_count, 6);
    }
}
