use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ArtPost, ArtPostDraft, Review, ReviewDraft};
use crate::error::RepoError;
use crate::query::ArtQuery;

/// Art post persistence.
///
/// Listing methods return posts newest-first by `post_date`.
#[async_trait]
pub trait ArtPostRepository: Send + Sync {
    /// Store a freshly created post.
    async fn insert(&self, post: ArtPost) -> Result<ArtPost, RepoError>;

    /// Find a post by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArtPost>, RepoError>;

    /// Find every post matching the predicate.
    async fn find(&self, query: &ArtQuery) -> Result<Vec<ArtPost>, RepoError>;

    /// Up to `limit` posts other than `exclude`.
    async fn find_others(&self, exclude: Uuid, limit: usize) -> Result<Vec<ArtPost>, RepoError>;

    /// Replace the editable fields of a post. `RepoError::NotFound` if absent.
    async fn update(
        &self,
        id: Uuid,
        draft: &ArtPostDraft,
        post_date: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError>;

    /// Delete a post with its reviews. `RepoError::NotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Name of the backing store, for diagnostics.
    fn backend(&self) -> &'static str;
}

/// Review persistence inside the owning post.
///
/// Each method is one atomic write against a single post document: the
/// review list and `statistics.review_count` change together or not at all.
/// Stores without native partial updates may answer `RepoError::Conflict`
/// when the post changed under them; callers retry.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Append a review and increment the review counter.
    async fn push_review(&self, art_id: Uuid, review: &Review) -> Result<(), RepoError>;

    /// Reviews of a post in insertion order.
    async fn list_reviews(&self, art_id: Uuid) -> Result<Vec<Review>, RepoError>;

    /// Replace a review's mutable fields wherever it lives.
    async fn update_review(
        &self,
        review_id: Uuid,
        draft: &ReviewDraft,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Remove a review and decrement the counter, clamped at zero.
    async fn pull_review(&self, review_id: Uuid) -> Result<(), RepoError>;

    /// Increment the like counter of a post.
    async fn increment_likes(&self, art_id: Uuid) -> Result<(), RepoError>;
}
