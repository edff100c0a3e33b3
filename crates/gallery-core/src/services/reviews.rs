//! Review sub-resource use-cases.
//!
//! Every write is delegated to the store as one atomic operation against the
//! owning post. Stores that detect a concurrent modification instead of
//! applying the write are retried a bounded number of times.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::policy::{ServicePolicy, with_deadline};
use crate::domain::{Review, ReviewFields};
use crate::error::{DomainError, RepoError};
use crate::ports::ReviewRepository;

const ART_POST: &str = "art post";
const REVIEW: &str = "review";

/// Review service facade over a repository implementation.
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    policy: ServicePolicy,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>, policy: ServicePolicy) -> Self {
        Self { reviews, policy }
    }

    /// Append a review to a post and return the new review id.
    pub async fn append(&self, art_id: Uuid, fields: ReviewFields) -> Result<Uuid, DomainError> {
        let draft = self.policy.validation.review(fields)?;
        let review = Review::new(draft, Utc::now());
        let review_id = review.id;

        let repo = self.reviews.as_ref();
        let review = &review;
        with_deadline(self.policy.operation_timeout, async {
            self.retrying(move || repo.push_review(art_id, review))
                .await
                .map_err(|e| e.for_entity(ART_POST, art_id))
        })
        .await?;

        tracing::info!(art_id = %art_id, review_id = %review_id, "Review appended");
        Ok(review_id)
    }

    /// Reviews of a post in insertion order.
    pub async fn list(&self, art_id: Uuid) -> Result<Vec<Review>, DomainError> {
        with_deadline(self.policy.operation_timeout, async {
            self.reviews
                .list_reviews(art_id)
                .await
                .map_err(|e| e.for_entity(ART_POST, art_id))
        })
        .await
    }

    /// Replace a review's fields in place and re-stamp its date.
    pub async fn edit(&self, review_id: Uuid, fields: ReviewFields) -> Result<(), DomainError> {
        let draft = self.policy.validation.review(fields)?;
        let at = Utc::now();

        let repo = self.reviews.as_ref();
        let draft = &draft;
        with_deadline(self.policy.operation_timeout, async {
            self.retrying(move || repo.update_review(review_id, draft, at))
                .await
                .map_err(|e| e.for_entity(REVIEW, review_id))
        })
        .await?;

        tracing::info!(review_id = %review_id, "Review edited");
        Ok(())
    }

    /// Remove a review from its post and decrement the counter.
    pub async fn delete(&self, review_id: Uuid) -> Result<(), DomainError> {
        let repo = self.reviews.as_ref();
        with_deadline(self.policy.operation_timeout, async {
            self.retrying(move || repo.pull_review(review_id))
                .await
                .map_err(|e| e.for_entity(REVIEW, review_id))
        })
        .await?;

        tracing::info!(review_id = %review_id, "Review deleted");
        Ok(())
    }

    /// One more like for a post. Repeat likes are not deduplicated.
    pub async fn increment_like(&self, art_id: Uuid) -> Result<(), DomainError> {
        let repo = self.reviews.as_ref();
        with_deadline(self.policy.operation_timeout, async {
            self.retrying(move || repo.increment_likes(art_id))
                .await
                .map_err(|e| e.for_entity(ART_POST, art_id))
        })
        .await?;

        tracing::debug!(art_id = %art_id, "Like recorded");
        Ok(())
    }

    /// Re-run `op` while the store reports a conflict, up to the configured
    /// number of retries. The last conflict is returned once they run out.
    async fn retrying<F, Fut>(&self, mut op: F) -> Result<(), RepoError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), RepoError>>,
    {
        let attempts = self.policy.max_write_retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Err(RepoError::Conflict) if attempt < attempts => {
                    tracing::debug!(attempt, attempts, "Write conflict, retrying");
                    attempt += 1;
                    tokio::task::yield_now().await;
                }
                Err(RepoError::Conflict) => {
                    tracing::warn!(attempts, "Write conflict persisted, giving up");
                    return Err(RepoError::Conflict);
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::domain::ReviewDraft;

    /// Store that reports a conflict for the first `conflicts` writes.
    struct ContendedStore {
        conflicts: u32,
        calls: AtomicU32,
        pushed: Mutex<Vec<Review>>,
        delay: Option<Duration>,
    }

    impl ContendedStore {
        fn new(conflicts: u32) -> Self {
            Self {
                conflicts,
                calls: AtomicU32::new(0),
                pushed: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn attempt(&self) -> Result<(), RepoError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.conflicts {
                Err(RepoError::Conflict)
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ReviewRepository for ContendedStore {
        async fn push_review(&self, _art_id: Uuid, review: &Review) -> Result<(), RepoError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.attempt()?;
            self.pushed.lock().unwrap().push(review.clone());
            Ok(())
        }

        async fn list_reviews(&self, _art_id: Uuid) -> Result<Vec<Review>, RepoError> {
            Err(RepoError::NotFound)
        }

        async fn update_review(
            &self,
            _review_id: Uuid,
            _draft: &ReviewDraft,
            _at: DateTime<Utc>,
        ) -> Result<(), RepoError> {
            self.attempt()
        }

        async fn pull_review(&self, _review_id: Uuid) -> Result<(), RepoError> {
            self.attempt()
        }

        async fn increment_likes(&self, _art_id: Uuid) -> Result<(), RepoError> {
            Err(RepoError::Connection("connection reset".into()))
        }
    }

    fn fields() -> ReviewFields {
        ReviewFields {
            reviewer_name: Some("Alice".into()),
            text: Some("Great colours".into()),
            liked_post: Some(true),
        }
    }

    fn service(store: Arc<ContendedStore>) -> ReviewService {
        ReviewService::new(store, ServicePolicy::default())
    }

    #[tokio::test]
    async fn retries_through_a_transient_conflict() {
        let store = Arc::new(ContendedStore::new(1));
        let id = service(store.clone()).append(Uuid::new_v4(), fields()).await.unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        let pushed = store.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        assert_eq!(pushed[0].id, id);
        assert_eq!(pushed[0].reviewer_name, "Alice");
    }

    #[tokio::test]
    async fn gives_up_after_the_retry_budget() {
        let store = Arc::new(ContendedStore::new(u32::MAX));
        let err = service(store.clone()).delete(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn append_gives_up_after_the_retry_budget() {
        let store = Arc::new(ContendedStore::new(u32::MAX));
        let err = service(store.clone()).append(Uuid::new_v4(), fields()).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 4);
        assert!(store.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_retries_means_a_single_attempt() {
        let store = Arc::new(ContendedStore::new(u32::MAX));
        let policy = ServicePolicy {
            max_write_retries: 0,
            ..ServicePolicy::default()
        };
        let err = ReviewService::new(store.clone(), policy)
            .append(Uuid::new_v4(), fields())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn edit_is_retried_too() {
        let store = Arc::new(ContendedStore::new(2));
        service(store.clone()).edit(Uuid::new_v4(), fields()).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn storage_errors_are_not_retried() {
        let store = Arc::new(ContendedStore::new(0));
        let err = service(store).increment_like(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }

    #[tokio::test]
    async fn missing_post_is_reported_with_context() {
        let art_id = Uuid::new_v4();
        let err = service(Arc::new(ContendedStore::new(0)))
            .list(art_id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound { entity_type: "art post", id } if id == art_id
        ));
    }

    #[tokio::test]
    async fn invalid_review_never_reaches_the_store() {
        let store = Arc::new(ContendedStore::new(0));
        let err = service(store.clone())
            .append(Uuid::new_v4(), ReviewFields::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out() {
        let store = Arc::new(ContendedStore {
            delay: Some(Duration::from_secs(60)),
            ..ContendedStore::new(0)
        });
        let policy = ServicePolicy {
            operation_timeout: Duration::from_millis(100),
            ..ServicePolicy::default()
        };

        let err = ReviewService::new(store, policy)
            .append(Uuid::new_v4(), fields())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Timeout(_)));
    }
}
