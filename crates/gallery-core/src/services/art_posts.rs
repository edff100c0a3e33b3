//! Art post use-cases.
//!
//! # Invariants
//! - A created post has no reviews and a zero review counter.
//! - Listings are newest-first by `post_date`.
//! - Edits replace every editable field; the review list and its counter
//!   are never touched here.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::policy::{ServicePolicy, with_deadline};
use crate::domain::{ArtPost, ArtPostFields};
use crate::error::DomainError;
use crate::ports::ArtPostRepository;
use crate::query::ArtQuery;

const ENTITY: &str = "art post";

/// Art post service facade over a repository implementation.
#[derive(Clone)]
pub struct ArtPostService {
    posts: Arc<dyn ArtPostRepository>,
    policy: ServicePolicy,
}

impl ArtPostService {
    pub fn new(posts: Arc<dyn ArtPostRepository>, policy: ServicePolicy) -> Self {
        Self { posts, policy }
    }

    pub fn backend(&self) -> &'static str {
        self.posts.backend()
    }

    /// Create a post and return its generated id.
    pub async fn create(&self, fields: ArtPostFields) -> Result<Uuid, DomainError> {
        let draft = self.policy.validation.art_post(fields)?;
        let post = ArtPost::new(draft, Utc::now());
        let id = post.id;

        with_deadline(self.policy.operation_timeout, async {
            self.posts
                .insert(post)
                .await
                .map_err(|e| e.for_entity(ENTITY, id))
        })
        .await?;

        tracing::info!(art_id = %id, "Art post created");
        Ok(id)
    }

    pub async fn get_all(&self) -> Result<Vec<ArtPost>, DomainError> {
        self.query(&ArtQuery::all()).await
    }

    pub async fn get_one(&self, id: Uuid) -> Result<ArtPost, DomainError> {
        with_deadline(self.policy.operation_timeout, async {
            self.posts
                .find_by_id(id)
                .await
                .map_err(|e| e.for_entity(ENTITY, id))?
                .ok_or(DomainError::NotFound {
                    entity_type: ENTITY,
                    id,
                })
        })
        .await
    }

    /// Posts other than `exclude`, capped at `limit` or the policy default.
    /// A zero cap yields an empty list without touching the store.
    pub async fn get_others(
        &self,
        exclude: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ArtPost>, DomainError> {
        let limit = limit.unwrap_or(self.policy.others_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }
        with_deadline(self.policy.operation_timeout, async {
            self.posts
                .find_others(exclude, limit)
                .await
                .map_err(|e| e.for_entity(ENTITY, exclude))
        })
        .await
    }

    /// Title or poster name search. A blank term lists everything.
    pub async fn search(&self, term: Option<&str>) -> Result<Vec<ArtPost>, DomainError> {
        self.query(&ArtQuery::search(term)).await
    }

    /// Type equality and subject superset filter, `subjects` comma-delimited.
    pub async fn filter(
        &self,
        art_type: Option<&str>,
        subjects: Option<&str>,
    ) -> Result<Vec<ArtPost>, DomainError> {
        self.query(&ArtQuery::filter(art_type, subjects)).await
    }

    pub async fn query(&self, query: &ArtQuery) -> Result<Vec<ArtPost>, DomainError> {
        tracing::debug!(?query, "Querying art posts");
        with_deadline(self.policy.operation_timeout, async {
            self.posts
                .find(query)
                .await
                .map_err(|e| e.for_entity(ENTITY, Uuid::nil()))
        })
        .await
    }

    /// Full replace of the editable fields.
    pub async fn update(&self, id: Uuid, fields: ArtPostFields) -> Result<(), DomainError> {
        let draft = self.policy.validation.art_post(fields)?;
        let post_date = self.policy.restamp_on_edit.then(Utc::now);

        with_deadline(self.policy.operation_timeout, async {
            self.posts
                .update(id, &draft, post_date)
                .await
                .map_err(|e| e.for_entity(ENTITY, id))
        })
        .await?;

        tracing::info!(art_id = %id, restamped = post_date.is_some(), "Art post updated");
        Ok(())
    }

    /// Delete a post and every review it owns.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        with_deadline(self.policy.operation_timeout, async {
            self.posts
                .delete(id)
                .await
                .map_err(|e| e.for_entity(ENTITY, id))
        })
        .await?;

        tracing::info!(art_id = %id, "Art post deleted");
        Ok(())
    }
}
