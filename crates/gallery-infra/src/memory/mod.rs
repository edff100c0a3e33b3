//! In-memory art post store - used when no database is configured.
//!
//! Every write runs under a single write guard, which makes each review
//! mutation atomic with its counter update.
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use gallery_core::domain::{ArtPost, ArtPostDraft, Review, ReviewDraft};
use gallery_core::error::RepoError;
use gallery_core::ports::{ArtPostRepository, ReviewRepository};
use gallery_core::query::ArtQuery;

struct Slot {
    /// Insertion sequence, breaks ties between equal post dates.
    seq: u64,
    post: ArtPost,
}

#[derive(Default)]
struct State {
    posts: HashMap<Uuid, Slot>,
    next_seq: u64,
}

impl State {
    fn newest_first<'a>(&'a self, keep: impl Fn(&ArtPost) -> bool) -> Vec<&'a Slot> {
        let mut slots: Vec<&Slot> = self.posts.values().filter(|s| keep(&s.post)).collect();
        slots.sort_by(|a, b| {
            b.post
                .post_date
                .cmp(&a.post.post_date)
                .then(b.seq.cmp(&a.seq))
        });
        slots
    }

    fn owner_of(&mut self, review_id: Uuid) -> Option<&mut ArtPost> {
        self.posts
            .values_mut()
            .map(|slot| &mut slot.post)
            .find(|post| post.has_review(review_id))
    }
}

/// In-memory document store for art posts and their embedded reviews.
pub struct InMemoryArtPostStore {
    state: RwLock<State>,
}

impl InMemoryArtPostStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }
}

impl Default for InMemoryArtPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtPostRepository for InMemoryArtPostStore {
    async fn insert(&self, post: ArtPost) -> Result<ArtPost, RepoError> {
        let mut state = self.state.write().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.posts.insert(
            post.id,
            Slot {
                seq,
                post: post.clone(),
            },
        );
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArtPost>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).map(|slot| slot.post.clone()))
    }

    async fn find(&self, query: &ArtQuery) -> Result<Vec<ArtPost>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first(|post| query.matches(post))
            .into_iter()
            .map(|slot| slot.post.clone())
            .collect())
    }

    async fn find_others(&self, exclude: Uuid, limit: usize) -> Result<Vec<ArtPost>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .newest_first(|post| post.id != exclude)
            .into_iter()
            .take(limit)
            .map(|slot| slot.post.clone())
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &ArtPostDraft,
        post_date: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let slot = state.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        slot.post.apply(draft, post_date);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl ReviewRepository for InMemoryArtPostStore {
    async fn push_review(&self, art_id: Uuid, review: &Review) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let slot = state.posts.get_mut(&art_id).ok_or(RepoError::NotFound)?;
        slot.post.push_review(review.clone());
        Ok(())
    }

    async fn list_reviews(&self, art_id: Uuid) -> Result<Vec<Review>, RepoError> {
        let state = self.state.read().await;
        state
            .posts
            .get(&art_id)
            .map(|slot| slot.post.reviews.clone())
            .ok_or(RepoError::NotFound)
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        draft: &ReviewDraft,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let post = state.owner_of(review_id).ok_or(RepoError::NotFound)?;
        post.edit_review(review_id, draft, at);
        Ok(())
    }

    async fn pull_review(&self, review_id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let post = state.owner_of(review_id).ok_or(RepoError::NotFound)?;
        post.pull_review(review_id);
        Ok(())
    }

    async fn increment_likes(&self, art_id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let slot = state.posts.get_mut(&art_id).ok_or(RepoError::NotFound)?;
        slot.post.add_like();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gallery_core::domain::{ArtPostFields, ReviewFields, SubjectInput};
    use gallery_core::{ArtPostService, DomainError, ReviewService, ServicePolicy};

    use super::*;

    fn services() -> (ArtPostService, ReviewService) {
        let store = Arc::new(InMemoryArtPostStore::new());
        let policy = ServicePolicy::default();
        (
            ArtPostService::new(store.clone(), policy.clone()),
            ReviewService::new(store, policy),
        )
    }

    fn post_fields(poster: &str, title: &str, art_type: &str, subjects: &[&str]) -> ArtPostFields {
        ArtPostFields {
            poster_name: Some(poster.into()),
            image_ref: Some("https://img.example/art.png".into()),
            title: Some(title.into()),
            art_type: Some(art_type.into()),
            description: Some("mixed media".into()),
            subjects: Some(SubjectInput::Many(
                subjects.iter().map(|s| s.to_string()).collect(),
            )),
            like_count: None,
        }
    }

    fn review_fields(name: &str) -> ReviewFields {
        ReviewFields {
            reviewer_name: Some(name.into()),
            text: Some(format!("{name} likes it")),
            liked_post: Some(true),
        }
    }

    #[tokio::test]
    async fn gallery_scenario_keeps_counter_and_list_in_step() {
        let (posts, reviews) = services();

        let art_id = posts
            .create(ArtPostFields {
                subjects: Some(SubjectInput::One("animal".into())),
                ..post_fields("Jane Doe", "Fox", "painting", &[])
            })
            .await
            .unwrap();

        let created = posts.get_one(art_id).await.unwrap();
        assert_eq!(created.subjects, vec!["animal"]);
        assert_eq!(created.statistics.review_count, 0);
        assert!(created.reviews.is_empty());

        let r1 = reviews.append(art_id, review_fields("Alice")).await.unwrap();
        assert_eq!(posts.get_one(art_id).await.unwrap().statistics.review_count, 1);
        let r2 = reviews.append(art_id, review_fields("Bob")).await.unwrap();
        assert_eq!(posts.get_one(art_id).await.unwrap().statistics.review_count, 2);

        reviews.delete(r1).await.unwrap();
        let post = posts.get_one(art_id).await.unwrap();
        assert_eq!(post.statistics.review_count, 1);
        assert_eq!(post.reviews.len(), 1);
        assert_eq!(post.reviews[0].id, r2);

        posts.delete(art_id).await.unwrap();
        assert!(matches!(
            posts.get_one(art_id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            reviews.list(art_id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_counted() {
        let (posts, reviews) = services();
        let art_id = posts
            .create(post_fields("Jane", "Crowd", "photo", &[]))
            .await
            .unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let reviews = reviews.clone();
                tokio::spawn(async move {
                    reviews
                        .append(art_id, review_fields(&format!("reviewer-{i}")))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let post = posts.get_one(art_id).await.unwrap();
        assert_eq!(post.statistics.review_count, 50);
        assert_eq!(post.reviews.len(), 50);
    }

    #[tokio::test]
    async fn edit_review_replaces_in_place() {
        let (posts, reviews) = services();
        let art_id = posts.create(post_fields("Jane", "Dawn", "photo", &[])).await.unwrap();
        let first = reviews.append(art_id, review_fields("Alice")).await.unwrap();
        reviews.append(art_id, review_fields("Bob")).await.unwrap();
        let before = reviews.list(art_id).await.unwrap();

        reviews
            .edit(
                first,
                ReviewFields {
                    reviewer_name: Some("Alicia".into()),
                    text: Some("on reflection, stunning".into()),
                    liked_post: None,
                },
            )
            .await
            .unwrap();

        let after = reviews.list(art_id).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, first);
        assert_eq!(after[0].reviewer_name, "Alicia");
        assert_eq!(after[0].liked_post, None);
        assert!(after[0].review_date >= before[0].review_date);
        assert_eq!(after[1], before[1]);
        assert_eq!(posts.get_one(art_id).await.unwrap().statistics.review_count, 2);
    }

    #[tokio::test]
    async fn unknown_review_is_not_found() {
        let (_, reviews) = services();
        let missing = Uuid::new_v4();

        assert!(matches!(
            reviews.delete(missing).await,
            Err(DomainError::NotFound { entity_type: "review", .. })
        ));
        assert!(matches!(
            reviews.edit(missing, review_fields("Alice")).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            reviews.append(missing, review_fields("Alice")).await,
            Err(DomainError::NotFound { entity_type: "art post", .. })
        ));
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let (posts, _) = services();
        let art_id = posts.create(post_fields("Jane", "Once", "photo", &[])).await.unwrap();

        posts.delete(art_id).await.unwrap();
        assert!(matches!(
            posts.delete(art_id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn search_and_filter_follow_the_query_builder() {
        let (posts, _) = services();
        let jane = posts.create(post_fields("Jane Doe", "Harbour", "photo", &["sea"])).await.unwrap();
        let garden = posts
            .create(post_fields("Bob", "Jane's Garden", "painting", &["animal", "nature"]))
            .await
            .unwrap();
        let fox = posts
            .create(post_fields("Carl", "Fox", "painting", &["animal"]))
            .await
            .unwrap();

        let found: Vec<Uuid> = posts.search(Some("JANE")).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&jane) && found.contains(&garden));

        assert_eq!(posts.search(Some("")).await.unwrap().len(), 3);

        let both = posts.filter(None, Some("animal,nature")).await.unwrap();
        assert_eq!(both.iter().map(|p| p.id).collect::<Vec<_>>(), vec![garden]);

        let paintings = posts.filter(Some("painting"), Some("animal")).await.unwrap();
        assert_eq!(paintings.len(), 2);
        assert!(paintings.iter().all(|p| p.id != jane));
        assert!(paintings.iter().any(|p| p.id == fox));
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let (posts, _) = services();
        let mut ids = Vec::new();
        for title in ["one", "two", "three"] {
            ids.push(posts.create(post_fields("Jane", title, "photo", &[])).await.unwrap());
        }

        let all: Vec<Uuid> = posts.get_all().await.unwrap().iter().map(|p| p.id).collect();
        ids.reverse();
        assert_eq!(all, ids);
    }

    #[tokio::test]
    async fn others_excludes_the_post_and_respects_the_cap() {
        let (posts, _) = services();
        let mut ids = Vec::new();
        for i in 0..15 {
            ids.push(
                posts
                    .create(post_fields("Jane", &format!("piece {i}"), "photo", &[]))
                    .await
                    .unwrap(),
            );
        }

        let others = posts.get_others(ids[0], None).await.unwrap();
        assert_eq!(others.len(), 12);
        assert!(others.iter().all(|p| p.id != ids[0]));

        let few = posts.get_others(ids[0], Some(3)).await.unwrap();
        assert_eq!(few.len(), 3);

        let none = posts.get_others(ids[0], Some(0)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_but_not_reviews() {
        let (posts, reviews) = services();
        let art_id = posts.create(post_fields("Jane", "Draft", "sketch", &["a"])).await.unwrap();
        reviews.append(art_id, review_fields("Alice")).await.unwrap();
        let before = posts.get_one(art_id).await.unwrap();

        posts
            .update(
                art_id,
                ArtPostFields {
                    like_count: Some(7),
                    subjects: Some(SubjectInput::One("b".into())),
                    ..post_fields("Jane", "Final", "painting", &[])
                },
            )
            .await
            .unwrap();

        let after = posts.get_one(art_id).await.unwrap();
        assert_eq!(after.title, "Final");
        assert_eq!(after.art_type, "painting");
        assert_eq!(after.subjects, vec!["b"]);
        assert_eq!(after.statistics.like_count, 7);
        assert_eq!(after.statistics.review_count, 1);
        assert_eq!(after.reviews, before.reviews);
        assert!(after.post_date >= before.post_date);

        assert!(matches!(
            posts.update(Uuid::new_v4(), post_fields("a", "b", "c", &[])).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn post_date_is_kept_when_restamping_is_disabled() {
        let store = Arc::new(InMemoryArtPostStore::new());
        let posts = ArtPostService::new(
            store,
            ServicePolicy {
                restamp_on_edit: false,
                ..ServicePolicy::default()
            },
        );
        let art_id = posts.create(post_fields("Jane", "Still", "photo", &[])).await.unwrap();
        let created = posts.get_one(art_id).await.unwrap().post_date;

        posts.update(art_id, post_fields("Jane", "Still life", "photo", &[])).await.unwrap();
        assert_eq!(posts.get_one(art_id).await.unwrap().post_date, created);
    }

    #[tokio::test]
    async fn likes_accumulate_without_dedup() {
        let (posts, reviews) = services();
        let art_id = posts.create(post_fields("Jane", "Liked", "photo", &[])).await.unwrap();

        for _ in 0..3 {
            reviews.increment_like(art_id).await.unwrap();
        }
        assert_eq!(posts.get_one(art_id).await.unwrap().statistics.like_count, 3);
        assert!(matches!(
            reviews.increment_like(Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_without_like_count_keeps_likes() {
        let (posts, reviews) = services();
        let art_id = posts.create(post_fields("Jane", "Liked", "photo", &[])).await.unwrap();
        for _ in 0..5 {
            reviews.increment_like(art_id).await.unwrap();
        }

        posts
            .update(art_id, post_fields("Jane", "Renamed", "photo", &[]))
            .await
            .unwrap();

        let after = posts.get_one(art_id).await.unwrap();
        assert_eq!(after.title, "Renamed");
        assert_eq!(after.statistics.like_count, 5);
    }
}
