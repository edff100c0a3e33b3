//! PostgreSQL art post repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use gallery_core::domain::{ArtPost, ArtPostDraft, Review, ReviewDraft};
use gallery_core::error::RepoError;
use gallery_core::ports::{ArtPostRepository, ReviewRepository};
use gallery_core::query::ArtQuery;

use super::entity::art_post::{ActiveModel, Column, Entity as ArtPostEntity, encode};

/// PostgreSQL art post repository.
pub struct PostgresArtPostRepository {
    pub(crate) db: DbConn,
}

fn query_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(err) => RepoError::Connection(err.to_string()),
        DbErr::ConnectionAcquire(err) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

/// Escape LIKE wildcards so a search term matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compile a query into a SQL condition.
pub(crate) fn condition(query: &ArtQuery) -> Result<Condition, RepoError> {
    let mut cond = Condition::all();

    if let Some(term) = &query.search {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        cond = cond.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(Column::PosterName)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    if let Some(art_type) = &query.art_type {
        cond = cond.add(Column::ArtType.eq(art_type.as_str()));
    }

    if !query.subjects.is_empty() {
        cond = cond.add(Expr::cust_with_values(
            "subjects @> $1",
            [encode(&query.subjects)?],
        ));
    }

    Ok(cond)
}

/// Matches the row whose embedded reviews contain `review_id`.
fn owns_review(review_id: Uuid) -> Condition {
    Condition::all().add(Expr::cust_with_values(
        "reviews @> $1",
        [serde_json::json!([{ "id": review_id }])],
    ))
}

impl PostgresArtPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> Result<(ArtPost, i64), RepoError> {
        let model = ArtPostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)?;
        let version = model.version;
        Ok((model.try_into()?, version))
    }

    async fn load_owner(&self, review_id: Uuid) -> Result<(ArtPost, i64), RepoError> {
        let model = ArtPostEntity::find()
            .filter(owns_review(review_id))
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)?;
        let version = model.version;
        Ok((model.try_into()?, version))
    }

    /// Write back reviews and counters, but only over the version we read.
    async fn store_reviews(&self, post: &ArtPost, read_version: i64) -> Result<(), RepoError> {
        let result = ArtPostEntity::update_many()
            .col_expr(Column::Reviews, Expr::value(encode(&post.reviews)?))
            .col_expr(
                Column::ReviewCount,
                Expr::value(i64::from(post.statistics.review_count)),
            )
            .col_expr(Column::Version, Expr::value(read_version + 1))
            .filter(Column::Id.eq(post.id))
            .filter(Column::Version.eq(read_version))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            tracing::debug!(art_id = %post.id, read_version, "Stale version, write rejected");
            return Err(RepoError::Conflict);
        }
        Ok(())
    }

    async fn find_models(
        &self,
        cond: Condition,
        limit: Option<u64>,
    ) -> Result<Vec<ArtPost>, RepoError> {
        let models = ArtPostEntity::find()
            .filter(cond)
            .order_by_desc(Column::PostDate)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        models.into_iter().map(ArtPost::try_from).collect()
    }
}

#[async_trait]
impl ArtPostRepository for PostgresArtPostRepository {
    async fn insert(&self, post: ArtPost) -> Result<ArtPost, RepoError> {
        let active = ActiveModel::try_from(&post)?;
        let model = active.insert(&self.db).await.map_err(query_err)?;
        model.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArtPost>, RepoError> {
        ArtPostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(ArtPost::try_from)
            .transpose()
    }

    async fn find(&self, query: &ArtQuery) -> Result<Vec<ArtPost>, RepoError> {
        self.find_models(condition(query)?, None).await
    }

    async fn find_others(&self, exclude: Uuid, limit: usize) -> Result<Vec<ArtPost>, RepoError> {
        let cond = Condition::all().add(Column::Id.ne(exclude));
        self.find_models(cond, Some(limit as u64)).await
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &ArtPostDraft,
        post_date: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError> {
        let mut update = ArtPostEntity::update_many()
            .col_expr(Column::PosterName, Expr::value(draft.poster_name.clone()))
            .col_expr(Column::ImageRef, Expr::value(draft.image_ref.clone()))
            .col_expr(Column::Title, Expr::value(draft.title.clone()))
            .col_expr(Column::ArtType, Expr::value(draft.art_type.clone()))
            .col_expr(Column::Description, Expr::value(draft.description.clone()))
            .col_expr(Column::Subjects, Expr::value(encode(&draft.subjects)?))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1));
        if let Some(likes) = draft.like_count {
            update = update.col_expr(Column::LikeCount, Expr::value(i64::from(likes)));
        }
        if let Some(at) = post_date {
            update = update.col_expr(Column::PostDate, Expr::value(DateTimeWithTimeZone::from(at)));
        }

        let result = update
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = ArtPostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl ReviewRepository for PostgresArtPostRepository {
    async fn push_review(&self, art_id: Uuid, review: &Review) -> Result<(), RepoError> {
        let (mut post, version) = self.load(art_id).await?;
        post.push_review(review.clone());
        self.store_reviews(&post, version).await
    }

    async fn list_reviews(&self, art_id: Uuid) -> Result<Vec<Review>, RepoError> {
        let (post, _) = self.load(art_id).await?;
        Ok(post.reviews)
    }

    async fn update_review(
        &self,
        review_id: Uuid,
        draft: &ReviewDraft,
        at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let (mut post, version) = self.load_owner(review_id).await?;
        post.edit_review(review_id, draft, at);
        self.store_reviews(&post, version).await
    }

    async fn pull_review(&self, review_id: Uuid) -> Result<(), RepoError> {
        let (mut post, version) = self.load_owner(review_id).await?;
        post.pull_review(review_id);
        self.store_reviews(&post, version).await
    }

    async fn increment_likes(&self, art_id: Uuid) -> Result<(), RepoError> {
        let result = ArtPostEntity::update_many()
            .col_expr(Column::LikeCount, Expr::col(Column::LikeCount).add(1))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1))
            .filter(Column::Id.eq(art_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
