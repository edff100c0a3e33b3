//! Review and like handlers.

use actix_web::{HttpResponse, web};

use gallery_core::domain::ReviewFields;
use gallery_shared::dto::{CreatedResponse, ReviewRequest};

use super::{parse_id, review_response};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn fields(req: ReviewRequest) -> ReviewFields {
    ReviewFields {
        reviewer_name: req.reviewer_name,
        text: req.text,
        liked_post: req.liked_post,
    }
}

/// POST /artposts/{id}/reviews
pub async fn append(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> AppResult<HttpResponse> {
    let art_id = parse_id(&path)?;
    let id = state.reviews.append(art_id, fields(body.into_inner())).await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id: id.to_string() }))
}

/// GET /artposts/{id}/reviews
pub async fn list(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let art_id = parse_id(&path)?;
    let reviews = state.reviews.list(art_id).await?;

    let body: Vec<_> = reviews.into_iter().map(review_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /reviews/{review_id}
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> AppResult<HttpResponse> {
    let review_id = parse_id(&path)?;
    state.reviews.edit(review_id, fields(body.into_inner())).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /reviews/{review_id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let review_id = parse_id(&path)?;
    state.reviews.delete(review_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /artposts/{id}/like
pub async fn like(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let art_id = parse_id(&path)?;
    state.reviews.increment_like(art_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
