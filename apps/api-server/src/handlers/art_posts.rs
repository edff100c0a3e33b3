//! Art post handlers.

use actix_web::{HttpResponse, web};

use gallery_core::ArtQuery;
use gallery_core::domain::{ArtPostFields, SubjectInput};
use gallery_shared::dto::{ArtPostListQuery, ArtPostRequest, CreatedResponse, OthersQuery, Subjects};

use super::{art_post_response, parse_id};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn fields(req: ArtPostRequest) -> ArtPostFields {
    ArtPostFields {
        poster_name: req.poster_name,
        image_ref: req.image_ref,
        title: req.title,
        art_type: req.art_type,
        description: req.description,
        subjects: req.subjects.map(|subjects| match subjects {
            Subjects::One(subject) => SubjectInput::One(subject),
            Subjects::Many(subjects) => SubjectInput::Many(subjects),
        }),
        like_count: req.statistics.and_then(|s| s.like_count),
    }
}

/// POST /artposts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<ArtPostRequest>,
) -> AppResult<HttpResponse> {
    let id = state.art_posts.create(fields(body.into_inner())).await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id: id.to_string() }))
}

/// GET /artposts[?q=&type=&subjects=a,b]
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ArtPostListQuery>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let query = ArtQuery::from_params(
        params.q.as_deref(),
        params.art_type.as_deref(),
        params.subjects.as_deref(),
    );

    let posts = state.art_posts.query(&query).await?;
    let body: Vec<_> = posts.into_iter().map(art_post_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /artposts/{id}
pub async fn get_one(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let post = state.art_posts.get_one(id).await?;

    Ok(HttpResponse::Ok().json(art_post_response(post)))
}

/// GET /artposts/{id}/others[?limit=n]
pub async fn others(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OthersQuery>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    let posts = state.art_posts.get_others(id, query.limit).await?;

    let body: Vec<_> = posts.into_iter().map(art_post_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /artposts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ArtPostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.art_posts.update(id, fields(body.into_inner())).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /artposts/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path)?;
    state.art_posts.delete(id).await?;

    Ok(HttpResponse::NoContent().finish())
}
