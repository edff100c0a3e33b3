//! HTTP handlers and route configuration.

mod art_posts;
mod health;
mod reviews;

use actix_web::web;
use chrono::SecondsFormat;
use uuid::Uuid;

use gallery_core::domain::{ArtPost, Review};
use gallery_shared::dto::{ArtPostResponse, ReviewResponse, StatisticsResponse};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/artposts")
                .route("", web::post().to(art_posts::create))
                .route("", web::get().to(art_posts::list))
                .route("/{id}", web::get().to(art_posts::get_one))
                .route("/{id}", web::put().to(art_posts::update))
                .route("/{id}", web::delete().to(art_posts::delete))
                .route("/{id}/others", web::get().to(art_posts::others))
                .route("/{id}/like", web::post().to(reviews::like))
                .route("/{id}/reviews", web::post().to(reviews::append))
                .route("/{id}/reviews", web::get().to(reviews::list)),
        )
        .service(
            web::scope("/reviews")
                .route("/{review_id}", web::put().to(reviews::edit))
                .route("/{review_id}", web::delete().to(reviews::delete)),
        );
}

/// Parse an id path segment; anything but a UUID is a validation problem.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("`{raw}` is not a valid id")))
}

pub(crate) fn review_response(review: Review) -> ReviewResponse {
    ReviewResponse {
        id: review.id.to_string(),
        review_date: review.review_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        reviewer_name: review.reviewer_name,
        text: review.text,
        liked_post: review.liked_post,
    }
}

pub(crate) fn art_post_response(post: ArtPost) -> ArtPostResponse {
    ArtPostResponse {
        id: post.id.to_string(),
        post_date: post.post_date.to_rfc3339_opts(SecondsFormat::Millis, true),
        poster_name: post.poster_name,
        image_ref: post.image_ref,
        title: post.title,
        art_type: post.art_type,
        description: post.description,
        subjects: post.subjects,
        statistics: StatisticsResponse {
            review_count: post.statistics.review_count,
            like_count: post.statistics.like_count,
        },
        reviews: post.reviews.into_iter().map(review_response).collect(),
    }
}
