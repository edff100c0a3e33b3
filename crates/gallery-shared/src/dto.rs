//! Data Transfer Objects - request/response types for the API.
//!
//! Every body is camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Subjects as sent by clients: one tag or a list of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subjects {
    One(String),
    Many(Vec<String>),
}

/// Statistics block of an incoming post. `reviewCount` is accepted but
/// ignored; the server derives it from the review list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsInput {
    pub review_count: Option<u32>,
    pub like_count: Option<u32>,
}

/// Request to create or fully replace an art post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtPostRequest {
    pub poster_name: Option<String>,
    pub image_ref: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub art_type: Option<String>,
    pub description: Option<String>,
    pub subjects: Option<Subjects>,
    pub statistics: Option<StatisticsInput>,
}

/// Request to append or edit a review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub reviewer_name: Option<String>,
    pub text: Option<String>,
    pub liked_post: Option<bool>,
}

/// Query string of `GET /artposts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtPostListQuery {
    /// Search term matched against title and poster name.
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub art_type: Option<String>,
    /// Comma-delimited subject list.
    pub subjects: Option<String>,
}

/// Query string of `GET /artposts/{id}/others`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OthersQuery {
    pub limit: Option<usize>,
}

/// Response carrying the id of a created resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub review_count: u32,
    pub like_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: String,
    pub review_date: String,
    pub reviewer_name: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_post: Option<bool>,
}

/// Full art post with its embedded reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtPostResponse {
    pub id: String,
    pub post_date: String,
    pub poster_name: String,
    pub image_ref: String,
    pub title: String,
    #[serde(rename = "type")]
    pub art_type: String,
    pub description: String,
    pub subjects: Vec<String>,
    pub statistics: StatisticsResponse,
    pub reviews: Vec<ReviewResponse>,
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_request_reads_camel_case_and_scalar_subject() {
        let req: ArtPostRequest = serde_json::from_str(
            r#"{
                "posterName": "Jane Doe",
                "imageRef": "https://img.example/fox.png",
                "title": "Fox",
                "type": "painting",
                "subjects": "animal",
                "statistics": { "reviewCount": 7, "likeCount": 2 }
            }"#,
        )
        .unwrap();

        assert_eq!(req.poster_name.as_deref(), Some("Jane Doe"));
        assert_eq!(req.art_type.as_deref(), Some("painting"));
        assert_eq!(req.subjects, Some(Subjects::One("animal".into())));
        assert_eq!(req.statistics.unwrap().like_count, Some(2));
        assert!(req.description.is_none());
    }

    #[test]
    fn review_without_flag_omits_it() {
        let body = serde_json::to_value(ReviewResponse {
            id: "r1".into(),
            review_date: "2024-01-01T00:00:00Z".into(),
            reviewer_name: "Alice".into(),
            text: "Nice".into(),
            liked_post: None,
        })
        .unwrap();

        assert_eq!(body["reviewerName"], "Alice");
        assert!(body.get("likedPost").is_none());
    }
}
