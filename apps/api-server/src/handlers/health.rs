//! Health check endpoint.

use actix_web::{HttpResponse, web};
use gallery_shared::dto::HealthResponse;

use crate::state::AppState;

/// Liveness check, also reporting which store is active.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.art_posts.backend().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use gallery_shared::dto::HealthResponse;

    use crate::handlers::testing::{app, memory_state};

    #[actix_web::test]
    async fn test_health_reports_backend() {
        let app = test::init_service(app(memory_state())).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let health: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(health.status, "ok");
        assert_eq!(health.backend, "memory");
    }
}
