use actix_web::{HttpRequest, HttpResponse, Responder};

/// Endpoint used by the frontend to know if the server is reachable
#[tracing::instrument(name = "CORS check handler", skip(_request))]
pub async fn cors_check(_request: HttpRequest) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
