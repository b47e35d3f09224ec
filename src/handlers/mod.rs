//! Route table and the extractor settings that keep malformed input inside
//! the `{message, data}` envelope.

pub mod employee;
pub mod health;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::models::envelope::ApiResponse;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = match &err {
            JsonPayloadError::Deserialize(inner) => format!("body {}", inner),
            other => other.to_string(),
        };
        AppError::Validation(format!("Validation Error: {}", detail)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let detail = match &err {
            QueryPayloadError::Deserialize(inner) => format!("query {}", inner),
            other => other.to_string(),
        };
        AppError::Validation(format!("Validation Error: {}", detail)).into()
    })
}

/// Answers unknown paths, and unsupported methods on known paths, with 404.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::empty(format!(
        "Endpoint not found: {} {}",
        req.method(),
        req.uri()
    )))
}

/// Registers every route at the root. Expects `web::Data<EmployeeService>`
/// in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    mount(cfg, "");
}

/// Registers every route under `prefix` (`""` or a path such as `/api`).
pub fn mount(cfg: &mut web::ServiceConfig, prefix: &str) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::resource(format!("{}/health", prefix))
                .route(web::get().to(health::health_check))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource(format!("{}/employees", prefix))
                .route(web::get().to(employee::get_employees))
                .route(web::post().to(employee::create_employee))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource(format!("{}/employees/stats", prefix))
                .route(web::get().to(employee::get_stats))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource(format!("{}/employees/{{id}}", prefix))
                .route(web::get().to(employee::get_employee))
                .route(web::put().to(employee::update_employee))
                .route(web::delete().to(employee::delete_employee))
                .default_service(web::to(not_found)),
        )
        .default_service(web::to(not_found));
}
