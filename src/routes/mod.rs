//! HTTP layer: thin handlers delegating to the service functions and a
//! uniform JSON envelope for success and failure responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use serde::Serialize;
use serde_json::json;

use crate::pagination::Paginated;
use crate::services::ServiceError;

pub mod auth;
pub mod categories;
pub mod products;
pub mod subcategories;
pub mod users;

/// Successful response envelope. The pagination block appears only when
/// the client requested a page.
#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Paginated>,
}

pub(crate) fn ok_json<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        success: true,
        data,
        pagination: None,
    })
}

pub(crate) fn created_json<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse {
        success: true,
        data,
        pagination: None,
    })
}

pub(crate) fn ok_list<T: Serialize>(data: T, pagination: Option<Paginated>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        success: true,
        data,
        pagination,
    })
}

pub(crate) fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "message": message }))
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::Duplicate(_)
            | Self::InactiveParent(_)
            | Self::HierarchyMismatch(_)
            | Self::HasDependents(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PartialFailure { .. } => StatusCode::MULTI_STATUS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({ "success": false, "message": self.to_string() });
        match self {
            Self::Validation { fields, .. } if !fields.is_empty() => {
                body["errors"] = json!(fields);
            }
            Self::PartialFailure { failed, .. } => {
                body["failed"] = json!(failed);
            }
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Mount every API route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(categories::configure)
            .configure(subcategories::configure)
            .configure(products::configure)
            .configure(users::configure),
    );
}
