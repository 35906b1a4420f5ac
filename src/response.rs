// src/response.rs

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;

/// One page of results, in the shape the frontend already consumes:
/// `data` plus flattened `total`/`pages`/`page`/`limit`.
#[derive(Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub pages: u64,
    pub page: u64,
    pub limit: u64,
}

/// Every task-service operation resolves to exactly one of these.
/// Failures are values, never panics or actix errors, so a handler can
/// always turn the outcome into a response in one place.
#[derive(Debug, PartialEq)]
pub enum ServiceResponse<T> {
    /// Operation succeeded, optionally carrying the affected entity.
    Success(Option<T>),
    /// Paginated read succeeded.
    SuccessPage(Page<T>),
    /// Malformed or missing input; persistence was never touched.
    PayloadError,
    /// The conditional query matched no document.
    NotFoundError,
    /// The database call failed or something unexpected happened.
    ServerError,
}

impl<T: Serialize> ServiceResponse<T> {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceResponse::Success(_) | ServiceResponse::SuccessPage(_) => StatusCode::OK,
            ServiceResponse::PayloadError => StatusCode::BAD_REQUEST,
            ServiceResponse::NotFoundError => StatusCode::NOT_FOUND,
            ServiceResponse::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> serde_json::Value {
        match self {
            ServiceResponse::Success(None) => json!({
                "status": 200,
                "message": "Success",
            }),
            ServiceResponse::Success(Some(data)) => json!({
                "status": 200,
                "message": "Success",
                "data": data,
            }),
            ServiceResponse::SuccessPage(page) => json!({
                "status": 200,
                "message": "Success",
                "data": page.data,
                "total": page.total,
                "pages": page.pages,
                "page": page.page,
                "limit": page.limit,
            }),
            ServiceResponse::PayloadError => json!({
                "status": 400,
                "message": "Invalid or missing payload",
            }),
            ServiceResponse::NotFoundError => json!({
                "status": 404,
                "message": "Requested resource not found",
            }),
            ServiceResponse::ServerError => json!({
                "status": 500,
                "message": "Something went wrong, please try again",
            }),
        }
    }

    pub fn into_http(self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Response for operations that exist in the API surface but have no
/// behavior yet.
pub fn not_implemented() -> HttpResponse {
    HttpResponse::NotImplemented().json(json!({
        "status": 501,
        "message": "Not implemented",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_data_carries_it() {
        let resp = ServiceResponse::Success(Some("payload"));
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body = resp.body();
        assert_eq!(body["status"], 200);
        assert_eq!(body["message"], "Success");
        assert_eq!(body["data"], "payload");
    }

    #[test]
    fn success_without_data_has_no_data_field() {
        let resp: ServiceResponse<String> = ServiceResponse::Success(None);
        let body = resp.body();
        assert_eq!(body["status"], 200);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn paginated_success_flattens_page_fields() {
        let resp = ServiceResponse::SuccessPage(Page {
            data: vec!["a", "b"],
            total: 12,
            pages: 2,
            page: 1,
            limit: 10,
        });
        let body = resp.body();
        assert_eq!(body["data"], json!(["a", "b"]));
        assert_eq!(body["total"], 12);
        assert_eq!(body["pages"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 10);
    }

    #[test]
    fn error_kinds_map_to_their_codes() {
        let payload: ServiceResponse<String> = ServiceResponse::PayloadError;
        let not_found: ServiceResponse<String> = ServiceResponse::NotFoundError;
        let server: ServiceResponse<String> = ServiceResponse::ServerError;
        assert_eq!(payload.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(server.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        for resp in [payload, not_found, server] {
            assert!(resp.body().get("data").is_none());
        }
    }
}
