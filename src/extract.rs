//! Request extractors whose rejections render as `AppError` JSON bodies.
//!
//! Use these in place of axum's `Json`, `Path` and `Query` when extracting.
//! Responses still use `axum::Json`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[allow(dead_code)]
        answer: crate::domain::Response,
    }

    #[tokio::test]
    async fn test_bad_json_becomes_bad_request() {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"answer":"maybe"}"#))
            .unwrap();

        let Err(err) = ApiJson::<Form>::from_request(request, &()).await else {
            panic!("unknown answer should be rejected");
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("maybe"));
    }

    #[tokio::test]
    async fn test_missing_content_type_becomes_bad_request() {
        let request = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"answer":"yes"}"#))
            .unwrap();

        let Err(err) = ApiJson::<Form>::from_request(request, &()).await else {
            panic!("request without a JSON content type should be rejected");
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
