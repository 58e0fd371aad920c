use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// `axum::Json` whose rejections (missing body, bad JSON, missing or mistyped fields)
/// come back as the 400 envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejections come back as the 404 envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
