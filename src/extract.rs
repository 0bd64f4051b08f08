//! Path and query extractors whose rejections render as `ApiError`.
//!
//! axum's own `Path` and `Query` reject with a plain-text body. These wrappers
//! deserialize the same way but route the failure through `ApiError`, so a
//! malformed id is a JSON 404 and a malformed filter is a JSON 400.

use axum::extract::FromRequestParts;

use crate::error::ApiError;

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);
