use crate::error::ApiError;
use axum::extract::FromRequest;

/// JSON request body whose rejections use the API error envelope
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
