use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejections come back in the `AppError` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
