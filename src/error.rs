use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::client::ClassifyError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no image file in upload")]
    NoImage,

    #[error("unsupported image type, expected JPEG or PNG")]
    UnsupportedImage,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("could not stage upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error("classification failed: {0}")]
    Classification(#[from] ClassifyError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoImage | AppError::UnsupportedImage | AppError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Staging(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Classification(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
