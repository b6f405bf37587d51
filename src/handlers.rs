use std::io;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Result};
use futures_util::StreamExt;
use image::ImageFormat;
use serde_json::json;
use tempfile::Builder;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::Classifier;
use crate::error::AppError;
use crate::models::AnalysisReport;
use crate::prediction::analyze;

const DASHBOARD: &str = include_str!("../static/index.html");

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(DASHBOARD)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Accept one sky photo, classify it and report the rain estimate.
pub async fn analyze_upload(
    mut payload: Multipart,
    classifier: web::Data<dyn Classifier>,
) -> Result<HttpResponse, AppError> {
    // first file part is the image; plain form fields are skipped
    let mut image = Vec::new();
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::Upload(e.to_string()))?;
        let is_file = field.content_disposition().get_filename().is_some();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| AppError::Upload(e.to_string()))?;
            if is_file {
                image.extend_from_slice(&data);
            }
        }
        if is_file {
            break;
        }
    }
    if image.is_empty() {
        return Err(AppError::NoImage);
    }

    let extension = match image::guess_format(&image) {
        Ok(ImageFormat::Jpeg) => "jpg",
        Ok(ImageFormat::Png) => "png",
        other => {
            warn!(format = ?other.ok(), "rejected upload");
            return Err(AppError::UnsupportedImage);
        }
    };

    // removed when `upload_dir` drops
    let upload_dir = Builder::new().prefix("sky_uploads").tempdir()?;
    let filepath = upload_dir
        .path()
        .join(format!("{}.{}", Uuid::new_v4(), extension));

    let staged = filepath.clone();
    let size = image.len();
    web::block(move || std::fs::write(&staged, image))
        .await
        .map_err(|e| io::Error::other(e.to_string()))??;

    info!(path = %filepath.display(), bytes = size, "staged upload");

    let raw = classifier.classify(&filepath).await?;
    let assessment = analyze(&raw);

    info!(
        cloud_type = %assessment.cloud_type,
        rain_probability = assessment.rain_probability,
        "sky analyzed"
    );

    Ok(HttpResponse::Ok().json(AnalysisReport::new(assessment, raw)))
}
