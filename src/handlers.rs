// src/handlers.rs
use crate::{AppState, errors::SoulCaptionError, models::*};
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{Error, HttpResponse, web};
use futures_util::TryStreamExt;

pub async fn get_options() -> HttpResponse {
    HttpResponse::Ok().json(FormOptions::catalog())
}

pub async fn get_params(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.studio.params().await)
}

pub async fn update_params(
    data: web::Data<AppState>,
    body: web::Json<GenerationParamsPatch>,
) -> HttpResponse {
    let params = data.studio.update_params(body.into_inner()).await;
    HttpResponse::Ok().json(params)
}

pub async fn generate(
    data: web::Data<AppState>,
    body: web::Json<GenerationParams>,
) -> Result<HttpResponse, SoulCaptionError> {
    let view = data.studio.generate(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_result(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.studio.view().await)
}

pub async fn copy_caption(data: web::Data<AppState>) -> Result<HttpResponse, SoulCaptionError> {
    let text = data.studio.copy_caption().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "copied": true,
        "text": text
    })))
}

pub async fn get_image(data: web::Data<AppState>) -> Result<HttpResponse, SoulCaptionError> {
    let (bytes, content_type) = data.studio.display_image().await?;
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}

pub async fn download(data: web::Data<AppState>) -> Result<HttpResponse, SoulCaptionError> {
    let artifact = data.studio.download().await?;
    Ok(HttpResponse::Ok()
        .content_type(artifact.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(artifact.filename)],
        })
        .body(artifact.bytes))
}

/// Multipart form with an `image` file field and an optional `author` text field.
pub async fn watermark_upload(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let mut image_data: Option<Vec<u8>> = None;
    let mut author = String::new();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.content_disposition().get_name().unwrap_or("").to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > data.max_upload_bytes {
                return Err(SoulCaptionError::Validation(format!(
                    "upload exceeds {} bytes",
                    data.max_upload_bytes
                ))
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "image" => image_data = Some(bytes),
            "author" => {
                author = String::from_utf8(bytes).map_err(|_| {
                    SoulCaptionError::Validation("author must be UTF-8 text".to_string())
                })?
            }
            other => log::debug!("Ignoring multipart field {:?}", other),
        }
    }

    let image_data = image_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| SoulCaptionError::Validation("No image provided".to_string()))?;

    let watermarked = data.studio.watermark_upload(image_data, author).await?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .body(watermarked.png))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "soulcaption",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
