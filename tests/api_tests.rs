//! HTTP-level tests for the studio API.

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use common::*;
use serde_json::{Value, json};
use soulcaption::configure;
use soulcaption::studio::renderer::IMAGE_PLACEHOLDER;
use std::sync::Arc;

fn jane_params() -> Value {
    json!({
        "category": "Du lịch",
        "emotion": "Hoài niệm",
        "author": "@jane",
        "imageDetails": "",
        "length": "Ngắn",
        "style": "Sâu lắng",
        "language": "Tiếng Việt",
        "imageStyle": "Chân thực"
    })
}

fn five_tags() -> [&'static str; 5] {
    ["#dulich", "#hoainiem", "#saigon", "#mientay", "#chill"]
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_options_catalog() {
    let (state, _) = memory_app_state(Arc::new(ScriptedGenerator::default()));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/options").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["categories"].as_array().unwrap().len(), 20);
    assert_eq!(body["emotions"].as_array().unwrap().len(), 50);
    assert_eq!(body["lengths"], json!(["Ngắn", "Trung bình", "Dài"]));
    assert_eq!(body["defaults"]["category"], "Du lịch");
}

#[actix_web::test]
async fn test_generate_renders_watermarked_image() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Chiều về trên sông, nhớ quá những ngày xưa.",
        &five_tags(),
        Some(png_data_uri(1024, 768)),
    ))]));
    let (state, _) = memory_app_state(generator.clone());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(generator.calls(), 1);

    settle(&state.studio).await;

    let req = test::TestRequest::get().uri("/api/v1/result").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(view["generation"]["state"], "ready");
    assert_eq!(view["hashtags"].as_array().unwrap().len(), 5);
    assert_eq!(view["watermark"], "loaded");
    assert_eq!(view["downloadEnabled"], true);
    assert_eq!(view["image"]["kind"], "watermarked");
    assert_eq!(view["image"]["badge"]["text"], "@jane");
    assert!(
        view["image"]["src"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );

    // Badge sits in the bottom-right corner, one padding away from both edges.
    let layout = &view["image"]["badge"]["layout"];
    let padding = layout["padding"].as_f64().unwrap();
    let right = layout["x"].as_f64().unwrap() + layout["rectWidth"].as_f64().unwrap();
    let bottom = layout["y"].as_f64().unwrap() + layout["rectHeight"].as_f64().unwrap();
    assert!((1024.0 - right - padding).abs() < 1e-3);
    assert!((768.0 - bottom - padding).abs() < 1e-3);
}

#[actix_web::test]
async fn test_generate_without_image_shows_placeholder() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Chỉ có chữ thôi.",
        &five_tags(),
        None,
    ))]));
    let (state, _) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(view["caption"], "Chỉ có chữ thôi.");
    assert_eq!(view["hashtags"].as_array().unwrap().len(), 5);
    assert_eq!(view["image"]["kind"], "placeholder");
    assert_eq!(view["image"]["message"], IMAGE_PLACEHOLDER);
    assert_eq!(view["downloadEnabled"], false);

    let req = test::TestRequest::get().uri("/api/v1/download").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_generation_failure_then_retry() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err("upstream unavailable".into()),
        Ok(content("Lần này được rồi.", &["#ok"], None)),
    ]));
    let (state, _) = memory_app_state(generator.clone());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let req = test::TestRequest::get().uri("/api/v1/result").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["generation"]["state"], "failed");
    assert!(
        view["generation"]["message"]
            .as_str()
            .unwrap()
            .contains("upstream unavailable")
    );
    assert!(view["caption"].is_null());

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["generation"]["state"], "ready");
    assert_eq!(view["caption"], "Lần này được rồi.");
    assert_eq!(generator.calls(), 2);
}

#[actix_web::test]
async fn test_empty_caption_is_a_failure() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content("   ", &["#a"], None))]));
    let (state, _) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn test_unknown_category_rejected() {
    let generator = Arc::new(ScriptedGenerator::default());
    let (state, _) = memory_app_state(generator.clone());
    let app = app!(state);

    let mut params = jane_params();
    params["category"] = json!("Không tồn tại");
    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(params)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(generator.calls(), 0);
}

#[actix_web::test]
async fn test_author_patch_rewatermarks() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Caption",
        &five_tags(),
        Some(png_data_uri(800, 800)),
    ))]));
    let (state, _) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    test::call_service(&app, req).await;
    settle(&state.studio).await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/params")
        .set_json(json!({ "author": "bob" }))
        .to_request();
    let params: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(params["author"], "bob");
    assert_eq!(params["category"], "Du lịch");

    let view = settle(&state.studio).await;
    let view = serde_json::to_value(view).unwrap();
    assert_eq!(view["image"]["badge"]["text"], "@bob");

    // Clearing the author drops the badge and falls back to the original image.
    let req = test::TestRequest::patch()
        .uri("/api/v1/params")
        .set_json(json!({ "author": "" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/api/v1/result").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["image"]["kind"], "original");
    assert_eq!(view["watermark"], "idle");
}

#[actix_web::test]
async fn test_copy_caption() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Hello",
        &["#a", "#b"],
        None,
    ))]));
    let (state, clipboard) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::post().uri("/api/v1/copy").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/v1/copy").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["text"], "Hello\n\n#a #b");
    assert_eq!(clipboard.contents().as_deref(), Some("Hello\n\n#a #b"));

    let req = test::TestRequest::get().uri("/api/v1/result").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["copy"]["state"], "copied");
}

#[actix_web::test]
async fn test_copy_failure_is_reported() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content("Hello", &["#a"], None))]));
    let state = app_state(generator, Arc::new(FailingClipboard));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/v1/copy").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let req = test::TestRequest::get().uri("/api/v1/result").to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["copy"]["state"], "failed");
}

#[actix_web::test]
async fn test_download_watermarked_image() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Caption",
        &five_tags(),
        Some(png_data_uri(640, 480)),
    ))]));
    let (state, _) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    test::call_service(&app, req).await;
    settle(&state.studio).await;

    let req = test::TestRequest::get().uri("/api/v1/download").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("soulcaption_@jane_"));
    assert!(disposition.contains(".png"));
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");

    let body = test::read_body(resp).await;
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (640, 480));
}

#[actix_web::test]
async fn test_undecodable_image_falls_back_to_original() {
    use base64::{Engine as _, engine::general_purpose};
    let broken = format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(b"these bytes are not an image")
    );
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Caption",
        &five_tags(),
        Some(broken.clone()),
    ))]));
    let (state, _) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    test::call_service(&app, req).await;

    let view = serde_json::to_value(settle(&state.studio).await).unwrap();
    assert_eq!(view["watermark"], "loadFailed");
    assert_eq!(view["image"]["kind"], "original");
    assert_eq!(view["image"]["src"], broken.as_str());
    assert_eq!(view["downloadEnabled"], true);

    // Download falls back to the raw reference.
    let req = test::TestRequest::get().uri("/api/v1/download").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"these bytes are not an image");
}

fn multipart_body(boundary: &str, author: &str, image: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"author\"\r\n\r\n{a}\r\n",
            b = boundary,
            a = author
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[actix_web::test]
async fn test_watermark_upload() {
    let (state, _) = memory_app_state(Arc::new(ScriptedGenerator::default()));
    let app = app!(state);

    let boundary = "soulcaptionboundary";
    let req = test::TestRequest::post()
        .uri("/api/v1/watermark")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(multipart_body(boundary, "jane", &png_bytes(300, 200)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");

    let body = test::read_body(resp).await;
    let out = image::load_from_memory(&body).unwrap().to_rgba8();
    assert_eq!(out.dimensions(), (300, 200));
    // Top-left untouched, bottom-right darkened by the badge.
    assert_eq!(out.get_pixel(2, 2).0, [90, 140, 200, 255]);
    assert_ne!(out.get_pixel(300 - 12, 200 - 25).0, [90, 140, 200, 255]);
}

#[actix_web::test]
async fn test_watermark_upload_requires_image() {
    let (state, _) = memory_app_state(Arc::new(ScriptedGenerator::default()));
    let app = app!(state);

    let boundary = "soulcaptionboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"author\"\r\n\r\njane\r\n--{b}--\r\n",
        b = boundary
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/watermark")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health() {
    let (state, _) = memory_app_state(Arc::new(ScriptedGenerator::default()));
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "soulcaption");
}

#[actix_web::test]
async fn test_watermark_upload_rejects_garbage() {
    let (state, _) = memory_app_state(Arc::new(ScriptedGenerator::default()));
    let app = app!(state);

    let boundary = "soulcaptionboundary";
    let req = test::TestRequest::post()
        .uri("/api/v1/watermark")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(multipart_body(boundary, "jane", b"not a picture"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_image_endpoint_serves_current_picture() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(content(
        "Caption",
        &["#a"],
        Some(png_data_uri(120, 90)),
    ))]));
    let (state, _) = memory_app_state(generator);
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/image").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/generate")
        .set_json(jane_params())
        .to_request();
    test::call_service(&app, req).await;
    settle(&state.studio).await;

    let req = test::TestRequest::get().uri("/api/v1/image").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
    assert!(resp.headers().get("content-disposition").is_none());

    let body = test::read_body(resp).await;
    let out = image::load_from_memory(&body).unwrap().to_rgba8();
    assert_eq!(out.dimensions(), (120, 90));
    // Watermarked, so it differs from the flat source near the bottom-right.
    assert_ne!(out.get_pixel(120 - 6, 90 - 15).0, [90, 140, 200, 255]);
}

#[actix_web::test]
async fn test_watermark_upload_rejects_oversized_dimensions() {
    let (state, _) = memory_app_state(Arc::new(ScriptedGenerator::default()));
    let app = app!(state);

    let boundary = "soulcaptionboundary";
    let req = test::TestRequest::post()
        .uri("/api/v1/watermark")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(multipart_body(boundary, "jane", &png_bytes(8193, 1)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("exceed"));
}
