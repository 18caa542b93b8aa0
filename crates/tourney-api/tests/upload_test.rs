//! Upload API integration tests.
//!
//! Run with: `cargo test -p tourney-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{api_path, fixtures, setup_test_app, setup_test_app_with};
use serde_json::Value;
use tourney_core::FieldErrors;

const NOT_ALLOWED: &str =
    "File type not allowed. Please upload image with these types: jpg, jpeg, png, gif, tiff";

fn file_form(field: &str, filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(field, Part::bytes(data).file_name(filename))
}

#[tokio::test]
async fn test_upload_then_commit_resizes_to_default_width() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form("flagIcon", "england.jpg", fixtures::england_jpg()))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Upload file successfully");
    let filename = body["data"]["flagIcon"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".jpg"));
    assert!(app.staging_dir("teams").join(&filename).is_file());

    // Create/update flow: validate the reference, then commit it
    let service = app.state.upload_service();
    let field = app.state.upload_field("teams", "flagIcon").unwrap();
    let mut errors = FieldErrors::new();
    let staged = service
        .validate_reference(&field, Some(&filename), &mut errors)
        .await
        .unwrap()
        .expect("staged file should validate");
    assert!(errors.is_empty());

    let asset = service.commit_field(&field, &filename, true).await.unwrap();
    assert_eq!(asset.path, app.storage_dir("teams").join(&filename));
    assert!(!staged.path.exists());

    let bytes = std::fs::read(&asset.path).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    let committed = image::load_from_memory(&bytes).unwrap();
    assert_eq!(committed.width(), 300);
    assert_eq!(committed.height(), 180);
}

#[tokio::test]
async fn test_upload_empty_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form("flagIcon", "flag.png", Vec::new()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["data"]["flagIcon"], "Flag Icon file is empty.");
    // The empty file is left for the sweep
    assert_eq!(app.staged_files("teams").len(), 1);
}

#[tokio::test]
async fn test_upload_too_large_is_rejected_before_sniffing() {
    let app = setup_test_app().await;
    let limit = app.state.config.max_file_size_bytes;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form(
            "flagIcon",
            "huge.png",
            fixtures::oversized_png(6 * 1024 * 1024),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["data"]["flagIcon"], "File too large");

    let staged = app.staged_files("teams");
    assert_eq!(staged.len(), 1);
    assert_eq!(std::fs::metadata(&staged[0]).unwrap().len(), limit);
}

#[tokio::test]
async fn test_upload_text_disguised_as_jpg() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form("flagIcon", "roster.jpg", fixtures::text_file()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["data"]["flagIcon"], NOT_ALLOWED);
}

#[tokio::test]
async fn test_upload_disallowed_extension_writes_nothing() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form("flagIcon", "flag.pdf", fixtures::small_png()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["data"]["flagIcon"], NOT_ALLOWED);
    assert!(app.staged_files("teams").is_empty());
}

#[tokio::test]
async fn test_upload_missing_field() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_text("name", "England")
        .add_part("avatar", Part::bytes(fixtures::small_png()).file_name("a.png"));
    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["data"]["flagIcon"], "Flag Icon is a required field");
    assert!(body["data"].get("avatar").is_none());
}

#[tokio::test]
async fn test_upload_second_file_for_same_field() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part(
            "flagIcon",
            Part::bytes(fixtures::small_png()).file_name("one.png"),
        )
        .add_part(
            "flagIcon",
            Part::bytes(fixtures::small_png()).file_name("two.png"),
        );
    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["data"]["flagIcon"], "Only one Flag Icon file is allowed");
}

#[tokio::test]
async fn test_first_error_per_field_wins() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part("flagIcon", Part::bytes(Vec::<u8>::new()).file_name("empty.png"))
        .add_part(
            "flagIcon",
            Part::bytes(fixtures::small_png()).file_name("two.png"),
        );
    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(form)
        .await;

    let body: Value = response.json();
    assert_eq!(body["data"]["flagIcon"], "Flag Icon file is empty.");
}

#[tokio::test]
async fn test_upload_user_avatar() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/users/upload/avatar"))
        .multipart(file_form("avatar", "Me.PNG", fixtures::small_png()))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let filename = body["data"]["avatar"].as_str().unwrap();
    assert!(filename.ends_with(".png"));
    assert!(app.staging_dir("users").join(filename).is_file());
}

#[tokio::test]
async fn test_upload_respects_configured_extensions() {
    let app = setup_test_app_with(|config| {
        config.accept_image_extensions = vec!["png".to_string()];
    })
    .await;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form("flagIcon", "england.jpg", fixtures::england_jpg()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["data"]["flagIcon"],
        "File type not allowed. Please upload image with these types: png"
    );
}

#[tokio::test]
async fn test_unknown_entity_or_field() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/leagues/upload/flagIcon"))
        .multipart(file_form("flagIcon", "flag.png", fixtures::small_png()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .client()
        .post(&api_path("/teams/upload/avatar"))
        .multipart(file_form("avatar", "flag.png", fixtures::small_png()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_non_multipart_body() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .json(&serde_json::json!({ "flagIcon": "flag.png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_commit_after_sweep_is_invalid_reference() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/teams/upload/flagIcon"))
        .multipart(file_form("flagIcon", "flag.png", fixtures::small_png()))
        .await;
    let body: Value = response.json();
    let filename = body["data"]["flagIcon"].as_str().unwrap().to_string();

    // The sweep got there first
    std::fs::remove_file(app.staging_dir("teams").join(&filename)).unwrap();

    let field = app.state.upload_field("teams", "flagIcon").unwrap();
    let err = app
        .state
        .upload_service()
        .commit_field(&field, &filename, true)
        .await
        .unwrap_err();
    assert!(matches!(err, tourney_core::AppError::InvalidFileReference(_)));
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"]
        .get("/api/admin/{entity}/upload/{field}")
        .is_some());

    std::fs::remove_dir_all(&app.state.config.upload_file_dir).unwrap();
    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}
