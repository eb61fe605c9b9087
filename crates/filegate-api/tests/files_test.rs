//! General file API integration tests.
//!
//! Run with: `cargo test -p filegate-api --test files_test`

mod helpers;

use axum::http::StatusCode;
use chrono::Local;
use helpers::auth::{bearer, mint_token, user_token};
use helpers::fixtures::{create_test_pdf, file_form, pdf_form, png_form};
use helpers::{setup_test_app, setup_test_app_with};

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[tokio::test]
async fn test_upload_file_into_caller_date_bucket() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .multipart(pdf_form("report.pdf"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let url = response.json::<String>();
    assert_eq!(url, format!("upload/u1/{}/report.pdf", today()));

    let stored = app
        .web_root()
        .join("upload")
        .join("u1")
        .join(today())
        .join("report.pdf");
    assert_eq!(std::fs::read(stored).unwrap(), create_test_pdf());
}

#[tokio::test]
async fn test_owner_can_delete_own_file() {
    let app = setup_test_app().await;
    let client = app.client();
    let token = user_token("u1");

    let url = client
        .post("/file")
        .add_header("Authorization", bearer(&token))
        .multipart(pdf_form("report.pdf"))
        .await
        .json::<String>();

    let response = client
        .delete("/file")
        .add_header("Authorization", bearer(&token))
        .add_query_param("relativeUrl", &url)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<String>(), url);

    // Second delete finds nothing
    let response = client
        .delete("/file")
        .add_header("Authorization", bearer(&token))
        .add_query_param("relativeUrl", &url)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_user_cannot_delete() {
    let app = setup_test_app().await;
    let client = app.client();

    let url = client
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u2")))
        .multipart(pdf_form("report.pdf"))
        .await
        .json::<String>();

    let response = client
        .delete("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .add_query_param("relativeUrl", &url)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
    assert!(app
        .web_root()
        .join("upload")
        .join("u2")
        .join(today())
        .join("report.pdf")
        .is_file());
}

#[tokio::test]
async fn test_caller_with_role_can_delete_any_file() {
    let app = setup_test_app().await;
    let client = app.client();

    let url = client
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u2")))
        .multipart(pdf_form("report.pdf"))
        .await
        .json::<String>();

    let response = client
        .delete("/file")
        .add_header("Authorization", bearer(&mint_token("staff-1", &["editor"])))
        .add_query_param("relativeUrl", &url)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_file_rejects_disallowed_extension() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .multipart(png_form("photo.png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.web_root().join("upload").exists());
}

#[tokio::test]
async fn test_file_rejects_zero_length_upload() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .multipart(file_form("empty.pdf", Vec::new(), "application/pdf"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.web_root().join("upload").exists());
}

#[tokio::test]
async fn test_file_rejects_missing_file_field() {
    let app = setup_test_app().await;

    let form = axum_test::multipart::MultipartForm::new().add_text("note", "no file here");
    let response = app
        .client()
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_name_with_path_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .multipart(pdf_form("../../escape.pdf"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(!app.web_root().join("upload").exists());
}

#[tokio::test]
async fn test_delete_requires_upload_prefix() {
    let app = setup_test_app().await;
    std::fs::write(app.web_root().join("u1-notes.pdf"), b"x").unwrap();

    let response = app
        .client()
        .delete("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .add_query_param("relativeUrl", "u1-notes.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.web_root().join("u1-notes.pdf").exists());
}

#[tokio::test]
async fn test_upload_over_size_limit_rejected() {
    let app = setup_test_app_with(|config| config.max_upload_size_bytes = 1024).await;

    let response = app
        .client()
        .post("/file")
        .add_header("Authorization", bearer(&user_token("u1")))
        .multipart(file_form("big.pdf", vec![b'x'; 256 * 1024], "application/pdf"))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!app
        .web_root()
        .join("upload")
        .join("u1")
        .join(today())
        .join("big.pdf")
        .exists());
}
