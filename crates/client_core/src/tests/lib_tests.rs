use super::*;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct CapturedPart {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct MockState {
    reply_status: StatusCode,
    reply_body: String,
    requests: Arc<Mutex<Vec<Vec<CapturedPart>>>>,
}

async fn classify_handler(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(CapturedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    state.requests.lock().await.push(parts);

    (
        state.reply_status,
        [(header::CONTENT_TYPE, "application/json")],
        state.reply_body.clone(),
    )
}

async fn spawn_classify_server(
    reply_status: StatusCode,
    reply_body: impl Into<String>,
) -> Result<(String, Arc<Mutex<Vec<Vec<CapturedPart>>>>), std::io::Error> {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply_status,
        reply_body: reply_body.into(),
        requests: requests.clone(),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/classify", post(classify_handler))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), requests))
}

fn plastic_body() -> String {
    serde_json::json!({
        "success": true,
        "category": "Plastic",
        "confidence": 82,
        "image": STANDARD.encode(b"annotated-jpeg"),
        "recycling_info": {
            "description": "Many plastics can be recycled, but check local guidelines for specific types.",
            "tips": ["Check resin codes (1-7)", "Rinse containers before recycling"]
        }
    })
    .to_string()
}

#[test]
fn size_gate_accepts_exact_limit_and_rejects_one_byte_more() {
    assert!(check_upload_size(MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES).is_ok());
    assert_eq!(
        check_upload_size(MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES),
        Err(UploadError::FileTooLarge {
            size_bytes: MAX_UPLOAD_BYTES + 1,
            limit_bytes: MAX_UPLOAD_BYTES,
        })
    );
}

#[test]
fn selected_file_guesses_mime_type_from_name() {
    assert_eq!(SelectedFile::from_bytes("bottle.jpg", vec![1]).mime_type, "image/jpeg");
    assert_eq!(SelectedFile::from_bytes("box.png", vec![1]).mime_type, "image/png");
    assert_eq!(
        SelectedFile::from_bytes("mystery", vec![1]).mime_type,
        "application/octet-stream"
    );
}

#[test]
fn size_alert_names_a_configured_limit() {
    let message = |limit_bytes: u64| {
        UploadError::FileTooLarge {
            size_bytes: limit_bytes + 1,
            limit_bytes,
        }
        .user_message()
    };
    assert_eq!(
        message(2 * 1024 * 1024),
        "File size too large. Please upload an image smaller than 2MB."
    );
    assert_eq!(
        message(2048),
        "File size too large. Please upload an image smaller than 2KB."
    );
    assert_eq!(
        message(1000),
        "File size too large. Please upload an image smaller than 1000 bytes."
    );
}

#[test]
fn user_messages_match_alert_texts() {
    assert_eq!(
        UploadError::FileTooLarge {
            size_bytes: MAX_UPLOAD_BYTES + 1,
            limit_bytes: MAX_UPLOAD_BYTES,
        }
        .user_message(),
        "File size too large. Please upload an image smaller than 10MB."
    );
    assert_eq!(
        UploadError::BackendReported("No file selected".into()).user_message(),
        "Error: No file selected"
    );
    assert_eq!(
        UploadError::TransportOrParse("connection refused".into()).user_message(),
        "An error occurred while processing your image. Please try again."
    );
}

#[tokio::test]
async fn uploads_single_file_part_and_decodes_result() {
    let (server_url, requests) = spawn_classify_server(StatusCode::OK, plastic_body())
        .await
        .expect("server");
    let classifier = HttpClassifier::new(server_url);
    let file = SelectedFile::from_bytes("bottle.jpg", b"raw-image".to_vec());

    let result = classifier.classify(&file).await.expect("classify");
    assert_eq!(result.category, "Plastic");
    assert_eq!(result.confidence_text(), "82% Confidence");
    assert_eq!(shared::protocol::decode_jpeg_data_uri(&result.image_data_uri()).expect("image"), b"annotated-jpeg");

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    let parts = &requests[0];
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name.as_deref(), Some("file"));
    assert_eq!(parts[0].file_name.as_deref(), Some("bottle.jpg"));
    assert_eq!(parts[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(parts[0].bytes, b"raw-image");
}

#[tokio::test]
async fn oversized_file_never_reaches_the_server() {
    let (server_url, requests) = spawn_classify_server(StatusCode::OK, plastic_body())
        .await
        .expect("server");
    let classifier = HttpClassifier::new(server_url).with_max_upload_bytes(4);
    let file = SelectedFile::from_bytes("huge.jpg", vec![0; 5]);

    let err = classifier.classify(&file).await.expect_err("too large");
    assert!(matches!(err, UploadError::FileTooLarge { size_bytes: 5, limit_bytes: 4 }));
    assert!(requests.lock().await.is_empty());
}

#[tokio::test]
async fn error_body_with_bad_request_status_is_backend_reported() {
    let (server_url, _requests) = spawn_classify_server(
        StatusCode::BAD_REQUEST,
        r#"{"error": "Invalid file type. Please upload PNG, JPG, or JPEG."}"#,
    )
    .await
    .expect("server");
    let classifier = HttpClassifier::new(server_url);
    let file = SelectedFile::from_bytes("notes.txt", b"hello".to_vec());

    let err = classifier.classify(&file).await.expect_err("rejected");
    assert_eq!(
        err,
        UploadError::BackendReported("Invalid file type. Please upload PNG, JPG, or JPEG.".into())
    );
}

#[tokio::test]
async fn non_json_body_is_transport_or_parse_failure() {
    let (server_url, _requests) =
        spawn_classify_server(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
            .await
            .expect("server");
    let classifier = HttpClassifier::new(server_url);
    let file = SelectedFile::from_bytes("can.jpg", b"img".to_vec());

    let err = classifier.classify(&file).await.expect_err("parse failure");
    assert!(err.is_transport());
}

#[tokio::test]
async fn unreachable_server_is_transport_or_parse_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let classifier = HttpClassifier::new(format!("http://{addr}/"));
    assert_eq!(classifier.endpoint(), format!("http://{addr}/classify"));

    let file = SelectedFile::from_bytes("can.jpg", b"img".to_vec());
    let err = classifier.classify(&file).await.expect_err("refused");
    assert!(err.is_transport());
}

#[tokio::test]
async fn reads_path_backed_files_lazily() {
    let dir = std::env::temp_dir().join(format!(
        "ecosort_client_core_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("dir");
    let path = dir.join("glass.png");
    std::fs::write(&path, b"png-bytes").expect("write");

    let file = SelectedFile::from_path(&path).expect("selected");
    assert_eq!(file.file_name, "glass.png");
    assert_eq!(file.size_bytes, 9);
    assert_eq!(file.read_bytes().await.expect("read"), b"png-bytes");

    std::fs::remove_dir_all(dir).expect("cleanup");
}
