use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tempfile::TempDir;
use travel_recommender::models::Destination;
use travel_recommender::server::{create_router, ServerConfig};
use travel_recommender::storage::{DestinationStore, StorageError, StorageResult, TagFilterQuery};
use travel_recommender::tagging::{ImageTagger, TaggingError, TaggingResult, TextTagger};
use travel_recommender::Recommender;

// ========== Test doubles ==========

#[derive(Default)]
struct Calls {
    text: Mutex<Vec<String>>,
    images: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    queries: Mutex<Vec<TagFilterQuery>>,
}

struct StubText {
    keyword: Option<&'static str>,
    calls: Arc<Calls>,
}

#[async_trait]
impl TextTagger for StubText {
    async fn keyword(&self, text: &str) -> TaggingResult<String> {
        self.calls.text.lock().unwrap().push(text.to_string());
        self.keyword
            .map(str::to_string)
            .ok_or_else(|| TaggingError::RequestError("completion unavailable".to_string()))
    }

    fn name(&self) -> &str {
        "stub-text"
    }
}

struct StubImage {
    tags: Option<Vec<&'static str>>,
    calls: Arc<Calls>,
}

#[async_trait]
impl ImageTagger for StubImage {
    async fn tags(&self, path: &Path) -> TaggingResult<Vec<String>> {
        let bytes = tokio::fs::read(path).await.unwrap_or_default();
        self.calls
            .images
            .lock()
            .unwrap()
            .push((path.to_path_buf(), bytes));
        self.tags
            .as_ref()
            .map(|tags| tags.iter().map(|t| t.to_string()).collect())
            .ok_or_else(|| TaggingError::ServiceError {
                status: 500,
                body: "vision down".to_string(),
            })
    }

    fn name(&self) -> &str {
        "stub-image"
    }
}

struct StubStore {
    destinations: Option<Vec<Destination>>,
    calls: Arc<Calls>,
}

#[async_trait]
impl DestinationStore for StubStore {
    async fn query(&self, query: &TagFilterQuery) -> StorageResult<Vec<Destination>> {
        self.calls.queries.lock().unwrap().push(query.clone());
        let Some(destinations) = &self.destinations else {
            return Err(StorageError::QueryError("store unavailable".to_string()));
        };
        Ok(destinations
            .iter()
            .filter(|d| {
                let tags = d
                    .tags
                    .as_ref()
                    .and_then(|t| t.as_str())
                    .unwrap_or("")
                    .to_lowercase();
                query.parameters.iter().any(|p| tags.contains(&p.value))
            })
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "stub-store"
    }
}

fn catalogue() -> Vec<Destination> {
    vec![
        Destination {
            id: Some("1".to_string()),
            name: "Maldives".to_string(),
            description: "Overwater villas".to_string(),
            tags: Some(serde_json::json!("Beach, Island")),
        },
        Destination {
            id: Some("2".to_string()),
            name: "Patagonia".to_string(),
            description: "Glaciers & peaks".to_string(),
            tags: Some(serde_json::json!("mountain, hiking")),
        },
    ]
}

struct TestApp {
    base_url: String,
    calls: Arc<Calls>,
    upload_dir: PathBuf,
    _tmp_dir: TempDir,
}

async fn spawn_app(
    keyword: Option<&'static str>,
    image_tags: Option<Vec<&'static str>>,
    destinations: Option<Vec<Destination>>,
) -> TestApp {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let upload_dir = tmp_dir.path().join("uploads");
    let calls = Arc::new(Calls::default());

    let recommender = Recommender::new(
        Arc::new(StubText {
            keyword,
            calls: calls.clone(),
        }),
        Arc::new(StubImage {
            tags: image_tags,
            calls: calls.clone(),
        }),
        Arc::new(StubStore {
            destinations,
            calls: calls.clone(),
        }),
    );

    let config = ServerConfig {
        upload_dir: upload_dir.clone(),
        ..ServerConfig::default()
    };
    let app = create_router(Arc::new(recommender), &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        calls,
        upload_dir,
        _tmp_dir: tmp_dir,
    }
}

async fn post_form(app: &TestApp, form: Form) -> (StatusCode, String) {
    let response = Client::new()
        .post(format!("{}/recommend", app.base_url))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post form");
    let status = response.status();
    (status, response.text().await.unwrap())
}

fn image_part(bytes: &'static [u8]) -> Part {
    Part::bytes(bytes)
        .file_name("mountains.jpg")
        .mime_str("image/jpeg")
        .unwrap()
}

fn upload_dir_is_empty(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count() == 0,
        Err(_) => true,
    }
}

// ========== Pages ==========

#[tokio::test]
async fn test_index_serves_upload_form() {
    let app = spawn_app(None, None, None).await;
    let body = reqwest::get(format!("{}/", app.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("action=\"/recommend\""));
    assert!(body.contains("name=\"text\""));
    assert!(body.contains("name=\"image\""));
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app(None, None, None).await;
    let response = reqwest::get(format!("{}/health", app.base_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

// ========== POST /recommend ==========

#[tokio::test]
async fn test_no_input_returns_no_tags_without_outbound_calls() {
    let app = spawn_app(Some("beach"), Some(vec!["mountain"]), Some(catalogue())).await;

    let (status, body) = post_form(&app, Form::new().text("text", "   ")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No tags detected. Please enter text or upload an image."));
    assert!(app.calls.text.lock().unwrap().is_empty());
    assert!(app.calls.images.lock().unwrap().is_empty());
    assert!(app.calls.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_file_input_counts_as_no_image() {
    let app = spawn_app(Some("beach"), Some(vec!["mountain"]), Some(catalogue())).await;

    let form = Form::new()
        .text("text", "")
        .part("image", Part::bytes(Vec::new()).file_name(""));
    let (status, body) = post_form(&app, form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No tags detected."));
    assert!(app.calls.images.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_text_only_recommendation() {
    let app = spawn_app(Some("beach"), Some(vec!["mountain"]), Some(catalogue())).await;

    let (status, body) = post_form(
        &app,
        Form::new().text("text", "  I want to relax on a beach  "),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.calls.text.lock().unwrap().as_slice(),
        &["I want to relax on a beach".to_string()]
    );
    assert!(app.calls.images.lock().unwrap().is_empty());

    assert!(body.contains("<strong>You said:</strong> I want to relax on a beach"));
    assert!(body.contains("<strong>Tags:</strong> beach</p>"));
    assert!(body.contains("<li><strong>Maldives</strong>: Overwater villas</li>"));
    assert!(!body.contains("Patagonia"));
}

#[tokio::test]
async fn test_image_only_uses_top_tag_and_removes_upload() {
    let app = spawn_app(
        Some("beach"),
        Some(vec!["mountain", "sky", "outdoor"]),
        Some(catalogue()),
    )
    .await;

    let form = Form::new().text("text", "").part("image", image_part(b"fake jpeg"));
    let (status, body) = post_form(&app, form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.calls.text.lock().unwrap().is_empty());

    let images = app.calls.images.lock().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].1, b"fake jpeg");
    assert!(images[0].0.starts_with(&app.upload_dir));
    assert!(!images[0].0.exists());

    assert!(body.contains("[image only]"));
    assert!(body.contains("<strong>Tags:</strong> mountain</p>"));
    assert!(body.contains("Patagonia"));
    assert!(body.contains("Glaciers &amp; peaks"));
    assert!(upload_dir_is_empty(&app.upload_dir));
}

#[tokio::test]
async fn test_same_tag_from_text_and_image_is_queried_once() {
    let app = spawn_app(Some("beach"), Some(vec!["beach", "sand"]), Some(catalogue())).await;

    let form = Form::new()
        .text("text", "sunny coast")
        .part("image", image_part(b"beach photo"));
    let (status, body) = post_form(&app, form).await;

    assert_eq!(status, StatusCode::OK);
    let queries = app.calls.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].parameters.len(), 1);
    assert!(body.contains("<strong>Tags:</strong> beach</p>"));
}

#[tokio::test]
async fn test_both_tags_combined_in_one_query() {
    let app = spawn_app(Some("beach"), Some(vec!["mountain"]), Some(catalogue())).await;

    let form = Form::new()
        .text("text", "sea and peaks")
        .part("image", image_part(b"photo"));
    let (_, body) = post_form(&app, form).await;

    let queries = app.calls.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].query,
        "SELECT * FROM c WHERE CONTAINS(LOWER(c.tags), @tag0) OR CONTAINS(LOWER(c.tags), @tag1)"
    );
    assert!(body.contains("<strong>Tags:</strong> beach, mountain</p>"));
    assert!(body.contains("Maldives"));
    assert!(body.contains("Patagonia"));
}

#[tokio::test]
async fn test_store_failure_still_renders() {
    let app = spawn_app(Some("beach"), None, None).await;

    let (status, body) = post_form(&app, Form::new().text("text", "beach")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No suggestions found."));
}

#[tokio::test]
async fn test_image_tagger_failure_still_cleans_up() {
    let app = spawn_app(None, None, Some(catalogue())).await;

    let form = Form::new().part("image", image_part(b"broken"));
    let (status, body) = post_form(&app, form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No tags detected."));
    assert_eq!(app.calls.images.lock().unwrap().len(), 1);
    assert!(upload_dir_is_empty(&app.upload_dir));
}

#[tokio::test]
async fn test_user_text_is_escaped() {
    let app = spawn_app(Some("city"), None, Some(Vec::new())).await;

    let (_, body) = post_form(
        &app,
        Form::new().text("text", "<script>alert('x')</script>"),
    )
    .await;

    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = spawn_app(Some("beach"), None, Some(catalogue())).await;

    let response = Client::new()
        .post(format!("{}/recommend", app.base_url))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("text=beach")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.calls.text.lock().unwrap().is_empty());
}
