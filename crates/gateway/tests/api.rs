use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use newsnotes_common::{
    config::{AppConfig, DatabaseConfig},
    db::schema::ensure_schema,
    errors::{AppError, Result},
    DbPool, NewArticle, PageFetcher, Repository, ScrapeService,
};
use newsnotes_gateway::{create_router, AppState};
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

const HOMEPAGE: &str = r#"
<html><body>
  <article>
    <header><h1><a href="/one">First Story</a></h1></header>
    <div></div><div></div>
    <div><div><p>First teaser.</p></div></div>
  </article>
  <article>
    <header><h1><a href="/two">Second Story</a></h1></header>
    <div></div><div></div>
    <div><div><p>Second teaser.</p></div></div>
  </article>
  <article><header><h1>Bare Headline</h1></header></article>
</body></html>
"#;

struct StaticFetcher;

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<String> {
        Ok(HOMEPAGE.to_string())
    }
}

struct SlowFetcher;

#[async_trait]
impl PageFetcher for SlowFetcher {
    async fn fetch(&self, _url: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(HOMEPAGE.to_string())
    }
}

struct TimeoutFetcher;

#[async_trait]
impl PageFetcher for TimeoutFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        Err(AppError::UpstreamTimeout { url: url.to_string() })
    }
}

async fn test_app(fetcher: Arc<dyn PageFetcher>) -> (Router, Repository) {
    let (app, repo, _) = test_app_with(fetcher, AppConfig::default()).await;
    (app, repo)
}

async fn test_app_with(fetcher: Arc<dyn PageFetcher>, mut config: AppConfig) -> (Router, Repository, DbPool) {
    config.database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    config.scraper.target_url = "https://news.example.com/".to_string();

    let db = DbPool::new(&config.database).await.unwrap();
    ensure_schema(db.write()).await.unwrap();

    let repo = Repository::new(db.clone());
    let scraper = ScrapeService::new(fetcher, repo.clone(), &config.scraper).unwrap();

    let state = AppState {
        config: Arc::new(config),
        db: db.clone(),
        scraper: Arc::new(scraper),
        metrics: None,
    };

    (create_router(state), repo, db)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn seed(repo: &Repository, title: &str) -> Uuid {
    repo.create_article(NewArticle {
        title: title.to_string(),
        link: "https://news.example.com/x".to_string(),
        summary: "teaser".to_string(),
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_add_note_then_read_it_back() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    let id = seed(&repo, "Noted").await;

    let (status, article) = send(
        &app,
        Method::POST,
        &format!("/articles/{}", id),
        Some(json!({"text": "good piece"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(article["id"], json!(id.to_string()));
    let note_ids = article["note"].as_array().unwrap();
    assert_eq!(note_ids.len(), 1);
    let note_id = note_ids[0].clone();

    let (status, article) = send(&app, Method::GET, &format!("/articles/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let notes = article["note"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["id"], note_id);
    assert_eq!(notes[0]["body"], json!({"text": "good piece"}));
}

#[tokio::test]
async fn test_add_note_from_form_body() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    let id = seed(&repo, "Form").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/articles/{}", id))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title=Nice&body=Loved+it"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, notes) = send(&app, Method::GET, "/notes", None).await;
    assert_eq!(notes[0]["body"], json!({"title": "Nice", "body": "Loved it"}));
}

#[tokio::test]
async fn test_note_without_content_type_is_empty() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    let id = seed(&repo, "Bare").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/articles/{}", id))
        .body(Body::from(r#"{"text":"ignored"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, article) = send(&app, Method::GET, &format!("/articles/{}", id), None).await;
    assert_eq!(article["note"][0]["body"], json!({}));
}

#[tokio::test]
async fn test_non_object_note_body_is_rejected() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    let id = seed(&repo, "Strict").await;

    let (status, body) = send(&app, Method::POST, &format!("/articles/{}", id), Some(json!(["x"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let (app, _) = test_app(Arc::new(StaticFetcher)).await;

    let (status, body) = send(&app, Method::GET, &format!("/articles/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("ARTICLE_NOT_FOUND"));

    let (status, body) = send(&app, Method::GET, "/articles/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_FORMAT"));

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/notes/deleteNote/zzz/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_FORMAT"));

    let (status, body) = send(&app, Method::POST, "/saved/zzz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_FORMAT"));

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/articles/{}", Uuid::new_v4()),
        Some(json!({"text": "orphan"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, notes) = send(&app, Method::GET, "/notes", None).await;
    assert_eq!(notes, json!([]));
}

#[tokio::test]
async fn test_delete_note_detaches_it() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    let id = seed(&repo, "Detach").await;

    let (_, article) = send(
        &app,
        Method::POST,
        &format!("/articles/{}", id),
        Some(json!({"text": "short-lived"})),
    )
    .await;
    let note_id = article["note"][0].as_str().unwrap().to_string();

    let (status, article) = send(
        &app,
        Method::DELETE,
        &format!("/notes/deleteNote/{}/{}", note_id, id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(article["note"], json!([]));

    let (_, notes) = send(&app, Method::GET, "/notes", None).await;
    assert_eq!(notes, json!([]));

    let (_, article) = send(&app, Method::GET, &format!("/articles/{}", id), None).await;
    assert_eq!(article["note"], json!([]));
}

#[tokio::test]
async fn test_saved_list() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    let id = seed(&repo, "Keeper").await;
    seed(&repo, "Other").await;

    let (status, article) = send(&app, Method::POST, &format!("/saved/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(article["saved"], json!(true));

    let (_, saved) = send(&app, Method::GET, "/saved", None).await;
    let saved = saved.as_array().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["id"], json!(id.to_string()));

    let (status, article) = send(&app, Method::POST, &format!("/deleteSaved/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(article["saved"], json!(false));

    let (_, saved) = send(&app, Method::GET, "/saved", None).await;
    assert_eq!(saved, json!([]));

    let (status, _) = send(&app, Method::POST, &format!("/saved/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_all_articles() {
    let (app, repo) = test_app(Arc::new(StaticFetcher)).await;
    seed(&repo, "One").await;
    seed(&repo, "Two").await;

    let (status, body) = send(&app, Method::DELETE, "/articles/deleteAll", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted": 2}));

    let (_, articles) = send(&app, Method::GET, "/articles", None).await;
    assert_eq!(articles, json!([]));
}

#[tokio::test]
async fn test_scrape_persists_and_acknowledges() {
    let (app, _) = test_app(Arc::new(StaticFetcher)).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/scrape").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        String::from_utf8(bytes.to_vec()).unwrap(),
        "Scrape complete: 3 found, 3 stored, 0 failed"
    );

    let (_, articles) = send(&app, Method::GET, "/articles", None).await;
    let articles = articles.as_array().unwrap();
    assert_eq!(articles.len(), 3);
    let bare = articles
        .iter()
        .find(|a| a["title"] == json!("Bare Headline"))
        .unwrap();
    assert_eq!(bare["summary"], json!(""));
    assert_eq!(bare["saved"], json!(false));
}

#[tokio::test]
async fn test_scrape_timeout_maps_to_gateway_timeout() {
    let (app, _) = test_app(Arc::new(TimeoutFetcher)).await;

    let (status, body) = send(&app, Method::GET, "/scrape", None).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], json!("UPSTREAM_TIMEOUT"));

    let (_, articles) = send(&app, Method::GET, "/articles", None).await;
    assert_eq!(articles, json!([]));
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let (app, _, db) = test_app_with(Arc::new(StaticFetcher), AppConfig::default()).await;
    db.write().execute_unprepared("DROP TABLE article_notes").await.unwrap();
    db.write().execute_unprepared("DROP TABLE articles").await.unwrap();

    let (status, body) = send(&app, Method::GET, "/articles", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], json!("DATABASE_ERROR"));
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let mut config = AppConfig::default();
    config.server.request_timeout_secs = 1;
    let (app, _, _) = test_app_with(Arc::new(SlowFetcher), config).await;

    let (status, _) = send(&app, Method::GET, "/scrape", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    let (_, articles) = send(&app, Method::GET, "/articles", None).await;
    assert_eq!(articles, json!([]));
}

#[tokio::test]
async fn test_health_and_disabled_metrics() {
    let (app, _) = test_app(Arc::new(StaticFetcher)).await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["service"], json!("newsnotes"));

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ready"));
    assert_eq!(body["checks"]["database"]["status"], json!("up"));
    assert_eq!(body["checks"]["scraper"]["target_url"], json!("https://news.example.com/"));

    let (status, _) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
