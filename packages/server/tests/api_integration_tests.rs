//! End-to-end tests over the HTTP surface with mock adapters behind an
//! in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use server_core::domains::itinerary::{
    AiStatus, ItemDraft, ItineraryStore, MemoryItineraryStore,
};
use server_core::kernel::testing::{MockAnalyzer, MockPlaceLookup, MockScraper};
use server_core::kernel::{AnalysisResult, PlaceDetails, ServerDeps};
use server_core::server::build_app;

struct TestApp {
    store: Arc<MemoryItineraryStore>,
    router: axum::Router,
}

fn test_app(deps: ServerDeps) -> axum::Router {
    build_app(Arc::new(deps))
}

fn default_app() -> TestApp {
    let store = Arc::new(MemoryItineraryStore::new());
    let deps = ServerDeps::new(
        store.clone(),
        Arc::new(MockScraper::new()),
        Arc::new(MockAnalyzer::new()),
        None,
    );
    TestApp {
        store,
        router: test_app(deps),
    }
}

async fn send(router: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = default_app();
    let (status, body) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_capture_with_url_queues_analysis() {
    let app = default_app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/capture",
        Some(json!({ "url": "https://tabelog.com/x" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let page_id = body["pageId"].as_str().unwrap();

    let item = app.store.snapshot(page_id).unwrap();
    assert_eq!(item.title, "https://tabelog.com/x");
    assert_eq!(item.ai_processing, Some(AiStatus::Pending));
}

#[tokio::test]
async fn test_capture_requires_input() {
    let app = default_app();
    let (status, body) = send(&app.router, Method::POST, "/capture", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    // blank fields count as absent
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/capture",
        Some(json!({ "url": "   ", "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_inbox_create_with_url_only() {
    let app = default_app();
    let (status, created) = send(
        &app.router,
        Method::POST,
        "/inbox",
        Some(json!({ "url": "https://tabelog.com/x" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "success");

    let id = created["id"].as_str().unwrap();
    let item = app.store.snapshot(id).unwrap();
    assert_eq!(item.title, "https://tabelog.com/x");
    assert_eq!(item.ai_processing, Some(AiStatus::Pending));
}

#[tokio::test]
async fn test_inbox_roundtrip() {
    let app = default_app();

    let (status, created) = send(
        &app.router,
        Method::POST,
        "/inbox",
        Some(json!({
            "title": "Fuglen Tokyo",
            "url": "https://fuglen.com",
            "categories": ["Cafe"],
            "date": "2026-03-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "success");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, list) = send(&app.router, Method::GET, "/inbox", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Fuglen Tokyo");
    assert_eq!(items[0]["type"], "food");
    // a record without a cover carries a deterministic placeholder
    assert!(items[0]["visual"]["emoji"].is_string());
    // the URL makes it pipeline-eligible regardless of client input
    assert_eq!(items[0]["aiProcessing"], "Pending");

    let (status, patched) = send(
        &app.router,
        Method::PATCH,
        &format!("/inbox/{id}"),
        Some(json!({ "status": "Scheduled", "cost": 1500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "success");
    let item = app.store.snapshot(&id).unwrap();
    assert_eq!(item.cost, Some(1500.0));

    let (status, _) = send(&app.router, Method::DELETE, &format!("/inbox/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app.router, Method::GET, "/inbox", None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_inbox_list_excludes_done() {
    let app = default_app();
    app.store
        .create(ItemDraft {
            title: "finished".into(),
            status: Some(server_core::domains::itinerary::ItemStatus::Done),
            ..Default::default()
        })
        .await
        .unwrap();
    app.store
        .create(ItemDraft {
            title: "open".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let (_, list) = send(&app.router, Method::GET, "/inbox", None).await;
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "open");
}

#[tokio::test]
async fn test_patch_unknown_record_is_404() {
    let app = default_app();
    let (status, _) = send(
        &app.router,
        Method::PATCH,
        "/inbox/mem-999",
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_full_scenario() {
    let store = Arc::new(MemoryItineraryStore::new());
    let url = "https://fuglen.com";
    let maps = "https://maps.app.goo.gl/fuglen";

    let scraper = MockScraper::new().with_page(
        url,
        "Title: Fuglen Tokyo\nDescription: Coffee by day, cocktails by night\nContent: ...",
    );
    let analyzer = MockAnalyzer::new().with_result(
        url,
        AnalysisResult {
            title: "Fuglen Tokyo".into(),
            summary: "來自奧斯陸的咖啡館,白天喝咖啡,晚上是酒吧。".into(),
            area: "澀谷".into(),
            category: vec!["Cafe".into()],
            maps_url: Some(maps.into()),
        },
    );
    let deps = ServerDeps::new(
        store.clone(),
        Arc::new(scraper),
        Arc::new(analyzer),
        Some(Arc::new(MockPlaceLookup::new().with_place(
            maps,
            PlaceDetails {
                title: "Fuglen Tokyo".into(),
                ..Default::default()
            },
        ))),
    );
    let router = test_app(deps);

    let (_, captured) = send(
        &router,
        Method::POST,
        "/capture",
        Some(json!({ "url": url })),
    )
    .await;
    let page_id = captured["pageId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::POST,
        "/analyze",
        Some(json!({ "pageId": page_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["title"], "Fuglen Tokyo");
    assert_eq!(body["data"]["area"], "澀谷");
    assert_eq!(body["data"]["aiProcessing"], "Done");
    assert_eq!(body["data"]["mapsUrl"], maps);

    // a second run is a no-op
    let (status, body) = send(
        &router,
        Method::POST,
        "/analyze",
        Some(json!({ "pageId": page_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "skipped");
    assert_eq!(body["aiStatus"], "Done");

    let (status, report) = send(
        &router,
        Method::GET,
        &format!("/analyze?pageId={page_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["aiStatus"], "Done");
    assert_eq!(report["title"], "Fuglen Tokyo");
}

#[tokio::test]
async fn test_analyze_record_without_url() {
    let app = default_app();
    let (_, captured) = send(
        &app.router,
        Method::POST,
        "/capture",
        Some(json!({ "title": "Souvenir shop" })),
    )
    .await;
    let page_id = captured["pageId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/analyze",
        Some(json!({ "pageId": page_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    // the failure is recorded on the item so it shows up in the UI
    let item = app.store.snapshot(&page_id).unwrap();
    assert_eq!(item.ai_processing, Some(AiStatus::Error));

    let (_, report) = send(
        &app.router,
        Method::GET,
        &format!("/analyze?pageId={page_id}"),
        None,
    )
    .await;
    assert_eq!(report["aiStatus"], "Error");
}

#[tokio::test]
async fn test_analyze_scrape_failure_is_500() {
    let store = Arc::new(MemoryItineraryStore::new());
    let url = "https://down.example.com";
    let deps = ServerDeps::new(
        store.clone(),
        Arc::new(MockScraper::new().fail_url(url)),
        Arc::new(MockAnalyzer::new()),
        None,
    );
    let router = test_app(deps);

    let (_, captured) = send(
        &router,
        Method::POST,
        "/capture",
        Some(json!({ "url": url })),
    )
    .await;
    let page_id = captured["pageId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::POST,
        "/analyze",
        Some(json!({ "pageId": page_id })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(
        store.snapshot(&page_id).unwrap().ai_processing,
        Some(AiStatus::Error)
    );
}

#[tokio::test]
async fn test_analyze_unknown_record_is_404() {
    let app = default_app();
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/analyze",
        Some(json!({ "pageId": "mem-999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, Method::GET, "/analyze?pageId=mem-999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
