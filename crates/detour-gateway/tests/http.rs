use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use axum::http::{Request, StatusCode};
use axum::Router;
use detour_admin::{Catalog, RedirectAdmin, ValidationOptions};
use detour_core::{ReadRedirectStorage, Redirect, RedirectStorage};
use detour_gateway::{App, AppState, GatewaySettings};
use detour_listing::FormState;
use detour_storage::InMemoryRedirectStorage;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "detour-test-boundary";

fn app_with(
    redirects: Vec<Redirect>,
    settings: GatewaySettings,
) -> (Router, Arc<InMemoryRedirectStorage>) {
    let storage = Arc::new(InMemoryRedirectStorage::with_redirects(redirects));
    let shared: Arc<dyn RedirectStorage> = storage.clone();
    let admin = RedirectAdmin::new(shared, Catalog::english(), ValidationOptions::default());
    (App::router(AppState::new(admin, settings)), storage)
}

fn app() -> (Router, Arc<InMemoryRedirectStorage>) {
    app_with(Vec::new(), GatewaySettings::default())
}

fn redirect(source: &str, target: &str) -> Redirect {
    Redirect::builder()
        .source_uri_path(source)
        .target_uri_path(target)
        .status_code(301)
        .build()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .expect("request")
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app();

    let response = app.oneshot(get("/health")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn create_with_envelope_returns_changed_redirects() {
    let (app, storage) = app();

    let response = app
        .oneshot(post_json(
            "/redirects/create",
            json!({
                "__csrfToken": "",
                "moduleArguments": {
                    "sourceUriPath": "old-page",
                    "targetUriPath": "new-page",
                    "statusCode": "302"
                }
            }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["changedRedirects"][0]["sourceUriPath"], "old-page");
    assert_eq!(body["changedRedirects"][0]["statusCode"], 302);
    assert_eq!(body["messages"][0]["severity"], "OK");

    let stored = storage
        .get_one_by_source_uri_path_and_host("old-page", None, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.target_uri_path, "new-page");
}

#[tokio::test]
async fn create_failure_is_reported_in_messages() {
    let (app, storage) = app();

    let response = app
        .oneshot(post_json(
            "/redirects/create",
            json!({"sourceUriPath": "same", "targetUriPath": "same"}),
        ))
        .await
        .expect("response");

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["changedRedirects"], json!([]));
    assert_eq!(
        body["messages"][0]["title"],
        "Source and target path must differ"
    );
    assert!(storage.is_empty());
}

#[tokio::test]
async fn page_clients_are_redirected_and_see_flash_messages() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/redirects/create")
                .method("POST")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"sourceUriPath": "from", "targetUriPath": "to"}).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[LOCATION]
        .to_str()
        .expect("location")
        .to_string();
    assert!(location.starts_with("/redirects?flash="));

    let other_client = app.clone().oneshot(get("/redirects")).await.expect("response");
    let html = String::from_utf8(body_bytes(other_client).await).expect("utf-8");
    assert!(!html.contains("flash-message--ok"));

    let page = app.clone().oneshot(get(&location)).await.expect("response");
    assert_eq!(page.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(page).await).expect("utf-8");
    assert!(html.contains("flash-message--ok"));
    assert!(html.contains("Redirect created"));
    assert!(html.contains("Showing 1-1 of 1"));

    let again = app.oneshot(get(&location)).await.expect("response");
    let html = String::from_utf8(body_bytes(again).await).expect("utf-8");
    assert!(!html.contains("flash-message--ok"));
}

#[tokio::test]
async fn form_submission_is_accepted_with_matching_csrf_token() {
    let (app, storage) = app_with(
        Vec::new(),
        GatewaySettings {
            csrf_token: Some("secret".to_string()),
            account: Some("admin".to_string()),
            ..GatewaySettings::default()
        },
    );

    let mut form = FormState::new();
    form.source_uri_path = "shop/old".to_string();
    form.target_uri_path = "shop/new".to_string();
    form.status_code = 307;
    let submission = form.submission("secret", 301, None).expect("valid form");

    let response = app
        .clone()
        .oneshot(post_json(
            "/redirects/create",
            serde_json::to_value(&submission).unwrap(),
        ))
        .await
        .expect("response");
    assert_eq!(body_json(response).await["success"], true);

    let stored = storage
        .get_one_by_source_uri_path_and_host("shop/old", None, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status_code, 307);
    assert_eq!(stored.creator.as_deref(), Some("admin"));

    let forged = form.submission("guess", 301, None).expect("valid form");
    let response = app
        .oneshot(post_json(
            "/redirects/create",
            serde_json::to_value(&forged).unwrap(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn account_header_overrides_configured_creator() {
    let (app, storage) = app_with(
        Vec::new(),
        GatewaySettings {
            account: Some("admin".to_string()),
            ..GatewaySettings::default()
        },
    );

    let mut request = post_json(
        "/redirects/create",
        json!({"sourceUriPath": "a", "targetUriPath": "b"}),
    );
    request
        .headers_mut()
        .insert("x-detour-account", "editor".parse().unwrap());
    app.oneshot(request).await.expect("response");

    let stored = storage
        .get_one_by_source_uri_path_and_host("a", None, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.creator.as_deref(), Some("editor"));
}

#[tokio::test]
async fn update_moves_redirect() {
    let (app, storage) = app_with(vec![redirect("old", "target")], GatewaySettings::default());

    let response = app
        .oneshot(post_json(
            "/redirects/update",
            json!({
                "originalSourceUriPath": "old",
                "originalHost": "",
                "sourceUriPath": "renamed",
                "targetUriPath": "target",
                "statusCode": 301
            }),
        ))
        .await
        .expect("response");

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["changedRedirects"][0]["sourceUriPath"], "renamed");

    let all = storage.get_all(None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].source_uri_path, "renamed");
}

#[tokio::test]
async fn delete_reports_missing_redirect() {
    let (app, _) = app_with(vec![redirect("old", "new")], GatewaySettings::default());

    let response = app
        .clone()
        .oneshot(post_json(
            "/redirects/delete",
            json!({"sourceUriPath": "old"}),
        ))
        .await
        .expect("response");
    assert_eq!(body_json(response).await["success"], true);

    let response = app
        .oneshot(post_json(
            "/redirects/delete",
            json!({"sourceUriPath": "old"}),
        ))
        .await
        .expect("response");
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["messages"][0]["severity"], "ERROR");
}

#[tokio::test]
async fn bulk_delete_lists_deleted_redirects() {
    let (app, storage) = app_with(
        vec![redirect("a", "x"), redirect("b", "y")],
        GatewaySettings::default(),
    );

    let response = app
        .oneshot(post_json(
            "/redirects/bulk-delete",
            json!({"redirects": [
                {"sourceUriPath": "a"},
                {"sourceUriPath": "b"},
                {"sourceUriPath": "missing"}
            ]}),
        ))
        .await
        .expect("response");

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["deleted"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["messages"][0]["severity"], "WARNING");
    assert!(storage.is_empty());
}

#[tokio::test]
async fn bulk_delete_rejects_malformed_payload() {
    let (app, _) = app();

    let response = app
        .oneshot(post_json(
            "/redirects/bulk-delete",
            json!({"redirects": "everything"}),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["messages"][0]["severity"], "ERROR");
}

#[tokio::test]
async fn list_json_carries_bootstrap_dataset() {
    let (app, _) = app_with(
        vec![redirect("a", "b")],
        GatewaySettings {
            hosts: vec!["example.com".to_string()],
            show_hit_count: true,
            ..GatewaySettings::default()
        },
    );

    let response = app
        .oneshot(get("/redirects.json?statusCode=301"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["redirects"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["actions"]["create"], "/redirects/create");
    assert_eq!(body["actions"]["bulkDelete"], "/redirects/bulk-delete");
    assert_eq!(body["hostOptions"], json!(["example.com"]));
    assert_eq!(body["defaultStatusCode"], 301);
    assert_eq!(body["initialStatusCodeFilter"], 301);
    assert_eq!(body["showHitCount"], true);
}

#[tokio::test]
async fn export_sends_csv_attachment() {
    let generated = Redirect {
        redirect_type: "generated".into(),
        ..redirect("generated", "elsewhere")
    };
    let (app, _) = app_with(
        vec![redirect("manual", "target"), generated],
        GatewaySettings::default(),
    );

    let response = app
        .clone()
        .oneshot(get("/redirects/export.csv"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/csv; charset=utf-8");
    let disposition = response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"redirects-"));

    let csv = String::from_utf8(body_bytes(response).await).expect("utf-8");
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].starts_with("sourceUriPath,targetUriPath,statusCode"));
    assert_eq!(lines.len(), 2);

    let response = app
        .oneshot(get("/redirects/export.csv?includeGeneratedRedirects=1"))
        .await
        .expect("response");
    let csv = String::from_utf8(body_bytes(response).await).expect("utf-8");
    assert_eq!(csv.lines().count(), 3);
}

fn multipart_request(csv: Option<&str>, delimiter: &str) -> Request<Body> {
    let mut body = String::new();
    if let Some(csv) = csv {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"csvFile\"; \
             filename=\"redirects.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"delimiter\"\r\n\r\n{delimiter}\r\n--{BOUNDARY}--\r\n"
    ));

    Request::builder()
        .uri("/redirects/import")
        .method("POST")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(ACCEPT, "application/json")
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn import_reports_protocol() {
    let (app, storage) = app_with(vec![redirect("kept", "same")], GatewaySettings::default());

    let csv = "sourceUriPath;targetUriPath;statusCode\n\
               kept;same;301\n\
               fresh;target;302\n\
               loop;loop;301";
    let response = app
        .oneshot(multipart_request(Some(csv), ";"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let types: Vec<&str> = body["protocol"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["unchanged", "created", "error"]);
    assert_eq!(body["messages"][0]["severity"], "WARNING");
    assert_eq!(storage.len(), 2);
}

#[tokio::test]
async fn import_without_file_fails() {
    let (app, _) = app();

    let response = app
        .oneshot(multipart_request(None, ","))
        .await
        .expect("response");

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["messages"][0]["title"],
        "Please choose a CSV file to import"
    );
}

#[tokio::test]
async fn unreadable_upload_is_reported_as_import_failure() {
    let (app, storage) = app();
    let truncated = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"csvFile\"; \
         filename=\"redirects.csv\"\r\n\r\nsourceUriPath,targetUriPath\nfrom,to\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/redirects/import")
                .method("POST")
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .header(ACCEPT, "application/json")
                .body(Body::from(truncated))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["protocol"], json!([]));
    assert_eq!(body["messages"][0]["severity"], "ERROR");
    assert!(body["messages"][0]["title"]
        .as_str()
        .unwrap()
        .starts_with("The uploaded file could not be accessed"));
    assert!(storage.is_empty());
}

#[tokio::test]
async fn index_highlights_search_query() {
    let (app, _) = app_with(
        vec![redirect("old/shoes", "new/shoes"), redirect("old/hats", "new/hats")],
        GatewaySettings::default(),
    );

    let response = app
        .oneshot(get("/redirects?search=SHOES"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).expect("utf-8");
    assert!(html.contains("old/<mark>shoes</mark>"));
    assert!(html.contains("new/<mark>shoes</mark>"));
    assert!(!html.contains("title=\"old/hats\""));
    assert!(html.contains("Showing 1-1 of 1"));
}
