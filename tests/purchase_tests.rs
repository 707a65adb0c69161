use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use iot_sim_ops::config::Config;
use iot_sim_ops::db::Store;
use serde_json::{Value, json};
use tower::ServiceExt;

const ACTIVE_SIM: &str = "89860000000000000001";
const SUSPENDED_SIM: &str = "89860000000000000002";
const OTHER_USERS_SIM: &str = "89860000000000000004";

async fn spawn_app() -> (Router, Store) {
    let path = std::env::temp_dir().join(format!("iot-sim-ops-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", path.display());

    let state = iot_sim_ops::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let store = state.store().clone();
    (iot_sim_ops::api::router(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn login(app: &Router) -> String {
    login_as(app, "demo", "demo-pw").await
}

async fn login_as(app: &Router, username: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap();
    let (_, body) = send(app, request).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

fn purchase_request(iccid: &str, token: &str, transid: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/sims/{iccid}/purchase"))
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"));
    if let Some(transid) = transid {
        builder = builder.header("X-TransId", transid);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn package(package_mb: i64) -> Value {
    json!({
        "month": "2025-09",
        "package_mb": package_mb,
        "product_id": "PKG-500",
        "pay_amount_cent": 990
    })
}

#[tokio::test]
async fn test_purchase_is_idempotent() {
    let (app, store) = spawn_app().await;
    let token = login(&app).await;

    let (status, first) = send(
        &app,
        purchase_request(ACTIVE_SIM, &token, Some("T1"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["code"], "0");
    assert_eq!(first["trace"]["transid"], "T1");
    assert_eq!(first["data"]["transid"], "T1");
    assert_eq!(first["data"]["package_mb"], 500);
    assert_eq!(first["data"]["status"], "SUCCESS");
    assert!(first["data"]["order_id"].as_str().unwrap().starts_with("PO"));

    let (status, second) = send(
        &app,
        purchase_request(ACTIVE_SIM, &token, Some("T1"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"], second["data"]);

    assert_eq!(store.count_purchases_by_transid("T1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicates_store_one_order() {
    let (app, store) = spawn_app().await;
    let token = login(&app).await;

    let requests = (0..8).map(|_| {
        send(
            &app,
            purchase_request(ACTIVE_SIM, &token, Some("T-race"), &package(500)),
        )
    });
    let results = futures::future::join_all(requests).await;

    let order_ids: Vec<&Value> = results
        .iter()
        .map(|(status, body)| {
            assert_eq!(*status, StatusCode::OK, "{body}");
            &body["data"]["order_id"]
        })
        .collect();
    assert!(order_ids.iter().all(|id| *id == order_ids[0]));

    assert_eq!(store.count_purchases_by_transid("T-race").await.unwrap(), 1);
}

#[tokio::test]
async fn test_purchase_without_transid_generates_one() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(purchase_request(ACTIVE_SIM, &token, None, &package(100)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let header = response.headers()["x-transid"].to_str().unwrap().to_string();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    let transid = body["data"]["transid"].as_str().unwrap();

    assert!(transid.starts_with("TX"));
    assert_eq!(body["trace"]["transid"], transid);
    assert_eq!(header, transid);
}

#[tokio::test]
async fn test_purchase_validation() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        purchase_request(ACTIVE_SIM, &token, Some("T-zero"), &package(0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_INVALID_ARGUMENT");

    let bad_month = json!({ "month": "Sept", "package_mb": 100 });
    let (status, _) = send(
        &app,
        purchase_request(ACTIVE_SIM, &token, Some("T-month"), &bad_month),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing_fields = json!({ "package_mb": 100 });
    let (status, body) = send(
        &app,
        purchase_request(ACTIVE_SIM, &token, Some("T-fields"), &missing_fields),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_purchase_on_foreign_sim_is_not_found() {
    let (app, store) = spawn_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        purchase_request(OTHER_USERS_SIM, &token, Some("T-foreign"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E_NOT_FOUND");
    assert_eq!(store.count_purchases_by_transid("T-foreign").await.unwrap(), 0);
}

#[tokio::test]
async fn test_transid_reuse_across_sims_is_rejected() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        purchase_request(ACTIVE_SIM, &token, Some("T-shared"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        purchase_request(SUSPENDED_SIM, &token, Some("T-shared"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_TRANSID_REUSED");
}

#[tokio::test]
async fn test_transid_held_by_another_user_reveals_nothing() {
    let (app, _) = spawn_app().await;
    let other = login_as(&app, "other", "other-pw").await;
    let demo = login(&app).await;

    let (status, _) = send(
        &app,
        purchase_request(OTHER_USERS_SIM, &other, Some("T-taken"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        purchase_request(ACTIVE_SIM, &demo, Some("T-taken"), &package(500)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_TRANSID_REUSED");
    assert!(body["data"].is_null());
    assert!(!body.to_string().contains(OTHER_USERS_SIM));
}

#[tokio::test]
async fn test_purchases_feed_usage_and_listing() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    for (transid, mb) in [("T-a", 500), ("T-b", 200), ("T-c", 100)] {
        let (status, _) = send(
            &app,
            purchase_request(ACTIVE_SIM, &token, Some(transid), &package(mb)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let get = |uri: String| {
        Request::builder()
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let (status, usage) = send(
        &app,
        get(format!("/sims/{ACTIVE_SIM}/usage?month=2025-09")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usage["data"]["effective_total_mb"], 1024 + 800);
    assert_eq!(usage["data"]["remain_mb"], 1024 + 800 - 300);

    let (status, page) = send(
        &app,
        get(format!("/sims/{ACTIVE_SIM}/purchases?month=2025-09&limit=2")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["limit"], 2);
    assert_eq!(page["data"]["offset"], 0);
    let items = page["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["transid"], "T-c");

    let (status, page) = send(
        &app,
        get(format!("/sims/{ACTIVE_SIM}/purchases?offset=2")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["items"][0]["transid"], "T-a");

    let (status, body) = send(
        &app,
        get(format!("/sims/{ACTIVE_SIM}/purchases?limit=101")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_INVALID_ARGUMENT");

    let (status, _) = send(
        &app,
        get(format!("/sims/{ACTIVE_SIM}/purchases?limit=abc")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
