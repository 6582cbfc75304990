//! End-to-end tests across both tiers.
//!
//! The database tier is served on an ephemeral local port. The service
//! tier is served too, because weapon enrichment calls back into its own
//! effect routes; requests under test are sent to it via `oneshot`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog_api::{
    DatabaseTier, DomainUrls, ServiceTier, ServiceTierConfig, build_database_router,
    build_service_router,
};
use catalog_resilience::{CircuitBreakerConfig, ResiliencePolicy, RetryPolicy};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

fn policy() -> ResiliencePolicy {
    ResiliencePolicy {
        retry: RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
        },
        breaker: CircuitBreakerConfig {
            failure_threshold: 50,
            ..CircuitBreakerConfig::default()
        },
        attempt_timeout: Some(Duration::from_secs(5)),
    }
}

fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
}

async fn local_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// A service-tier router in front of `database_url`.
async fn service_tier(database_url: &str) -> Router {
    let (listener, service_url) = local_listener().await;
    let config = ServiceTierConfig {
        database_urls: DomainUrls::uniform(database_url),
        effect_service_url: service_url,
        request_timeout: Duration::from_secs(5),
        policy: policy(),
    };
    let router = build_service_router(ServiceTier::connect(&config).unwrap());
    spawn(listener, router.clone());
    router
}

/// Both tiers over a fresh in-memory database tier.
async fn both_tiers() -> Router {
    let (listener, database_url) = local_listener().await;
    spawn(listener, build_database_router(DatabaseTier::memory()));
    service_tier(&database_url).await
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn weapon(name: &str, effect_id: Option<i64>) -> Value {
    json!({
        "Name": name,
        "Slot": "MainHand",
        "Type": "Melee",
        "MinDamage": 1,
        "MaxDamage": 5,
        "EffectId": effect_id,
    })
}

#[tokio::test]
async fn post_weapon_then_get_through_the_service_tier() {
    let app = both_tiers().await;

    let (status, body) = send(&app, "POST", "/Weapon", Some(weapon("Sword", None))).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["Id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/Weapon/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Name"], "Sword");
    assert_eq!(body["Effect"], Value::Null);
}

#[tokio::test]
async fn weapons_are_enriched_with_effect_names() {
    let app = both_tiers().await;

    let (_, body) = send(
        &app,
        "POST",
        "/Effect",
        Some(json!({"Name": "Burn", "Description": "Fire damage over time"})),
    )
    .await;
    let burn = body["Id"].as_i64().unwrap();

    send(&app, "POST", "/Weapon", Some(weapon("Flame Sword", Some(burn)))).await;
    send(&app, "POST", "/Weapon", Some(weapon("Cursed Axe", Some(99)))).await;
    send(&app, "POST", "/Weapon", Some(weapon("Club", None))).await;

    let (status, body) = send(&app, "GET", "/Weapon", None).await;
    assert_eq!(status, StatusCode::OK);
    let summary: Vec<(Value, Value)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|w| (w["Name"].clone(), w["Effect"].clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (json!("Flame Sword"), json!("Burn")),
            (json!("Cursed Axe"), json!("")),
            (json!("Club"), Value::Null),
        ]
    );

    let (_, body) = send(&app, "GET", "/Weapon/type/Melee", None).await;
    assert_eq!(body[0]["Effect"], "Burn");
}

#[tokio::test]
async fn update_and_delete_propagate_to_the_database_tier() {
    let app = both_tiers().await;
    let (_, body) = send(
        &app,
        "POST",
        "/Attack",
        Some(json!({"Name": "Bite", "Damage": 4, "WeaponRequirement": "None"})),
    )
    .await;
    let id = body["Id"].as_i64().unwrap();
    let path = format!("/Attack/{id}");

    let (status, _) = send(&app, "PUT", &path, Some(json!({"Damage": 6}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", &path, None).await;
    assert_eq!(body["Damage"], 6);
    assert_eq!(body["Name"], "Bite");

    let (status, _) = send(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Success"], false);
}

#[tokio::test]
async fn unreachable_database_tier_degrades_to_failure_responses() {
    let (listener, dead_url) = local_listener().await;
    drop(listener);
    let app = service_tier(&dead_url).await;

    let (status, body) = send(&app, "GET", "/Feat", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(&app, "GET", "/Feat/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/Feat",
        Some(json!({"Name": "Alert", "Description": "+5 initiative"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"Success": false, "Message": "Failed to create Feat"}));
}
