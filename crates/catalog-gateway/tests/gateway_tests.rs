//! Service gateway tests against stub database-tier servers.
//!
//! Each stub is a small axum router served on an ephemeral local port.
//! Policies use millisecond backoff so retries finish quickly on the real
//! clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog_gateway::{DownstreamClient, ServiceGateway, WeaponGateway};
use catalog_resilience::{CircuitBreakerConfig, CircuitState, ResiliencePolicy, ResilientInvoker, RetryPolicy};
use catalog_types::{Effect, EffectDraft, EffectPatch, Envelope, Weapon};
use serde_json::{Value, json};

type Hits = Arc<AtomicU32>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

fn policy(max_retries: u32) -> ResiliencePolicy {
    ResiliencePolicy {
        retry: RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        },
        breaker: CircuitBreakerConfig::default(),
        attempt_timeout: Some(Duration::from_secs(5)),
    }
}

fn gateway<E: catalog_types::Entity>(base: &str, max_retries: u32) -> ServiceGateway<E> {
    let client = DownstreamClient::new(base, Duration::from_secs(5)).unwrap();
    let invoker = Arc::new(ResilientInvoker::new(base, &policy(max_retries)));
    ServiceGateway::new(client, invoker)
}

fn weapon_json(id: i32, name: &str, effect_id: Option<i32>) -> Value {
    json!({
        "Id": id,
        "Name": name,
        "Slot": "MainHand",
        "Type": "Melee",
        "MinDamage": 1,
        "MaxDamage": 5,
        "EffectId": effect_id,
    })
}

async fn count(State(hits): State<Hits>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

#[tokio::test]
async fn create_posts_the_draft_and_returns_the_new_id() {
    let router = Router::new().route(
        "/Effect",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["Name"], "Burn");
            Json(Envelope::ok("Effect created").with_id(7))
        }),
    );
    let base = serve(router).await;
    let effects = gateway::<Effect>(&base, 0);

    let id = effects
        .create(&EffectDraft {
            name: String::from("Burn"),
            description: String::from("Fire damage"),
        })
        .await;

    assert_eq!(id, Some(7));
}

#[tokio::test]
async fn update_forwards_only_present_fields_to_the_id_path() {
    let router = Router::new().route(
        "/Effect/{id}",
        axum::routing::put(|Path(id): Path<i32>, Json(body): Json<Value>| async move {
            assert_eq!(id, 3);
            assert_eq!(body, json!({"Id": 3, "Description": "Hotter"}));
            Json(Envelope::<i32>::ok("Effect updated"))
        }),
    );
    let base = serve(router).await;
    let effects = gateway::<Effect>(&base, 0);

    let patch = EffectPatch {
        id: Some(3),
        description: Some(String::from("Hotter")),
        ..EffectPatch::default()
    };
    assert!(effects.update(&patch).await);
}

#[tokio::test]
async fn update_without_id_never_calls_downstream() {
    let hits = Hits::default();
    let router = Router::new()
        .fallback(count)
        .with_state(Arc::clone(&hits));
    let base = serve(router).await;
    let effects = gateway::<Effect>(&base, 0);

    assert!(!effects.update(&EffectPatch::default()).await);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failing_list_is_retried_then_reported_empty() {
    let hits = Hits::default();
    let router = Router::new()
        .route("/Effect", get(count))
        .with_state(Arc::clone(&hits));
    let base = serve(router).await;
    let effects = gateway::<Effect>(&base, 2);

    assert!(effects.get_all().await.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn fourth_call_fails_fast_without_network_io() {
    let hits = Hits::default();
    let router = Router::new()
        .route("/Effect/{id}", get(count))
        .with_state(Arc::clone(&hits));
    let base = serve(router).await;
    let effects = gateway::<Effect>(&base, 0);

    for id in 1..=3 {
        assert!(effects.get_by_id(&id).await.is_none());
    }
    assert_eq!(effects.invoker().breaker().state(), CircuitState::Open);

    assert!(effects.get_by_id(&4).await.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unreachable_downstream_counts_as_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let effects = gateway::<Effect>(&base, 0);

    assert!(effects.get_all().await.is_empty());
    assert_eq!(effects.invoker().breaker().consecutive_failures(), 1);
}

#[tokio::test]
async fn enrichment_keeps_every_weapon_when_an_effect_is_missing() {
    let effect_hits = Hits::default();
    let effects_router = Router::new()
        .route(
            "/Effect/{id}",
            get(|State(hits): State<Hits>, Path(id): Path<i32>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                if id == 3 {
                    Ok(Json(json!({"Id": 3, "Name": "Frost", "Description": "Slows"})))
                } else {
                    Err(StatusCode::NOT_FOUND)
                }
            }),
        )
        .with_state(Arc::clone(&effect_hits));
    let weapons_router = Router::new().route(
        "/Weapon",
        get(|| async {
            Json(json!([
                weapon_json(1, "Sword", Some(7)),
                weapon_json(2, "Axe", Some(3)),
                weapon_json(3, "Club", None),
                weapon_json(4, "Mace", Some(3)),
            ]))
        }),
    );
    let weapons = WeaponGateway::new(
        gateway::<Weapon>(&serve(weapons_router).await, 0),
        gateway::<Effect>(&serve(effects_router).await, 0),
    );

    let listed = weapons.get_all().await;

    let summary: Vec<(&str, Option<&str>)> = listed
        .iter()
        .map(|w| (w.name.as_str(), w.effect.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Sword", Some("")),
            ("Axe", Some("Frost")),
            ("Club", None),
            ("Mace", Some("Frost")),
        ]
    );
    // One lookup per distinct effect id.
    assert_eq!(effect_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn weapon_type_listing_uses_the_type_path() {
    let router = Router::new().route(
        "/Weapon/type/{kind}",
        get(|Path(kind): Path<String>| async move {
            assert_eq!(kind, "Two Handed");
            Json(json!([weapon_json(5, "Greatsword", None)]))
        }),
    );
    let effects_base = serve(Router::new()).await;
    let weapons = WeaponGateway::new(
        gateway::<Weapon>(&serve(router).await, 0),
        gateway::<Effect>(&effects_base, 0),
    );

    let listed = weapons.get_by_type("Two Handed").await;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Greatsword");
    assert_eq!(listed[0].effect, None);
}
