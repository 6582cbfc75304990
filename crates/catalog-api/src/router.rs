//! Axum routers for both tiers.
//!
//! [`crud_router`] mounts the five CRUD routes for one entity over any
//! [`Gateway`]. The tier builders merge one such router per domain, add
//! the weapon-type listing, and wrap everything in [`with_middleware`].

use std::any::Any;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use catalog_types::{Entity, Envelope, Weapon};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::gateway::{Gateway, WeaponTypes};
use crate::tiers::{DatabaseTier, ServiceTier};

/// Build the complete database-tier router.
pub fn build_database_router(tier: DatabaseTier) -> Router {
    let router = Router::new()
        .merge(crud_router(tier.weapons.clone()))
        .merge(weapon_type_router(tier.weapons))
        .merge(crud_router(tier.armour))
        .merge(crud_router(tier.jewellery))
        .merge(crud_router(tier.effects))
        .merge(crud_router(tier.feats))
        .merge(crud_router(tier.attacks))
        .merge(crud_router(tier.creatures));
    with_middleware(router)
}

/// Build the complete service-tier router.
pub fn build_service_router(tier: ServiceTier) -> Router {
    let router = Router::new()
        .merge(crud_router(tier.weapons.clone()))
        .merge(weapon_type_router(tier.weapons))
        .merge(crud_router(tier.armour))
        .merge(crud_router(tier.jewellery))
        .merge(crud_router(tier.effects))
        .merge(crud_router(tier.feats))
        .merge(crud_router(tier.attacks))
        .merge(crud_router(tier.creatures));
    with_middleware(router)
}

/// CRUD routes for entity `E`:
///
/// - `POST /{Entity}` -- create
/// - `PUT /{Entity}` and `PUT /{Entity}/{id}` -- partial update
/// - `DELETE /{Entity}/{id}` -- delete
/// - `GET /{Entity}/{id}` -- one record
/// - `GET /{Entity}` -- every record
pub fn crud_router<E, G>(gateway: Arc<G>) -> Router
where
    E: Entity,
    G: Gateway<E>,
{
    let collection = format!("/{}", E::RESOURCE);
    let member = format!("/{}/{{id}}", E::RESOURCE);

    Router::new()
        .route(
            &collection,
            get(list::<E, G>).post(create::<E, G>).put(update::<E, G>),
        )
        .route(
            &member,
            get(fetch::<E, G>)
                .put(update_at::<E, G>)
                .delete(remove::<E, G>),
        )
        .with_state(gateway)
}

/// `GET /Weapon/type/{type}` over any [`WeaponTypes`] implementation.
pub fn weapon_type_router<G: WeaponTypes>(gateway: Arc<G>) -> Router {
    Router::new()
        .route(
            &format!("/{}/type/{{weapon_type}}", Weapon::RESOURCE),
            get(list_by_type::<G>),
        )
        .with_state(gateway)
}

/// Wrap a router in the shared middleware stack: panics become a 500
/// envelope, CORS is open, and every request is traced.
pub fn with_middleware(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[allow(clippy::needless_pass_by_value)] // signature fixed by `CatchPanicLayer`
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    ApiError::Internal(String::from("Internal server error")).into_response()
}

fn parse_id<E: Entity>(raw: Result<Path<String>, PathRejection>) -> Result<E::Id, ApiError> {
    let Path(raw) = raw?;
    raw.parse::<E::Id>()
        .ok()
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {} id", E::RESOURCE)))
}

async fn create<E: Entity, G: Gateway<E>>(
    State(gateway): State<Arc<G>>,
    body: Result<Json<E::Draft>, JsonRejection>,
) -> Result<Json<Envelope<E::Id>>, ApiError> {
    let Json(draft) = body?;
    match gateway.create(&draft).await {
        Some(id) => Ok(Json(
            Envelope::ok(format!("{} created", E::RESOURCE)).with_id(id),
        )),
        None => Err(ApiError::BadRequest(format!(
            "Failed to create {}",
            E::RESOURCE
        ))),
    }
}

async fn update<E: Entity, G: Gateway<E>>(
    State(gateway): State<Arc<G>>,
    body: Result<Json<E::Patch>, JsonRejection>,
) -> Result<Json<Envelope<E::Id>>, ApiError> {
    let Json(patch) = body?;
    apply_update(gateway.as_ref(), &patch).await
}

async fn update_at<E: Entity, G: Gateway<E>>(
    State(gateway): State<Arc<G>>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<E::Patch>, JsonRejection>,
) -> Result<Json<Envelope<E::Id>>, ApiError> {
    let id = parse_id::<E>(id)?;
    let Json(mut patch) = body?;
    E::set_patch_id(&mut patch, id);
    apply_update(gateway.as_ref(), &patch).await
}

async fn apply_update<E: Entity, G: Gateway<E>>(
    gateway: &G,
    patch: &E::Patch,
) -> Result<Json<Envelope<E::Id>>, ApiError> {
    if gateway.update(patch).await {
        Ok(Json(Envelope::ok(format!("{} updated", E::RESOURCE))))
    } else {
        Err(ApiError::BadRequest(format!(
            "Failed to update {}",
            E::RESOURCE
        )))
    }
}

async fn remove<E: Entity, G: Gateway<E>>(
    State(gateway): State<Arc<G>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<E::Id>>, ApiError> {
    let id = parse_id::<E>(id)?;
    if gateway.delete(&id).await {
        Ok(Json(Envelope::ok(format!("{} deleted", E::RESOURCE))))
    } else {
        Err(ApiError::BadRequest(format!(
            "Failed to delete {}",
            E::RESOURCE
        )))
    }
}

async fn fetch<E: Entity, G: Gateway<E>>(
    State(gateway): State<Arc<G>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<E>, ApiError> {
    let id = parse_id::<E>(id)?;
    gateway
        .get_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", E::RESOURCE)))
}

async fn list<E: Entity, G: Gateway<E>>(
    State(gateway): State<Arc<G>>,
) -> Result<Json<Vec<E>>, ApiError> {
    gateway
        .get_all()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::Internal(format!("Failed to list {}", E::RESOURCE)))
}

async fn list_by_type<G: WeaponTypes>(
    State(gateway): State<Arc<G>>,
    weapon_type: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Weapon>>, ApiError> {
    let Path(weapon_type) = weapon_type?;
    gateway
        .get_by_type(&weapon_type)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::Internal(String::from("Failed to list Weapon")))
}
