//! Generic service-tier gateway: one domain's CRUD calls forwarded to its
//! database tier through the resilience policy.
//!
//! Nothing here returns an error to the caller. Every failure is logged
//! and becomes `None`, `false` or an empty list.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use catalog_resilience::{InvokeError, ResilientInvoker};
use catalog_types::{Entity, Envelope};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::DownstreamClient;
use crate::error::DownstreamError;

/// Service-tier gateway for entity `E`.
#[derive(Debug)]
pub struct ServiceGateway<E> {
    client: DownstreamClient,
    invoker: Arc<ResilientInvoker>,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ServiceGateway<E> {
    /// Forward calls for `E` through `client`, guarded by `invoker`.
    pub const fn new(client: DownstreamClient, invoker: Arc<ResilientInvoker>) -> Self {
        Self {
            client,
            invoker,
            entity: PhantomData,
        }
    }

    /// The resilience policy guarding this gateway's downstream.
    pub fn invoker(&self) -> &ResilientInvoker {
        &self.invoker
    }

    /// POST a draft. Returns the new id when the database tier accepted it.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE))]
    pub async fn create(&self, draft: &E::Draft) -> Option<E::Id> {
        let body = encode(draft)?;
        let envelope = self
            .call::<Envelope<E::Id>>(&Method::POST, &[E::RESOURCE], Some(&body))
            .await
            .inspect_err(|error| log_failure("create", error))
            .ok()?;
        if envelope.id.is_none() {
            tracing::warn!("Create accepted without an id");
        }
        envelope.id
    }

    /// PUT the fields present in `patch` to the record it names.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE))]
    pub async fn update(&self, patch: &E::Patch) -> bool {
        let Some(id) = E::patch_id(patch) else {
            tracing::warn!("Update rejected: no id");
            return false;
        };
        let Some(body) = encode(patch) else {
            return false;
        };
        let id = id.to_string();
        self.call::<Envelope<E::Id>>(&Method::PUT, &[E::RESOURCE, id.as_str()], Some(&body))
            .await
            .inspect_err(|error| log_failure("update", error))
            .is_ok_and(|envelope| envelope.success)
    }

    /// DELETE record `id`.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE, id = %id))]
    pub async fn delete(&self, id: &E::Id) -> bool {
        let id = id.to_string();
        self.call::<Envelope<E::Id>>(&Method::DELETE, &[E::RESOURCE, id.as_str()], None)
            .await
            .inspect_err(|error| log_failure("delete", error))
            .is_ok_and(|envelope| envelope.success)
    }

    /// GET record `id`. A missing record and a failed call are both `None`.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE, id = %id))]
    pub async fn get_by_id(&self, id: &E::Id) -> Option<E> {
        let id = id.to_string();
        self.call::<E>(&Method::GET, &[E::RESOURCE, id.as_str()], None)
            .await
            .inspect_err(|error| log_failure("get", error))
            .ok()
    }

    /// GET every record. Empty on failure.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE))]
    pub async fn get_all(&self) -> Vec<E> {
        self.get_list(&[E::RESOURCE]).await
    }

    /// GET a record list from a sub-path of the domain. Empty on failure.
    pub(crate) async fn get_list(&self, segments: &[&str]) -> Vec<E> {
        self.call::<Vec<E>>(&Method::GET, segments, None)
            .await
            .inspect_err(|error| log_failure("list", error))
            .unwrap_or_default()
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
    ) -> Result<T, InvokeError<DownstreamError>> {
        self.invoker
            .invoke(|| self.client.request(method.clone(), segments, body))
            .await
    }
}

fn encode<T: Serialize>(payload: &T) -> Option<serde_json::Value> {
    serde_json::to_value(payload)
        .map_err(DownstreamError::from)
        .inspect_err(|error| tracing::error!(%error, "Failed to encode request body"))
        .ok()
}

fn log_failure(operation: &str, error: &impl Display) {
    tracing::warn!(operation, %error, "Downstream call failed");
}
