// Per-resource managers. Each one builds requests for its collection and
// hands them to the shared `BaseManager`, which unwraps the response key
// and wraps the payload in a `Resource`.

use serde_json::{Map, Value};

use crate::api::{ApiRequest, Method, Transport};
use crate::error::{Error, Result};
use crate::resource::{Location, Resource};

pub mod deployments;
pub mod diagnostics;
pub mod endpoint_resources;
pub mod endpoints;
pub mod executions;
pub mod minion_pools;
pub mod providers;
pub mod regions;
pub mod schedules;
pub mod services;
pub mod transfers;

pub use deployments::{DeploymentKind, DeploymentManager, DeploymentSpec};
pub use diagnostics::DiagnosticManager;
pub use endpoint_resources::{
    EndpointInstanceManager, EndpointNetworkManager, EndpointOptionsManager, EndpointStorageManager,
    OptionsKind,
};
pub use endpoints::{ConnectionValidation, EndpointManager, EndpointSpec};
pub use executions::{tasks, ExecutionManager};
pub use minion_pools::{MinionPoolManager, MinionPoolSpec};
pub use providers::ProviderManager;
pub use regions::RegionManager;
pub use schedules::{ScheduleManager, ScheduleSpec, ScheduleUpdate};
pub use services::ServiceManager;
pub use transfers::{TransferKind, TransferManager, TransferSpec};

/// A REST collection: its path and the keys wrapping one or many items.
#[derive(Clone, Debug)]
pub(crate) struct Collection {
    pub path: String,
    pub singular: &'static str,
    pub plural: &'static str,
}

impl Collection {
    pub fn new(path: impl Into<String>, singular: &'static str, plural: &'static str) -> Self {
        Collection {
            path: path.into(),
            singular,
            plural,
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    pub fn actions_path(&self, id: &str) -> String {
        format!("{}/{}/actions", self.path, id)
    }

    fn location(&self, id: &str) -> Location {
        Location {
            path: self.item_path(id),
            key: self.singular.to_owned(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct BaseManager<'a> {
    transport: &'a dyn Transport,
}

impl<'a> BaseManager<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        BaseManager { transport }
    }

    pub fn transport(&self) -> &'a dyn Transport {
        self.transport
    }

    pub fn send(&self, request: &ApiRequest) -> Result<Option<Value>> {
        self.transport.send(request)
    }

    /// Send `request` and return the value under `key` in the response.
    pub fn send_for_key(&self, request: &ApiRequest, key: &str) -> Result<Value> {
        let body = self.send(request)?.ok_or_else(|| {
            Error::InvalidResponse(format!(
                "{} {} returned no body",
                request.method, request.path
            ))
        })?;
        take_key(body, key).ok_or_else(|| {
            Error::InvalidResponse(format!(
                "{} {} response has no {key:?} key",
                request.method, request.path
            ))
        })
    }

    pub(crate) fn wrap(
        &self,
        value: Value,
        collection: Option<&Collection>,
        loaded: bool,
    ) -> Result<Resource> {
        let res = Resource::from_value(value)?;
        match (collection, res.id().map(str::to_owned)) {
            (Some(c), Some(id)) => Ok(res.located(c.location(&id), loaded)),
            _ => Ok(res),
        }
    }

    pub(crate) fn wrap_list(
        &self,
        value: Value,
        collection: Option<&Collection>,
        loaded: bool,
    ) -> Result<Vec<Resource>> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|v| self.wrap(v, collection, loaded))
                .collect(),
            other => Err(Error::InvalidResponse(format!(
                "expected a list, got {other}"
            ))),
        }
    }

    pub(crate) fn list(
        &self,
        collection: &Collection,
        request: ApiRequest,
        loaded: bool,
    ) -> Result<Vec<Resource>> {
        let value = self.send_for_key(&request, collection.plural)?;
        self.wrap_list(value, Some(collection), loaded)
    }

    pub(crate) fn get(&self, collection: &Collection, id: &str) -> Result<Resource> {
        let request = ApiRequest::new(Method::Get, collection.item_path(id));
        let value = self.send_for_key(&request, collection.singular)?;
        self.wrap(value, Some(collection), true)
    }

    /// POST `{singular: body}` to the collection.
    pub(crate) fn create(&self, collection: &Collection, body: Value) -> Result<Resource> {
        let request =
            ApiRequest::new(Method::Post, collection.path.clone()).body(envelope(collection.singular, body));
        let value = self.send_for_key(&request, collection.singular)?;
        self.wrap(value, Some(collection), false)
    }

    /// PUT `{singular: body}` to one item.
    pub(crate) fn update(&self, collection: &Collection, id: &str, body: Value) -> Result<Resource> {
        let request = ApiRequest::new(Method::Put, collection.item_path(id))
            .body(envelope(collection.singular, body));
        let value = self.send_for_key(&request, collection.singular)?;
        self.wrap(value, Some(collection), false)
    }

    pub(crate) fn delete(&self, collection: &Collection, id: &str) -> Result<()> {
        self.send(&ApiRequest::new(Method::Delete, collection.item_path(id)))?;
        Ok(())
    }

    /// POST an action envelope such as `{"cancel": {"force": true}}`.
    pub(crate) fn action(
        &self,
        collection: &Collection,
        id: &str,
        action: &str,
        args: Value,
    ) -> Result<Option<Value>> {
        let request = ApiRequest::new(Method::Post, collection.actions_path(id))
            .body(envelope(action, args));
        self.send(&request)
    }
}

pub(crate) fn envelope(key: &str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_owned(), inner);
    Value::Object(map)
}

fn take_key(body: Value, key: &str) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove(key),
        _ => None,
    }
}

/// Insert `value` under `key` unless it is `None`.
pub(crate) fn insert_opt<T: serde::Serialize>(
    map: &mut Map<String, Value>,
    key: &str,
    value: Option<T>,
) -> Result<()> {
    if let Some(v) = value {
        map.insert(key.to_owned(), serde_json::to_value(v)?);
    }
    Ok(())
}
