// Read-only views the service computes on the fly from an endpoint's
// platform: instances, networks, storage backends and provider options.
// Environments are passed as base64 encoded JSON query parameters.

use serde_json::Value;

use super::{BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::params::{encode_base64_param, encode_base64_str};
use crate::resource::{AsId, Resource};

fn with_env(mut request: ApiRequest, env: Option<&Value>) -> Result<ApiRequest> {
    if let Some(env) = env {
        request = request.query("env", encode_base64_param(env)?);
    }
    Ok(request)
}

pub struct EndpointInstanceManager<'a> {
    base: BaseManager<'a>,
}

impl<'a> EndpointInstanceManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        EndpointInstanceManager { base }
    }

    fn collection(endpoint_id: &str) -> Collection {
        Collection::new(format!("/endpoints/{endpoint_id}/instances"), "instance", "instances")
    }

    pub fn list(
        &self,
        endpoint: impl AsId,
        env: Option<&Value>,
        marker: Option<&str>,
        limit: Option<u32>,
        name: Option<&str>,
    ) -> Result<Vec<Resource>> {
        let collection = Self::collection(endpoint.as_id()?);
        let mut request = with_env(ApiRequest::new(Method::Get, collection.path.clone()), env)?;
        if let Some(marker) = marker {
            request = request.query("marker", marker);
        }
        if let Some(limit) = limit {
            request = request.query("limit", limit.to_string());
        }
        if let Some(name) = name {
            request = request.query("name", name);
        }
        // Instances are addressed by encoded name, so list items carry no
        // reload location.
        let value = self.base.send_for_key(&request, collection.plural)?;
        self.base.wrap_list(value, None, true)
    }

    /// Instance names may hold any character, so they are base64url encoded
    /// into the path.
    pub fn get(
        &self,
        endpoint: impl AsId,
        instance_name: &str,
        env: Option<&Value>,
    ) -> Result<Resource> {
        let collection = Self::collection(endpoint.as_id()?);
        let path = collection.item_path(&encode_base64_str(instance_name));
        let request = with_env(ApiRequest::new(Method::Get, path), env)?;
        let value = self.base.send_for_key(&request, collection.singular)?;
        self.base.wrap(value, None, true)
    }
}

pub struct EndpointNetworkManager<'a> {
    base: BaseManager<'a>,
}

impl<'a> EndpointNetworkManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        EndpointNetworkManager { base }
    }

    pub fn list(&self, endpoint: impl AsId, env: Option<&Value>) -> Result<Vec<Resource>> {
        let path = format!("/endpoints/{}/networks", endpoint.as_id()?);
        let request = with_env(ApiRequest::new(Method::Get, path), env)?;
        let value = self.base.send_for_key(&request, "networks")?;
        self.base.wrap_list(value, None, true)
    }
}

pub struct EndpointStorageManager<'a> {
    base: BaseManager<'a>,
}

impl<'a> EndpointStorageManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        EndpointStorageManager { base }
    }

    /// Returns the storage description: `storage_backends` plus the
    /// platform's `config_default`, when it has one.
    pub fn list(&self, endpoint: impl AsId, env: Option<&Value>) -> Result<Resource> {
        let path = format!("/endpoints/{}/storage", endpoint.as_id()?);
        let request = with_env(ApiRequest::new(Method::Get, path), env)?;
        let value = self.base.send_for_key(&request, "storage")?;
        self.base.wrap(value, None, true)
    }
}

/// The four option sets an endpoint's provider can describe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionsKind {
    Source,
    Destination,
    SourceMinionPool,
    DestinationMinionPool,
}

impl OptionsKind {
    fn path_segment(self) -> &'static str {
        match self {
            OptionsKind::Source => "source-options",
            OptionsKind::Destination => "destination-options",
            OptionsKind::SourceMinionPool => "source-minion-pool-options",
            OptionsKind::DestinationMinionPool => "destination-minion-pool-options",
        }
    }

    fn response_key(self) -> &'static str {
        match self {
            OptionsKind::Source => "source_options",
            OptionsKind::Destination => "destination_options",
            OptionsKind::SourceMinionPool => "source_minion_pool_options",
            OptionsKind::DestinationMinionPool => "destination_minion_pool_options",
        }
    }
}

pub struct EndpointOptionsManager<'a> {
    base: BaseManager<'a>,
    kind: OptionsKind,
}

impl<'a> EndpointOptionsManager<'a> {
    pub fn new(base: BaseManager<'a>, kind: OptionsKind) -> Self {
        EndpointOptionsManager { base, kind }
    }

    /// List the possible values of each option. `option_names` restricts
    /// the listing to the named options.
    pub fn list(
        &self,
        endpoint: impl AsId,
        env: Option<&Value>,
        option_names: &[&str],
    ) -> Result<Vec<Resource>> {
        let path = format!("/endpoints/{}/{}", endpoint.as_id()?, self.kind.path_segment());
        let mut request = with_env(ApiRequest::new(Method::Get, path), env)?;
        if !option_names.is_empty() {
            let names = Value::from(option_names.to_vec());
            request = request.query("options", encode_base64_param(&names)?);
        }
        let value = self.base.send_for_key(&request, self.kind.response_key())?;
        self.base.wrap_list(value, None, true)
    }
}
