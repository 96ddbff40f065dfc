// Source and destination platforms registered with Coriolis, and
// resolution of user supplied endpoint names to ids.

use log::debug;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::{Error, Result};
use crate::resource::{AsId, Resource};

/// Registration data for a source or destination platform.
#[derive(Clone, Debug, Default, Serialize)]
pub struct EndpointSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub endpoint_type: String,
    pub connection_info: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mapped_regions: Vec<String>,
}

/// Result of asking the service to check an endpoint's credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionValidation {
    pub valid: bool,
    pub message: String,
}

impl ConnectionValidation {
    pub fn ensure_valid(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(Error::EndpointConnectionValidationFailed(self.message))
        }
    }
}

pub struct EndpointManager<'a> {
    base: BaseManager<'a>,
    collection: Collection,
}

impl<'a> EndpointManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        EndpointManager {
            base,
            collection: Collection::new("/endpoints", "endpoint", "endpoints"),
        }
    }

    pub fn list(&self) -> Result<Vec<Resource>> {
        self.base.list(
            &self.collection,
            ApiRequest::new(Method::Get, self.collection.path.clone()),
            true,
        )
    }

    pub fn get(&self, endpoint: impl AsId) -> Result<Resource> {
        self.base.get(&self.collection, endpoint.as_id()?)
    }

    pub fn create(&self, spec: &EndpointSpec) -> Result<Resource> {
        self.base
            .create(&self.collection, serde_json::to_value(spec)?)
    }

    /// `values` holds only the fields being changed.
    pub fn update(&self, endpoint: impl AsId, values: Value) -> Result<Resource> {
        self.base
            .update(&self.collection, endpoint.as_id()?, values)
    }

    pub fn delete(&self, endpoint: impl AsId) -> Result<()> {
        self.base.delete(&self.collection, endpoint.as_id()?)
    }

    pub fn validate_connection(&self, endpoint: impl AsId) -> Result<ConnectionValidation> {
        let id = endpoint.as_id()?;
        let body = self
            .base
            .action(&self.collection, id, "validate-connection", Value::Null)?
            .ok_or_else(|| Error::InvalidResponse("validate-connection returned no body".into()))?;
        let result = body.get("validate-connection").ok_or_else(|| {
            Error::InvalidResponse("response has no \"validate-connection\" key".into())
        })?;
        Ok(ConnectionValidation {
            valid: result.get("valid").and_then(Value::as_bool).unwrap_or(false),
            message: result
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        })
    }

    /// Resolve a user supplied endpoint reference. UUIDs are taken as IDs,
    /// anything else must match the name of exactly one endpoint.
    pub fn get_endpoint_id_for_name(&self, name_or_id: &str) -> Result<String> {
        if Uuid::parse_str(name_or_id).is_ok() {
            return Ok(name_or_id.to_owned());
        }
        let matches: Vec<String> = self
            .list()?
            .iter()
            .filter(|e| e.attr_str("name") == Some(name_or_id))
            .filter_map(|e| e.id().map(str::to_owned))
            .collect();
        debug!("endpoint name {name_or_id:?} matched {} endpoints", matches.len());
        match matches.as_slice() {
            [] => Err(Error::EndpointIdNotFound(name_or_id.to_owned())),
            [id] => Ok(id.clone()),
            _ => Err(Error::NoUniqueEndpointNameMatch(name_or_id.to_owned())),
        }
    }
}
