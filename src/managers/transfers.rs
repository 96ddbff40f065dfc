// Transfers (replicas on older services): what to copy, from which
// endpoint to which, and how to map networks and storage.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::mappings::{StorageMappings, UserScripts};
use crate::resource::{AsId, Resource};

/// Transfers replaced replicas in newer API versions; both collections
/// share one request shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferKind {
    #[default]
    Transfer,
    Replica,
}

impl TransferKind {
    pub(crate) fn collection(self) -> Collection {
        match self {
            TransferKind::Transfer => Collection::new("/transfers", "transfer", "transfers"),
            TransferKind::Replica => Collection::new("/replicas", "replica", "replicas"),
        }
    }
}

/// Everything needed to define a transfer between two endpoints.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TransferSpec {
    pub origin_endpoint_id: String,
    pub destination_endpoint_id: String,
    pub instances: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub source_environment: Map<String, Value>,
    pub destination_environment: Map<String, Value>,
    pub network_map: Map<String, Value>,
    pub storage_mappings: StorageMappings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_minion_pool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_minion_pool_id: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub instance_osmorphing_minion_pool_mappings: Map<String, Value>,
    #[serde(skip_serializing_if = "UserScripts::is_empty")]
    pub user_scripts: UserScripts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_disks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_os_morphing: Option<bool>,
}

pub struct TransferManager<'a> {
    base: BaseManager<'a>,
    kind: TransferKind,
    collection: Collection,
}

impl<'a> TransferManager<'a> {
    pub fn new(base: BaseManager<'a>, kind: TransferKind) -> Self {
        TransferManager {
            base,
            kind,
            collection: kind.collection(),
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// Without `detail` the service omits executions and environments, so
    /// those resources reload on first access to such keys.
    pub fn list(&self, detail: bool) -> Result<Vec<Resource>> {
        let path = if detail {
            format!("{}/detail", self.collection.path)
        } else {
            self.collection.path.clone()
        };
        self.base
            .list(&self.collection, ApiRequest::new(Method::Get, path), detail)
    }

    pub fn get(&self, transfer: impl AsId) -> Result<Resource> {
        self.base.get(&self.collection, transfer.as_id()?)
    }

    pub fn create(&self, spec: &TransferSpec) -> Result<Resource> {
        self.base
            .create(&self.collection, serde_json::to_value(spec)?)
    }

    /// Updates run as an execution on the service; the returned resource is
    /// that execution.
    pub fn update(&self, transfer: impl AsId, values: Value) -> Result<Resource> {
        let id = transfer.as_id()?;
        let request = ApiRequest::new(Method::Put, self.collection.item_path(id))
            .body(super::envelope(self.collection.singular, values));
        let value = self.base.send_for_key(&request, "execution")?;
        let executions = super::executions::collection(&self.collection, id);
        self.base.wrap(value, Some(&executions), false)
    }

    pub fn delete(&self, transfer: impl AsId) -> Result<()> {
        self.base.delete(&self.collection, transfer.as_id()?)
    }

    /// Remove the replicated disks on the destination; returns the
    /// execution doing so.
    pub fn delete_disks(&self, transfer: impl AsId) -> Result<Resource> {
        let id = transfer.as_id()?;
        let body = self
            .base
            .action(&self.collection, id, "delete-disks", Value::Null)?;
        let value = body
            .and_then(|mut b| b.get_mut("execution").map(Value::take))
            .ok_or_else(|| {
                crate::error::Error::InvalidResponse("delete-disks returned no execution".into())
            })?;
        let executions = super::executions::collection(&self.collection, id);
        self.base.wrap(value, Some(&executions), false)
    }
}
