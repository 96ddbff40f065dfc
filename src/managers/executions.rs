// Executions of a transfer and their ordered tasks.

use serde_json::{json, Value};

use super::{BaseManager, Collection, TransferKind};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::resource::{AsId, Resource};

pub(crate) fn collection(parent: &Collection, transfer_id: &str) -> Collection {
    Collection::new(
        format!("{}/executions", parent.item_path(transfer_id)),
        "execution",
        "executions",
    )
}

pub struct ExecutionManager<'a> {
    base: BaseManager<'a>,
    parent: Collection,
}

impl<'a> ExecutionManager<'a> {
    pub fn new(base: BaseManager<'a>, kind: TransferKind) -> Self {
        ExecutionManager {
            base,
            parent: kind.collection(),
        }
    }

    fn collection(&self, transfer: impl AsId) -> Result<Collection> {
        Ok(collection(&self.parent, transfer.as_id()?))
    }

    pub fn list(&self, transfer: impl AsId) -> Result<Vec<Resource>> {
        let collection = self.collection(transfer)?;
        let request = ApiRequest::new(Method::Get, collection.path.clone());
        self.base.list(&collection, request, false)
    }

    /// The loaded execution carries its ordered `tasks`.
    pub fn get(&self, transfer: impl AsId, execution: impl AsId) -> Result<Resource> {
        let collection = self.collection(transfer)?;
        self.base.get(&collection, execution.as_id()?)
    }

    pub fn create(
        &self,
        transfer: impl AsId,
        shutdown_instances: bool,
        auto_deploy: bool,
    ) -> Result<Resource> {
        let collection = self.collection(transfer)?;
        self.base.create(
            &collection,
            json!({
                "shutdown_instances": shutdown_instances,
                "auto_deploy": auto_deploy,
            }),
        )
    }

    pub fn delete(&self, transfer: impl AsId, execution: impl AsId) -> Result<()> {
        let collection = self.collection(transfer)?;
        self.base.delete(&collection, execution.as_id()?)
    }

    pub fn cancel(&self, transfer: impl AsId, execution: impl AsId, force: bool) -> Result<()> {
        let collection = self.collection(transfer)?;
        self.base.action(
            &collection,
            execution.as_id()?,
            "cancel",
            json!({ "force": force }),
        )?;
        Ok(())
    }
}

/// `tasks` of a loaded execution, in execution order.
pub fn tasks(execution: &Resource) -> &[Value] {
    execution
        .attr("tasks")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
