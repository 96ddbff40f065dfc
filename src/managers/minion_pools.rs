// Pools of worker VMs and their allocation lifecycle.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::{Error, Result};
use crate::resource::{AsId, Resource};

/// A pool of worker VMs kept on one endpoint's platform.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MinionPoolSpec {
    pub name: String,
    pub endpoint_id: String,
    /// `source` or `destination`.
    pub platform: String,
    /// `linux` or `windows`.
    pub os_type: String,
    pub environment_options: Map<String, Value>,
    pub minimum_minions: u32,
    pub maximum_minions: u32,
    /// Seconds a minion may stay idle before being reclaimed.
    pub minion_max_idle_time: u32,
    /// `delete` or `poweroff`.
    pub minion_retention_strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub skip_allocation: bool,
}

impl MinionPoolSpec {
    pub fn validate(&self) -> Result<()> {
        if !["source", "destination"].contains(&self.platform.as_str()) {
            return Err(Error::InvalidArgument(format!(
                "minion pool platform must be source or destination, got {:?}",
                self.platform
            )));
        }
        if self.minimum_minions > self.maximum_minions {
            return Err(Error::InvalidArgument(format!(
                "minimum minions ({}) exceeds maximum minions ({})",
                self.minimum_minions, self.maximum_minions
            )));
        }
        Ok(())
    }
}

pub struct MinionPoolManager<'a> {
    base: BaseManager<'a>,
    collection: Collection,
}

impl<'a> MinionPoolManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        MinionPoolManager {
            base,
            collection: Collection::new("/minion_pools", "minion_pool", "minion_pools"),
        }
    }

    pub fn list(&self) -> Result<Vec<Resource>> {
        self.base.list(
            &self.collection,
            ApiRequest::new(Method::Get, self.collection.path.clone()),
            false,
        )
    }

    pub fn get(&self, pool: impl AsId) -> Result<Resource> {
        self.base.get(&self.collection, pool.as_id()?)
    }

    pub fn create(&self, spec: &MinionPoolSpec) -> Result<Resource> {
        spec.validate()?;
        self.base
            .create(&self.collection, serde_json::to_value(spec)?)
    }

    pub fn update(&self, pool: impl AsId, values: Value) -> Result<Resource> {
        self.base.update(&self.collection, pool.as_id()?, values)
    }

    pub fn delete(&self, pool: impl AsId) -> Result<()> {
        self.base.delete(&self.collection, pool.as_id()?)
    }

    fn pool_action(&self, pool: impl AsId, action: &str, args: Value) -> Result<Resource> {
        let id = pool.as_id()?;
        let body = self.base.action(&self.collection, id, action, args)?;
        let value = body
            .and_then(|mut b| b.get_mut(self.collection.singular).map(Value::take))
            .ok_or_else(|| Error::InvalidResponse(format!("{action} returned no minion pool")))?;
        self.base.wrap(value, Some(&self.collection), false)
    }

    pub fn allocate(&self, pool: impl AsId) -> Result<Resource> {
        self.pool_action(pool, "allocate", Value::Null)
    }

    pub fn refresh(&self, pool: impl AsId) -> Result<Resource> {
        self.pool_action(pool, "refresh", Value::Null)
    }

    pub fn deallocate(&self, pool: impl AsId, force: bool) -> Result<Resource> {
        self.pool_action(pool, "deallocate", json!({ "force": force }))
    }
}
