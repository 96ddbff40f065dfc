// Registered Coriolis services.

use serde_json::{json, Value};

use super::{BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::resource::{AsId, Resource};

/// Coriolis worker services (conductor, worker, scheduler, ...) and the
/// regions they serve.
pub struct ServiceManager<'a> {
    base: BaseManager<'a>,
    collection: Collection,
}

impl<'a> ServiceManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        ServiceManager {
            base,
            collection: Collection::new("/services", "service", "services"),
        }
    }

    pub fn list(&self) -> Result<Vec<Resource>> {
        self.base.list(
            &self.collection,
            ApiRequest::new(Method::Get, self.collection.path.clone()),
            true,
        )
    }

    pub fn get(&self, service: impl AsId) -> Result<Resource> {
        self.base.get(&self.collection, service.as_id()?)
    }

    pub fn create(
        &self,
        host: &str,
        binary: &str,
        topic: &str,
        mapped_regions: &[String],
        enabled: bool,
    ) -> Result<Resource> {
        self.base.create(
            &self.collection,
            json!({
                "host": host,
                "binary": binary,
                "topic": topic,
                "mapped_regions": mapped_regions,
                "enabled": enabled,
            }),
        )
    }

    pub fn update(&self, service: impl AsId, values: Value) -> Result<Resource> {
        self.base
            .update(&self.collection, service.as_id()?, values)
    }

    pub fn delete(&self, service: impl AsId) -> Result<()> {
        self.base.delete(&self.collection, service.as_id()?)
    }
}
