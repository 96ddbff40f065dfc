// Regions group endpoints and services by location.

use serde_json::{Map, Value};

use super::{insert_opt, BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::resource::{AsId, Resource};

pub struct RegionManager<'a> {
    base: BaseManager<'a>,
    collection: Collection,
}

impl<'a> RegionManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        RegionManager {
            base,
            collection: Collection::new("/regions", "region", "regions"),
        }
    }

    pub fn list(&self) -> Result<Vec<Resource>> {
        self.base.list(
            &self.collection,
            ApiRequest::new(Method::Get, self.collection.path.clone()),
            true,
        )
    }

    pub fn get(&self, region: impl AsId) -> Result<Resource> {
        self.base.get(&self.collection, region.as_id()?)
    }

    pub fn create(&self, name: &str, description: Option<&str>, enabled: bool) -> Result<Resource> {
        let mut body = Map::new();
        body.insert("name".into(), Value::String(name.to_owned()));
        insert_opt(&mut body, "description", description)?;
        body.insert("enabled".into(), Value::Bool(enabled));
        self.base.create(&self.collection, Value::Object(body))
    }

    pub fn update(&self, region: impl AsId, values: Value) -> Result<Resource> {
        self.base
            .update(&self.collection, region.as_id()?, values)
    }

    pub fn delete(&self, region: impl AsId) -> Result<()> {
        self.base.delete(&self.collection, region.as_id()?)
    }
}
