// Provider types and schemas each platform plugin exposes.

use serde_json::{Map, Value};

use super::BaseManager;
use crate::api::{ApiRequest, Method};
use crate::error::{Error, Result};

pub struct ProviderManager<'a> {
    base: BaseManager<'a>,
}

impl<'a> ProviderManager<'a> {
    pub fn new(base: BaseManager<'a>) -> Self {
        ProviderManager { base }
    }

    /// Map of platform name to the provider types it implements.
    pub fn list(&self) -> Result<Map<String, Value>> {
        let request = ApiRequest::new(Method::Get, "/providers");
        match self.base.send_for_key(&request, "providers")? {
            Value::Object(map) => Ok(map),
            other => Err(Error::InvalidResponse(format!(
                "expected an object of providers, got {other}"
            ))),
        }
    }

    /// JSON schemas a provider publishes for one provider type.
    pub fn schemas(&self, platform: &str, schema_type: u32) -> Result<Value> {
        let request = ApiRequest::new(
            Method::Get,
            format!("/providers/{platform}/schemas/{schema_type}"),
        );
        self.base.send_for_key(&request, "schemas")
    }
}
