// Generic wrapper over the JSON objects returned by the API. Keys are read
// directly; a missing key on a partially loaded resource triggers a single
// re-fetch from the location the resource was produced from.

use log::debug;
use serde_json::{Map, Value};

use crate::api::{ApiRequest, Method, Transport};
use crate::error::{Error, Result};

/// Where a resource can be fetched from again: the GET path and the key
/// wrapping it in the response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    info: Map<String, Value>,
    location: Option<Location>,
    loaded: bool,
}

impl Resource {
    pub fn new(info: Map<String, Value>) -> Self {
        Resource {
            info,
            location: None,
            loaded: false,
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(info) => Ok(Resource::new(info)),
            other => Err(Error::InvalidResponse(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    pub(crate) fn located(mut self, location: Location, loaded: bool) -> Self {
        self.location = Some(location);
        self.loaded = loaded;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.attr_str("id")
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.info.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(Value::as_str)
    }

    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.info.get(key).and_then(Value::as_bool)
    }

    /// Read `key`, fetching the full representation once if the key is
    /// absent and the resource has not been loaded yet.
    pub fn attr_or_load(&mut self, key: &str, transport: &dyn Transport) -> Result<Option<&Value>> {
        if !self.info.contains_key(key) && !self.loaded {
            debug!("attribute {key:?} missing, reloading resource");
            self.reload(transport)?;
        }
        Ok(self.info.get(key))
    }

    /// Replace the contents with a fresh GET of the resource.
    pub fn reload(&mut self, transport: &dyn Transport) -> Result<()> {
        let location = self.location.as_ref().ok_or_else(|| {
            Error::InvalidArgument("resource has no location to reload from".into())
        })?;
        let body = transport
            .send(&ApiRequest::new(Method::Get, location.path.clone()))?
            .ok_or_else(|| Error::InvalidResponse(format!("empty body from {}", location.path)))?;
        let inner = body.get(&location.key).cloned().ok_or_else(|| {
            Error::InvalidResponse(format!("missing key {:?} in {}", location.key, location.path))
        })?;
        match inner {
            Value::Object(info) => self.info = info,
            other => {
                return Err(Error::InvalidResponse(format!(
                    "expected object under {:?}, got {other}",
                    location.key
                )))
            }
        }
        self.loaded = true;
        Ok(())
    }

    pub fn info(&self) -> &Map<String, Value> {
        &self.info
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.info.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.info)
    }
}

/// Anything that identifies a remote resource.
pub trait AsId {
    fn as_id(&self) -> Result<&str>;
}

impl AsId for str {
    fn as_id(&self) -> Result<&str> {
        Ok(self)
    }
}

impl AsId for String {
    fn as_id(&self) -> Result<&str> {
        Ok(self.as_str())
    }
}

impl AsId for Resource {
    fn as_id(&self) -> Result<&str> {
        self.id()
            .ok_or_else(|| Error::InvalidArgument("resource has no \"id\" attribute".into()))
    }
}

impl<T: AsId + ?Sized> AsId for &T {
    fn as_id(&self) -> Result<&str> {
        (**self).as_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    struct OneShot {
        calls: Cell<usize>,
        body: Value,
    }

    impl Transport for OneShot {
        fn send(&self, request: &ApiRequest) -> Result<Option<Value>> {
            assert_eq!(request.method, Method::Get);
            assert_eq!(request.path, "/endpoints/e1");
            self.calls.set(self.calls.get() + 1);
            Ok(Some(self.body.clone()))
        }
    }

    fn partial() -> Resource {
        Resource::from_value(json!({"id": "e1", "name": "vmware"}))
            .unwrap()
            .located(
                Location {
                    path: "/endpoints/e1".into(),
                    key: "endpoint".into(),
                },
                false,
            )
    }

    #[test]
    fn test_lazy_load_once() {
        let transport = OneShot {
            calls: Cell::new(0),
            body: json!({"endpoint": {"id": "e1", "name": "vmware", "type": "vmware_vsphere"}}),
        };
        let mut res = partial();
        assert_eq!(res.attr_or_load("name", &transport).unwrap(), Some(&json!("vmware")));
        assert_eq!(transport.calls.get(), 0);

        assert_eq!(
            res.attr_or_load("type", &transport).unwrap(),
            Some(&json!("vmware_vsphere"))
        );
        assert_eq!(transport.calls.get(), 1);
        assert!(res.is_loaded());

        assert_eq!(res.attr_or_load("missing", &transport).unwrap(), None);
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn test_reload_errors() {
        let transport = OneShot {
            calls: Cell::new(0),
            body: json!({"other": {}}),
        };
        let mut res = partial();
        assert!(matches!(
            res.attr_or_load("type", &transport),
            Err(Error::InvalidResponse(_))
        ));

        let mut unlocated = Resource::from_value(json!({"id": "x"})).unwrap();
        unlocated.reload(&transport).unwrap_err();
        Resource::from_value(json!([1])).unwrap_err();
    }

    #[test]
    fn test_as_id() {
        let res = partial();
        assert_eq!(res.as_id().unwrap(), "e1");
        assert_eq!("abc".as_id().unwrap(), "abc");
        assert_eq!(String::from("abc").as_id().unwrap(), "abc");
        Resource::new(Map::new()).as_id().unwrap_err();
    }
}
