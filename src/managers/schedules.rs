// Recurring executions attached to a transfer.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{insert_opt, BaseManager, Collection, TransferKind};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::resource::{AsId, Resource};
use crate::schedule::{format_expiration_date, Schedule};

/// A schedule to attach to a transfer.
#[derive(Clone, Debug, Default)]
pub struct ScheduleSpec {
    pub schedule: Schedule,
    pub enabled: bool,
    pub expiration_date: Option<DateTime<Utc>>,
    pub shutdown_instance: bool,
    pub auto_deploy: bool,
}

impl ScheduleSpec {
    fn to_body(&self) -> Result<Value> {
        self.schedule.validate()?;
        let mut body = Map::new();
        body.insert("schedule".into(), serde_json::to_value(self.schedule)?);
        body.insert("enabled".into(), Value::Bool(self.enabled));
        insert_opt(
            &mut body,
            "expiration_date",
            self.expiration_date.as_ref().map(format_expiration_date),
        )?;
        body.insert("shutdown_instance".into(), Value::Bool(self.shutdown_instance));
        body.insert("auto_deploy".into(), Value::Bool(self.auto_deploy));
        Ok(Value::Object(body))
    }
}

/// Fields to change on an existing schedule; unset fields are left alone.
#[derive(Clone, Debug, Default)]
pub struct ScheduleUpdate {
    pub schedule: Option<Schedule>,
    pub enabled: Option<bool>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub shutdown_instance: Option<bool>,
    pub auto_deploy: Option<bool>,
}

impl ScheduleUpdate {
    fn to_body(&self) -> Result<Value> {
        let mut body = Map::new();
        if let Some(schedule) = &self.schedule {
            schedule.validate()?;
        }
        insert_opt(&mut body, "schedule", self.schedule)?;
        insert_opt(&mut body, "enabled", self.enabled)?;
        insert_opt(
            &mut body,
            "expiration_date",
            self.expiration_date.as_ref().map(format_expiration_date),
        )?;
        insert_opt(&mut body, "shutdown_instance", self.shutdown_instance)?;
        insert_opt(&mut body, "auto_deploy", self.auto_deploy)?;
        Ok(Value::Object(body))
    }
}

pub struct ScheduleManager<'a> {
    base: BaseManager<'a>,
    parent: Collection,
}

impl<'a> ScheduleManager<'a> {
    pub fn new(base: BaseManager<'a>, kind: TransferKind) -> Self {
        ScheduleManager {
            base,
            parent: kind.collection(),
        }
    }

    fn collection(&self, transfer: impl AsId) -> Result<Collection> {
        Ok(Collection::new(
            format!("{}/schedules", self.parent.item_path(transfer.as_id()?)),
            "schedule",
            "schedules",
        ))
    }

    pub fn list(&self, transfer: impl AsId, hide_expired: bool) -> Result<Vec<Resource>> {
        let collection = self.collection(transfer)?;
        let mut request = ApiRequest::new(Method::Get, collection.path.clone());
        if hide_expired {
            request = request.query("show_expired", "false");
        }
        self.base.list(&collection, request, true)
    }

    pub fn get(&self, transfer: impl AsId, schedule: impl AsId) -> Result<Resource> {
        let collection = self.collection(transfer)?;
        self.base.get(&collection, schedule.as_id()?)
    }

    /// The schedule body is sent flat, not wrapped in a `schedule` key.
    pub fn create(&self, transfer: impl AsId, spec: &ScheduleSpec) -> Result<Resource> {
        let collection = self.collection(transfer)?;
        let request = ApiRequest::new(Method::Post, collection.path.clone()).body(spec.to_body()?);
        let value = self.base.send_for_key(&request, collection.singular)?;
        self.base.wrap(value, Some(&collection), false)
    }

    pub fn update(
        &self,
        transfer: impl AsId,
        schedule: impl AsId,
        update: &ScheduleUpdate,
    ) -> Result<Resource> {
        let collection = self.collection(transfer)?;
        let request = ApiRequest::new(Method::Put, collection.item_path(schedule.as_id()?))
            .body(update.to_body()?);
        let value = self.base.send_for_key(&request, collection.singular)?;
        self.base.wrap(value, Some(&collection), false)
    }

    pub fn delete(&self, transfer: impl AsId, schedule: impl AsId) -> Result<()> {
        let collection = self.collection(transfer)?;
        self.base.delete(&collection, schedule.as_id()?)
    }
}
