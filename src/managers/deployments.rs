// Deployments (migrations on older services) of a transfer's instances.

use serde_json::{json, Map, Value};

use super::{insert_opt, BaseManager, Collection};
use crate::api::{ApiRequest, Method};
use crate::error::Result;
use crate::mappings::UserScripts;
use crate::resource::{AsId, Resource};

/// Deployments replaced migrations in newer API versions. The request body
/// differs only in how the source transfer is named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeploymentKind {
    #[default]
    Deployment,
    Migration,
}

impl DeploymentKind {
    fn collection(self) -> Collection {
        match self {
            DeploymentKind::Deployment => Collection::new("/deployments", "deployment", "deployments"),
            DeploymentKind::Migration => Collection::new("/migrations", "migration", "migrations"),
        }
    }

    fn source_key(self) -> &'static str {
        match self {
            DeploymentKind::Deployment => "transfer_id",
            DeploymentKind::Migration => "replica_id",
        }
    }
}

/// Options for deploying the instances of an existing transfer.
#[derive(Clone, Debug, Default)]
pub struct DeploymentSpec {
    pub transfer_id: String,
    pub clone_disks: bool,
    pub force: bool,
    pub skip_os_morphing: bool,
    pub user_scripts: Option<UserScripts>,
    pub instance_osmorphing_minion_pool_mappings: Option<Map<String, Value>>,
}

pub struct DeploymentManager<'a> {
    base: BaseManager<'a>,
    kind: DeploymentKind,
    collection: Collection,
}

impl<'a> DeploymentManager<'a> {
    pub fn new(base: BaseManager<'a>, kind: DeploymentKind) -> Self {
        DeploymentManager {
            base,
            kind,
            collection: kind.collection(),
        }
    }

    pub fn list(&self, detail: bool) -> Result<Vec<Resource>> {
        let path = if detail {
            format!("{}/detail", self.collection.path)
        } else {
            self.collection.path.clone()
        };
        self.base
            .list(&self.collection, ApiRequest::new(Method::Get, path), detail)
    }

    pub fn get(&self, deployment: impl AsId) -> Result<Resource> {
        self.base.get(&self.collection, deployment.as_id()?)
    }

    pub fn create_from_transfer(&self, spec: &DeploymentSpec) -> Result<Resource> {
        let mut body = Map::new();
        body.insert(
            self.kind.source_key().to_owned(),
            Value::String(spec.transfer_id.clone()),
        );
        body.insert("clone_disks".into(), Value::Bool(spec.clone_disks));
        body.insert("force".into(), Value::Bool(spec.force));
        body.insert("skip_os_morphing".into(), Value::Bool(spec.skip_os_morphing));
        insert_opt(
            &mut body,
            "user_scripts",
            spec.user_scripts.as_ref().filter(|s| !s.is_empty()),
        )?;
        insert_opt(
            &mut body,
            "instance_osmorphing_minion_pool_mappings",
            spec.instance_osmorphing_minion_pool_mappings
                .as_ref()
                .filter(|m| !m.is_empty()),
        )?;
        self.base.create(&self.collection, Value::Object(body))
    }

    pub fn delete(&self, deployment: impl AsId) -> Result<()> {
        self.base.delete(&self.collection, deployment.as_id()?)
    }

    pub fn cancel(&self, deployment: impl AsId, force: bool) -> Result<()> {
        self.base.action(
            &self.collection,
            deployment.as_id()?,
            "cancel",
            json!({ "force": force }),
        )?;
        Ok(())
    }
}
