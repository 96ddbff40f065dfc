// Entry point of the SDK: owns the transport and hands out managers that
// borrow it.

use crate::api::{HttpTransport, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::managers::*;

pub struct Client {
    transport: Box<dyn Transport>,
    transfer_kind: TransferKind,
    deployment_kind: DeploymentKind,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Client::with_transport(HttpTransport::from_config(config)?))
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Client {
            transport: Box::new(transport),
            transfer_kind: TransferKind::default(),
            deployment_kind: DeploymentKind::default(),
        }
    }

    /// Talk to an API that still exposes `/replicas` and `/migrations`.
    pub fn legacy(mut self) -> Self {
        self.transfer_kind = TransferKind::Replica;
        self.deployment_kind = DeploymentKind::Migration;
        self
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn base(&self) -> BaseManager<'_> {
        BaseManager::new(self.transport.as_ref())
    }

    pub fn endpoints(&self) -> EndpointManager<'_> {
        EndpointManager::new(self.base())
    }

    pub fn endpoint_instances(&self) -> EndpointInstanceManager<'_> {
        EndpointInstanceManager::new(self.base())
    }

    pub fn endpoint_networks(&self) -> EndpointNetworkManager<'_> {
        EndpointNetworkManager::new(self.base())
    }

    pub fn endpoint_storage(&self) -> EndpointStorageManager<'_> {
        EndpointStorageManager::new(self.base())
    }

    pub fn endpoint_options(&self, kind: OptionsKind) -> EndpointOptionsManager<'_> {
        EndpointOptionsManager::new(self.base(), kind)
    }

    pub fn transfers(&self) -> TransferManager<'_> {
        TransferManager::new(self.base(), self.transfer_kind)
    }

    pub fn executions(&self) -> ExecutionManager<'_> {
        ExecutionManager::new(self.base(), self.transfer_kind)
    }

    pub fn schedules(&self) -> ScheduleManager<'_> {
        ScheduleManager::new(self.base(), self.transfer_kind)
    }

    pub fn deployments(&self) -> DeploymentManager<'_> {
        DeploymentManager::new(self.base(), self.deployment_kind)
    }

    pub fn minion_pools(&self) -> MinionPoolManager<'_> {
        MinionPoolManager::new(self.base())
    }

    pub fn providers(&self) -> ProviderManager<'_> {
        ProviderManager::new(self.base())
    }

    pub fn regions(&self) -> RegionManager<'_> {
        RegionManager::new(self.base())
    }

    pub fn services(&self) -> ServiceManager<'_> {
        ServiceManager::new(self.base())
    }

    pub fn diagnostics(&self) -> DiagnosticManager<'_> {
        DiagnosticManager::new(self.base())
    }
}
